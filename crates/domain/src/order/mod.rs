//! Order entities, the lifecycle state machine and checkout
//! materialization.

mod checkout;
mod status;

pub use checkout::{OrderDraft, OrderItemDraft, ShippingInfo};
pub use status::{OrderStatus, PaymentStatus};

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::money::Money;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The transition table does not contain this edge.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The request did not name a target status.
    #[error("no target status provided")]
    MissingTargetStatus,

    /// A status string did not match any known status.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}

/// A placed order.
///
/// Immutable after creation except for `status`/`updated_at`, which move
/// only through the lifecycle engine. The monetary fields are fixed at
/// checkout and never recomputed from the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub subtotal: Money,
    pub discount: Money,
    pub total_amount: Money,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A frozen snapshot of a cart line at the moment the order was placed.
///
/// Size and color are plain text labels, deliberately decoupled from the
/// catalog's variant tables. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    /// Unit price captured at order time.
    pub price: Money,
}

impl OrderItem {
    /// Quantity times the captured unit price.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Append-only audit record of one accepted status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusHistory {
    pub id: Uuid,
    pub order_id: OrderId,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_item_line_total() {
        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: OrderId::new(),
            product_id: ProductId::new(),
            size: "L".to_string(),
            color: String::new(),
            quantity: 3,
            price: Money::from_minor(1050),
        };
        assert_eq!(item.line_total(), Money::from_minor(3150));
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Shipped,
        };
        assert_eq!(err.to_string(), "invalid transition from Pending to Shipped");
    }
}
