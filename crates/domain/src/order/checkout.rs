//! Cart-to-order materialization as a pure computation.
//!
//! Converting a cart into an order snapshots every line: the unit price
//! (discount price when set) and the size/color display names are copied
//! into the draft so that later catalog edits cannot reach placed orders.
//! Persisting the draft atomically is the storage layer's job.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::money::Money;

/// Freeform shipping details captured verbatim from the checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

/// A frozen order line computed from a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub product_name: String,
    /// Size display name, empty when the cart line had none.
    pub size: String,
    /// Color display name, empty when the cart line had none.
    pub color: String,
    pub quantity: u32,
    /// Unit price captured at materialization time.
    pub price: Money,
}

impl OrderItemDraft {
    /// Quantity times the captured unit price.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// The monetary summary and frozen lines of an order about to be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub subtotal: Money,
    /// Always zero; the discount is already folded into each captured
    /// unit price.
    pub discount: Money,
    pub total_amount: Money,
    pub items: Vec<OrderItemDraft>,
}

impl OrderDraft {
    /// Materializes the given cart lines into frozen order lines.
    ///
    /// Unit prices are evaluated at this moment (discount price when
    /// present) and never recomputed afterwards. Returns an empty draft
    /// for an empty cart; callers treat that as the no-op path.
    pub fn from_cart(lines: &[CartLine]) -> Self {
        let items: Vec<OrderItemDraft> = lines
            .iter()
            .map(|line| OrderItemDraft {
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                size: line.size_name.clone().unwrap_or_default(),
                color: line.color_name.clone().unwrap_or_default(),
                quantity: line.item.quantity,
                price: line.unit_price(),
            })
            .collect();

        let total: Money = items.iter().map(OrderItemDraft::line_total).sum();

        Self {
            subtotal: total,
            discount: Money::zero(),
            total_amount: total,
            items,
        }
    }

    /// Returns true when there is nothing to place.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, CartLine};
    use crate::catalog::Product;
    use chrono::Utc;
    use common::{CartId, CartItemId, CategoryId};

    fn cart_line(
        name: &str,
        quantity: u32,
        price: i64,
        discount: Option<i64>,
        size_name: Option<&str>,
        color_name: Option<&str>,
    ) -> CartLine {
        let product = Product {
            id: ProductId::new(),
            name: name.to_string(),
            category_id: CategoryId::new(),
            price: Money::from_minor(price),
            discount_price: discount.map(Money::from_minor),
            description: String::new(),
            stock: 10,
            created_at: Utc::now(),
        };
        CartLine {
            item: CartItem {
                id: CartItemId::new(),
                cart_id: CartId::new(),
                product_id: product.id,
                size_id: None,
                color_id: None,
                quantity,
            },
            product,
            size_name: size_name.map(String::from),
            color_name: color_name.map(String::from),
        }
    }

    #[test]
    fn empty_cart_yields_empty_draft() {
        let draft = OrderDraft::from_cart(&[]);
        assert!(draft.is_empty());
        assert_eq!(draft.total_amount, Money::zero());
    }

    #[test]
    fn captures_discounted_unit_price() {
        let draft = OrderDraft::from_cart(&[cart_line(
            "Wool Coat",
            2,
            Money::from_major(100).minor(),
            Some(Money::from_major(80).minor()),
            None,
            None,
        )]);

        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].price, Money::from_major(80));
        assert_eq!(draft.items[0].quantity, 2);
        assert_eq!(draft.items[0].line_total(), Money::from_major(160));
        assert_eq!(draft.total_amount, Money::from_major(160));
    }

    #[test]
    fn totals_sum_over_all_lines() {
        let draft = OrderDraft::from_cart(&[
            cart_line("Shirt", 3, Money::from_major(50).minor(), None, None, None),
            cart_line(
                "Cap",
                1,
                Money::from_major(20).minor(),
                Some(Money::from_major(15).minor()),
                None,
                None,
            ),
        ]);

        assert_eq!(draft.items[0].line_total(), Money::from_major(150));
        assert_eq!(draft.items[1].line_total(), Money::from_major(15));
        assert_eq!(draft.total_amount, Money::from_major(165));
        assert_eq!(draft.subtotal, draft.total_amount);
    }

    #[test]
    fn discount_field_is_always_zero() {
        let draft = OrderDraft::from_cart(&[cart_line(
            "Scarf",
            1,
            1999,
            Some(999),
            None,
            None,
        )]);
        assert_eq!(draft.discount, Money::zero());
    }

    #[test]
    fn variant_names_are_captured_as_text() {
        let draft = OrderDraft::from_cart(&[
            cart_line("Tee", 1, 2500, None, Some("M"), Some("Red")),
            cart_line("Tote", 1, 4000, None, None, None),
        ]);

        assert_eq!(draft.items[0].size, "M");
        assert_eq!(draft.items[0].color, "Red");
        assert_eq!(draft.items[1].size, "");
        assert_eq!(draft.items[1].color, "");
    }

    #[test]
    fn later_product_edits_do_not_reach_the_draft() {
        let mut line = cart_line("Boots", 2, 12000, Some(9000), None, None);
        let draft = OrderDraft::from_cart(std::slice::from_ref(&line));

        line.product.price = Money::from_minor(1);
        line.product.discount_price = None;

        assert_eq!(draft.items[0].price, Money::from_minor(9000));
        assert_eq!(draft.total_amount, Money::from_minor(18000));
    }
}
