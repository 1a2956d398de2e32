//! Cart-to-order materialization.

use chrono::Utc;
use common::OrderId;
use domain::{
    Actor, CartOwner, Order, OrderDraft, OrderItem, OrderStatus, PaymentStatus, ShippingInfo,
    UserIdentity,
};
use notifier::{Notification, Notifier};
use store::{CartStore, CatalogStore, OrderStore};
use uuid::Uuid;

use crate::{ShopError, lines::load_cart_lines};

/// The result of a checkout request.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// The cart was materialized into an order.
    Placed(PlacedOrder),
    /// The cart had no items; nothing happened.
    EmptyCart,
}

/// An order together with its frozen line items.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Service that converts a cart into an immutable order.
pub struct CheckoutService<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> CheckoutService<S, N>
where
    S: CartStore + CatalogStore + OrderStore,
    N: Notifier,
{
    /// Creates a new checkout service.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Places an order from the actor's cart.
    ///
    /// Requires an authenticated actor. An empty cart yields
    /// [`CheckoutOutcome::EmptyCart`] without touching storage. Otherwise
    /// the cart lines are priced at this moment, frozen into order items,
    /// and persisted atomically together with the cart clear; one
    /// confirmation notification is enqueued afterwards, and its fate
    /// never affects the order.
    #[tracing::instrument(skip(self, actor, shipping))]
    pub async fn checkout(
        &self,
        actor: &Actor,
        shipping: ShippingInfo,
    ) -> Result<CheckoutOutcome, ShopError> {
        let started = std::time::Instant::now();

        let user = actor.user().ok_or(ShopError::AuthenticationRequired)?;

        let cart = self
            .store
            .get_or_create_cart(&CartOwner::User(user.user_id))
            .await?;
        let lines = load_cart_lines(&self.store, cart.id).await?;
        let draft = OrderDraft::from_cart(&lines);

        if draft.is_empty() {
            tracing::debug!(cart_id = %cart.id, "checkout on empty cart, nothing to do");
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            user_id: user.user_id,
            full_name: shipping.full_name,
            address: shipping.address,
            city: shipping.city,
            phone: shipping.phone,
            subtotal: draft.subtotal,
            discount: draft.discount,
            total_amount: draft.total_amount,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            ordered_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = draft
            .items
            .iter()
            .map(|line| OrderItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: line.product_id,
                size: line.size.clone(),
                color: line.color.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        self.store
            .place_order(cart.id, order.clone(), items.clone())
            .await?;

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        self.notifier.notify(Notification::new(
            user.email.as_str(),
            format!("Order Confirmed: #{}", order.id),
            confirmation_body(user, &order, &draft),
        ));

        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            items = items.len(),
            "order placed"
        );

        Ok(CheckoutOutcome::Placed(PlacedOrder { order, items }))
    }
}

fn confirmation_body(user: &UserIdentity, order: &Order, draft: &OrderDraft) -> String {
    let mut body = format!(
        "Hi {},\n\nYour order #{} has been confirmed!\n\nHere is what you ordered:\n",
        user.username, order.id
    );

    for item in &draft.items {
        body.push_str(&format!(
            "- {} (Qty: {}) - {}\n",
            item.product_name,
            item.quantity,
            item.line_total()
        ));
    }

    body.push_str(&format!(
        "\nTotal Amount: {}\n\nWe will notify you when it ships!",
        order.total_amount
    ));

    body
}
