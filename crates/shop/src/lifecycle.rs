//! Order lifecycle engine: status transitions with an audit trail.

use common::OrderId;
use domain::{Actor, Order, OrderError, OrderItem, OrderStatus, OrderStatusHistory};
use store::OrderStore;

use crate::ShopError;

/// How many audit rows the order detail view carries, newest first.
pub const HISTORY_LIMIT: usize = 20;

/// An order with its frozen items, recent audit trail and the statuses
/// it may move to next.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub history: Vec<OrderStatusHistory>,
    pub allowed_next: Vec<OrderStatus>,
}

/// Service that applies and audits order status transitions.
///
/// Legality comes from the transition table on [`OrderStatus`]; this
/// service sequences the check against storage so that an accepted
/// transition persists the new status and exactly one history row, and a
/// rejected one changes nothing.
pub struct LifecycleService<S> {
    store: S,
}

impl<S: OrderStore> LifecycleService<S> {
    /// Creates a new lifecycle service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn require_order(&self, order_id: OrderId) -> Result<Order, ShopError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", order_id))
    }

    /// Returns the statuses the order may transition to.
    #[tracing::instrument(skip(self))]
    pub async fn allowed_transitions(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderStatus>, ShopError> {
        let order = self.require_order(order_id).await?;
        Ok(order.status.allowed_next().to_vec())
    }

    /// Moves an order to `target` and records the change.
    ///
    /// Staff only. The transition is validated against the table before
    /// anything is written; storage re-checks the current status under
    /// its own serialization so concurrent transitions cannot both
    /// succeed.
    #[tracing::instrument(skip(self, actor))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        actor: &Actor,
    ) -> Result<Order, ShopError> {
        let user = actor.user().ok_or(ShopError::AuthenticationRequired)?;
        if !user.staff {
            return Err(ShopError::StaffRequired);
        }

        let order = self.require_order(order_id).await?;
        if !order.status.can_transition_to(target) {
            metrics::counter!("order_transitions_rejected_total").increment(1);
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: target,
            }
            .into());
        }

        let updated = self
            .store
            .apply_transition(order_id, order.status, target, Some(user.user_id))
            .await?;

        metrics::counter!("order_transitions_total").increment(1);
        tracing::info!(
            order_id = %order_id,
            from = %order.status,
            to = %target,
            changed_by = %user.user_id,
            "order status updated"
        );

        Ok(updated)
    }

    /// Returns one order with items, recent history and allowed next
    /// statuses. Staff only.
    #[tracing::instrument(skip(self, actor))]
    pub async fn order_detail(
        &self,
        order_id: OrderId,
        actor: &Actor,
    ) -> Result<OrderDetail, ShopError> {
        if !actor.is_staff() {
            return Err(ShopError::StaffRequired);
        }

        let order = self.require_order(order_id).await?;
        let items = self.store.order_items(order_id).await?;
        let history = self.store.status_history(order_id, HISTORY_LIMIT).await?;
        let allowed_next = order.status.allowed_next().to_vec();

        Ok(OrderDetail {
            order,
            items,
            history,
            allowed_next,
        })
    }

    /// Returns every order, newest first. Staff only.
    #[tracing::instrument(skip(self, actor))]
    pub async fn all_orders(&self, actor: &Actor) -> Result<Vec<Order>, ShopError> {
        if !actor.is_staff() {
            return Err(ShopError::StaffRequired);
        }
        Ok(self.store.list_orders().await?)
    }

    /// Returns the acting user's own orders, newest first.
    #[tracing::instrument(skip(self, actor))]
    pub async fn orders_for(&self, actor: &Actor) -> Result<Vec<Order>, ShopError> {
        let user = actor.user().ok_or(ShopError::AuthenticationRequired)?;
        Ok(self.store.list_orders_for_user(user.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CartId, UserId};
    use domain::{Money, PaymentStatus, UserIdentity};
    use store::InMemoryStore;

    fn staff() -> Actor {
        Actor::Authenticated(UserIdentity {
            user_id: UserId::new(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            staff: true,
        })
    }

    fn customer() -> Actor {
        Actor::Authenticated(UserIdentity {
            user_id: UserId::new(),
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            staff: false,
        })
    }

    async fn seed_order(store: &InMemoryStore) -> Order {
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            user_id: UserId::new(),
            full_name: "Asha Rao".to_string(),
            address: "12 Hill Road".to_string(),
            city: "Pune".to_string(),
            phone: "555-0100".to_string(),
            subtotal: Money::from_minor(5000),
            discount: Money::zero(),
            total_amount: Money::from_minor(5000),
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            ordered_at: now,
            updated_at: now,
        };
        store
            .place_order(CartId::new(), order.clone(), vec![])
            .await
            .unwrap();
        order
    }

    #[tokio::test]
    async fn accepted_transition_updates_status_and_history() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store.clone());

        let updated = service
            .transition(order.id, OrderStatus::Confirmed, &staff())
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(store.history_count(order.id).await, 1);
    }

    #[tokio::test]
    async fn rejected_transition_leaves_no_trace() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store.clone());

        let result = service
            .transition(order.id, OrderStatus::Shipped, &staff())
            .await;

        assert!(matches!(
            result,
            Err(ShopError::Order(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            }))
        ));
        assert_eq!(store.history_count(order.id).await, 0);

        let unchanged = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn every_accepted_transition_appends_one_history_row() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store.clone());
        let admin = staff();

        for target in [
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            service.transition(order.id, target, &admin).await.unwrap();
        }

        assert_eq!(store.history_count(order.id).await, 3);

        let detail = service.order_detail(order.id, &admin).await.unwrap();
        assert_eq!(detail.history[0].to_status, OrderStatus::Delivered);
        assert_eq!(detail.history[2].from_status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn terminal_states_are_absorbing() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store.clone());
        let admin = staff();

        service
            .transition(order.id, OrderStatus::Cancelled, &admin)
            .await
            .unwrap();

        assert!(
            service
                .allowed_transitions(order.id)
                .await
                .unwrap()
                .is_empty()
        );

        for target in OrderStatus::ALL {
            let result = service.transition(order.id, target, &admin).await;
            assert!(result.is_err(), "transition to {target} should fail");
        }
        assert_eq!(store.history_count(order.id).await, 1);
    }

    #[tokio::test]
    async fn non_staff_cannot_transition() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store.clone());

        let result = service
            .transition(order.id, OrderStatus::Confirmed, &customer())
            .await;
        assert!(matches!(result, Err(ShopError::StaffRequired)));

        let anonymous = Actor::Anonymous {
            session_token: "sess-1".to_string(),
        };
        let result = service
            .transition(order.id, OrderStatus::Confirmed, &anonymous)
            .await;
        assert!(matches!(result, Err(ShopError::AuthenticationRequired)));
        assert_eq!(store.history_count(order.id).await, 0);
    }

    #[tokio::test]
    async fn transition_on_missing_order_is_not_found() {
        let service = LifecycleService::new(InMemoryStore::new());
        let result = service
            .transition(OrderId::new(), OrderStatus::Confirmed, &staff())
            .await;
        assert!(matches!(result, Err(ShopError::NotFound { .. })));
    }

    #[tokio::test]
    async fn allowed_transitions_follow_the_table() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store);

        let allowed = service.allowed_transitions(order.id).await.unwrap();
        assert_eq!(allowed, vec![OrderStatus::Confirmed, OrderStatus::Cancelled]);
    }

    #[tokio::test]
    async fn order_detail_carries_history_and_allowed_next() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store);
        let admin = staff();

        service
            .transition(order.id, OrderStatus::Confirmed, &admin)
            .await
            .unwrap();

        let detail = service.order_detail(order.id, &admin).await.unwrap();
        assert_eq!(detail.order.status, OrderStatus::Confirmed);
        assert_eq!(detail.history.len(), 1);
        assert_eq!(
            detail.allowed_next,
            vec![OrderStatus::Shipped, OrderStatus::Cancelled]
        );
    }

    #[tokio::test]
    async fn order_detail_requires_staff() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        let service = LifecycleService::new(store);

        let result = service.order_detail(order.id, &customer()).await;
        assert!(matches!(result, Err(ShopError::StaffRequired)));
    }

    #[tokio::test]
    async fn orders_for_returns_only_own_orders() {
        let store = InMemoryStore::new();
        let order = seed_order(&store).await;
        seed_order(&store).await;
        let service = LifecycleService::new(store);

        let owner = Actor::Authenticated(UserIdentity {
            user_id: order.user_id,
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            staff: false,
        });

        let orders = service.orders_for(&owner).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order.id);

        let all = service.all_orders(&staff()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
