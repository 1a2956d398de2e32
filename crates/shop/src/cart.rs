//! Cart resolution and item mutation.

use common::{CartId, CartItemId, ColorId, ProductId, SizeId};
use domain::{Actor, CartAction, CartItem, CartLine, CartOwner, Money};
use store::{CartStore, CatalogStore};

use crate::{ShopError, lines::load_cart_lines};

/// A cart's contents priced at this moment.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart_id: CartId,
    pub lines: Vec<CartLine>,
    pub total: Money,
}

/// Service for cart access and mutation.
///
/// Carts exist for authenticated users and anonymous sessions alike;
/// the owner is derived from the acting identity. No stock checks are
/// performed anywhere in here.
pub struct CartService<S> {
    store: S,
}

impl<S: CartStore + CatalogStore> CartService<S> {
    /// Creates a new cart service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn owner_for(actor: &Actor) -> CartOwner {
        match actor {
            Actor::Authenticated(user) => CartOwner::User(user.user_id),
            Actor::Anonymous { session_token } => CartOwner::Session(session_token.clone()),
        }
    }

    /// Adds one unit of a product variant to the actor's cart.
    ///
    /// An existing item matching the exact (product, size, color) tuple
    /// is incremented; otherwise a new item with quantity 1 is created.
    #[tracing::instrument(skip(self, actor))]
    pub async fn add_to_cart(
        &self,
        actor: &Actor,
        product_id: ProductId,
        size_id: Option<SizeId>,
        color_id: Option<ColorId>,
    ) -> Result<CartItem, ShopError> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| ShopError::not_found("product", product_id))?;

        if let Some(id) = size_id {
            if self.store.get_size(id).await?.is_none() {
                return Err(ShopError::not_found("size", id));
            }
        }
        if let Some(id) = color_id {
            if self.store.get_color(id).await?.is_none() {
                return Err(ShopError::not_found("color", id));
            }
        }

        let cart = self.store.get_or_create_cart(&Self::owner_for(actor)).await?;

        if let Some(existing) = self
            .store
            .find_cart_item(cart.id, product.id, size_id, color_id)
            .await?
        {
            let quantity = existing.quantity + 1;
            self.store
                .set_cart_item_quantity(existing.id, quantity)
                .await?;
            return Ok(CartItem {
                quantity,
                ..existing
            });
        }

        let item = CartItem {
            id: CartItemId::new(),
            cart_id: cart.id,
            product_id: product.id,
            size_id,
            color_id,
            quantity: 1,
        };
        self.store.insert_cart_item(item.clone()).await?;
        Ok(item)
    }

    /// Applies a mutation to a cart item.
    ///
    /// `Decrease` deletes the item when its quantity would reach zero;
    /// a zero-quantity row is never persisted.
    #[tracing::instrument(skip(self))]
    pub async fn update_item(
        &self,
        item_id: CartItemId,
        action: CartAction,
    ) -> Result<(), ShopError> {
        let item = self
            .store
            .get_cart_item(item_id)
            .await?
            .ok_or_else(|| ShopError::not_found("cart item", item_id))?;

        match action {
            CartAction::Increase => {
                self.store
                    .set_cart_item_quantity(item.id, item.quantity + 1)
                    .await?;
            }
            CartAction::Decrease => {
                if item.quantity <= 1 {
                    self.store.delete_cart_item(item.id).await?;
                } else {
                    self.store
                        .set_cart_item_quantity(item.id, item.quantity - 1)
                        .await?;
                }
            }
            CartAction::Remove => {
                self.store.delete_cart_item(item.id).await?;
            }
        }

        Ok(())
    }

    /// Returns the actor's cart priced live against the catalog.
    #[tracing::instrument(skip(self, actor))]
    pub async fn view_cart(&self, actor: &Actor) -> Result<CartView, ShopError> {
        let cart = self.store.get_or_create_cart(&Self::owner_for(actor)).await?;
        let lines = load_cart_lines(&self.store, cart.id).await?;
        let total = lines.iter().map(CartLine::total_price).sum();

        Ok(CartView {
            cart_id: cart.id,
            lines,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::CategoryId;
    use domain::{Product, Size, UserIdentity};
    use store::InMemoryStore;

    fn customer() -> Actor {
        Actor::Authenticated(UserIdentity {
            user_id: common::UserId::new(),
            username: "asha".to_string(),
            email: "asha@example.com".to_string(),
            staff: false,
        })
    }

    async fn seed_product(store: &InMemoryStore, price: i64, discount: Option<i64>) -> Product {
        let product = Product {
            id: ProductId::new(),
            name: "Linen Shirt".to_string(),
            category_id: CategoryId::new(),
            price: Money::from_minor(price),
            discount_price: discount.map(Money::from_minor),
            description: String::new(),
            stock: 10,
            created_at: Utc::now(),
        };
        store.insert_product(product.clone()).await.unwrap();
        product
    }

    #[tokio::test]
    async fn add_creates_item_with_quantity_one() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let service = CartService::new(store);

        let item = service
            .add_to_cart(&customer(), product.id, None, None)
            .await
            .unwrap();

        assert_eq!(item.quantity, 1);
        assert_eq!(item.product_id, product.id);
    }

    #[tokio::test]
    async fn add_same_variant_increments_quantity() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let actor = customer();
        let service = CartService::new(store);

        let first = service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();
        let second = service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 2);

        let view = service.view_cart(&actor).await.unwrap();
        assert_eq!(view.lines.len(), 1);
    }

    #[tokio::test]
    async fn add_different_size_creates_separate_item() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let size = Size {
            id: SizeId::new(),
            name: "M".to_string(),
        };
        store.insert_size(size.clone()).await.unwrap();
        let actor = customer();
        let service = CartService::new(store);

        service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();
        service
            .add_to_cart(&actor, product.id, Some(size.id), None)
            .await
            .unwrap();

        let view = service.view_cart(&actor).await.unwrap();
        assert_eq!(view.lines.len(), 2);
    }

    #[tokio::test]
    async fn add_unknown_product_is_not_found() {
        let service = CartService::new(InMemoryStore::new());
        let result = service
            .add_to_cart(&customer(), ProductId::new(), None, None)
            .await;
        assert!(matches!(result, Err(ShopError::NotFound { .. })));
    }

    #[tokio::test]
    async fn add_unknown_size_is_not_found() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let service = CartService::new(store);

        let result = service
            .add_to_cart(&customer(), product.id, Some(SizeId::new()), None)
            .await;
        assert!(matches!(result, Err(ShopError::NotFound { .. })));
    }

    #[tokio::test]
    async fn anonymous_actor_gets_a_session_cart() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let actor = Actor::Anonymous {
            session_token: "sess-1".to_string(),
        };
        let service = CartService::new(store);

        service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();

        let view = service.view_cart(&actor).await.unwrap();
        assert_eq!(view.lines.len(), 1);
    }

    #[tokio::test]
    async fn increase_and_decrease_adjust_quantity() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let actor = customer();
        let service = CartService::new(store);

        let item = service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();

        service
            .update_item(item.id, CartAction::Increase)
            .await
            .unwrap();
        service
            .update_item(item.id, CartAction::Increase)
            .await
            .unwrap();
        service
            .update_item(item.id, CartAction::Decrease)
            .await
            .unwrap();

        let view = service.view_cart(&actor).await.unwrap();
        assert_eq!(view.lines[0].item.quantity, 2);
    }

    #[tokio::test]
    async fn decrease_at_quantity_one_deletes_the_item() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let actor = customer();
        let service = CartService::new(store);

        let item = service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();
        service
            .update_item(item.id, CartAction::Decrease)
            .await
            .unwrap();

        let view = service.view_cart(&actor).await.unwrap();
        assert!(view.lines.is_empty());
    }

    #[tokio::test]
    async fn remove_deletes_unconditionally() {
        let store = InMemoryStore::new();
        let product = seed_product(&store, 4500, None).await;
        let actor = customer();
        let service = CartService::new(store);

        let item = service
            .add_to_cart(&actor, product.id, None, None)
            .await
            .unwrap();
        service
            .update_item(item.id, CartAction::Increase)
            .await
            .unwrap();
        service
            .update_item(item.id, CartAction::Remove)
            .await
            .unwrap();

        let view = service.view_cart(&actor).await.unwrap();
        assert!(view.lines.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_item_is_not_found() {
        let service = CartService::new(InMemoryStore::new());
        let result = service
            .update_item(CartItemId::new(), CartAction::Increase)
            .await;
        assert!(matches!(result, Err(ShopError::NotFound { .. })));
    }

    #[tokio::test]
    async fn view_cart_totals_use_discount_prices() {
        let store = InMemoryStore::new();
        let full = seed_product(&store, 5000, None).await;
        let discounted = seed_product(&store, 2000, Some(1500)).await;
        let actor = customer();
        let service = CartService::new(store);

        for _ in 0..3 {
            service
                .add_to_cart(&actor, full.id, None, None)
                .await
                .unwrap();
        }
        service
            .add_to_cart(&actor, discounted.id, None, None)
            .await
            .unwrap();

        let view = service.view_cart(&actor).await.unwrap();
        assert_eq!(view.total, Money::from_minor(16500));
    }
}
