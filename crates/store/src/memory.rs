//! In-memory store implementation for tests and store-less dev runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartId, CartItemId, CategoryId, ColorId, OrderId, ProductId, SizeId, UserId};
use domain::{
    Cart, CartItem, CartOwner, Category, Color, Order, OrderItem, OrderStatus, OrderStatusHistory,
    Product, Size,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{CartStore, CatalogStore, OrderStore},
};

#[derive(Debug, Default)]
struct State {
    categories: HashMap<CategoryId, Category>,
    sizes: HashMap<SizeId, Size>,
    colors: HashMap<ColorId, Color>,
    products: HashMap<ProductId, Product>,
    carts: HashMap<CartId, Cart>,
    cart_items: HashMap<CartItemId, CartItem>,
    orders: HashMap<OrderId, Order>,
    order_items: Vec<OrderItem>,
    history: Vec<OrderStatusHistory>,
}

/// In-memory store with the same semantics as the PostgreSQL
/// implementation.
///
/// All tables live behind a single `RwLock`; multi-step writes hold the
/// write guard for their full duration, which gives checkout its
/// atomicity and status transitions their serialization.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of history rows recorded for an order.
    pub async fn history_count(&self, order_id: OrderId) -> usize {
        self.state
            .read()
            .await
            .history
            .iter()
            .filter(|h| h.order_id == order_id)
            .count()
    }

    /// Clears every table.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = State::default();
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_category(&self, category: Category) -> Result<()> {
        self.state
            .write()
            .await
            .categories
            .insert(category.id, category);
        Ok(())
    }

    async fn insert_size(&self, size: Size) -> Result<()> {
        self.state.write().await.sizes.insert(size.id, size);
        Ok(())
    }

    async fn insert_color(&self, color: Color) -> Result<()> {
        self.state.write().await.colors.insert(color.id, color);
        Ok(())
    }

    async fn insert_product(&self, product: Product) -> Result<()> {
        self.state.write().await.products.insert(product.id, product);
        Ok(())
    }

    async fn update_product(&self, product: Product) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&product.id) {
            return Err(StoreError::not_found("product", product.id));
        }
        state.products.insert(product.id, product);
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .products
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("product", id))?;
        state.cart_items.retain(|_, item| item.product_id != id);
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_size(&self, id: SizeId) -> Result<Option<Size>> {
        Ok(self.state.read().await.sizes.get(&id).cloned())
    }

    async fn get_color(&self, id: ColorId) -> Result<Option<Color>> {
        Ok(self.state.read().await.colors.get(&id).cloned())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn get_or_create_cart(&self, owner: &CartOwner) -> Result<Cart> {
        let mut state = self.state.write().await;

        if let Some(cart) = state.carts.values().find(|c| &c.owner == owner) {
            return Ok(cart.clone());
        }

        let cart = Cart {
            id: CartId::new(),
            owner: owner.clone(),
            created_at: Utc::now(),
        };
        state.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        Ok(self
            .state
            .read()
            .await
            .cart_items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn get_cart_item(&self, item_id: CartItemId) -> Result<Option<CartItem>> {
        Ok(self.state.read().await.cart_items.get(&item_id).cloned())
    }

    async fn find_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        size_id: Option<SizeId>,
        color_id: Option<ColorId>,
    ) -> Result<Option<CartItem>> {
        Ok(self
            .state
            .read()
            .await
            .cart_items
            .values()
            .find(|item| item.cart_id == cart_id && item.matches(product_id, size_id, color_id))
            .cloned())
    }

    async fn insert_cart_item(&self, item: CartItem) -> Result<()> {
        self.state.write().await.cart_items.insert(item.id, item);
        Ok(())
    }

    async fn set_cart_item_quantity(&self, item_id: CartItemId, quantity: u32) -> Result<()> {
        let mut state = self.state.write().await;
        let item = state
            .cart_items
            .get_mut(&item_id)
            .ok_or_else(|| StoreError::not_found("cart item", item_id))?;
        item.quantity = quantity;
        Ok(())
    }

    async fn delete_cart_item(&self, item_id: CartItemId) -> Result<()> {
        self.state
            .write()
            .await
            .cart_items
            .remove(&item_id)
            .ok_or_else(|| StoreError::not_found("cart item", item_id))?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn place_order(
        &self,
        cart_id: CartId,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<()> {
        // One write guard across insert + clear keeps the checkout
        // invisible until it is complete.
        let mut state = self.state.write().await;
        state.orders.insert(order.id, order);
        state.order_items.extend(items);
        state.cart_items.retain(|_, item| item.cart_id != cart_id);
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self
            .state
            .read()
            .await
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        Ok(orders)
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        Ok(orders)
    }

    async fn apply_transition(
        &self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        changed_by: Option<UserId>,
    ) -> Result<Order> {
        let mut state = self.state.write().await;

        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::not_found("order", order_id))?;

        if order.status != from {
            return Err(StoreError::TransitionConflict {
                order_id,
                expected: from,
                actual: order.status,
            });
        }

        let now = Utc::now();
        order.status = to;
        order.updated_at = now;
        let updated = order.clone();

        state.history.push(OrderStatusHistory {
            id: Uuid::new_v4(),
            order_id,
            from_status: from,
            to_status: to,
            changed_at: now,
            changed_by,
        });

        Ok(updated)
    }

    async fn status_history(
        &self,
        order_id: OrderId,
        limit: usize,
    ) -> Result<Vec<OrderStatusHistory>> {
        let state = self.state.read().await;
        let mut rows: Vec<OrderStatusHistory> = state
            .history
            .iter()
            .filter(|h| h.order_id == order_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        rows.truncate(limit);
        Ok(rows)
    }
}
