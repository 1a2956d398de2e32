//! Storage traits consumed by the service layer.

use async_trait::async_trait;
use common::{CartId, CartItemId, ColorId, OrderId, ProductId, SizeId, UserId};
use domain::{
    Cart, CartItem, CartOwner, Category, Color, Order, OrderItem, OrderStatus, OrderStatusHistory,
    Product, Size,
};

use crate::Result;

/// Alias for a store providing every storage capability.
pub trait Store: CatalogStore + CartStore + OrderStore {}

impl<T: CatalogStore + CartStore + OrderStore> Store for T {}

/// Read access to the catalog, plus the minimal writes the back office
/// and test fixtures need. Products are never mutated through the order
/// core once referenced by an order item; their prices are captured at
/// checkout instead.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, category: Category) -> Result<()>;
    async fn insert_size(&self, size: Size) -> Result<()>;
    async fn insert_color(&self, color: Color) -> Result<()>;
    async fn insert_product(&self, product: Product) -> Result<()>;

    /// Replaces an existing product row.
    async fn update_product(&self, product: Product) -> Result<()>;
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;
    async fn get_size(&self, id: SizeId) -> Result<Option<Size>>;
    async fn get_color(&self, id: ColorId) -> Result<Option<Color>>;
}

/// Cart persistence.
///
/// A cart is created lazily on first access and never deleted. Item
/// uniqueness per (cart, product, size, color) is enforced by the
/// `find_cart_item` lookup the mutator performs before inserting.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the owner's cart, creating an empty one if none exists.
    async fn get_or_create_cart(&self, owner: &CartOwner) -> Result<Cart>;

    async fn cart_items(&self, cart_id: CartId) -> Result<Vec<CartItem>>;

    async fn get_cart_item(&self, item_id: CartItemId) -> Result<Option<CartItem>>;

    /// Finds the item matching the exact variant tuple. A `None` size or
    /// color matches only `None`.
    async fn find_cart_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        size_id: Option<SizeId>,
        color_id: Option<ColorId>,
    ) -> Result<Option<CartItem>>;

    async fn insert_cart_item(&self, item: CartItem) -> Result<()>;

    /// Sets an item's quantity. Callers never pass zero; they delete
    /// the item instead.
    async fn set_cart_item_quantity(&self, item_id: CartItemId, quantity: u32) -> Result<()>;

    async fn delete_cart_item(&self, item_id: CartItemId) -> Result<()>;
}

/// Order persistence, including the atomic materialization write and the
/// serialized status transition.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a checkout in one atomic unit: inserts the order row and
    /// every item row, then deletes all of the cart's items. Either all
    /// of it becomes visible or none of it does.
    async fn place_order(
        &self,
        cart_id: CartId,
        order: Order,
        items: Vec<OrderItem>,
    ) -> Result<()>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Orders for one user, most recent first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// All orders, most recent first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Applies `from -> to` and appends one history row, serialized
    /// against concurrent transitions on the same order: the write only
    /// happens while the stored status still equals `from`, otherwise
    /// [`StoreError::TransitionConflict`] is returned and nothing is
    /// written. Legality of the edge itself is the caller's concern.
    ///
    /// Returns the updated order.
    ///
    /// [`StoreError::TransitionConflict`]: crate::StoreError::TransitionConflict
    async fn apply_transition(
        &self,
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        changed_by: Option<UserId>,
    ) -> Result<Order>;

    /// History rows for an order, most recent first, capped at `limit`.
    async fn status_history(
        &self,
        order_id: OrderId,
        limit: usize,
    ) -> Result<Vec<OrderStatusHistory>>;
}
