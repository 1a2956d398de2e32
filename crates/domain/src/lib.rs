//! Domain layer for the hemline storefront.
//!
//! This crate holds the pure domain model:
//! - Fixed-point money arithmetic
//! - Catalog entities (categories, sizes, colors, products)
//! - Cart entities and cart mutation actions
//! - The order lifecycle state machine with its transition table
//! - Cart-to-order materialization (checkout) as a pure computation
//!
//! Nothing here performs I/O; persistence lives in the `store` crate and
//! orchestration in the `shop` crate.

pub mod actor;
pub mod cart;
pub mod catalog;
pub mod money;
pub mod order;

pub use actor::{Actor, UserIdentity};
pub use cart::{Cart, CartAction, CartItem, CartLine, CartOwner};
pub use catalog::{Category, Color, Product, Section, Size};
pub use money::Money;
pub use order::{
    Order, OrderDraft, OrderError, OrderItem, OrderItemDraft, OrderStatus, OrderStatusHistory,
    PaymentStatus, ShippingInfo,
};
