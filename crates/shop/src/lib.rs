//! Application services for the hemline storefront.
//!
//! Three services sit between the HTTP surface and storage:
//! - [`CartService`] — cart resolution and item mutation
//! - [`CheckoutService`] — cart-to-order materialization
//! - [`LifecycleService`] — order status transitions with audit trail
//!
//! Domain rules (pricing, the transition table) live in `domain`; these
//! services sequence them against storage and the notification sink.

mod cart;
mod checkout;
mod error;
mod lifecycle;
mod lines;

pub use cart::{CartService, CartView};
pub use checkout::{CheckoutOutcome, CheckoutService, PlacedOrder};
pub use error::ShopError;
pub use lifecycle::{LifecycleService, OrderDetail, HISTORY_LIMIT};
