//! Shared types used across the hemline workspace.

mod types;

pub use types::{
    CartId, CartItemId, CategoryId, ColorId, OrderId, ProductId, SizeId, UserId,
};
