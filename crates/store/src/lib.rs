//! Persistence layer for the hemline storefront.
//!
//! Defines the storage traits consumed by the service layer and provides
//! two implementations with identical semantics:
//! - [`PostgresStore`] backed by sqlx/PostgreSQL
//! - [`InMemoryStore`] for tests and store-less development runs

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{CartStore, CatalogStore, OrderStore, Store};
