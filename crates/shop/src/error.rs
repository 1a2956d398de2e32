use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the application services.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The operation requires an authenticated user.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The operation requires a staff member.
    #[error("staff access required")]
    StaffRequired,

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A domain rule rejected the request.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Storage failed or detected a conflict.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ShopError {
    /// Shorthand for a typed not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ShopError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
