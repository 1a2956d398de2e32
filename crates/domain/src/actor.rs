//! The acting identity behind a request.
//!
//! Authentication itself is handled by an external identity layer; the
//! core only needs to know who is acting — an authenticated user or an
//! anonymous browsing session.

use common::UserId;
use serde::{Deserialize, Serialize};

/// An authenticated user as reported by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    /// Staff members may manage orders through the admin surface.
    pub staff: bool,
}

/// The identity a request acts as.
///
/// Carts may belong to either variant; checkout and order management
/// require the authenticated one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Authenticated(UserIdentity),
    Anonymous { session_token: String },
}

impl Actor {
    /// Returns the authenticated identity, if any.
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Actor::Authenticated(user) => Some(user),
            Actor::Anonymous { .. } => None,
        }
    }

    /// Returns true for authenticated staff members.
    pub fn is_staff(&self) -> bool {
        self.user().is_some_and(|u| u.staff)
    }
}
