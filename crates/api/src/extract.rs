//! Actor extraction from gateway-injected identity headers.
//!
//! Authentication happens upstream; the gateway forwards the resolved
//! identity as headers. Authenticated requests carry `x-user-id` (plus
//! `x-user-name`, `x-user-email` and `x-staff`), anonymous ones carry
//! `x-session-id`.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::UserId;
use domain::{Actor, UserIdentity};

use crate::error::ApiError;

/// Extractor for the request's acting identity.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Builds an [`Actor`] from identity headers.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    if let Some(raw_id) = header_str(headers, "x-user-id") {
        let user_id: UserId = raw_id
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid x-user-id: {raw_id}")))?;

        let staff = matches!(
            header_str(headers, "x-staff"),
            Some("true") | Some("1")
        );

        return Ok(Actor::Authenticated(UserIdentity {
            user_id,
            username: header_str(headers, "x-user-name")
                .unwrap_or("customer")
                .to_string(),
            email: header_str(headers, "x-user-email")
                .unwrap_or_default()
                .to_string(),
            staff,
        }));
    }

    if let Some(session) = header_str(headers, "x-session-id") {
        return Ok(Actor::Anonymous {
            session_token: session.to_string(),
        });
    }

    Err(ApiError::BadRequest(
        "missing identity: provide x-user-id or x-session-id".to_string(),
    ))
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(CurrentActor)
    }
}
