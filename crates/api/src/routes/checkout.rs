//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use domain::ShippingInfo;
use notifier::Notifier;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::CurrentActor;
use crate::routes::orders::{OrderItemResponse, OrderResponse};
use shop::CheckoutOutcome;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

#[derive(Serialize)]
pub struct PlacedOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

/// POST /checkout — materialize the cart into an order.
///
/// An empty cart is not an error: the client is redirected back to the
/// catalog and nothing is created.
#[tracing::instrument(skip(state, actor, req))]
pub async fn place<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<CheckoutRequest>,
) -> Result<Response, ApiError> {
    let shipping = ShippingInfo {
        full_name: req.full_name,
        address: req.address,
        city: req.city,
        phone: req.phone,
    };

    match state.checkout.checkout(&actor, shipping).await? {
        CheckoutOutcome::Placed(placed) => {
            let response = PlacedOrderResponse {
                order: OrderResponse::from(&placed.order),
                items: placed.items.iter().map(OrderItemResponse::from).collect(),
            };
            Ok((StatusCode::CREATED, Json(response)).into_response())
        }
        CheckoutOutcome::EmptyCart => Ok(Redirect::to("/products").into_response()),
    }
}
