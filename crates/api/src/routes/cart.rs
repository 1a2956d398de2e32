//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CartItemId, ColorId, ProductId, SizeId};
use domain::{CartAction, CartItem, CartLine};
use notifier::Notifier;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::CurrentActor;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub size_id: Option<String>,
    pub color_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub action: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub size_id: Option<String>,
    pub color_id: Option<String>,
    pub quantity: u32,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            size_id: item.size_id.map(|id| id.to_string()),
            color_id: item.color_id.map(|id| id.to_string()),
            quantity: item.quantity,
        }
    }
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub item_id: String,
    pub product_id: String,
    pub product_name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub unit_price_minor: i64,
    pub line_total_minor: i64,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item.id.to_string(),
            product_id: line.product.id.to_string(),
            product_name: line.product.name.clone(),
            size: line.size_name.clone(),
            color: line.color_name.clone(),
            quantity: line.item.quantity,
            unit_price_minor: line.unit_price().minor(),
            line_total_minor: line.total_price().minor(),
        }
    }
}

#[derive(Serialize)]
pub struct CartViewResponse {
    pub cart_id: String,
    pub items: Vec<CartLineResponse>,
    pub total_minor: i64,
}

// -- Handlers --

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid {what}: {raw}")))
}

/// POST /cart/items — add one unit of a product variant to the cart.
#[tracing::instrument(skip(state, actor, req))]
pub async fn add<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>), ApiError> {
    let product_id: ProductId = parse_id(&req.product_id, "product_id")?;
    let size_id: Option<SizeId> = req
        .size_id
        .as_deref()
        .map(|raw| parse_id(raw, "size_id"))
        .transpose()?;
    let color_id: Option<ColorId> = req
        .color_id
        .as_deref()
        .map(|raw| parse_id(raw, "color_id"))
        .transpose()?;

    let item = state
        .carts
        .add_to_cart(&actor, product_id, size_id, color_id)
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// POST /cart/items/{id} — apply increase/decrease/remove to an item.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<StatusCode, ApiError> {
    let item_id: CartItemId = parse_id(&id, "cart item id")?;
    let action: CartAction = req
        .action
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown cart action: {}", req.action)))?;

    state.carts.update_item(item_id, action).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /cart — the actor's cart priced at this moment.
#[tracing::instrument(skip(state, actor))]
pub async fn view<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<CartViewResponse>, ApiError> {
    let view = state.carts.view_cart(&actor).await?;

    Ok(Json(CartViewResponse {
        cart_id: view.cart_id.to_string(),
        items: view.lines.iter().map(CartLineResponse::from).collect(),
        total_minor: view.total.minor(),
    }))
}
