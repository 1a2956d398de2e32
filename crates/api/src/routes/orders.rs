//! Order listing and admin lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use domain::{Order, OrderError, OrderItem, OrderStatus, OrderStatusHistory};
use notifier::Notifier;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::CurrentActor;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub new_status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub total_minor: i64,
    pub payment_status: String,
    pub status: String,
    pub ordered_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            full_name: order.full_name.clone(),
            address: order.address.clone(),
            city: order.city.clone(),
            phone: order.phone.clone(),
            subtotal_minor: order.subtotal.minor(),
            discount_minor: order.discount.minor(),
            total_minor: order.total_amount.minor(),
            payment_status: order.payment_status.to_string(),
            status: order.status.to_string(),
            ordered_at: order.ordered_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub price_minor: i64,
    pub line_total_minor: i64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            size: item.size.clone(),
            color: item.color.clone(),
            quantity: item.quantity,
            price_minor: item.price.minor(),
            line_total_minor: item.line_total().minor(),
        }
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub from_status: String,
    pub to_status: String,
    pub changed_at: String,
    pub changed_by: Option<String>,
}

impl From<&OrderStatusHistory> for HistoryResponse {
    fn from(entry: &OrderStatusHistory) -> Self {
        Self {
            from_status: entry.from_status.to_string(),
            to_status: entry.to_status.to_string(),
            changed_at: entry.changed_at.to_rfc3339(),
            changed_by: entry.changed_by.map(|id| id.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
    pub status_history: Vec<HistoryResponse>,
    pub allowed_next_statuses: Vec<String>,
}

// -- Handlers --

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid order id: {raw}")))
}

/// GET /orders — the acting user's own orders, newest first.
#[tracing::instrument(skip(state, actor))]
pub async fn mine<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.lifecycle.orders_for(&actor).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /admin/orders — every order, newest first. Staff only.
#[tracing::instrument(skip(state, actor))]
pub async fn list<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.lifecycle.all_orders(&actor).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /admin/orders/{id} — one order with items, recent status history
/// and the statuses it may move to. Staff only.
#[tracing::instrument(skip(state, actor))]
pub async fn detail<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    Path(id): Path<String>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let detail = state.lifecycle.order_detail(order_id, &actor).await?;

    Ok(Json(OrderDetailResponse {
        order: OrderResponse::from(&detail.order),
        items: detail.items.iter().map(OrderItemResponse::from).collect(),
        status_history: detail.history.iter().map(HistoryResponse::from).collect(),
        allowed_next_statuses: detail
            .allowed_next
            .iter()
            .map(ToString::to_string)
            .collect(),
    }))
}

/// POST /admin/orders/{id}/status — transition an order. Staff only.
#[tracing::instrument(skip(state, actor, req))]
pub async fn update_status<S: Store + 'static, N: Notifier + 'static>(
    State(state): State<Arc<AppState<S, N>>>,
    Path(id): Path<String>,
    CurrentActor(actor): CurrentActor,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;

    let raw = req.new_status.as_deref().map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ApiError::from(shop::ShopError::Order(
            OrderError::MissingTargetStatus,
        )));
    }

    let target: OrderStatus = raw
        .parse()
        .map_err(|err: OrderError| ApiError::from(shop::ShopError::Order(err)))?;

    let updated = state.lifecycle.transition(order_id, target, &actor).await?;
    Ok(Json(OrderResponse::from(&updated)))
}
