use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::PaymentStatus;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/{id}/status", patch(update_status))
        .route("/payments/{id}/refund", patch(refund))
        .route("/bookings/{id}/payments", get(payments_for_booking))
        .route("/bookings/{id}/total_paid", get(total_paid))
}

#[derive(Debug, Deserialize)]
struct CreatePaymentRequest {
    booking_id: i64,
    method: String,
    amount: f64,
}

async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let payment = state
        .payments
        .create_payment(req.booking_id, &req.method, req.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let next = PaymentStatus::parse(&req.status)?;
    let payment = state.payments.update_payment_status(id, next).await?;
    Ok(Json(payment))
}

async fn refund(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let payment = state.payments.refund_payment(id).await?;
    Ok(Json(payment))
}

async fn payments_for_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.payments.get_payments_for_booking(id).await?))
}

async fn total_paid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let total = state.payments.total_paid(id).await?;
    Ok(Json(serde_json::json!({ "total_paid": total })))
}
