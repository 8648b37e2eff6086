use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ServiceError;
use crate::models::TimeOfDay;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/tickets", get(tickets_by_booking))
        .route("/bookings/{id}/tickets", post(issue_tickets))
        .route("/bookings/{id}/cancel", patch(cancel_booking))
        .route("/tickets", post(create_ticket))
        .route("/screenings/{id}/tickets", get(tickets_by_screening))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateBookingRequest {
    #[validate(length(min = 1))]
    customer: String,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;
    let booking = state.bookings.create_booking(&req.customer).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let booking = state
        .bookings
        .get_booking(id)
        .await?
        .ok_or(ServiceError::NotFound("booking"))?;
    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
struct CreateTicketRequest {
    booking_id: i64,
    seat_id: i64,
    screening_id: i64,
    city_id: i64,
    #[serde(rename = "timeOfDay")]
    time_of_day: String,
}

async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let time_of_day = TimeOfDay::parse(&req.time_of_day)?;
    let ticket = state
        .bookings
        .create_ticket(
            req.booking_id,
            req.seat_id,
            req.screening_id,
            req.city_id,
            time_of_day,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[derive(Debug, Deserialize)]
struct IssueTicketsRequest {
    screening_id: i64,
    seat_ids: Vec<i64>,
    city_id: i64,
    #[serde(rename = "timeOfDay")]
    time_of_day: String,
}

async fn issue_tickets(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<IssueTicketsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let time_of_day = TimeOfDay::parse(&req.time_of_day)?;
    let tickets = state
        .bookings
        .issue_tickets(id, req.screening_id, &req.seat_ids, req.city_id, time_of_day)
        .await?;
    Ok((StatusCode::CREATED, Json(tickets)))
}

async fn tickets_by_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.bookings.get_tickets_by_booking(id).await?))
}

async fn tickets_by_screening(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.bookings.get_tickets_by_screening(id).await?))
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.bookings.cancel_booking(id).await?;
    Ok(Json(serde_json::json!({ "message": "booking cancelled" })))
}
