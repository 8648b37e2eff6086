use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::SeatState;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/screenings", post(create_screening))
        .route("/screenings/{id}", patch(update_screening))
        .route("/screenings/{id}", delete(delete_screening))
        .route("/screens/{id}/screenings", get(screenings_for_screen))
        .route(
            "/screenings/{id}/seats/{seat_id}/availability",
            get(check_availability),
        )
        .route(
            "/screenings/{id}/seats/{seat_id}/availability",
            put(set_availability),
        )
}

#[derive(Debug, Deserialize)]
struct CreateScreeningRequest {
    screen_id: i64,
    film_id: i64,
    show_date: NaiveDate,
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
}

async fn create_screening(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateScreeningRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let screening = state
        .screenings
        .create_screening(
            req.screen_id,
            req.film_id,
            req.show_date,
            req.starts_at,
            req.ends_at,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(screening)))
}

#[derive(Debug, Deserialize)]
struct UpdateScreeningRequest {
    show_date: NaiveDate,
    starts_at: NaiveDateTime,
    ends_at: NaiveDateTime,
}

async fn update_screening(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateScreeningRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let screening = state
        .screenings
        .update_screening(id, req.show_date, req.starts_at, req.ends_at)
        .await?;
    Ok(Json(screening))
}

async fn delete_screening(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.screenings.delete_screening(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn screenings_for_screen(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.screenings.get_screenings_for_screen(id).await?))
}

async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path((id, seat_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ServiceError> {
    let available = state.availability.check_availability(id, seat_id).await?;
    let seat_state = state.availability.get_state(id, seat_id).await?;
    Ok(Json(serde_json::json!({
        "available": available,
        "state": seat_state.map(|s| s.as_str()),
    })))
}

#[derive(Debug, Deserialize)]
struct SetAvailabilityRequest {
    state: String,
}

async fn set_availability(
    State(state): State<Arc<AppState>>,
    Path((id, seat_id)): Path<(i64, i64)>,
    Json(req): Json<SetAvailabilityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let seat_state = SeatState::parse(&req.state)?;
    state
        .availability
        .set_availability(id, seat_id, seat_state)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
