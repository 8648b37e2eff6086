use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ServiceError;
use crate::models::{SeatClass, TimeOfDay};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cities", post(create_city))
        .route("/cities", get(list_cities))
        .route("/cities/{id}", patch(update_city))
        .route("/cities/{id}", delete(delete_city))
        .route("/cities/{id}/cinemas", get(cinemas_in_city))
        .route("/cities/{id}/prices", get(prices_for_city))
        .route("/cinemas", post(create_cinema))
        .route("/cinemas/{id}", patch(update_cinema))
        .route("/cinemas/{id}", delete(delete_cinema))
        .route("/cinemas/{id}/screens", get(screens_for_cinema))
        .route("/screens", post(create_screen))
        .route("/screens/{id}", patch(update_screen))
        .route("/screens/{id}", delete(delete_screen))
        .route("/screens/{id}/seats", get(seats_for_screen))
        .route("/screens/{id}/capacities", get(screen_capacities))
        .route("/seats", post(create_seat))
        .route("/seats/{id}", delete(delete_seat))
        .route("/seats/{id}/class", patch(update_seat_class))
        .route("/films", post(create_film))
        .route("/films", get(list_films))
        .route("/films/{id}", patch(update_film))
        .route("/price", get(resolve_price))
        .route("/prices", post(add_price))
        .route("/prices", patch(update_price))
        .route("/prices", delete(delete_price))
        .route("/roles", post(create_role))
        .route("/roles/{id}", delete(delete_role))
        .route("/permissions", post(create_permission))
        .route("/roles/{id}/permissions", get(role_permissions))
        .route("/roles/{id}/permissions", post(grant_permission))
}

fn invalid(e: validator::ValidationErrors) -> ServiceError {
    ServiceError::Validation(e.to_string())
}

/* ---------- cities ---------- */

#[derive(Debug, Deserialize, Validate)]
struct CreateCityRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(length(min = 1))]
    country: String,
}

async fn create_city(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let city = state.catalog.create_city(&req.name, &req.country).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

async fn list_cities(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.catalog.get_cities().await?))
}

async fn update_city(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateCityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let city = state.catalog.update_city(id, &req.name, &req.country).await?;
    Ok(Json(city))
}

async fn delete_city(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.catalog.delete_city(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cinemas_in_city(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.catalog.get_cinemas_in_city(id).await?))
}

/* ---------- cinemas / screens ---------- */

#[derive(Debug, Deserialize, Validate)]
struct CreateCinemaRequest {
    #[validate(length(min = 1))]
    name: String,
    address: String,
    city_id: i64,
}

async fn create_cinema(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCinemaRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let cinema = state
        .catalog
        .create_cinema(&req.name, &req.address, req.city_id)
        .await?;
    Ok((StatusCode::CREATED, Json(cinema)))
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateCinemaRequest {
    #[validate(length(min = 1))]
    name: String,
    address: String,
}

async fn update_cinema(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCinemaRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let cinema = state
        .catalog
        .update_cinema(id, &req.name, &req.address)
        .await?;
    Ok(Json(cinema))
}

async fn delete_cinema(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.catalog.delete_cinema(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn screens_for_cinema(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.catalog.get_screens_for_cinema(id).await?))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateScreenRequest {
    cinema_id: i64,
    #[validate(length(min = 1))]
    name: String,
    #[validate(range(min = 1))]
    row_count: i32,
    #[validate(range(min = 1))]
    seats_per_row: i32,
}

async fn create_screen(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateScreenRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let screen = state
        .catalog
        .create_screen(req.cinema_id, &req.name, req.row_count, req.seats_per_row)
        .await?;
    Ok((StatusCode::CREATED, Json(screen)))
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateScreenRequest {
    #[validate(length(min = 1))]
    name: String,
    #[validate(range(min = 1))]
    row_count: i32,
    #[validate(range(min = 1))]
    seats_per_row: i32,
}

async fn update_screen(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateScreenRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let screen = state
        .catalog
        .update_screen(id, &req.name, req.row_count, req.seats_per_row)
        .await?;
    Ok(Json(screen))
}

async fn delete_screen(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.catalog.delete_screen(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/* ---------- seats ---------- */

async fn seats_for_screen(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.seats.get_seats_for_screen(id).await?))
}

async fn screen_capacities(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let caps = state.seats.class_capacities(id).await?;
    let body: serde_json::Map<String, serde_json::Value> = caps
        .into_iter()
        .map(|(class, count)| (class, serde_json::json!(count)))
        .collect();
    Ok(Json(serde_json::Value::Object(body)))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateSeatRequest {
    screen_id: i64,
    #[validate(range(min = 1))]
    row: i32,
    #[validate(range(min = 1))]
    number: i32,
    class: String,
}

async fn create_seat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSeatRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let seat = state
        .seats
        .create_seat(req.screen_id, req.row, req.number, &req.class)
        .await?;
    Ok((StatusCode::CREATED, Json(seat)))
}

async fn delete_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.seats.delete_seat(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct UpdateSeatClassRequest {
    class: String,
}

async fn update_seat_class(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSeatClassRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.seats.update_seat_class(id, &req.class).await?;
    Ok(StatusCode::NO_CONTENT)
}

/* ---------- films ---------- */

#[derive(Debug, Deserialize, Validate)]
struct CreateFilmRequest {
    #[validate(length(min = 1))]
    title: String,
    #[validate(range(min = 1))]
    duration_minutes: i32,
}

async fn create_film(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFilmRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let film = state
        .catalog
        .create_film(&req.title, req.duration_minutes)
        .await?;
    Ok((StatusCode::CREATED, Json(film)))
}

async fn update_film(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateFilmRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let film = state
        .catalog
        .update_film(id, &req.title, req.duration_minutes)
        .await?;
    Ok(Json(film))
}

async fn list_films(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.catalog.get_films().await?))
}

/* ---------- pricing ---------- */

#[derive(Debug, Deserialize)]
struct PriceQuery {
    city_id: i64,
    class: String,
    #[serde(rename = "timeOfDay")]
    time_of_day: String,
}

async fn resolve_price(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PriceQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let class = SeatClass::parse(&params.class)?;
    let time_of_day = TimeOfDay::parse(&params.time_of_day)?;
    let price = state
        .pricing
        .get_price(params.city_id, class, time_of_day)
        .await?;
    Ok(Json(serde_json::json!({ "price": price })))
}

#[derive(Debug, Deserialize)]
struct PriceBody {
    city_id: i64,
    #[serde(rename = "timeOfDay")]
    time_of_day: String,
    base_price: f64,
}

async fn add_price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PriceBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let time_of_day = TimeOfDay::parse(&req.time_of_day)?;
    let row = state
        .pricing
        .add_price(req.city_id, time_of_day, req.base_price)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

async fn update_price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PriceBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let time_of_day = TimeOfDay::parse(&req.time_of_day)?;
    state
        .pricing
        .update_price(req.city_id, time_of_day, req.base_price)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct DeletePriceBody {
    city_id: i64,
    #[serde(rename = "timeOfDay")]
    time_of_day: String,
}

async fn delete_price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeletePriceBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let time_of_day = TimeOfDay::parse(&req.time_of_day)?;
    state.pricing.delete_price(req.city_id, time_of_day).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn prices_for_city(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.pricing.get_prices_for_city(id).await?))
}

/* ---------- roles / permissions ---------- */

#[derive(Debug, Deserialize, Validate)]
struct NameRequest {
    #[validate(length(min = 1))]
    name: String,
}

async fn create_role(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let role = state.roles.create_role(&req.name).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn create_permission(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NameRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    req.validate().map_err(invalid)?;
    let perm = state.roles.create_permission(&req.name).await?;
    Ok((StatusCode::CREATED, Json(perm)))
}

async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.roles.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn role_permissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.roles.permissions_for_role(id).await?))
}

#[derive(Debug, Deserialize)]
struct GrantPermissionRequest {
    permission_id: i64,
}

async fn grant_permission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<GrantPermissionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.roles.grant_permission(id, req.permission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
