use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Service-layer error taxonomy. Every service method returns
/// `Result<_, ServiceError>`; nothing is signalled through `None`/`false`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no base price for city {city_id} at {time_of_day}")]
    PriceNotFound { city_id: i64, time_of_day: String },

    #[error("invalid seat class: {0}")]
    InvalidSeatClass(String),

    #[error("seat {0} not found")]
    SeatNotFound(i64),

    #[error("seat {seat_id} is not available for screening {screening_id}")]
    SeatUnavailable { screening_id: i64, seat_id: i64 },

    #[error("screening overlaps an existing screening on screen {screen_id}")]
    ScreeningConflict { screen_id: i64 },

    #[error("payment status cannot change from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_)
            | ServiceError::SeatNotFound(_)
            | ServiceError::PriceNotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) | ServiceError::InvalidSeatClass(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::SeatUnavailable { .. }
            | ServiceError::ScreeningConflict { .. }
            | ServiceError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // SQL details stay in the logs, not in the response body.
        let message = match &self {
            ServiceError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(
            ServiceError::SeatUnavailable { screening_id: 1, seat_id: 2 }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::ScreeningConflict { screen_id: 1 }.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn seat_missing_and_seat_taken_are_distinct() {
        // The UI must be able to say "seat taken" rather than "seat missing".
        let taken = ServiceError::SeatUnavailable { screening_id: 1, seat_id: 2 };
        let missing = ServiceError::SeatNotFound(2);
        assert_ne!(taken.status_code(), missing.status_code());
    }
}
