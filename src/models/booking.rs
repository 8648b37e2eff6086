use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub booking_id: i64,
    pub seat_id: i64,
    pub screening_id: i64,
    /// Snapshot taken at issuance. Never recomputed, even if the underlying
    /// price table changes afterwards.
    pub price: f64,
    pub code: Uuid,
}
