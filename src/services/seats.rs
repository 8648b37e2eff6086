//! Seat inventory: seat definitions per screen, scoped by (screen, cinema).

use sqlx::PgPool;

use crate::error::ServiceError;
use crate::models::{Screen, Seat, SeatClass};

#[derive(Clone)]
pub struct SeatService {
    pool: PgPool,
}

impl SeatService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_screen(&self, screen_id: i64) -> Result<Screen, ServiceError> {
        sqlx::query_as::<_, Screen>("SELECT * FROM screens WHERE id = $1")
            .bind(screen_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServiceError::NotFound("screen"))
    }

    pub async fn create_seat(
        &self,
        screen_id: i64,
        row: i32,
        number: i32,
        class: &str,
    ) -> Result<Seat, ServiceError> {
        let class = SeatClass::parse(class)?;
        let screen = self.load_screen(screen_id).await?;

        if row < 1 || row > screen.row_count {
            return Err(ServiceError::Validation(format!(
                "row {row} outside the screen's range 1..={}",
                screen.row_count
            )));
        }
        if number < 1 || number > screen.seats_per_row {
            return Err(ServiceError::Validation(format!(
                "seat number {number} outside the screen's range 1..={}",
                screen.seats_per_row
            )));
        }

        sqlx::query_as::<_, Seat>(
            "INSERT INTO seats (screen_id, cinema_id, \"row\", number, class)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(screen_id)
        .bind(screen.cinema_id)
        .bind(row)
        .bind(number)
        .bind(class.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                ServiceError::Validation(format!(
                    "seat {row}/{number} already exists on screen {screen_id}"
                ))
            } else {
                e.into()
            }
        })
    }

    pub async fn get_seat(&self, id: i64) -> Result<Option<Seat>, ServiceError> {
        Ok(sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_seats_for_screen(&self, screen_id: i64) -> Result<Vec<Seat>, ServiceError> {
        Ok(sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE screen_id = $1 ORDER BY \"row\", number",
        )
        .bind(screen_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn update_seat_class(&self, id: i64, class: &str) -> Result<(), ServiceError> {
        let class = SeatClass::parse(class)?;
        let res = sqlx::query("UPDATE seats SET class = $1 WHERE id = $2")
            .bind(class.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::SeatNotFound(id));
        }
        Ok(())
    }

    pub async fn delete_seat(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM seats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::SeatNotFound(id));
        }
        Ok(())
    }

    /// Capacity per seat class for a screen.
    pub async fn class_capacities(
        &self,
        screen_id: i64,
    ) -> Result<Vec<(String, i64)>, ServiceError> {
        self.load_screen(screen_id).await?;
        Ok(sqlx::query_as(
            "SELECT class, COUNT(*) FROM seats WHERE screen_id = $1 GROUP BY class ORDER BY class",
        )
        .bind(screen_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
