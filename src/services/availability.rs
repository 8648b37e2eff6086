//! The seat availability ledger: one row per (screening, seat), the single
//! source of truth for whether a seat can be sold for a screening. The Seat's
//! own is_active flag is never consulted or mutated by booking.

use sqlx::{PgConnection, PgPool};

use crate::error::ServiceError;
use crate::models::{SeatClass, SeatState};

#[derive(Clone)]
pub struct AvailabilityService {
    pool: PgPool,
}

impl AvailabilityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// True only if a ledger row exists for the pair with state = available.
    pub async fn check_availability(
        &self,
        screening_id: i64,
        seat_id: i64,
    ) -> Result<bool, ServiceError> {
        let available: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM seat_availability
                WHERE screening_id = $1 AND seat_id = $2 AND state = 'available'
             )",
        )
        .bind(screening_id)
        .bind(seat_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(available)
    }

    pub async fn get_state(
        &self,
        screening_id: i64,
        seat_id: i64,
    ) -> Result<Option<SeatState>, ServiceError> {
        let state: Option<String> = sqlx::query_scalar(
            "SELECT state FROM seat_availability WHERE screening_id = $1 AND seat_id = $2",
        )
        .bind(screening_id)
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await?;

        state.as_deref().map(SeatState::parse).transpose()
    }

    /// Upserts the ledger row. The only write path for seat state outside
    /// the booking/refund transactions.
    pub async fn set_availability(
        &self,
        screening_id: i64,
        seat_id: i64,
        state: SeatState,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO seat_availability (screening_id, seat_id, state)
             VALUES ($1, $2, $3)
             ON CONFLICT (screening_id, seat_id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(screening_id)
        .bind(seat_id)
        .bind(state.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Materializes one 'available' row per active seat of the screen.
    /// Runs on the screening-creation transaction so a screening never
    /// becomes visible without its ledger.
    pub async fn seed_screening(
        &self,
        conn: &mut PgConnection,
        screening_id: i64,
        screen_id: i64,
    ) -> Result<u64, ServiceError> {
        let res = sqlx::query(
            "INSERT INTO seat_availability (screening_id, seat_id, state)
             SELECT $1, id, 'available' FROM seats WHERE screen_id = $2 AND is_active
             ON CONFLICT (screening_id, seat_id) DO NOTHING",
        )
        .bind(screening_id)
        .bind(screen_id)
        .execute(&mut *conn)
        .await?;
        Ok(res.rows_affected())
    }

    /// The critical compare-and-swap: available -> sold in a single statement.
    /// Zero rows affected means a concurrent buyer won (or the ledger row
    /// does not exist), reported as SeatUnavailable either way.
    pub async fn mark_sold(
        &self,
        conn: &mut PgConnection,
        screening_id: i64,
        seat_id: i64,
    ) -> Result<(), ServiceError> {
        let res = sqlx::query(
            "UPDATE seat_availability SET state = 'sold'
             WHERE screening_id = $1 AND seat_id = $2 AND state = 'available'",
        )
        .bind(screening_id)
        .bind(seat_id)
        .execute(&mut *conn)
        .await?;

        if res.rows_affected() == 0 {
            return Err(ServiceError::SeatUnavailable {
                screening_id,
                seat_id,
            });
        }
        Ok(())
    }

    /// Flips every sold ledger row under the booking's tickets back to
    /// available. Returns the (screening, class) of each freed seat so the
    /// caller can adjust sold counters in the same transaction.
    pub async fn release_for_booking(
        &self,
        conn: &mut PgConnection,
        booking_id: i64,
    ) -> Result<Vec<(i64, SeatClass)>, ServiceError> {
        let freed: Vec<(i64, String)> = sqlx::query_as(
            "UPDATE seat_availability sa
             SET state = 'available'
             FROM tickets t, seats s
             WHERE t.booking_id = $1
               AND s.id = t.seat_id
               AND sa.screening_id = t.screening_id
               AND sa.seat_id = t.seat_id
               AND sa.state = 'sold'
             RETURNING sa.screening_id, s.class",
        )
        .bind(booking_id)
        .fetch_all(&mut *conn)
        .await?;

        freed
            .into_iter()
            .map(|(screening_id, class)| Ok((screening_id, SeatClass::parse(&class)?)))
            .collect()
    }

    pub async fn available_count(&self, screening_id: i64) -> Result<i64, ServiceError> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM seat_availability
             WHERE screening_id = $1 AND state = 'available'",
        )
        .bind(screening_id)
        .fetch_one(&self.pool)
        .await?)
    }
}
