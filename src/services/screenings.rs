//! Screening scheduling with half-open overlap checks per screen. Creating a
//! screening also seeds the availability ledger in the same transaction, so
//! every sellable seat has a ledger entry from the moment the screening exists.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgConnection, PgPool};

use crate::error::ServiceError;
use crate::models::Screening;
use crate::services::AvailabilityService;

#[derive(Clone)]
pub struct ScreeningService {
    pool: PgPool,
    availability: AvailabilityService,
}

impl ScreeningService {
    pub fn new(pool: PgPool, availability: AvailabilityService) -> Self {
        Self { pool, availability }
    }

    fn validate_window(
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        if starts_at >= ends_at {
            return Err(ServiceError::Validation(
                "screening must start before it ends".to_string(),
            ));
        }
        Ok(())
    }

    /// Half-open interval test against the screen's other screenings.
    /// `exclude` skips the screening being updated.
    ///
    /// The WHERE clause is the SQL form of [`crate::models::screening::overlaps`];
    /// any change here must be mirrored there (and in its test cases).
    async fn has_conflict(
        conn: &mut PgConnection,
        screen_id: i64,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        exclude: Option<i64>,
    ) -> Result<bool, ServiceError> {
        let conflict: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM screenings
                WHERE screen_id = $1
                  AND id <> COALESCE($2, -1)
                  AND starts_at < $4
                  AND ends_at > $3
             )",
        )
        .bind(screen_id)
        .bind(exclude)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(&mut *conn)
        .await?;
        Ok(conflict)
    }

    pub async fn create_screening(
        &self,
        screen_id: i64,
        film_id: i64,
        show_date: NaiveDate,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<Screening, ServiceError> {
        Self::validate_window(starts_at, ends_at)?;

        let screen_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM screens WHERE id = $1)")
                .bind(screen_id)
                .fetch_one(&self.pool)
                .await?;
        if !screen_exists {
            return Err(ServiceError::NotFound("screen"));
        }
        let film_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM films WHERE id = $1)")
                .bind(film_id)
                .fetch_one(&self.pool)
                .await?;
        if !film_exists {
            return Err(ServiceError::NotFound("film"));
        }

        let mut tx = self.pool.begin().await?;

        if Self::has_conflict(&mut tx, screen_id, starts_at, ends_at, None).await? {
            return Err(ServiceError::ScreeningConflict { screen_id });
        }

        let screening = sqlx::query_as::<_, Screening>(
            "INSERT INTO screenings (screen_id, film_id, show_date, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(screen_id)
        .bind(film_id)
        .bind(show_date)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(&mut *tx)
        .await?;

        let seeded = self
            .availability
            .seed_screening(&mut tx, screening.id, screen_id)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "created screening {} on screen {} ({} ledger rows seeded)",
            screening.id,
            screen_id,
            seeded
        );
        Ok(screening)
    }

    pub async fn update_screening(
        &self,
        id: i64,
        show_date: NaiveDate,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<Screening, ServiceError> {
        Self::validate_window(starts_at, ends_at)?;

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Screening>(
            "SELECT * FROM screenings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::NotFound("screening"))?;

        if Self::has_conflict(&mut tx, existing.screen_id, starts_at, ends_at, Some(id)).await? {
            return Err(ServiceError::ScreeningConflict {
                screen_id: existing.screen_id,
            });
        }

        let updated = sqlx::query_as::<_, Screening>(
            "UPDATE screenings SET show_date = $1, starts_at = $2, ends_at = $3
             WHERE id = $4
             RETURNING *",
        )
        .bind(show_date)
        .bind(starts_at)
        .bind(ends_at)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Ledger rows go with the screening (FK cascade).
    pub async fn delete_screening(&self, id: i64) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM screenings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("screening"));
        }
        Ok(())
    }

    pub async fn get_screening(&self, id: i64) -> Result<Option<Screening>, ServiceError> {
        Ok(sqlx::query_as::<_, Screening>("SELECT * FROM screenings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_screenings_for_screen(
        &self,
        screen_id: i64,
    ) -> Result<Vec<Screening>, ServiceError> {
        Ok(sqlx::query_as::<_, Screening>(
            "SELECT * FROM screenings WHERE screen_id = $1 ORDER BY starts_at",
        )
        .bind(screen_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
