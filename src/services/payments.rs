//! Payment tracking: pending -> paid -> refunded, with refund modeled as a
//! compensating transaction that also restores the booking's ledger rows.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{Payment, PaymentStatus};
use crate::services::{adjust_sold_counters, AvailabilityService};

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    availability: AvailabilityService,
}

impl PaymentService {
    pub fn new(pool: PgPool, availability: AvailabilityService) -> Self {
        Self { pool, availability }
    }

    pub async fn create_payment(
        &self,
        booking_id: i64,
        method: &str,
        amount: f64,
    ) -> Result<Payment, ServiceError> {
        let method = method.trim();
        if method.is_empty() {
            return Err(ServiceError::Validation(
                "payment method must not be empty".to_string(),
            ));
        }
        if amount <= 0.0 {
            return Err(ServiceError::Validation(
                "payment amount must be positive".to_string(),
            ));
        }

        let booking_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1)")
                .bind(booking_id)
                .fetch_one(&self.pool)
                .await?;
        if !booking_exists {
            return Err(ServiceError::NotFound("booking"));
        }

        Ok(sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (booking_id, method, amount, transaction_id)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(booking_id)
        .bind(method)
        .bind(amount)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_payment(&self, id: i64) -> Result<Option<Payment>, ServiceError> {
        Ok(sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_payments_for_booking(
        &self,
        booking_id: i64,
    ) -> Result<Vec<Payment>, ServiceError> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE booking_id = $1 ORDER BY created_at",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Sum of the booking's paid payments. Reconciliation against the ticket
    /// total is the caller's concern; the tracker only reports it.
    pub async fn total_paid(&self, booking_id: i64) -> Result<f64, ServiceError> {
        Ok(sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)
             FROM payments WHERE booking_id = $1 AND status = 'paid'",
        )
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Applies a status transition under a row lock. A transition to refunded
    /// always goes through the full compensating path, whichever entry point
    /// the caller used.
    pub async fn update_payment_status(
        &self,
        payment_id: i64,
        next: PaymentStatus,
    ) -> Result<Payment, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let payment =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
                .bind(payment_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(ServiceError::NotFound("payment"))?;

        let current = PaymentStatus::parse(&payment.status)?;
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidStatusTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let updated = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(next.as_str())
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await?;

        if next == PaymentStatus::Refunded {
            self.release_booking_seats(&mut tx, payment.booking_id).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Transition to refunded and release every seat held by the booking's
    /// tickets back to available for their screenings.
    pub async fn refund_payment(&self, payment_id: i64) -> Result<Payment, ServiceError> {
        let payment = self
            .update_payment_status(payment_id, PaymentStatus::Refunded)
            .await?;
        tracing::info!(
            "payment {} refunded for booking {}",
            payment_id,
            payment.booking_id
        );
        Ok(payment)
    }

    /// The compensating half of a refund: flip the ledger rows back, fix the
    /// sold counters, and remove the booking's tickets. Tickets must not
    /// outlive the release — a resale of a freed seat would otherwise leave
    /// two tickets against the same (screening, seat) pair.
    async fn release_booking_seats(
        &self,
        conn: &mut PgConnection,
        booking_id: i64,
    ) -> Result<(), ServiceError> {
        let freed = self
            .availability
            .release_for_booking(conn, booking_id)
            .await?;
        adjust_sold_counters(conn, &freed, -1).await?;

        sqlx::query("DELETE FROM tickets WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE bookings SET status = 'refunded' WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *conn)
            .await?;

        tracing::info!(
            "booking {}: {} seats released on refund",
            booking_id,
            freed.len()
        );
        Ok(())
    }
}
