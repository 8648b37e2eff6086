//! Booking and ticket issuance.
//!
//! Issuing a ticket is: load the seat, compare-and-swap its ledger row to
//! sold, resolve the price, persist the ticket with the price snapshot, bump
//! the screening's per-class sold counter. A multi-seat request runs all of
//! that in ONE transaction; if any seat fails the whole batch rolls back and
//! zero tickets are persisted.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{Booking, Screening, Seat, Ticket, TimeOfDay};
use crate::services::{adjust_sold_counters, AvailabilityService, PricingService};

#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    pricing: PricingService,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(pool: PgPool, pricing: PricingService, availability: AvailabilityService) -> Self {
        Self {
            pool,
            pricing,
            availability,
        }
    }

    pub async fn create_booking(&self, customer: &str) -> Result<Booking, ServiceError> {
        let customer = customer.trim();
        if customer.is_empty() {
            return Err(ServiceError::Validation(
                "customer must not be empty".to_string(),
            ));
        }

        Ok(sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (customer) VALUES ($1) RETURNING *",
        )
        .bind(customer)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn get_booking(&self, id: i64) -> Result<Option<Booking>, ServiceError> {
        Ok(sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Issues a single ticket in its own transaction.
    pub async fn create_ticket(
        &self,
        booking_id: i64,
        seat_id: i64,
        screening_id: i64,
        city_id: i64,
        time_of_day: TimeOfDay,
    ) -> Result<Ticket, ServiceError> {
        let tickets = self
            .issue_tickets(booking_id, screening_id, &[seat_id], city_id, time_of_day)
            .await?;
        // one seat in, one ticket out
        Ok(tickets.into_iter().next().expect("one ticket issued"))
    }

    /// Issues one ticket per requested seat, all-or-nothing.
    pub async fn issue_tickets(
        &self,
        booking_id: i64,
        screening_id: i64,
        seat_ids: &[i64],
        city_id: i64,
        time_of_day: TimeOfDay,
    ) -> Result<Vec<Ticket>, ServiceError> {
        if seat_ids.is_empty() {
            return Err(ServiceError::Validation(
                "at least one seat is required".to_string(),
            ));
        }

        if self.get_booking(booking_id).await?.is_none() {
            return Err(ServiceError::NotFound("booking"));
        }
        let screening = sqlx::query_as::<_, Screening>("SELECT * FROM screenings WHERE id = $1")
            .bind(screening_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ServiceError::NotFound("screening"))?;

        let mut tx = self.pool.begin().await?;
        let mut tickets = Vec::with_capacity(seat_ids.len());

        for &seat_id in seat_ids {
            match self
                .issue_one(&mut tx, booking_id, seat_id, &screening, city_id, time_of_day)
                .await
            {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => {
                    // roll back already-issued tickets of this batch
                    tx.rollback().await?;
                    tracing::warn!(
                        "booking {}: batch of {} seats rolled back at seat {}: {}",
                        booking_id,
                        seat_ids.len(),
                        seat_id,
                        e
                    );
                    return Err(e);
                }
            }
        }

        tx.commit().await?;
        Ok(tickets)
    }

    async fn issue_one(
        &self,
        conn: &mut PgConnection,
        booking_id: i64,
        seat_id: i64,
        screening: &Screening,
        city_id: i64,
        time_of_day: TimeOfDay,
    ) -> Result<Ticket, ServiceError> {
        let seat = sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE id = $1")
            .bind(seat_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(ServiceError::SeatNotFound(seat_id))?;

        if seat.screen_id != screening.screen_id {
            return Err(ServiceError::Validation(format!(
                "seat {} does not belong to screen {}",
                seat_id, screening.screen_id
            )));
        }

        // At-most-one-winner: the CAS both checks and flips the ledger row.
        self.availability
            .mark_sold(conn, screening.id, seat_id)
            .await?;

        let class = seat.seat_class()?;
        let price = self.pricing.get_price(city_id, class, time_of_day).await?;

        let ticket = sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (booking_id, seat_id, screening_id, price, code)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(booking_id)
        .bind(seat_id)
        .bind(screening.id)
        .bind(price)
        .bind(Uuid::new_v4())
        .fetch_one(&mut *conn)
        .await?;

        adjust_sold_counters(conn, &[(screening.id, class)], 1).await?;

        Ok(ticket)
    }

    pub async fn get_tickets_by_booking(
        &self,
        booking_id: i64,
    ) -> Result<Vec<Ticket>, ServiceError> {
        Ok(sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE booking_id = $1 ORDER BY id",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_tickets_by_screening(
        &self,
        screening_id: i64,
    ) -> Result<Vec<Ticket>, ServiceError> {
        Ok(sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE screening_id = $1 ORDER BY id",
        )
        .bind(screening_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Releases every seat under the booking, removes its tickets and marks
    /// the booking cancelled, in one transaction.
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<(), ServiceError> {
        if self.get_booking(booking_id).await?.is_none() {
            return Err(ServiceError::NotFound("booking"));
        }

        let mut tx = self.pool.begin().await?;

        let freed = self
            .availability
            .release_for_booking(&mut tx, booking_id)
            .await?;
        adjust_sold_counters(&mut tx, &freed, -1).await?;

        sqlx::query("DELETE FROM tickets WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!("booking {} cancelled, {} seats released", booking_id, freed.len());
        Ok(())
    }
}
