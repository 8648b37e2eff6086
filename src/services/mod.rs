pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod payments;
pub mod pricing;
pub mod roles;
pub mod screenings;
pub mod seats;

pub use availability::AvailabilityService;
pub use bookings::BookingService;
pub use catalog::CatalogService;
pub use payments::PaymentService;
pub use pricing::{PricingPolicy, PricingService};
pub use roles::RoleService;
pub use screenings::ScreeningService;
pub use seats::SeatService;

use crate::error::ServiceError;
use crate::models::SeatClass;

/// Postgres unique_violation (23505).
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

pub(crate) fn sold_column(class: SeatClass) -> &'static str {
    match class {
        SeatClass::Lower => "lower_sold",
        SeatClass::Upper => "upper_sold",
        SeatClass::Vip => "vip_sold",
    }
}

/// Adjusts per-class sold counters on screenings by `delta` for each freed or
/// sold (screening_id, class) pair. Runs on the caller's transaction.
pub(crate) async fn adjust_sold_counters(
    conn: &mut sqlx::PgConnection,
    entries: &[(i64, SeatClass)],
    delta: i32,
) -> Result<(), ServiceError> {
    for (screening_id, class) in entries {
        let col = sold_column(*class);
        let q = format!("UPDATE screenings SET {col} = {col} + $1 WHERE id = $2");
        sqlx::query(&q)
            .bind(delta)
            .bind(screening_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
