pub mod bookings;
pub mod catalog;
pub mod payments;
pub mod screenings;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(catalog::routes())
        .merge(screenings::routes())
        .merge(bookings::routes())
        .merge(payments::routes())
}
