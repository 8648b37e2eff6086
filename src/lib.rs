pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use services::{
    AvailabilityService, BookingService, CatalogService, PaymentService, PricingPolicy,
    PricingService, RoleService, ScreeningService, SeatService,
};

// Shared state for the whole application. Every service gets its pool handle
// here, explicitly; there is no process-wide connection.
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub catalog: CatalogService,
    pub pricing: PricingService,
    pub seats: SeatService,
    pub availability: AvailabilityService,
    pub screenings: ScreeningService,
    pub bookings: BookingService,
    pub payments: PaymentService,
    pub roles: RoleService,
}

impl AppState {
    pub fn new(db: database::Database, config: config::Config) -> Arc<Self> {
        let pool = db.pool.clone();
        let policy = PricingPolicy::from(&config.pricing);

        let pricing = PricingService::new(pool.clone(), policy);
        let availability = AvailabilityService::new(pool.clone());
        let catalog = CatalogService::new(pool.clone());
        let seats = SeatService::new(pool.clone());
        let screenings = ScreeningService::new(pool.clone(), availability.clone());
        let bookings = BookingService::new(pool.clone(), pricing.clone(), availability.clone());
        let payments = PaymentService::new(pool.clone(), availability.clone());
        let roles = RoleService::new(pool);

        Arc::new(Self {
            db,
            config,
            catalog,
            pricing,
            seats,
            availability,
            screenings,
            bookings,
            payments,
            roles,
        })
    }
}
