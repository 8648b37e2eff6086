//! End-to-end flows against a live Postgres. Run with a database:
//!
//!     DATABASE_URL=postgres://... cargo test -- --ignored
//!
//! Each test builds its own city/cinema/screen fixture, so tests are
//! independent and repeatable on a shared database.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use cinema_system::{
    config::{AppConfig, Config, DatabaseConfig, PricingConfig},
    database::Database,
    error::ServiceError,
    models::{Screening, Seat, SeatClass, TimeOfDay},
    AppState,
};

async fn test_state() -> Arc<AppState> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let config = Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "warn".to_string(),
        },
        database: DatabaseConfig {
            url,
            pool_size: 5,
        },
        pricing: PricingConfig {
            upper_multiplier: 1.2,
            vip_multiplier: 1.2,
            vip_tiered: false,
        },
    };
    let db = Database::connect(&config.database).await.expect("connect");
    db.run_migrations().await.expect("migrate");
    AppState::new(db, config)
}

struct Fixture {
    city_id: i64,
    cinema_id: i64,
    screen_id: i64,
    seats: Vec<Seat>,
    screening: Screening,
}

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// City with a morning base price of 10.00, one cinema, one 2x3 screen with
/// mixed seat classes and a 14:00-16:00 screening.
async fn fixture(state: &AppState) -> Fixture {
    let tag = Uuid::new_v4();
    let city = state
        .catalog
        .create_city(&format!("City-{tag}"), "Testland")
        .await
        .expect("city");
    state
        .pricing
        .add_price(city.id, TimeOfDay::Morning, 10.0)
        .await
        .expect("price");
    let cinema = state
        .catalog
        .create_cinema(&format!("Cinema-{tag}"), "1 Main St", city.id)
        .await
        .expect("cinema");
    let screen = state
        .catalog
        .create_screen(cinema.id, "Screen 1", 2, 3)
        .await
        .expect("screen");

    let mut seats = Vec::new();
    for (row, number, class) in [
        (1, 1, "Lower Class"),
        (1, 2, "Lower Class"),
        (1, 3, "Upper Class"),
        (2, 1, "Upper Class"),
        (2, 2, "VIP"),
        (2, 3, "VIP"),
    ] {
        seats.push(
            state
                .seats
                .create_seat(screen.id, row, number, class)
                .await
                .expect("seat"),
        );
    }

    let film = state
        .catalog
        .create_film(&format!("Film-{tag}"), 115)
        .await
        .expect("film");
    let screening = state
        .screenings
        .create_screening(
            screen.id,
            film.id,
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            at(14),
            at(16),
        )
        .await
        .expect("screening");

    Fixture {
        city_id: city.id,
        cinema_id: cinema.id,
        screen_id: screen.id,
        seats,
        screening,
    }
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn screening_creation_seeds_the_ledger() {
    let state = test_state().await;
    let fx = fixture(&state).await;

    assert_eq!(
        state
            .availability
            .available_count(fx.screening.id)
            .await
            .unwrap(),
        fx.seats.len() as i64
    );
    for seat in &fx.seats {
        assert!(state
            .availability
            .check_availability(fx.screening.id, seat.id)
            .await
            .unwrap());
    }
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn ticket_issuance_flips_the_ledger_and_snapshots_the_price() {
    let state = test_state().await;
    let fx = fixture(&state).await;
    let seat = &fx.seats[2]; // Upper Class

    let booking = state.bookings.create_booking("alice").await.unwrap();
    let ticket = state
        .bookings
        .create_ticket(
            booking.id,
            seat.id,
            fx.screening.id,
            fx.city_id,
            TimeOfDay::Morning,
        )
        .await
        .unwrap();

    assert!((ticket.price - 12.0).abs() < 1e-9);
    assert!(!state
        .availability
        .check_availability(fx.screening.id, seat.id)
        .await
        .unwrap());

    // price immutability: repricing the city must not touch issued tickets
    state
        .pricing
        .update_price(fx.city_id, TimeOfDay::Morning, 99.0)
        .await
        .unwrap();
    let stored = state
        .bookings
        .get_tickets_by_booking(booking.id)
        .await
        .unwrap();
    assert!((stored[0].price - 12.0).abs() < 1e-9);
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn double_sale_is_rejected() {
    let state = test_state().await;
    let fx = fixture(&state).await;
    let seat = &fx.seats[0];

    let first = state.bookings.create_booking("alice").await.unwrap();
    let second = state.bookings.create_booking("bob").await.unwrap();

    state
        .bookings
        .create_ticket(first.id, seat.id, fx.screening.id, fx.city_id, TimeOfDay::Morning)
        .await
        .unwrap();

    let err = state
        .bookings
        .create_ticket(second.id, seat.id, fx.screening.id, fx.city_id, TimeOfDay::Morning)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::SeatUnavailable { .. }));
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn concurrent_issuance_has_exactly_one_winner() {
    let state = test_state().await;
    let fx = fixture(&state).await;
    let seat_id = fx.seats[0].id;

    let mut handles = Vec::new();
    for i in 0..8 {
        let state = state.clone();
        let screening_id = fx.screening.id;
        let city_id = fx.city_id;
        handles.push(tokio::spawn(async move {
            let booking = state
                .bookings
                .create_booking(&format!("buyer-{i}"))
                .await
                .unwrap();
            state
                .bookings
                .create_ticket(booking.id, seat_id, screening_id, city_id, TimeOfDay::Morning)
                .await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(ServiceError::SeatUnavailable { .. }) => losers += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 7);
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn multi_seat_booking_is_all_or_nothing() {
    let state = test_state().await;
    let fx = fixture(&state).await;
    let (a, b, c) = (fx.seats[0].id, fx.seats[1].id, fx.seats[2].id);

    // someone else takes the middle seat first
    let rival = state.bookings.create_booking("rival").await.unwrap();
    state
        .bookings
        .create_ticket(rival.id, b, fx.screening.id, fx.city_id, TimeOfDay::Morning)
        .await
        .unwrap();

    let booking = state.bookings.create_booking("alice").await.unwrap();
    let err = state
        .bookings
        .issue_tickets(
            booking.id,
            fx.screening.id,
            &[a, b, c],
            fx.city_id,
            TimeOfDay::Morning,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::SeatUnavailable { .. }));

    // zero tickets persisted, and seat `a` is still sellable
    assert!(state
        .bookings
        .get_tickets_by_booking(booking.id)
        .await
        .unwrap()
        .is_empty());
    assert!(state
        .availability
        .check_availability(fx.screening.id, a)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn overlapping_screening_is_rejected() {
    let state = test_state().await;
    let fx = fixture(&state).await; // existing screening 14:00-16:00

    let film = state.catalog.create_film("Second Feature", 100).await.unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();

    let err = state
        .screenings
        .create_screening(fx.screen_id, film.id, date, at(15), at(17))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ScreeningConflict { .. }));

    // back-to-back is fine
    state
        .screenings
        .create_screening(fx.screen_id, film.id, date, at(16), at(18))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn refund_releases_the_bookings_seats() {
    let state = test_state().await;
    let fx = fixture(&state).await;
    let (a, b) = (fx.seats[0].id, fx.seats[4].id);

    let booking = state.bookings.create_booking("alice").await.unwrap();
    let tickets = state
        .bookings
        .issue_tickets(
            booking.id,
            fx.screening.id,
            &[a, b],
            fx.city_id,
            TimeOfDay::Morning,
        )
        .await
        .unwrap();
    let total: f64 = tickets.iter().map(|t| t.price).sum();

    let payment = state
        .payments
        .create_payment(booking.id, "card", total)
        .await
        .unwrap();
    state
        .payments
        .update_payment_status(payment.id, cinema_system::models::PaymentStatus::Paid)
        .await
        .unwrap();

    let refunded = state.payments.refund_payment(payment.id).await.unwrap();
    assert_eq!(refunded.status, "refunded");

    for seat_id in [a, b] {
        assert!(state
            .availability
            .check_availability(fx.screening.id, seat_id)
            .await
            .unwrap());
    }

    // refunded is terminal
    let err = state
        .payments
        .update_payment_status(payment.id, cinema_system::models::PaymentStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidStatusTransition { .. }));
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn refund_voids_tickets_so_a_resale_stays_single() {
    let state = test_state().await;
    let fx = fixture(&state).await;
    let seat_id = fx.seats[0].id;

    let booking = state.bookings.create_booking("alice").await.unwrap();
    let ticket = state
        .bookings
        .create_ticket(booking.id, seat_id, fx.screening.id, fx.city_id, TimeOfDay::Morning)
        .await
        .unwrap();
    let payment = state
        .payments
        .create_payment(booking.id, "card", ticket.price)
        .await
        .unwrap();
    state.payments.refund_payment(payment.id).await.unwrap();

    // the refunded booking keeps no tickets around
    assert!(state
        .bookings
        .get_tickets_by_booking(booking.id)
        .await
        .unwrap()
        .is_empty());

    // the freed seat can be sold again, and the screening then carries
    // exactly one ticket for it
    let rebuyer = state.bookings.create_booking("bob").await.unwrap();
    state
        .bookings
        .create_ticket(rebuyer.id, seat_id, fx.screening.id, fx.city_id, TimeOfDay::Morning)
        .await
        .unwrap();

    let for_screening = state
        .bookings
        .get_tickets_by_screening(fx.screening.id)
        .await
        .unwrap();
    assert_eq!(
        for_screening.iter().filter(|t| t.seat_id == seat_id).count(),
        1
    );
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn catalog_updates_persist_and_validate() {
    let state = test_state().await;
    let fx = fixture(&state).await;

    // renames stick
    let renamed = state
        .catalog
        .update_city(fx.city_id, "Renamed City", "Testland")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed City");
    assert_eq!(
        state.catalog.get_city(fx.city_id).await.unwrap().unwrap().name,
        "Renamed City"
    );

    // renaming onto an existing (name, country) pair is rejected
    let other = state
        .catalog
        .create_city(&format!("Other-{}", Uuid::new_v4()), "Testland")
        .await
        .unwrap();
    let err = state
        .catalog
        .update_city(other.id, "Renamed City", "Testland")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // unknown ids surface as NotFound
    let err = state
        .catalog
        .update_cinema(i64::MAX, "Nowhere", "0 Void St")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("cinema")));

    // the fixture screen is 2x3 with seats up to row 2, number 3:
    // shrinking below them is refused, growing is fine
    let err = state
        .catalog
        .update_screen(fx.screen_id, "Screen 1", 1, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    let grown = state
        .catalog
        .update_screen(fx.screen_id, "Screen 1", 4, 5)
        .await
        .unwrap();
    assert_eq!(grown.row_count, 4);

    let film = state.catalog.create_film("Working Title", 90).await.unwrap();
    let updated = state
        .catalog
        .update_film(film.id, "Final Title", 102)
        .await
        .unwrap();
    assert_eq!(updated.title, "Final Title");
    assert_eq!(updated.duration_minutes, 102);
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn deleting_a_city_cascades_to_its_cinemas() {
    let state = test_state().await;
    let fx = fixture(&state).await;

    state.catalog.delete_city(fx.city_id).await.unwrap();

    assert!(state
        .catalog
        .get_cinemas_in_city(fx.city_id)
        .await
        .unwrap()
        .is_empty());
    assert!(state.catalog.get_cinema(fx.cinema_id).await.unwrap().is_none());
    assert!(state.catalog.get_screen(fx.screen_id).await.unwrap().is_none());
    assert!(state
        .seats
        .get_seats_for_screen(fx.screen_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn seat_outside_screen_range_is_rejected() {
    let state = test_state().await;
    let fx = fixture(&state).await;

    let err = state
        .seats
        .create_seat(fx.screen_id, 1, 99, "Lower Class")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = state
        .seats
        .create_seat(fx.screen_id, 1, 1, "Balcony")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidSeatClass(_)));
}

#[tokio::test]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn missing_price_row_fails_resolution() {
    let state = test_state().await;
    let fx = fixture(&state).await;

    // only the Morning price exists in the fixture
    let err = state
        .pricing
        .get_price(fx.city_id, SeatClass::Lower, TimeOfDay::Evening)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PriceNotFound { .. }));
}
