pub mod booking;
pub mod catalog;
pub mod payment;
pub mod role;
pub mod screening;
pub mod seat;

pub use booking::{Booking, Ticket};
pub use catalog::{Cinema, City, CityPricing, Film, Screen, TimeOfDay};
pub use payment::{Payment, PaymentStatus};
pub use role::{Permission, Role};
pub use screening::Screening;
pub use seat::{Seat, SeatClass, SeatState};
