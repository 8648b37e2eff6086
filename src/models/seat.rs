use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ServiceError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub screen_id: i64,
    pub cinema_id: i64,
    pub row: i32,
    pub number: i32,
    pub class: String,
    /// Fallback default flag only. Per-screening sellability lives in the
    /// seat_availability ledger, never here.
    pub is_active: bool,
}

impl Seat {
    pub fn seat_class(&self) -> Result<SeatClass, ServiceError> {
        SeatClass::parse(&self.class)
    }
}

/// Closed set of pricing/quality tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatClass {
    Lower,
    Upper,
    Vip,
}

impl SeatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatClass::Lower => "Lower Class",
            SeatClass::Upper => "Upper Class",
            SeatClass::Vip => "VIP",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        match s {
            "Lower Class" => Ok(SeatClass::Lower),
            "Upper Class" => Ok(SeatClass::Upper),
            "VIP" => Ok(SeatClass::Vip),
            other => Err(ServiceError::InvalidSeatClass(other.to_string())),
        }
    }
}

impl std::fmt::Display for SeatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger state for a (screening, seat) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatState {
    Available,
    Held,
    Sold,
}

impl SeatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatState::Available => "available",
            SeatState::Held => "held",
            SeatState::Sold => "sold",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        match s {
            "available" => Ok(SeatState::Available),
            "held" => Ok(SeatState::Held),
            "sold" => Ok(SeatState::Sold),
            other => Err(ServiceError::Validation(format!(
                "seat state must be available | held | sold, got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_class_round_trips() {
        for class in [SeatClass::Lower, SeatClass::Upper, SeatClass::Vip] {
            assert_eq!(SeatClass::parse(class.as_str()).unwrap(), class);
        }
    }

    #[test]
    fn unknown_class_is_rejected() {
        let err = SeatClass::parse("Business").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSeatClass(s) if s == "Business"));
    }

    #[test]
    fn seat_state_round_trips() {
        for state in [SeatState::Available, SeatState::Held, SeatState::Sold] {
            assert_eq!(SeatState::parse(state.as_str()).unwrap(), state);
        }
    }
}
