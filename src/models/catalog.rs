use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ServiceError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub country: String,
}

/// One base-price row: the Lower Class price for a (city, time-of-day) pair.
/// Higher classes are derived from this by the pricing policy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CityPricing {
    pub id: i64,
    pub city_id: i64,
    pub time_of_day: String,
    pub base_price: f64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cinema {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Screen {
    pub id: i64,
    pub cinema_id: i64,
    pub name: String,
    pub row_count: i32,
    pub seats_per_row: i32,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        match s {
            "Morning" => Ok(TimeOfDay::Morning),
            "Afternoon" => Ok(TimeOfDay::Afternoon),
            "Evening" => Ok(TimeOfDay::Evening),
            other => Err(ServiceError::Validation(format!(
                "time of day must be Morning | Afternoon | Evening, got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
