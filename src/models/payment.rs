use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ServiceError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub method: String,
    pub amount: f64,
    pub transaction_id: Uuid,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(ServiceError::Validation(format!(
                "payment status must be pending | paid | refunded, got '{other}'"
            ))),
        }
    }

    /// pending -> paid, pending -> refunded, paid -> refunded.
    /// Everything else is rejected.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Refunded)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::PaymentStatus::*;

    #[test]
    fn allowed_transitions() {
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Refunded));
        assert!(Paid.can_transition_to(Refunded));
    }

    #[test]
    fn refunded_is_terminal() {
        assert!(!Refunded.can_transition_to(Pending));
        assert!(!Refunded.can_transition_to(Paid));
        assert!(!Refunded.can_transition_to(Refunded));
    }

    #[test]
    fn paid_cannot_go_back_to_pending() {
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Paid));
    }
}
