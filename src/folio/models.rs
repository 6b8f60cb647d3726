use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::{Criteria, FilterBuilder};
use crate::validation::{validate_money, validate_not_blank};

/// Payment processing status; only COMPLETED counts toward the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Completed,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// PENDING → COMPLETED | FAILED, COMPLETED → REFUNDED
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Completed, PaymentStatus::Refunded)
        )
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Debit on a reservation's folio
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Charge {
    pub id: Uuid,
    pub property_id: Uuid,
    pub reservation_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub charge_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Credit on a reservation's folio
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub property_id: Uuid,
    pub reservation_id: Uuid,
    pub guest_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChargeRequest {
    pub property_id: Uuid,
    pub reservation_id: Uuid,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub description: String,
    #[validate(custom = "validate_money")]
    pub amount: Decimal,
    /// Free-text category such as `room_charge` or `minibar`
    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub charge_type: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    pub property_id: Uuid,
    pub reservation_id: Uuid,
    pub guest_id: Uuid,
    #[validate(custom = "validate_money")]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub method: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
}

/// Charges, completed payments and the difference for one reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FolioBalance {
    pub reservation_id: Uuid,
    pub total_charges: Decimal,
    pub total_payments: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChargeFilter {
    pub property_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub charge_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Criteria for ChargeFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .eq("reservation_id", self.reservation_id)
            .eq("charge_type", self.charge_type.as_deref())
            .gte("created_at", self.from)
            .lt("created_at", self.to);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilter {
    pub property_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    pub method: Option<String>,
}

impl Criteria for PaymentFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .eq("reservation_id", self.reservation_id)
            .eq("guest_id", self.guest_id)
            .eq("status", self.status)
            .eq("method", self.method.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_graph() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Refunded));

        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        for next in PaymentStatus::ALL {
            assert!(!Failed.can_transition_to(next));
            assert!(!Refunded.can_transition_to(next));
            assert!(!next.can_transition_to(next));
        }
    }

    #[test]
    fn test_payment_defaults_to_pending() {
        let json = serde_json::json!({
            "property_id": Uuid::new_v4(),
            "reservation_id": Uuid::new_v4(),
            "guest_id": Uuid::new_v4(),
            "amount": "100.00",
            "method": "credit_card"
        });
        let request: CreatePaymentRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.status, PaymentStatus::Pending);
        assert!(request.validate().is_ok());
    }
}
