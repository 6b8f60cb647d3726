use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::{Criteria, FilterBuilder};
use crate::validation::validate_not_blank;

/// Action tags written by the reservation and folio services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    ReservationCreated,
    ReservationUpdated,
    ReservationConfirmed,
    ReservationCheckedIn,
    ReservationCheckedOut,
    ReservationCancelled,
    ReservationRoomChanged,
    ReservationDeleted,
    ChargePosted,
    PaymentRecorded,
    PaymentStatusChanged,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ReservationCreated => "RESERVATION_CREATED",
            ActivityAction::ReservationUpdated => "RESERVATION_UPDATED",
            ActivityAction::ReservationConfirmed => "RESERVATION_CONFIRMED",
            ActivityAction::ReservationCheckedIn => "RESERVATION_CHECKED_IN",
            ActivityAction::ReservationCheckedOut => "RESERVATION_CHECKED_OUT",
            ActivityAction::ReservationCancelled => "RESERVATION_CANCELLED",
            ActivityAction::ReservationRoomChanged => "RESERVATION_ROOM_CHANGED",
            ActivityAction::ReservationDeleted => "RESERVATION_DELETED",
            ActivityAction::ChargePosted => "CHARGE_POSTED",
            ActivityAction::PaymentRecorded => "PAYMENT_RECORDED",
            ActivityAction::PaymentStatusChanged => "PAYMENT_STATUS_CHANGED",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entity types referenced by audit entries
pub mod entity {
    pub const RESERVATION: &str = "reservation";
    pub const CHARGE: &str = "charge";
    pub const PAYMENT: &str = "payment";
}

/// One row of the append-only audit trail
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub details: Option<String>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Audit entry about to be written
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub details: Option<String>,
}

impl NewActivity {
    pub fn new(
        action: ActivityAction,
        entity_type: &str,
        entity_id: Uuid,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Self {
        Self {
            property_id,
            user_id,
            action: action.as_str().to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            details: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Manually logged activity (`POST /api/activity-logs`)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    pub property_id: Uuid,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub action: String,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
    #[validate(length(min = 1, max = 50), custom = "validate_not_blank")]
    pub entity_type: String,
    pub entity_id: Uuid,
}

/// Query filters for activity log listings
#[derive(Debug, Default, Deserialize)]
pub struct ActivityFilter {
    pub property_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub action: Option<String>,
}

impl Criteria for ActivityFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .eq("user_id", self.user_id)
            .eq("entity_type", self.entity_type.as_deref())
            .eq("entity_id", self.entity_id)
            .eq("action", self.action.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags_match_wire_format() {
        let json = serde_json::to_string(&ActivityAction::ReservationRoomChanged).unwrap();
        assert_eq!(json, format!("\"{}\"", ActivityAction::ReservationRoomChanged.as_str()));
        assert_eq!(ActivityAction::PaymentStatusChanged.to_string(), "PAYMENT_STATUS_CHANGED");
    }

    #[test]
    fn test_new_activity_builder() {
        let reservation_id = Uuid::new_v4();
        let entry = NewActivity::new(
            ActivityAction::ReservationCancelled,
            entity::RESERVATION,
            reservation_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .details("Reservation RES-1-ABC cancelled");

        assert_eq!(entry.action, "RESERVATION_CANCELLED");
        assert_eq!(entry.entity_id, reservation_id);
        assert_eq!(entry.details.as_deref(), Some("Reservation RES-1-ABC cancelled"));
    }

    #[test]
    fn test_entity_filter() {
        let criteria = ActivityFilter {
            entity_type: Some("reservation".into()),
            entity_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let mut filter = FilterBuilder::new("SELECT * FROM activity_logs");
        criteria.apply(&mut filter);
        assert_eq!(
            filter.sql(),
            "SELECT * FROM activity_logs WHERE entity_type = $1 AND entity_id = $2"
        );
    }
}
