use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::query::{Criteria, FilterBuilder};
use crate::validation::{validate_date_range, validate_money};

/// Reservation lifecycle status
///
/// `CONFIRMED` and `CHECKED_IN` occupy a room; `CHECKED_OUT` and
/// `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::CheckedIn,
        ReservationStatus::CheckedOut,
        ReservationStatus::Cancelled,
    ];

    /// Statuses that block a room for availability
    pub const OCCUPYING: [ReservationStatus; 2] =
        [ReservationStatus::Confirmed, ReservationStatus::CheckedIn];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::CheckedIn => "CHECKED_IN",
            ReservationStatus::CheckedOut => "CHECKED_OUT",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn occupies_room(&self) -> bool {
        Self::OCCUPYING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::CheckedOut | ReservationStatus::Cancelled)
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Booking channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationSource {
    Direct,
    Ota,
    BookingCom,
    Airbnb,
    Expedia,
}

impl Default for ReservationSource {
    fn default() -> Self {
        ReservationSource::Direct
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub room_id: Option<Uuid>,
    pub status: ReservationStatus,
    pub source: ReservationSource,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub number_of_guests: i32,
    pub number_of_rooms: i32,
    pub total_price: Decimal,
    pub paid_amount: Decimal,
    pub confirmation_code: String,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reservation joined with guest and room labels for listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReservationSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reservation: Reservation,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_email: Option<String>,
    pub room_number: Option<String>,
}

fn validate_initial_status(status: &ReservationStatus) -> Result<(), ValidationError> {
    match status {
        ReservationStatus::Pending | ReservationStatus::Confirmed => Ok(()),
        _ => {
            let mut error = ValidationError::new("initial_status");
            error.message = Some("Reservations are created PENDING or CONFIRMED".into());
            Err(error)
        }
    }
}

fn validate_create_dates(request: &CreateReservationRequest) -> Result<(), ValidationError> {
    validate_date_range(request.check_in_date, request.check_out_date)
}

fn default_count() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_dates", skip_on_field_errors = false))]
pub struct CreateReservationRequest {
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub room_id: Option<Uuid>,
    #[serde(default)]
    #[validate(custom = "validate_initial_status")]
    pub status: ReservationStatus,
    #[serde(default)]
    pub source: ReservationSource,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 50))]
    pub number_of_guests: i32,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 50))]
    pub number_of_rooms: i32,
    #[serde(default)]
    #[validate(custom = "validate_money")]
    pub total_price: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_money")]
    pub paid_amount: Decimal,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

/// Partial update; status changes go through the transition endpoints
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateReservationRequest {
    pub room_id: Option<Uuid>,
    pub source: Option<ReservationSource>,
    pub check_in_date: Option<DateTime<Utc>>,
    pub check_out_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 50))]
    pub number_of_guests: Option<i32>,
    #[validate(range(min = 1, max = 50))]
    pub number_of_rooms: Option<i32>,
    #[validate(custom = "validate_money")]
    pub total_price: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub paid_amount: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

impl UpdateReservationRequest {
    /// Names of the fields present in the request, for the audit detail
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.room_id.is_some() {
            fields.push("room_id");
        }
        if self.source.is_some() {
            fields.push("source");
        }
        if self.check_in_date.is_some() {
            fields.push("check_in_date");
        }
        if self.check_out_date.is_some() {
            fields.push("check_out_date");
        }
        if self.number_of_guests.is_some() {
            fields.push("number_of_guests");
        }
        if self.number_of_rooms.is_some() {
            fields.push("number_of_rooms");
        }
        if self.total_price.is_some() {
            fields.push("total_price");
        }
        if self.paid_amount.is_some() {
            fields.push("paid_amount");
        }
        if self.special_requests.is_some() {
            fields.push("special_requests");
        }
        fields
    }
}

/// `PUT /api/reservations/:id/room`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignRoomRequest {
    pub room_id: Uuid,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CheckInRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Defaults to the reservation's number of guests
    #[validate(range(min = 1, max = 50))]
    pub occupants: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CheckOutRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CancelReservationRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Query filters for `GET /api/reservations`
#[derive(Debug, Default, Deserialize)]
pub struct ReservationFilter {
    pub property_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
    pub source: Option<ReservationSource>,
    pub guest_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub check_in_from: Option<DateTime<Utc>>,
    pub check_in_to: Option<DateTime<Utc>>,
    pub check_out_from: Option<DateTime<Utc>>,
    pub check_out_to: Option<DateTime<Utc>>,
    /// Matches confirmation code, guest name or guest email
    pub search: Option<String>,
}

impl Criteria for ReservationFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("r.property_id", self.property_id)
            .eq("r.status", self.status)
            .eq("r.source", self.source)
            .eq("r.guest_id", self.guest_id)
            .eq("r.room_id", self.room_id)
            .gte("r.check_in_date", self.check_in_from)
            .lte("r.check_in_date", self.check_in_to)
            .gte("r.check_out_date", self.check_out_from)
            .lte("r.check_out_date", self.check_out_to)
            .search(
                &["r.confirmation_code", "g.first_name", "g.last_name", "g.email"],
                self.search.as_deref(),
            );
    }
}
