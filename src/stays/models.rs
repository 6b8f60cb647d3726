use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::{Criteria, FilterBuilder};

/// Realized occupancy, opened at check-in and closed at check-out
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Stay {
    pub id: Uuid,
    pub property_id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub guest_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    /// `None` while the guest is in-house
    pub check_out_date: Option<DateTime<Utc>>,
    pub number_of_nights: i32,
    pub occupants: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stay {
    pub fn is_active(&self) -> bool {
        self.check_out_date.is_none()
    }
}

/// Nights charged for `[from, to)`: partial days round up, minimum one
pub fn nights_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    const SECONDS_PER_DAY: i64 = 86_400;

    let seconds = (to - from).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    let nights = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    i32::try_from(nights).unwrap_or(i32::MAX).max(1)
}

/// Values for a stay opened at check-in
#[derive(Debug, Clone)]
pub struct NewStay {
    pub property_id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub guest_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub number_of_nights: i32,
    pub occupants: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStayRequest {
    #[validate(range(min = 1, max = 50))]
    pub occupants: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query filters for `GET /api/stays`
#[derive(Debug, Default, Deserialize)]
pub struct StayFilter {
    pub property_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    /// `true` for in-house stays, `false` for closed ones
    pub active: Option<bool>,
}

impl Criteria for StayFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .eq("room_id", self.room_id)
            .eq("guest_id", self.guest_id)
            .eq("reservation_id", self.reservation_id)
            .is_null("check_out_date", self.active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_nights_between() {
        let jan10 = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();

        assert_eq!(nights_between(jan10, jan10 + Duration::days(5)), 5);
        // Late checkout rolls into another night
        assert_eq!(nights_between(jan10, jan10 + Duration::days(2) + Duration::hours(1)), 3);
        // Same-day check-out still counts one night
        assert_eq!(nights_between(jan10, jan10 + Duration::hours(3)), 1);
        assert_eq!(nights_between(jan10, jan10), 1);
        assert_eq!(nights_between(jan10, jan10 - Duration::days(1)), 1);
    }

    #[test]
    fn test_active_filter() {
        let criteria = StayFilter {
            active: Some(true),
            ..Default::default()
        };
        let mut filter = FilterBuilder::new("SELECT * FROM stays");
        criteria.apply(&mut filter);
        assert_eq!(filter.sql(), "SELECT * FROM stays WHERE check_out_date IS NULL");
    }
}
