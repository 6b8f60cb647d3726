use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::reservations::ReservationStatus;
use crate::rooms::RoomStatus;

/// Default span of the availability calendar
pub const CALENDAR_DAYS: i64 = 14;
/// Window for upcoming arrivals on the dashboard
pub const UPCOMING_DAYS: i64 = 7;
/// Row cap for the dashboard lists
pub const DASHBOARD_LIST_LIMIT: i64 = 10;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OccupancyQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    pub date: NaiveDate,
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    pub date: Option<NaiveDate>,
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub property_id: Option<Uuid>,
}

/// One row of a reservation list inside a report
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReservationBrief {
    pub id: Uuid,
    pub confirmation_code: String,
    pub status: ReservationStatus,
    pub guest_name: String,
    pub room_id: Option<Uuid>,
    pub room_number: Option<String>,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RoomOccupancy {
    pub room_id: Uuid,
    pub room_number: String,
    pub status: RoomStatus,
    pub guest_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OccupancyReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_rooms: i64,
    pub occupied_rooms: i64,
    pub available_rooms: i64,
    pub occupancy_rate: f64,
    /// Room-by-room picture on `start_date`
    pub room_breakdown: Vec<RoomOccupancy>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArrivalsDeparturesReport {
    pub date: NaiveDate,
    pub arrivals: Vec<ReservationBrief>,
    pub departures: Vec<ReservationBrief>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RoomStatusCount {
    pub status: RoomStatus,
    pub count: i64,
    #[sqlx(skip)]
    pub percentage: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub total_rooms: i64,
    pub occupied_rooms: i64,
    pub available_rooms: i64,
    pub in_house_guests: i64,
    pub occupancy_rate: f64,
    pub todays_arrivals: Vec<ReservationBrief>,
    pub todays_departures: Vec<ReservationBrief>,
    pub room_status_summary: Vec<RoomStatusCount>,
    pub upcoming_reservations: Vec<ReservationBrief>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityCalendar {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub reservations: Vec<ReservationBrief>,
}

/// Percentage rounded to two decimals; zero when there are no rooms
pub fn occupancy_rate(occupied: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = occupied as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Whole-number share of `total`
pub fn percentage(count: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as i64
}

/// `[00:00, 24:00)` UTC of a calendar day; `field` names the offending
/// parameter when the day after `date` is out of range
pub fn day_bounds(date: NaiveDate, field: &'static str) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| ApiError::invalid_field(field, "out_of_range", "date is out of range"))?;
    Ok((start, end))
}

/// Resolve the calendar window; `to` defaults to 14 days after `from`
pub fn calendar_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let start = from.unwrap_or(now);
    let end = match to {
        Some(to) => to,
        None => start
            .checked_add_signed(Duration::days(CALENDAR_DAYS))
            .ok_or_else(|| ApiError::invalid_field("from", "out_of_range", "from is out of range"))?,
    };
    if end <= start {
        return Err(ApiError::invalid_field("to", "invalid_range", "to must be after from"));
    }
    Ok((start, end))
}

/// Inclusive day range as a half-open instant range
pub fn report_window(start: NaiveDate, end: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    if end < start {
        return Err(ApiError::invalid_field(
            "end_date",
            "invalid_range",
            "end_date must not be before start_date",
        ));
    }
    let (from, _) = day_bounds(start, "start_date")?;
    let (_, to) = day_bounds(end, "end_date")?;
    Ok((from, to))
}
