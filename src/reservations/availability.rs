// Room availability
//
// Two stays conflict iff `in_a < out_b AND in_b < out_a` (half-open), so a
// check-out at the same instant as the next check-in is fine. Only
// CONFIRMED and CHECKED_IN reservations occupy a room.
//
// The SQL check runs after `RoomRepository::lock_room` inside the write
// transaction; the `reservations_no_double_booking` exclusion constraint
// backs it for any writer that skips the lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::reservations::ReservationStatus;

/// Half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ApiError> {
        if end <= start {
            return Err(ApiError::invalid_field(
                "check_out_date",
                "date_range",
                "check_out_date must be after check_in_date",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// In-memory view of a reservation that may hold a room
#[derive(Debug, Clone)]
pub struct Booking {
    pub reservation_id: Uuid,
    pub status: ReservationStatus,
    pub range: DateRange,
}

/// First occupying booking that overlaps `range`, ignoring `exclude`
pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    range: &DateRange,
    exclude: Option<Uuid>,
) -> Option<&'a Booking> {
    bookings.iter().find(|booking| {
        Some(booking.reservation_id) != exclude
            && booking.status.occupies_room()
            && booking.range.overlaps(range)
    })
}

/// Id of a conflicting occupying reservation for `room_id`, if any
pub async fn find_conflicting_reservation(
    conn: &mut PgConnection,
    room_id: Uuid,
    range: &DateRange,
    exclude: Option<Uuid>,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM reservations
        WHERE room_id = $1
          AND status IN ('CONFIRMED', 'CHECKED_IN')
          AND check_in_date < $3
          AND check_out_date > $2
          AND ($4::uuid IS NULL OR id <> $4)
        LIMIT 1
        "#,
    )
    .bind(room_id)
    .bind(range.start)
    .bind(range.end)
    .bind(exclude)
    .fetch_optional(conn)
    .await
}

pub async fn is_room_available(
    conn: &mut PgConnection,
    room_id: Uuid,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<bool, ApiError> {
    let range = DateRange::new(check_in, check_out)?;
    Ok(find_conflicting_reservation(conn, room_id, &range, exclude)
        .await?
        .is_none())
}

/// Fail with Conflict when the room is taken for `range`
pub async fn ensure_available(
    conn: &mut PgConnection,
    room_id: Uuid,
    range: &DateRange,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(conflicting) = find_conflicting_reservation(conn, room_id, range, exclude).await? {
        debug!(%room_id, %conflicting, "Room unavailable");
        return Err(ApiError::conflict("Room is not available for the selected dates"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()
    }

    fn range(from: u32, to: u32) -> DateRange {
        DateRange::new(jan(from), jan(to)).unwrap()
    }

    fn booking(status: ReservationStatus, from: u32, to: u32) -> Booking {
        Booking {
            reservation_id: Uuid::new_v4(),
            status,
            range: range(from, to),
        }
    }

    #[test]
    fn test_room_101_scenario() {
        // Reservation A: CONFIRMED [Jan 10, Jan 15)
        let room_101 = vec![booking(ReservationStatus::Confirmed, 10, 15)];

        // B [Jan 12, Jan 18) overlaps
        assert!(find_conflict(&room_101, &range(12, 18), None).is_some());
        // C [Jan 15, Jan 20) touches the boundary only
        assert!(find_conflict(&room_101, &range(15, 20), None).is_none());
    }

    #[test]
    fn test_back_to_back_is_available() {
        assert!(!range(10, 15).overlaps(&range(15, 20)));
        assert!(!range(15, 20).overlaps(&range(10, 15)));
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(range(10, 20).overlaps(&range(12, 13)));
        assert!(range(12, 13).overlaps(&range(10, 20)));
    }

    #[test]
    fn test_only_occupying_statuses_block() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::CheckedOut,
            ReservationStatus::Cancelled,
        ] {
            let bookings = vec![booking(status, 10, 15)];
            assert!(find_conflict(&bookings, &range(11, 12), None).is_none());
        }
        let bookings = vec![booking(ReservationStatus::CheckedIn, 10, 15)];
        assert!(find_conflict(&bookings, &range(11, 12), None).is_some());
    }

    #[test]
    fn test_excluded_reservation_is_ignored() {
        let existing = booking(ReservationStatus::Confirmed, 10, 15);
        let id = existing.reservation_id;
        let bookings = vec![existing];
        assert!(find_conflict(&bookings, &range(11, 16), Some(id)).is_none());
        assert!(find_conflict(&bookings, &range(11, 16), Some(Uuid::new_v4())).is_some());
    }

    #[test]
    fn test_empty_range_rejected() {
        assert!(DateRange::new(jan(10), jan(10)).is_err());
        assert!(DateRange::new(jan(11), jan(10)).is_err());
    }

    fn arb_range() -> impl Strategy<Value = DateRange> {
        (0i64..1000, 1i64..200).prop_map(|(start, len)| {
            let start = jan(1) + Duration::hours(start);
            DateRange {
                start,
                end: start + Duration::hours(len),
            }
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in arb_range(), b in arb_range()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_overlap_matches_pointwise_definition(a in arb_range(), b in arb_range()) {
            // Some hour lies in both ranges iff they overlap
            let shared = (0..1200i64)
                .map(|h| jan(1) + Duration::hours(h))
                .any(|t| a.start <= t && t < a.end && b.start <= t && t < b.end);
            prop_assert_eq!(a.overlaps(&b), shared);
        }

        #[test]
        fn prop_accepted_bookings_never_overlap(ranges in prop::collection::vec(arb_range(), 1..20)) {
            let mut accepted: Vec<Booking> = Vec::new();
            for r in ranges {
                if find_conflict(&accepted, &r, None).is_none() {
                    accepted.push(Booking {
                        reservation_id: Uuid::new_v4(),
                        status: ReservationStatus::Confirmed,
                        range: r,
                    });
                }
            }
            for (i, a) in accepted.iter().enumerate() {
                for b in accepted.iter().skip(i + 1) {
                    prop_assert!(!a.range.overlaps(&b.range));
                }
            }
        }
    }
}
