use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crate::activity::{entity, record, ActivityAction, NewActivity};
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::folio::ledger;
use crate::guests::GuestRepository;
use crate::query::{Page, PageRequest};
use crate::reservations::availability::{self, DateRange};
use crate::reservations::repository::NewReservation;
use crate::reservations::{
    confirmation, AssignRoomRequest, CancelReservationRequest, CheckInRequest, CheckOutRequest,
    CreateReservationRequest, Reservation, ReservationFilter, ReservationRepository,
    ReservationStatus, ReservationSummary, StatusMachine, TransitionError,
    UpdateReservationRequest,
};
use crate::rooms::{Room, RoomRepository, RoomStatus};
use crate::stays::{nights_between, NewStay, StayRepository};

/// Reservation lifecycle
///
/// Every mutating call runs in one transaction: lock the reservation row,
/// lock the room row, check availability, write, append the audit entry,
/// commit. Dropping the future before commit rolls all of it back.
#[derive(Clone)]
pub struct ReservationService {
    pool: PgPool,
    repo: ReservationRepository,
}

impl ReservationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: ReservationRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateReservationRequest,
    ) -> Result<Reservation, ApiError> {
        let range = DateRange::new(request.check_in_date, request.check_out_date)?;
        let mut tx = self.pool.begin().await?;

        let guest = GuestRepository::fetch(&mut *tx, request.guest_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Guest", request.guest_id))?;
        if guest.property_id != request.property_id {
            return Err(ApiError::invalid_field(
                "guest_id",
                "property_mismatch",
                "Guest belongs to a different property",
            ));
        }

        if let Some(room_id) = request.room_id {
            claim_room(&mut *tx, room_id, request.property_id, &range, None).await?;
        }

        let confirmation_code = confirmation::generate_unique(&mut *tx).await?;
        let reservation = ReservationRepository::insert(
            &mut *tx,
            &NewReservation {
                property_id: request.property_id,
                guest_id: request.guest_id,
                room_id: request.room_id,
                status: request.status,
                source: request.source,
                check_in_date: request.check_in_date,
                check_out_date: request.check_out_date,
                number_of_guests: request.number_of_guests,
                number_of_rooms: request.number_of_rooms,
                total_price: request.total_price,
                paid_amount: request.paid_amount,
                confirmation_code,
                special_requests: request.special_requests,
            },
        )
        .await?;

        audit(
            &mut *tx,
            actor,
            &reservation,
            ActivityAction::ReservationCreated,
            format!(
                "Reservation {} created for {} as {}",
                reservation.confirmation_code,
                guest.full_name(),
                reservation.status
            ),
        )
        .await?;
        tx.commit().await?;

        info!(
            reservation_id = %reservation.id,
            code = %reservation.confirmation_code,
            "Created reservation"
        );
        Ok(reservation)
    }

    pub async fn list(
        &self,
        filter: ReservationFilter,
        page: PageRequest,
    ) -> Result<Page<ReservationSummary>, ApiError> {
        Ok(self.repo.list(&filter, page).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ReservationSummary, ApiError> {
        self.repo
            .find_summary(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Reservation", id))
    }

    /// Edit fields of an open reservation; status is left alone
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateReservationRequest,
    ) -> Result<Reservation, ApiError> {
        let changed = request.changed_fields();
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        StatusMachine::ensure_open(current.status)?;
        if changed.is_empty() {
            return Ok(current);
        }

        let mut next = current.clone();
        if let Some(room_id) = request.room_id {
            next.room_id = Some(room_id);
        }
        if let Some(source) = request.source {
            next.source = source;
        }
        if let Some(check_in) = request.check_in_date {
            next.check_in_date = check_in;
        }
        if let Some(check_out) = request.check_out_date {
            next.check_out_date = check_out;
        }
        if let Some(guests) = request.number_of_guests {
            next.number_of_guests = guests;
        }
        if let Some(rooms) = request.number_of_rooms {
            next.number_of_rooms = rooms;
        }
        if let Some(total) = request.total_price {
            next.total_price = total;
        }
        if let Some(paid) = request.paid_amount {
            next.paid_amount = paid;
        }
        if request.special_requests.is_some() {
            next.special_requests = request.special_requests;
        }

        let range = DateRange::new(next.check_in_date, next.check_out_date)?;
        let room_changed = next.room_id != current.room_id;
        let dates_changed = next.check_in_date != current.check_in_date
            || next.check_out_date != current.check_out_date;

        if let Some(room_id) = next.room_id {
            if room_changed && current.status == ReservationStatus::CheckedIn {
                lock_in_house_rooms(&mut *tx, current.room_id, room_id).await?;
            }
            if room_changed || dates_changed {
                claim_room(&mut *tx, room_id, current.property_id, &range, Some(id)).await?;
            }
            if room_changed && current.status == ReservationStatus::CheckedIn {
                move_in_house(&mut *tx, id, current.room_id, room_id).await?;
            }
        }

        let saved = ReservationRepository::save(&mut *tx, &next).await?;
        audit(
            &mut *tx,
            actor,
            &saved,
            ActivityAction::ReservationUpdated,
            format!("Updated {}", changed.join(", ")),
        )
        .await?;
        tx.commit().await?;

        info!(reservation_id = %id, fields = ?changed, "Updated reservation");
        Ok(saved)
    }

    /// Move an open reservation to another room for its current dates
    pub async fn reassign_room(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: AssignRoomRequest,
    ) -> Result<Reservation, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        StatusMachine::ensure_open(current.status)?;
        if current.room_id == Some(request.room_id) {
            return Ok(current);
        }

        let range = DateRange::new(current.check_in_date, current.check_out_date)?;
        if current.status == ReservationStatus::CheckedIn {
            lock_in_house_rooms(&mut *tx, current.room_id, request.room_id).await?;
        }
        let room = claim_room(&mut *tx, request.room_id, current.property_id, &range, Some(id)).await?;
        if current.status == ReservationStatus::CheckedIn {
            move_in_house(&mut *tx, id, current.room_id, room.id).await?;
        }

        let previous = match current.room_id {
            Some(old) => RoomRepository::number_of(&mut *tx, old).await?,
            None => None,
        };

        let mut next = current.clone();
        next.room_id = Some(room.id);
        let saved = ReservationRepository::save(&mut *tx, &next).await?;

        let detail = match previous {
            Some(old) => format!("Room changed from {} to {}", old, room.number),
            None => format!("Room {} assigned", room.number),
        };
        audit(&mut *tx, actor, &saved, ActivityAction::ReservationRoomChanged, detail).await?;
        tx.commit().await?;

        info!(reservation_id = %id, room_id = %room.id, "Reassigned reservation room");
        Ok(saved)
    }

    /// PENDING or CONFIRMED → CONFIRMED; an assigned room must still be free
    pub async fn confirm(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<Reservation, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        let status = StatusMachine::confirm(current.status)?;
        if let Some(room_id) = current.room_id {
            let range = DateRange::new(current.check_in_date, current.check_out_date)?;
            claim_room(&mut *tx, room_id, current.property_id, &range, Some(id)).await?;
        }

        let updated = ReservationRepository::set_status(&mut *tx, id, status).await?;
        audit(
            &mut *tx,
            actor,
            &updated,
            ActivityAction::ReservationConfirmed,
            format!("Reservation {} confirmed", updated.confirmation_code),
        )
        .await?;
        tx.commit().await?;

        info!(reservation_id = %id, "Confirmed reservation");
        Ok(updated)
    }

    /// CONFIRMED → CHECKED_IN: opens the stay and marks the room occupied
    pub async fn check_in(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: CheckInRequest,
    ) -> Result<Reservation, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        let status = StatusMachine::check_in(current.status, current.room_id)?;
        let Some(room_id) = current.room_id else {
            return Err(TransitionError::RoomNotAssigned.into());
        };
        let room = RoomRepository::lock_room(&mut *tx, room_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Room", room_id))?;

        let stay = StayRepository::open(
            &mut *tx,
            &NewStay {
                property_id: current.property_id,
                reservation_id: id,
                room_id,
                guest_id: current.guest_id,
                check_in_date: Utc::now(),
                number_of_nights: nights_between(current.check_in_date, current.check_out_date),
                occupants: request.occupants.unwrap_or(current.number_of_guests),
                notes: request.notes,
            },
        )
        .await?;
        RoomRepository::set_status(&mut *tx, room_id, RoomStatus::Occupied).await?;

        let updated = ReservationRepository::set_status(&mut *tx, id, status).await?;
        audit(
            &mut *tx,
            actor,
            &updated,
            ActivityAction::ReservationCheckedIn,
            format!("Guest checked in to room {}", room.number),
        )
        .await?;
        tx.commit().await?;

        info!(reservation_id = %id, stay_id = %stay.id, room = %room.number, "Checked in");
        Ok(updated)
    }

    /// CHECKED_IN → CHECKED_OUT: closes the stay and sends the room to cleaning
    pub async fn check_out(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: CheckOutRequest,
    ) -> Result<Reservation, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        let status = StatusMachine::check_out(current.status)?;

        let stay = StayRepository::close(&mut *tx, id, Utc::now(), request.notes.as_deref())
            .await?
            .ok_or_else(|| {
                error!(reservation_id = %id, "Checked-in reservation has no open stay");
                ApiError::InternalError(format!("Reservation {} is checked in without an open stay", id))
            })?;
        if let Some(room_id) = current.room_id {
            RoomRepository::set_status(&mut *tx, room_id, RoomStatus::Cleaning).await?;
        }

        let balance = ledger::load(&mut *tx, id).await?.balance().round_dp(2);
        let updated = ReservationRepository::set_status(&mut *tx, id, status).await?;

        let nights = stay.number_of_nights;
        audit(
            &mut *tx,
            actor,
            &updated,
            ActivityAction::ReservationCheckedOut,
            format!(
                "Guest checked out after {} night(s); folio balance {}",
                nights, balance
            ),
        )
        .await?;
        tx.commit().await?;

        info!(reservation_id = %id, %balance, "Checked out");
        Ok(updated)
    }

    /// Any status before checkout → CANCELLED; an in-house guest's stay is closed
    pub async fn cancel(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: CancelReservationRequest,
    ) -> Result<Reservation, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        let status = StatusMachine::cancel(current.status)?;

        if current.status == ReservationStatus::CheckedIn {
            StayRepository::close(&mut *tx, id, Utc::now(), None).await?;
            if let Some(room_id) = current.room_id {
                RoomRepository::set_status(&mut *tx, room_id, RoomStatus::Cleaning).await?;
            }
        }

        let updated = ReservationRepository::set_status(&mut *tx, id, status).await?;
        let detail = match request.reason.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => format!(
                "Reservation {} cancelled: {}",
                updated.confirmation_code, reason
            ),
            _ => format!("Reservation {} cancelled", updated.confirmation_code),
        };
        audit(&mut *tx, actor, &updated, ActivityAction::ReservationCancelled, detail).await?;
        tx.commit().await?;

        info!(reservation_id = %id, from = %current.status, "Cancelled reservation");
        Ok(updated)
    }

    /// Only CANCELLED or CHECKED_OUT reservations may be removed
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = lock(&mut *tx, id).await?;
        if !StatusMachine::can_delete(current.status) {
            return Err(ApiError::conflict(format!(
                "Cannot delete a {} reservation; cancel it first",
                current.status
            )));
        }

        audit(
            &mut *tx,
            actor,
            &current,
            ActivityAction::ReservationDeleted,
            format!(
                "Reservation {} ({}) deleted",
                current.confirmation_code, current.status
            ),
        )
        .await?;
        ReservationRepository::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(reservation_id = %id, "Deleted reservation");
        Ok(())
    }

    /// Read-only availability check for a room and date range
    pub async fn is_room_available(
        &self,
        room_id: Uuid,
        range: DateRange,
        exclude: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let mut conn = self.pool.acquire().await?;
        availability::is_room_available(&mut *conn, room_id, range.start, range.end, exclude).await
    }
}

async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Reservation, ApiError> {
    ReservationRepository::lock(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", id))
}

/// Lock `room_id`, check it belongs to the property, then check availability
async fn claim_room(
    conn: &mut PgConnection,
    room_id: Uuid,
    property_id: Uuid,
    range: &DateRange,
    exclude: Option<Uuid>,
) -> Result<Room, ApiError> {
    let room = RoomRepository::lock_room(&mut *conn, room_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Room", room_id))?;
    if room.property_id != property_id {
        return Err(ApiError::invalid_field(
            "room_id",
            "property_mismatch",
            "Room belongs to a different property",
        ));
    }

    availability::ensure_available(conn, room_id, range, exclude).await?;
    Ok(room)
}

/// Both rooms of an in-house move, in ascending id order so that two
/// concurrent swaps cannot lock them in opposite orders
async fn lock_in_house_rooms(
    conn: &mut PgConnection,
    old_room: Option<Uuid>,
    new_room: Uuid,
) -> Result<(), ApiError> {
    let Some(old_room) = old_room else {
        return Ok(());
    };
    for room_id in room_lock_order(old_room, new_room) {
        RoomRepository::lock_room(&mut *conn, room_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Room", room_id))?;
    }
    Ok(())
}

fn room_lock_order(a: Uuid, b: Uuid) -> [Uuid; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

/// Carry an in-house guest's stay and room statuses over to a new room
async fn move_in_house(
    conn: &mut PgConnection,
    reservation_id: Uuid,
    old_room: Option<Uuid>,
    new_room: Uuid,
) -> Result<(), ApiError> {
    StayRepository::move_room(&mut *conn, reservation_id, new_room).await?;
    if let Some(old_room) = old_room {
        RoomRepository::set_status(&mut *conn, old_room, RoomStatus::Cleaning).await?;
    }
    RoomRepository::set_status(conn, new_room, RoomStatus::Occupied).await?;
    Ok(())
}

async fn audit(
    conn: &mut PgConnection,
    actor: &AuthenticatedUser,
    reservation: &Reservation,
    action: ActivityAction,
    detail: String,
) -> Result<(), ApiError> {
    record(
        conn,
        NewActivity::new(
            action,
            entity::RESERVATION,
            reservation.id,
            actor.user_id,
            reservation.property_id,
        )
        .details(detail),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_locks_taken_in_id_order() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        assert_eq!(room_lock_order(low, high), [low, high]);
        assert_eq!(room_lock_order(high, low), [low, high]);
    }
}
