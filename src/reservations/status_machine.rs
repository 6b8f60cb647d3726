use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::reservations::ReservationStatus;

/// Rejected lifecycle operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Reservation must be CONFIRMED to check in (current status: {0})")]
    NotConfirmed(ReservationStatus),

    #[error("A room must be assigned before check-in")]
    RoomNotAssigned,

    #[error("Reservation must be CHECKED_IN to check out (current status: {0})")]
    NotCheckedIn(ReservationStatus),

    #[error("Cannot confirm a reservation in status {0}")]
    CannotConfirm(ReservationStatus),

    #[error("Reservation is already {0}")]
    Closed(ReservationStatus),
}

impl From<TransitionError> for ApiError {
    fn from(error: TransitionError) -> Self {
        ApiError::precondition(error.to_string())
    }
}

/// Reservation lifecycle rules
///
/// Pure decisions only; callers apply side effects (stay, room status,
/// audit entry) inside their transaction.
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Cancelled
    /// - Confirmed → Confirmed (re-confirm), CheckedIn, Cancelled
    /// - CheckedIn → CheckedOut, Cancelled
    /// - CheckedOut, Cancelled → nothing
    pub fn is_valid_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
        use ReservationStatus::*;

        match (from, to) {
            (Pending, Confirmed) | (Confirmed, Confirmed) => true,
            (Confirmed, CheckedIn) => true,
            (CheckedIn, CheckedOut) => true,
            (Pending | Confirmed | CheckedIn, Cancelled) => true,
            _ => false,
        }
    }

    pub fn confirm(from: ReservationStatus) -> Result<ReservationStatus, TransitionError> {
        Self::guard(from, ReservationStatus::Confirmed, TransitionError::CannotConfirm(from))
    }

    /// Room assignment is checked before status
    pub fn check_in(
        from: ReservationStatus,
        room_id: Option<Uuid>,
    ) -> Result<ReservationStatus, TransitionError> {
        if room_id.is_none() {
            return Err(TransitionError::RoomNotAssigned);
        }
        Self::guard(from, ReservationStatus::CheckedIn, TransitionError::NotConfirmed(from))
    }

    pub fn check_out(from: ReservationStatus) -> Result<ReservationStatus, TransitionError> {
        Self::guard(from, ReservationStatus::CheckedOut, TransitionError::NotCheckedIn(from))
    }

    pub fn cancel(from: ReservationStatus) -> Result<ReservationStatus, TransitionError> {
        Self::guard(from, ReservationStatus::Cancelled, TransitionError::Closed(from))
    }

    /// Field edits and room reassignment keep the status but need an open reservation
    pub fn ensure_open(status: ReservationStatus) -> Result<(), TransitionError> {
        if status.is_terminal() {
            Err(TransitionError::Closed(status))
        } else {
            Ok(())
        }
    }

    /// Only closed reservations may be removed
    pub fn can_delete(status: ReservationStatus) -> bool {
        status.is_terminal()
    }

    fn guard(
        from: ReservationStatus,
        to: ReservationStatus,
        error: TransitionError,
    ) -> Result<ReservationStatus, TransitionError> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use proptest::prelude::*;
    use ReservationStatus::*;

    #[test]
    fn test_happy_path() {
        let room = Some(Uuid::new_v4());
        let status = StatusMachine::confirm(Pending).unwrap();
        let status = StatusMachine::check_in(status, room).unwrap();
        let status = StatusMachine::check_out(status).unwrap();
        assert_eq!(status, CheckedOut);
    }

    #[test]
    fn test_pending_cannot_check_in() {
        let err = StatusMachine::check_in(Pending, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err, TransitionError::NotConfirmed(Pending));
        assert!(err.to_string().contains("must be CONFIRMED"));
    }

    #[test]
    fn test_check_in_without_room_fails_for_every_status() {
        for status in ReservationStatus::ALL {
            assert_eq!(
                StatusMachine::check_in(status, None),
                Err(TransitionError::RoomNotAssigned)
            );
        }
    }

    #[test]
    fn test_check_out_requires_checked_in() {
        assert!(StatusMachine::check_out(Confirmed).is_err());
        assert!(StatusMachine::check_out(Pending).is_err());
        assert_eq!(StatusMachine::check_out(CheckedIn), Ok(CheckedOut));
    }

    #[test]
    fn test_cancel_twice_fails_second_time() {
        let status = StatusMachine::cancel(Confirmed).unwrap();
        assert_eq!(
            StatusMachine::cancel(status),
            Err(TransitionError::Closed(Cancelled))
        );
    }

    #[test]
    fn test_cancel_before_checkout() {
        assert!(StatusMachine::cancel(Pending).is_ok());
        assert!(StatusMachine::cancel(CheckedIn).is_ok());
        assert!(StatusMachine::cancel(CheckedOut).is_err());
    }

    #[test]
    fn test_reconfirm_allowed() {
        assert_eq!(StatusMachine::confirm(Confirmed), Ok(Confirmed));
        assert!(StatusMachine::confirm(CheckedIn).is_err());
    }

    #[test]
    fn test_delete_only_closed() {
        assert!(StatusMachine::can_delete(Cancelled));
        assert!(StatusMachine::can_delete(CheckedOut));
        assert!(!StatusMachine::can_delete(Pending));
        assert!(!StatusMachine::can_delete(Confirmed));
        assert!(!StatusMachine::can_delete(CheckedIn));
    }

    #[test]
    fn test_transition_error_is_precondition() {
        let err: ApiError = TransitionError::NotCheckedIn(Confirmed).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    fn any_status() -> impl Strategy<Value = ReservationStatus> {
        prop::sample::select(ReservationStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_terminal_states_are_sinks(from in prop::sample::select(vec![CheckedOut, Cancelled]), to in any_status()) {
            prop_assert!(!StatusMachine::is_valid_transition(from, to));
            prop_assert!(StatusMachine::ensure_open(from).is_err());
        }

        #[test]
        fn prop_no_transition_back_to_pending(from in any_status()) {
            prop_assert!(!StatusMachine::is_valid_transition(from, Pending));
        }

        #[test]
        fn prop_guards_agree_with_graph(from in any_status()) {
            let room = Some(Uuid::nil());
            prop_assert_eq!(StatusMachine::confirm(from).is_ok(), StatusMachine::is_valid_transition(from, Confirmed));
            prop_assert_eq!(StatusMachine::check_in(from, room).is_ok(), StatusMachine::is_valid_transition(from, CheckedIn));
            prop_assert_eq!(StatusMachine::check_out(from).is_ok(), StatusMachine::is_valid_transition(from, CheckedOut));
            prop_assert_eq!(StatusMachine::cancel(from).is_ok(), StatusMachine::is_valid_transition(from, Cancelled));
        }
    }
}
