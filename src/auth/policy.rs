// Authorization policy table
//
// Every protected operation is listed once with the roles allowed to
// perform it. Handlers call `authorize` (or `AuthenticatedUser::authorize`)
// instead of carrying their own role lists.

use tracing::warn;

use crate::auth::{middleware::AuthenticatedUser, models::Role};
use crate::error::ApiError;

use Role::{Housekeeping as H, Manager as M, Reception as R};

const ALL: &[Role] = &[M, R, H];
const FRONT_DESK: &[Role] = &[M, R];
const MANAGER_ONLY: &[Role] = &[M];

/// Operations guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PropertyCreate,
    PropertyRead,
    PropertyUpdate,

    UserCreate,
    UserList,
    UserRead,
    UserUpdate,
    UserDelete,

    RoomTypeCreate,
    RoomTypeRead,
    RoomTypeUpdate,
    RoomTypeDelete,
    RoomCreate,
    RoomRead,
    RoomUpdate,
    RoomDelete,

    GuestCreate,
    GuestRead,
    GuestUpdate,
    GuestDelete,

    ReservationCreate,
    ReservationRead,
    ReservationUpdate,
    ReservationTransition,
    ReservationDelete,

    StayRead,
    StayUpdate,
    StayDelete,

    FolioWrite,
    FolioRead,

    HousekeepingCreate,
    HousekeepingRead,
    HousekeepingUpdate,
    HousekeepingDelete,

    ActivityCreate,
    ActivityRead,
    ActivityReadByUser,

    ReportRead,
    DashboardRead,
    AvailabilityRead,
}

impl Operation {
    /// Roles allowed to perform this operation
    pub fn allowed_roles(self) -> &'static [Role] {
        use Operation::*;

        match self {
            PropertyCreate | PropertyUpdate => MANAGER_ONLY,
            PropertyRead => ALL,

            UserCreate | UserDelete => MANAGER_ONLY,
            UserList | UserUpdate => FRONT_DESK,
            UserRead => ALL,

            RoomTypeCreate | RoomTypeUpdate | RoomTypeDelete => MANAGER_ONLY,
            RoomTypeRead => ALL,
            RoomCreate | RoomDelete => MANAGER_ONLY,
            RoomUpdate => FRONT_DESK,
            RoomRead => ALL,

            GuestCreate | GuestUpdate => FRONT_DESK,
            GuestRead => ALL,
            GuestDelete => MANAGER_ONLY,

            ReservationCreate | ReservationUpdate | ReservationTransition => FRONT_DESK,
            ReservationRead => ALL,
            ReservationDelete => MANAGER_ONLY,

            StayRead => ALL,
            StayUpdate => FRONT_DESK,
            StayDelete => MANAGER_ONLY,

            FolioWrite | FolioRead => FRONT_DESK,

            HousekeepingCreate | HousekeepingRead | HousekeepingUpdate => ALL,
            HousekeepingDelete => MANAGER_ONLY,

            ActivityCreate => ALL,
            ActivityRead => FRONT_DESK,
            ActivityReadByUser => MANAGER_ONLY,

            ReportRead => FRONT_DESK,
            DashboardRead | AvailabilityRead => ALL,
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Reject the call unless the actor's role is allowed for `operation`
pub fn authorize(user: &AuthenticatedUser, operation: Operation) -> Result<(), ApiError> {
    if operation.permits(user.role) {
        return Ok(());
    }

    warn!(
        user_id = %user.user_id,
        role = %user.role,
        ?operation,
        "Authorization failed"
    );
    let allowed: Vec<&str> = operation.allowed_roles().iter().map(Role::as_str).collect();
    Err(ApiError::Forbidden(format!(
        "Insufficient permissions: requires one of [{}]",
        allowed.join(", ")
    )))
}

impl AuthenticatedUser {
    pub fn authorize(&self, operation: Operation) -> Result<(), ApiError> {
        authorize(self, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "staff@test.com".into(),
            name: "Staff".into(),
            role,
        }
    }

    #[test]
    fn test_only_front_desk_changes_reservation_status() {
        assert!(user(Role::Manager).authorize(Operation::ReservationTransition).is_ok());
        assert!(user(Role::Reception).authorize(Operation::ReservationTransition).is_ok());

        let err = user(Role::Housekeeping)
            .authorize(Operation::ReservationTransition)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_only_manager_deletes_reservations() {
        assert!(Operation::ReservationDelete.permits(Role::Manager));
        assert!(!Operation::ReservationDelete.permits(Role::Reception));
        assert!(!Operation::ReservationDelete.permits(Role::Housekeeping));
    }

    #[test]
    fn test_housekeeping_tasks_open_to_all_but_delete() {
        for role in Role::ALL {
            assert!(Operation::HousekeepingUpdate.permits(role));
        }
        assert!(!Operation::HousekeepingDelete.permits(Role::Housekeeping));
    }

    #[test]
    fn test_folio_restricted_to_front_desk() {
        assert!(!Operation::FolioWrite.permits(Role::Housekeeping));
        assert!(!Operation::FolioRead.permits(Role::Housekeeping));
        assert!(Operation::FolioWrite.permits(Role::Reception));
    }

    #[test]
    fn test_manager_is_permitted_everywhere() {
        use Operation::*;
        let every = [
            PropertyCreate, PropertyRead, PropertyUpdate, UserCreate, UserList, UserRead,
            UserUpdate, UserDelete, RoomTypeCreate, RoomTypeRead, RoomTypeUpdate, RoomTypeDelete,
            RoomCreate, RoomRead, RoomUpdate, RoomDelete, GuestCreate, GuestRead, GuestUpdate,
            GuestDelete, ReservationCreate, ReservationRead, ReservationUpdate,
            ReservationTransition, ReservationDelete, StayRead, StayUpdate, StayDelete,
            FolioWrite, FolioRead, HousekeepingCreate, HousekeepingRead, HousekeepingUpdate,
            HousekeepingDelete, ActivityCreate, ActivityRead, ActivityReadByUser, ReportRead,
            DashboardRead, AvailabilityRead,
        ];
        for op in every {
            assert!(op.permits(Role::Manager), "{:?} should permit MANAGER", op);
            assert!(!op.allowed_roles().is_empty());
        }
    }
}
