//! Hotel property management API
//!
//! Rooms, guests, reservations, stays, folio, housekeeping, activity logs and
//! reports over PostgreSQL, behind JWT authentication and a role policy table.

pub mod activity;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod folio;
pub mod guests;
pub mod housekeeping;
pub mod properties;
pub mod query;
pub mod reports;
pub mod reservations;
pub mod rooms;
pub mod stays;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use activity::ActivityRepository;
use auth::{AuthService, TokenService};
use folio::FolioService;
use guests::{GuestRepository, GuestService};
use housekeeping::{HousekeepingRepository, HousekeepingService};
use properties::PropertyRepository;
use reports::{ReportRepository, ReportService};
use reservations::ReservationService;
use rooms::{RoomRepository, RoomService};
use stays::StayRepository;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::login_handler,
        reservations::handlers::create_reservation_handler,
        reservations::handlers::check_in_handler,
        folio::handlers::reservation_balance_handler,
        reports::handlers::occupancy_handler,
        reports::handlers::dashboard_handler,
    ),
    components(schemas(
        auth::models::LoginRequest,
        auth::models::AuthResponse,
        auth::models::UserResponse,
        auth::models::Role,
        reservations::Reservation,
        reservations::ReservationStatus,
        reservations::ReservationSource,
        reservations::CreateReservationRequest,
        reservations::CheckInRequest,
        folio::FolioBalance,
        reports::OccupancyReport,
        reports::RoomOccupancy,
        reports::Dashboard,
        reports::ReservationBrief,
        reports::RoomStatusCount,
        rooms::RoomStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Staff login"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "folio", description = "Charges, payments and balances"),
        (name = "reports", description = "Occupancy and front desk reporting")
    ),
    info(
        title = "Hotel PMS API",
        version = "1.0.0",
        description = "Property management API: reservations, stays, folio and housekeeping"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub token_service: Arc<TokenService>,
    pub auth_service: AuthService,
    pub property_repo: PropertyRepository,
    pub room_service: RoomService,
    pub guest_service: GuestService,
    pub reservation_service: ReservationService,
    pub stay_repo: StayRepository,
    pub folio_service: FolioService,
    pub housekeeping_service: HousekeepingService,
    pub activity_repo: ActivityRepository,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(db: PgPool, jwt_secret: &str, jwt_expires_in_secs: i64) -> Self {
        let token_service = Arc::new(TokenService::new(jwt_secret, jwt_expires_in_secs));
        let auth_service = AuthService::new(
            auth::repository::UserRepository::new(db.clone()),
            token_service.clone(),
        );
        let room_repo = RoomRepository::new(db.clone());

        Self {
            token_service,
            auth_service,
            property_repo: PropertyRepository::new(db.clone()),
            room_service: RoomService::new(room_repo.clone()),
            guest_service: GuestService::new(GuestRepository::new(db.clone())),
            reservation_service: ReservationService::new(db.clone()),
            stay_repo: StayRepository::new(db.clone()),
            folio_service: FolioService::new(db.clone()),
            housekeeping_service: HousekeepingService::new(
                HousekeepingRepository::new(db.clone()),
                room_repo,
            ),
            activity_repo: ActivityRepository::new(db.clone()),
            report_service: ReportService::new(ReportRepository::new(db.clone())),
            db,
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.token_service.clone()
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "hotel-pms" }))
}

/// Creates and configures the application router
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_handler))
        .nest("/api", api_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use crate::activity::handlers as activity;
    use crate::auth::handlers as auth;
    use crate::folio::handlers as folio;
    use crate::guests::handlers as guests;
    use crate::housekeeping::handlers as housekeeping;
    use crate::properties::handlers as properties;
    use crate::reports::handlers as reports;
    use crate::reservations::handlers as reservations;
    use crate::rooms::handlers as rooms;
    use crate::stays::handlers as stays;

    Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/users", post(auth::create_user_handler).get(auth::list_users_handler))
        .route(
            "/users/:id",
            get(auth::get_user_handler)
                .patch(auth::update_user_handler)
                .delete(auth::delete_user_handler),
        )
        .route(
            "/properties",
            post(properties::create_property_handler).get(properties::list_properties_handler),
        )
        .route(
            "/properties/:id",
            get(properties::get_property_handler).patch(properties::update_property_handler),
        )
        .route(
            "/room-types",
            post(rooms::create_room_type_handler).get(rooms::list_room_types_handler),
        )
        .route(
            "/room-types/:id",
            get(rooms::get_room_type_handler)
                .patch(rooms::update_room_type_handler)
                .delete(rooms::delete_room_type_handler),
        )
        .route("/rooms", post(rooms::create_room_handler).get(rooms::list_rooms_handler))
        .route(
            "/rooms/:id",
            get(rooms::get_room_handler)
                .patch(rooms::update_room_handler)
                .delete(rooms::delete_room_handler),
        )
        .route(
            "/rooms/:id/availability",
            get(reservations::room_availability_handler),
        )
        .route("/guests", post(guests::create_guest_handler).get(guests::list_guests_handler))
        .route(
            "/guests/:id",
            get(guests::get_guest_handler)
                .patch(guests::update_guest_handler)
                .delete(guests::delete_guest_handler),
        )
        .route(
            "/reservations",
            post(reservations::create_reservation_handler).get(reservations::list_reservations_handler),
        )
        .route(
            "/reservations/:id",
            get(reservations::get_reservation_handler)
                .patch(reservations::update_reservation_handler)
                .delete(reservations::delete_reservation_handler),
        )
        .route("/reservations/:id/room", put(reservations::assign_room_handler))
        .route("/reservations/:id/confirm", post(reservations::confirm_reservation_handler))
        .route("/reservations/:id/check-in", post(reservations::check_in_handler))
        .route("/reservations/:id/check-out", post(reservations::check_out_handler))
        .route("/reservations/:id/cancel", post(reservations::cancel_reservation_handler))
        .route("/reservations/:id/charges", get(folio::reservation_charges_handler))
        .route("/reservations/:id/payments", get(folio::reservation_payments_handler))
        .route("/reservations/:id/balance", get(folio::reservation_balance_handler))
        .route("/stays", get(stays::list_stays_handler))
        .route("/stays/active", get(stays::active_stays_handler))
        .route(
            "/stays/:id",
            get(stays::get_stay_handler)
                .patch(stays::update_stay_handler)
                .delete(stays::delete_stay_handler),
        )
        .route("/charges", post(folio::create_charge_handler).get(folio::list_charges_handler))
        .route("/payments", post(folio::create_payment_handler).get(folio::list_payments_handler))
        .route("/payments/:id/status", patch(folio::update_payment_status_handler))
        .route(
            "/housekeeping",
            post(housekeeping::create_task_handler).get(housekeeping::list_tasks_handler),
        )
        .route(
            "/housekeeping/:id",
            get(housekeeping::get_task_handler)
                .patch(housekeeping::update_task_handler)
                .delete(housekeeping::delete_task_handler),
        )
        .route("/housekeeping/:id/status", patch(housekeeping::update_task_status_handler))
        .route(
            "/activity-logs",
            post(activity::create_activity_handler).get(activity::list_activity_handler),
        )
        .route(
            "/activity-logs/entity/:entity_type/:entity_id",
            get(activity::entity_activity_handler),
        )
        .route("/activity-logs/user/:user_id", get(activity::user_activity_handler))
        .route("/reports/occupancy", get(reports::occupancy_handler))
        .route("/reports/arrivals-departures", get(reports::arrivals_departures_handler))
        .route("/reports/dashboard", get(reports::dashboard_handler))
        .route("/availability", get(reports::availability_calendar_handler))
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod lifecycle_tests;
