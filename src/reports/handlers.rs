use axum::{
    extract::{Query, State},
    Json,
};

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::reports::{
    ArrivalsDeparturesReport, AvailabilityCalendar, CalendarQuery, Dashboard, DashboardQuery,
    DayQuery, OccupancyQuery, OccupancyReport,
};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/reports/occupancy",
    params(OccupancyQuery),
    responses(
        (status = 200, description = "Occupancy over the date range", body = OccupancyReport),
        (status = 400, description = "Invalid date range")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn occupancy_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OccupancyQuery>,
) -> Result<Json<OccupancyReport>, ApiError> {
    user.authorize(Operation::ReportRead)?;
    Ok(Json(state.report_service.occupancy(query).await?))
}

pub async fn arrivals_departures_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DayQuery>,
) -> Result<Json<ArrivalsDeparturesReport>, ApiError> {
    user.authorize(Operation::ReportRead)?;
    Ok(Json(state.report_service.arrivals_departures(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    params(DashboardQuery),
    responses((status = 200, description = "Front desk dashboard", body = Dashboard)),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn dashboard_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    user.authorize(Operation::DashboardRead)?;
    Ok(Json(state.report_service.dashboard(query).await?))
}

pub async fn availability_calendar_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<AvailabilityCalendar>, ApiError> {
    user.authorize(Operation::AvailabilityRead)?;
    Ok(Json(state.report_service.availability(query).await?))
}
