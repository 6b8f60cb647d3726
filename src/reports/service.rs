use chrono::{Duration, Utc};
use tracing::debug;

use crate::error::ApiError;
use crate::reports::{
    calendar_window, day_bounds, occupancy_rate, percentage, report_window, ArrivalsDeparturesReport,
    AvailabilityCalendar, CalendarQuery, Dashboard, DashboardQuery, DayQuery, OccupancyQuery,
    OccupancyReport, ReportRepository, DASHBOARD_LIST_LIMIT, UPCOMING_DAYS,
};

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    pub async fn occupancy(&self, query: OccupancyQuery) -> Result<OccupancyReport, ApiError> {
        let (from, to) = report_window(query.start_date, query.end_date)?;

        let total_rooms = self.repo.count_rooms(query.property_id).await?;
        let occupied_rooms = self
            .repo
            .count_occupied_rooms(query.property_id, from, to)
            .await?
            .min(total_rooms);
        let room_breakdown = self.repo.room_breakdown(query.property_id, from).await?;

        debug!(%from, %to, total_rooms, occupied_rooms, "Computed occupancy");
        Ok(OccupancyReport {
            start_date: query.start_date,
            end_date: query.end_date,
            total_rooms,
            occupied_rooms,
            available_rooms: total_rooms - occupied_rooms,
            occupancy_rate: occupancy_rate(occupied_rooms, total_rooms),
            room_breakdown,
        })
    }

    pub async fn arrivals_departures(&self, query: DayQuery) -> Result<ArrivalsDeparturesReport, ApiError> {
        let (from, to) = day_bounds(query.date, "date")?;
        Ok(ArrivalsDeparturesReport {
            date: query.date,
            arrivals: self.repo.arrivals(query.property_id, from, to, None).await?,
            departures: self.repo.departures(query.property_id, from, to, None).await?,
        })
    }

    pub async fn dashboard(&self, query: DashboardQuery) -> Result<Dashboard, ApiError> {
        let now = Utc::now();
        let date = query.date.unwrap_or_else(|| now.date_naive());
        let (from, to) = day_bounds(date, "date")?;
        let property_id = query.property_id;

        let total_rooms = self.repo.count_rooms(property_id).await?;
        let occupied_rooms = self.repo.count_checked_in_rooms(property_id).await?.min(total_rooms);
        let in_house_guests = self.repo.count_active_stays(property_id).await?;

        let mut room_status_summary = self.repo.room_status_counts(property_id).await?;
        for entry in &mut room_status_summary {
            entry.percentage = percentage(entry.count, total_rooms);
        }

        Ok(Dashboard {
            date,
            total_rooms,
            occupied_rooms,
            available_rooms: total_rooms - occupied_rooms,
            in_house_guests,
            occupancy_rate: occupancy_rate(occupied_rooms, total_rooms),
            todays_arrivals: self
                .repo
                .arrivals(property_id, from, to, Some(DASHBOARD_LIST_LIMIT))
                .await?,
            todays_departures: self
                .repo
                .departures(property_id, from, to, Some(DASHBOARD_LIST_LIMIT))
                .await?,
            room_status_summary,
            upcoming_reservations: self
                .repo
                .upcoming(property_id, now, now + Duration::days(UPCOMING_DAYS), DASHBOARD_LIST_LIMIT)
                .await?,
        })
    }

    pub async fn availability(&self, query: CalendarQuery) -> Result<AvailabilityCalendar, ApiError> {
        let (from, to) = calendar_window(query.from, query.to, Utc::now())?;
        let reservations = self.repo.calendar(query.property_id, from, to).await?;
        Ok(AvailabilityCalendar {
            from,
            to,
            reservations,
        })
    }
}
