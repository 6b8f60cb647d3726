// Occupancy, arrivals/departures, dashboard and availability calendar

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::*;
pub use repository::ReportRepository;
pub use service::ReportService;
