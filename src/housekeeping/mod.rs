pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::*;
pub use repository::HousekeepingRepository;
pub use service::HousekeepingService;
