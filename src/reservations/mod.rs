// Reservation lifecycle and room availability

pub mod availability;
pub mod confirmation;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod status_machine;

pub use models::*;
pub use repository::ReservationRepository;
pub use service::ReservationService;
pub use status_machine::{StatusMachine, TransitionError};
