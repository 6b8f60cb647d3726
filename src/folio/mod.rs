// Reservation folios: charges, payments and the balance between them

pub mod handlers;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod service;

pub use ledger::FolioLedger;
pub use models::*;
pub use repository::FolioRepository;
pub use service::FolioService;
