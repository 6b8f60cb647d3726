// Properties: the tenant partition every other entity belongs to

pub mod handlers;
pub mod models;
pub mod repository;

pub use models::*;
pub use repository::PropertyRepository;
