pub mod handlers;
pub mod models;
pub mod recorder;

pub use models::*;
pub use recorder::{record, ActivityRepository};
