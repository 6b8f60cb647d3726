// Authentication module
// JWT login, staff accounts and the role policy table

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::{Role, User, UserResponse};
pub use policy::{authorize, Operation};
pub use service::AuthService;
pub use token::TokenService;
