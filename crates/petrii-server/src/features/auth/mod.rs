pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    LoginCommand, LoginError, LoginResponse, RegisterCommand, RegisterError,
};
pub use queries::MeError;

pub use routes::auth_routes;
