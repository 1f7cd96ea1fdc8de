pub mod login;
pub mod register;

pub use login::{LoginCommand, LoginError, LoginResponse};
pub use register::{RegisterCommand, RegisterError};
