pub mod seed;
pub mod update_status;

pub use seed::{ensure_admin, SeedAdminError};
pub use update_status::{UpdateStatusCommand, UpdateStatusError};
