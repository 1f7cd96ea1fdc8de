pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    ensure_admin, SeedAdminError, UpdateStatusCommand, UpdateStatusError,
};
pub use queries::{AdminDatasetView, ListDatasetsError, ListUsersError};

pub use routes::admin_routes;
