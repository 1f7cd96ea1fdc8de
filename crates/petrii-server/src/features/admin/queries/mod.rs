pub mod list_datasets;
pub mod list_users;

pub use list_datasets::{AdminDatasetView, ListDatasetsError};
pub use list_users::ListUsersError;
