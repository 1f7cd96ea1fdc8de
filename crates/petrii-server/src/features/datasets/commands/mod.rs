pub mod delete;
pub mod upload;

pub use delete::{DeleteDatasetCommand, DeleteDatasetError, DeleteDatasetResponse};
pub use upload::{UploadDatasetCommand, UploadDatasetError};
