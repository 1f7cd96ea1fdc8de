pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    DeleteDatasetCommand, DeleteDatasetError, DeleteDatasetResponse, UploadDatasetCommand,
    UploadDatasetError,
};
pub use queries::{ListDatasetsError, SearchDatasetsError, SearchDatasetsQuery};

pub use routes::datasets_routes;
