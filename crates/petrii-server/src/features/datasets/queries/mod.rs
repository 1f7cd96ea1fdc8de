pub mod list;
pub mod search;

pub use list::ListDatasetsError;
pub use search::{SearchDatasetsError, SearchDatasetsQuery};
