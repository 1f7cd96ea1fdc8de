//! Indexed text and search
//!
//! The indexer builds one lowercased text blob per dataset at creation time;
//! the engine matches query terms against it. Since the blob is stored with
//! the record, a dataset is searchable as soon as its insert commits.

pub mod engine;
pub mod indexer;

pub use engine::{rank, SearchQuery};
pub use indexer::{build_indexed_text, decode_content, IndexFields};
