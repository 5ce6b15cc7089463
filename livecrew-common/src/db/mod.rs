//! Database models, schema and ordered-table writer

pub mod init;
pub mod models;
pub mod ordered;

pub use init::*;
pub use models::*;
pub use ordered::{OrderedTable, SEGMENTS, TITLE_DEFINITIONS};
