//! Database access layer
//!
//! Queries for productions, segments, segment assignments and title
//! definitions. Every reordering write runs in a single transaction.

pub mod assignments;
pub mod productions;
pub mod segments;
pub mod title_definitions;

use livecrew_common::{Error, Result};

/// Trimmed, non-empty name or `InvalidInput`
pub(crate) fn require_name(raw: &str, what: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput(format!("{} name must not be empty", what)));
    }
    Ok(name.to_string())
}
