//! # LiveCrew Common Library
//!
//! Shared code for the LiveCrew production planner:
//! - Database schema, models and the ordered-table writer
//! - Dense ordering planner for segments and title definitions
//! - Configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod ordering;

pub use error::{Error, Result};
pub use ordering::Position;
