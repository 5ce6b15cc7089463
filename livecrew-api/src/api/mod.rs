//! HTTP API handlers for livecrew-api

pub mod assignments;
pub mod health;
pub mod productions;
pub mod segments;
pub mod title_definitions;

pub use health::health_routes;
