//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One livestream of one match
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Production {
    pub id: i64,
    pub name: String,
    pub home_team: String,
    pub away_team: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Agenda item of a production (pre-show, first half, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Segment {
    pub id: i64,
    pub production_id: i64,
    pub name: String,
    pub duration_minutes: i64,
    pub is_break: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Crew member covering a position during one segment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SegmentAssignment {
    pub id: i64,
    pub segment_id: i64,
    pub position: String,
    pub person: String,
    pub created_at: DateTime<Utc>,
}

/// Lower-third graphic shown during a production
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TitleDefinition {
    pub id: i64,
    pub production_id: i64,
    pub name: String,
    pub enabled: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
