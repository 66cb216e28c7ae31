#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types for the analytics pipeline.
//!
//! These types represent the shape of incident data as loaded from the
//! report store. They are distinct from the derived analytical record types
//! in `crime_signals_analytics_models`, which describe what the pipeline
//! writes back.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A geotagged, timestamped incident report as loaded from the report store.
///
/// Immutable from the analyzers' viewpoint. Records missing valid
/// coordinates never reach this type; the loader filters them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// Primary key in the report store.
    pub id: i64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Category label (e.g. "robbery"). Defaults to "other" at load time
    /// when the source row has no analysis category.
    pub category: String,
    /// Severity level, 1 (minimal) to 5 (critical). Defaults to 1 at load
    /// time when the source row has no analysis severity.
    pub severity: i32,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
}

impl IncidentReport {
    /// Day of week of `created_at`, 0 = Sunday through 6 = Saturday.
    ///
    /// Matches Postgres `EXTRACT(DOW FROM ...)` numbering.
    #[must_use]
    pub fn day_of_week(&self) -> u32 {
        self.created_at.weekday().num_days_from_sunday()
    }

    /// Hour of day of `created_at`, 0 through 23.
    #[must_use]
    pub fn hour_of_day(&self) -> u32 {
        self.created_at.hour()
    }
}
