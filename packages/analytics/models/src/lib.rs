#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Derived analytical record types and analyzer configuration.
//!
//! These are the shapes of the three derived tables the pipeline owns
//! (`hotspot_analysis`, `temporal_patterns`, `crime_correlations`). All
//! records carry a `last_updated` timestamp set to the run time; identifiers
//! within the records (`hotspot_id`, `cluster_id`) are run-local and must
//! not be treated as stable across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Relative risk classification for a time-of-week bucket.
///
/// Quantile-based: the top quartile of buckets by incident count in a run
/// is `High`, the next quartile `Medium`, the remainder `Low`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    /// Top quartile of buckets by incident count.
    High,
    /// Second quartile.
    Medium,
    /// Remaining buckets.
    Low,
}

/// A geographic concentration of incidents, one row of `hotspot_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotRecord {
    /// Run-local sequential identifier, 1-based, ordered by descending
    /// incident count. Not stable across runs.
    pub hotspot_id: i32,
    /// Cluster centroid latitude, rounded to 8 fractional digits.
    pub center_lat: f64,
    /// Cluster centroid longitude, rounded to 8 fractional digits.
    pub center_lng: f64,
    /// Number of member incidents.
    pub incident_count: u32,
    /// Mean member severity, rounded to 2 fractional digits.
    pub avg_severity: f64,
    /// Maximum member severity.
    pub max_severity: i32,
    /// Most frequent category among members (first-encountered tie-break).
    pub primary_category: String,
    /// Maximum centroid-to-member haversine distance in km, rounded to
    /// 2 fractional digits.
    pub radius_km: f64,
    /// Run timestamp.
    pub last_updated: DateTime<Utc>,
}

/// Incident volume for one (day-of-week, hour-of-day, category) bucket,
/// one row of `temporal_patterns`.
///
/// Only buckets with at least one incident in the lookback window are
/// emitted; zero-count combinations are omitted, not zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatternRecord {
    /// Day of week, 0 = Sunday through 6 = Saturday.
    pub day_of_week: u32,
    /// Hour of day, 0 through 23.
    pub hour_of_day: u32,
    /// Category label.
    pub category: String,
    /// Number of incidents in this bucket.
    pub incident_count: u32,
    /// Mean severity within the bucket, rounded to 2 fractional digits.
    pub avg_severity: f64,
    /// Relative risk classification across this run's buckets.
    pub risk_level: RiskLevel,
    /// Run timestamp.
    pub last_updated: DateTime<Utc>,
}

/// A joint spatial+temporal cluster within one category, one row of
/// `crime_correlations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeCorrelationRecord {
    /// Run-local identifier, `{category}_{n}` with n 1-based per category
    /// in descending cluster size order. Not stable across runs.
    pub cluster_id: String,
    /// Category label shared by all members.
    pub category: String,
    /// Number of member incidents.
    pub incident_count: u32,
    /// Spatial centroid latitude, rounded to 8 fractional digits.
    pub center_lat: f64,
    /// Spatial centroid longitude, rounded to 8 fractional digits.
    pub center_lng: f64,
    /// Mean member severity, rounded to 2 fractional digits.
    pub avg_severity: f64,
    /// Whole days between the earliest and latest member timestamps.
    pub time_span_days: i32,
    /// Mode of member day-of-week (first-encountered tie-break).
    pub most_common_day: u32,
    /// Mode of member hour-of-day (first-encountered tie-break).
    pub most_common_hour: u32,
    /// Whether the cluster matches the repeated/organized activity
    /// criteria (size, multi-day span, consistent day/hour signature).
    pub is_likely_organized: bool,
    /// Composite of cluster density, day/hour consistency, and span
    /// adequacy, clamped to [0, 1] and rounded to 2 fractional digits.
    pub confidence_score: f64,
    /// Run timestamp.
    pub last_updated: DateTime<Utc>,
}

/// Configuration for spatial hotspot detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotConfig {
    /// Neighborhood radius in kilometers.
    pub eps_km: f64,
    /// Minimum neighborhood size (including the point itself) to form a
    /// dense region.
    pub min_samples: usize,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            eps_km: 1.0,
            min_samples: 5,
        }
    }
}

/// Configuration for temporal pattern classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// How far back from the run time to look, in days.
    pub lookback_days: u32,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self { lookback_days: 90 }
    }
}

/// Configuration for per-category correlation clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Neighborhood radius in combined feature space.
    pub eps: f64,
    /// Minimum neighborhood size to form a dense region.
    pub min_samples: usize,
    /// Minimum total reports before any correlation is attempted.
    pub min_reports: usize,
    /// Minimum reports within a category before it is clustered.
    pub min_category_reports: usize,
    /// Multiplier applied to the spatial feature block relative to the
    /// temporal block, so distant incidents are never merged purely on a
    /// shared time-of-week signature.
    pub spatial_weight: f64,
    /// Optional in-memory filter on report age; `None` analyzes every
    /// loaded report.
    pub lookback_days: Option<u32>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 3,
            min_reports: 10,
            min_category_reports: 5,
            spatial_weight: 2.0,
            lookback_days: None,
        }
    }
}
