//! Per-category correlation clustering.
//!
//! Looks for groups of incidents within one category that are close both
//! in space and in time-of-week, the signature of repeated or organized
//! activity. Each incident maps to a six-dimensional feature vector:
//! z-scored latitude/longitude (weighted up so distant incidents never
//! merge on a shared schedule alone) concatenated with unit-circle
//! encodings of day-of-week and hour-of-day. DBSCAN over those vectors
//! yields the clusters; every retained cluster is emitted, with the
//! organized flag and confidence score grading how consistent it looks.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use crime_signals_analytics_models::{CorrelationConfig, CrimeCorrelationRecord};
use crime_signals_cluster::dbscan;
use crime_signals_cluster::features::{cyclic_bucket_distance, cyclic_pair, euclidean, zscore};
use crime_signals_database_models::IncidentReport;

use crate::stats::{mean, mode, round2, round8};

/// Organized-activity floor on cluster size.
const MIN_ORGANIZED_INCIDENTS: u32 = 3;
/// Organized-activity floor on the cluster's calendar span; a single-day
/// burst never qualifies.
const MIN_ORGANIZED_SPAN_DAYS: i32 = 2;
/// Cluster density contribution saturates at this many members.
const DENSITY_SATURATION: f64 = 10.0;
/// Span adequacy contribution saturates at this many days.
const SPAN_SATURATION: f64 = 14.0;

/// Clusters each category's reports in combined space/time-of-week
/// features and grades the resulting clusters.
///
/// Categories are processed independently so unrelated activity is never
/// conflated. Cluster ids are `{category}_{n}`, 1-based per category in
/// descending size order, and are only meaningful within this run.
#[must_use]
pub fn correlate(
    reports: &[IncidentReport],
    config: &CorrelationConfig,
    now: DateTime<Utc>,
) -> Vec<CrimeCorrelationRecord> {
    let mut sorted: Vec<&IncidentReport> = reports.iter().collect();
    sorted.sort_by_key(|r| r.id);

    if let Some(days) = config.lookback_days {
        let cutoff = now - Duration::days(i64::from(days));
        sorted.retain(|r| r.created_at > cutoff);
    }

    if sorted.len() < config.min_reports {
        return Vec::new();
    }

    let mut by_category: BTreeMap<&str, Vec<&IncidentReport>> = BTreeMap::new();
    for report in &sorted {
        by_category
            .entry(report.category.as_str())
            .or_default()
            .push(report);
    }

    let mut records = Vec::new();
    for (category, members) in &by_category {
        if members.len() < config.min_category_reports {
            continue;
        }
        records.extend(correlate_category(category, members, config, now));
    }

    records
}

/// Builds the combined feature vector for each report.
///
/// The spatial block is z-scored per axis within the category (population
/// deviation; a zero-variance axis collapses to zero) and multiplied by
/// `spatial_weight`. The temporal block is already normalized to the unit
/// circle by construction.
fn feature_vectors(members: &[&IncidentReport], spatial_weight: f64) -> Vec<[f64; 6]> {
    let latitudes: Vec<f64> = members.iter().map(|r| r.latitude).collect();
    let longitudes: Vec<f64> = members.iter().map(|r| r.longitude).collect();
    let lat_z = zscore(&latitudes);
    let lng_z = zscore(&longitudes);

    members
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let (day_sin, day_cos) = cyclic_pair(f64::from(report.day_of_week()), 7.0);
            let (hour_sin, hour_cos) = cyclic_pair(f64::from(report.hour_of_day()), 24.0);
            [
                lat_z[i] * spatial_weight,
                lng_z[i] * spatial_weight,
                day_sin,
                day_cos,
                hour_sin,
                hour_cos,
            ]
        })
        .collect()
}

fn correlate_category(
    category: &str,
    members: &[&IncidentReport],
    config: &CorrelationConfig,
    now: DateTime<Utc>,
) -> Vec<CrimeCorrelationRecord> {
    let vectors = feature_vectors(members, config.spatial_weight);

    let labels = dbscan(members.len(), config.min_samples, |i| {
        (0..members.len())
            .filter(|&j| euclidean(&vectors[i], &vectors[j]) <= config.eps)
            .collect()
    });

    let mut clusters: BTreeMap<usize, Vec<&IncidentReport>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        if let Some(cluster) = label {
            clusters.entry(*cluster).or_default().push(members[i]);
        }
    }

    let mut by_size: Vec<Vec<&IncidentReport>> = clusters
        .into_values()
        .filter(|cluster| cluster.len() >= config.min_samples)
        .collect();
    by_size.sort_by_key(|cluster| Reverse(cluster.len()));

    by_size
        .iter()
        .enumerate()
        .map(|(i, cluster)| summarize(category, i, cluster, now))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn summarize(
    category: &str,
    position: usize,
    members: &[&IncidentReport],
    now: DateTime<Utc>,
) -> CrimeCorrelationRecord {
    let latitudes: Vec<f64> = members.iter().map(|r| r.latitude).collect();
    let longitudes: Vec<f64> = members.iter().map(|r| r.longitude).collect();
    let severities: Vec<f64> = members.iter().map(|r| f64::from(r.severity)).collect();
    let days: Vec<u32> = members.iter().map(|r| r.day_of_week()).collect();
    let hours: Vec<u32> = members.iter().map(|r| r.hour_of_day()).collect();

    // Members arrive in id order, so mode ties break on the earliest report.
    let most_common_day = mode(&days).copied().unwrap_or(0);
    let most_common_hour = mode(&hours).copied().unwrap_or(0);

    let earliest = members.iter().map(|r| r.created_at).min().unwrap_or(now);
    let latest = members.iter().map(|r| r.created_at).max().unwrap_or(now);
    let time_span_days = i32::try_from((latest - earliest).num_days()).unwrap_or(i32::MAX);

    let len = members.len() as f64;
    let day_hits = days
        .iter()
        .filter(|&&d| cyclic_bucket_distance(d, most_common_day, 7) <= 1)
        .count();
    let hour_hits = hours
        .iter()
        .filter(|&&h| cyclic_bucket_distance(h, most_common_hour, 24) <= 1)
        .count();
    let day_ratio = day_hits as f64 / len;
    let hour_ratio = hour_hits as f64 / len;
    let consistency = (day_ratio + hour_ratio) / 2.0;

    let incident_count = u32::try_from(members.len()).unwrap_or(u32::MAX);

    let is_likely_organized = incident_count >= MIN_ORGANIZED_INCIDENTS
        && time_span_days >= MIN_ORGANIZED_SPAN_DAYS
        && day_ratio > 0.5
        && hour_ratio > 0.5;

    let density = (f64::from(incident_count) / DENSITY_SATURATION).min(1.0);
    let span_adequacy = (f64::from(time_span_days) / SPAN_SATURATION).min(1.0);
    let confidence =
        0.4f64.mul_add(density, 0.3f64.mul_add(consistency, 0.3 * span_adequacy)).clamp(0.0, 1.0);

    CrimeCorrelationRecord {
        cluster_id: format!("{category}_{}", position + 1),
        category: category.to_string(),
        incident_count,
        center_lat: round8(mean(&latitudes)),
        center_lng: round8(mean(&longitudes)),
        avg_severity: round2(mean(&severities)),
        time_span_days,
        most_common_day,
        most_common_hour,
        is_likely_organized,
        confidence_score: round2(confidence),
        last_updated: now,
    }
}
