//! Spatial hotspot detection.
//!
//! DBSCAN directly over geographic coordinates with great-circle distance:
//! a hotspot is a region where at least `min_samples` reports fall within
//! `eps_km` of one another. Reports outside any dense region are noise and
//! are never emitted as singleton hotspots.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use crime_signals_analytics_models::{HotspotConfig, HotspotRecord};
use crime_signals_cluster::dbscan;
use crime_signals_cluster::spatial::{GeoIndex, haversine_km};
use crime_signals_database_models::IncidentReport;

use crate::stats::{mean, mode, round2, round8};

/// Clusters coordinate-bearing reports into hotspots.
///
/// Hotspot ids are assigned 1-based in descending incident count order and
/// are only meaningful within this run. Fewer than `min_samples` reports
/// yields an empty result, not an error.
#[must_use]
pub fn detect(
    reports: &[IncidentReport],
    config: &HotspotConfig,
    now: DateTime<Utc>,
) -> Vec<HotspotRecord> {
    if reports.len() < config.min_samples {
        return Vec::new();
    }

    let mut sorted: Vec<&IncidentReport> = reports.iter().collect();
    sorted.sort_by_key(|r| r.id);

    let points: Vec<(f64, f64)> = sorted.iter().map(|r| (r.latitude, r.longitude)).collect();
    let index = GeoIndex::new(&points);

    let labels = dbscan(points.len(), config.min_samples, |i| {
        let (lat, lng) = points[i];
        index.neighbors_within(lat, lng, config.eps_km)
    });

    let mut clusters: BTreeMap<usize, Vec<&IncidentReport>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        if let Some(cluster) = label {
            clusters.entry(*cluster).or_default().push(sorted[i]);
        }
    }

    // Stable sort over the label order, so equal-sized clusters keep a
    // deterministic relative order.
    let mut by_size: Vec<Vec<&IncidentReport>> = clusters.into_values().collect();
    by_size.sort_by_key(|members| Reverse(members.len()));

    by_size
        .iter()
        .enumerate()
        .map(|(i, members)| summarize(i, members, now))
        .collect()
}

fn summarize(position: usize, members: &[&IncidentReport], now: DateTime<Utc>) -> HotspotRecord {
    let latitudes: Vec<f64> = members.iter().map(|r| r.latitude).collect();
    let longitudes: Vec<f64> = members.iter().map(|r| r.longitude).collect();
    let severities: Vec<f64> = members.iter().map(|r| f64::from(r.severity)).collect();
    let categories: Vec<&str> = members.iter().map(|r| r.category.as_str()).collect();

    let center_lat = mean(&latitudes);
    let center_lng = mean(&longitudes);

    let radius_km = members
        .iter()
        .map(|r| haversine_km(center_lat, center_lng, r.latitude, r.longitude))
        .fold(0.0, f64::max);

    HotspotRecord {
        hotspot_id: i32::try_from(position + 1).unwrap_or(i32::MAX),
        center_lat: round8(center_lat),
        center_lng: round8(center_lng),
        incident_count: u32::try_from(members.len()).unwrap_or(u32::MAX),
        avg_severity: round2(mean(&severities)),
        max_severity: members.iter().map(|r| r.severity).max().unwrap_or(1),
        primary_category: (*mode(&categories).unwrap_or(&"other")).to_string(),
        radius_km: round2(radius_km),
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn report(id: i64, lat: f64, lng: f64, category: &str, severity: i32) -> IncidentReport {
        IncidentReport {
            id,
            latitude: lat,
            longitude: lng,
            category: category.to_string(),
            severity,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    fn run_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 3, 0, 0).unwrap()
    }

    /// Six reports spread within roughly 200 m around a center point.
    fn tight_cluster() -> Vec<IncidentReport> {
        vec![
            report(1, 41.8781, -87.6298, "robbery", 2),
            report(2, 41.8785, -87.6295, "robbery", 3),
            report(3, 41.8779, -87.6301, "robbery", 3),
            report(4, 41.8783, -87.6303, "robbery", 4),
            report(5, 41.8778, -87.6294, "robbery", 2),
            report(6, 41.8786, -87.6300, "robbery", 3),
        ]
    }

    #[test]
    fn six_tight_reports_produce_expected_summary() {
        let hotspots = detect(&tight_cluster(), &HotspotConfig::default(), run_time());

        assert_eq!(hotspots.len(), 1);
        let hotspot = &hotspots[0];
        assert_eq!(hotspot.hotspot_id, 1);
        assert_eq!(hotspot.incident_count, 6);
        assert!((hotspot.avg_severity - 2.83).abs() < f64::EPSILON);
        assert_eq!(hotspot.max_severity, 4);
        assert_eq!(hotspot.primary_category, "robbery");
        assert!(hotspot.radius_km <= 1.0);
    }

    #[test]
    fn five_reports_within_a_kilometer_form_one_hotspot() {
        let reports = tight_cluster()[..5].to_vec();
        let hotspots = detect(&reports, &HotspotConfig::default(), run_time());

        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].incident_count, 5);
        assert!(hotspots[0].radius_km <= 1.0);
    }

    #[test]
    fn four_reports_form_no_hotspot() {
        let reports = tight_cluster()[..4].to_vec();
        assert!(detect(&reports, &HotspotConfig::default(), run_time()).is_empty());
    }

    #[test]
    fn isolated_report_is_excluded_from_all_aggregates() {
        let mut reports = tight_cluster();
        // Roughly 50 km away, no neighbor within eps.
        reports.push(report(7, 42.3000, -87.6298, "theft", 5));

        let hotspots = detect(&reports, &HotspotConfig::default(), run_time());

        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].max_severity, 4, "outlier must not contribute");

        let clustered: u32 = hotspots.iter().map(|h| h.incident_count).sum();
        assert!(clustered <= u32::try_from(reports.len()).unwrap());
        assert_eq!(clustered, 6);
    }

    #[test]
    fn hotspot_ids_order_by_descending_incident_count() {
        let mut reports = tight_cluster()[..5].to_vec();
        // A second, larger cluster far from the first.
        for i in 0..7 {
            let jitter = f64::from(i) * 0.0004;
            reports.push(report(100 + i64::from(i), 42.5000 + jitter, -88.0000, "theft", 1));
        }

        let hotspots = detect(&reports, &HotspotConfig::default(), run_time());

        assert_eq!(hotspots.len(), 2);
        assert_eq!(hotspots[0].hotspot_id, 1);
        assert_eq!(hotspots[0].incident_count, 7);
        assert_eq!(hotspots[0].primary_category, "theft");
        assert_eq!(hotspots[1].hotspot_id, 2);
        assert_eq!(hotspots[1].incident_count, 5);
    }

    #[test]
    fn detection_is_deterministic_for_identical_input() {
        let reports = tight_cluster();
        let first = detect(&reports, &HotspotConfig::default(), run_time());
        let second = detect(&reports, &HotspotConfig::default(), run_time());
        assert_eq!(first, second);

        // Input order must not matter either.
        let mut shuffled = reports;
        shuffled.reverse();
        let third = detect(&shuffled, &HotspotConfig::default(), run_time());
        assert_eq!(first, third);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        assert!(detect(&[], &HotspotConfig::default(), run_time()).is_empty());
    }

    #[test]
    fn primary_category_tie_breaks_by_first_encountered() {
        let reports = vec![
            report(1, 41.8781, -87.6298, "theft", 2),
            report(2, 41.8782, -87.6298, "robbery", 2),
            report(3, 41.8783, -87.6298, "theft", 2),
            report(4, 41.8784, -87.6298, "robbery", 2),
            report(5, 41.8785, -87.6298, "robbery", 2),
            report(6, 41.8786, -87.6298, "theft", 2),
        ];

        let hotspots = detect(&reports, &HotspotConfig::default(), run_time());
        assert_eq!(hotspots.len(), 1);
        // 3-3 tie; "theft" appears first in id order.
        assert_eq!(hotspots[0].primary_category, "theft");
    }
}
