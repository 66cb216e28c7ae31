//! Time-of-week risk pattern classification.
//!
//! Buckets reports by (day-of-week, hour-of-day, category) over a lookback
//! window, then classifies each bucket's risk level relative to the other
//! buckets in the same run: the top quartile by incident count is high,
//! the next quartile medium, the rest low. Quantile-based tiers track data
//! volume instead of relying on fixed count cutoffs.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use crime_signals_analytics_models::{RiskLevel, TemporalConfig, TemporalPatternRecord};
use crime_signals_database_models::IncidentReport;

use crate::stats::round2;

/// Aggregates reports into time-of-week buckets and assigns relative risk
/// levels.
///
/// Only buckets observed within the lookback window are emitted, ordered
/// by (day, hour, category). Fewer than four buckets still classify; the
/// tier boundaries just become coarse.
#[must_use]
pub fn classify(
    reports: &[IncidentReport],
    config: &TemporalConfig,
    now: DateTime<Utc>,
) -> Vec<TemporalPatternRecord> {
    let cutoff = now - Duration::days(i64::from(config.lookback_days));

    let mut buckets: BTreeMap<(u32, u32, String), (u32, f64)> = BTreeMap::new();
    for report in reports {
        if report.created_at <= cutoff {
            continue;
        }
        let key = (
            report.day_of_week(),
            report.hour_of_day(),
            report.category.clone(),
        );
        let entry = buckets.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += f64::from(report.severity);
    }

    let mut records: Vec<TemporalPatternRecord> = buckets
        .into_iter()
        .map(
            |((day_of_week, hour_of_day, category), (count, severity_sum))| {
                TemporalPatternRecord {
                    day_of_week,
                    hour_of_day,
                    category,
                    incident_count: count,
                    avg_severity: round2(severity_sum / f64::from(count)),
                    risk_level: RiskLevel::Low,
                    last_updated: now,
                }
            },
        )
        .collect();

    assign_risk_levels(&mut records);
    records
}

/// Ranks buckets by descending incident count and assigns quartile tiers.
///
/// The sort is stable over the deterministic (day, hour, category) base
/// order, so ties at a quartile boundary resolve the same way for
/// identical input: the lower rank wins the higher tier.
fn assign_risk_levels(records: &mut [TemporalPatternRecord]) {
    let total = records.len();
    if total == 0 {
        return;
    }

    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by_key(|&i| Reverse(records[i].incident_count));

    let high_cut = total.div_ceil(4);
    let medium_cut = total.div_ceil(2);

    for (rank, &i) in order.iter().enumerate() {
        records[i].risk_level = if rank < high_cut {
            RiskLevel::High
        } else if rank < medium_cut {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn run_time() -> DateTime<Utc> {
        // A Tuesday.
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    fn report(id: i64, created_at: DateTime<Utc>, category: &str, severity: i32) -> IncidentReport {
        IncidentReport {
            id,
            latitude: 41.8781,
            longitude: -87.6298,
            category: category.to_string(),
            severity,
            created_at,
        }
    }

    /// `count` reports in the same (day, hour, category) bucket.
    fn bucket_reports(
        start_id: i64,
        created_at: DateTime<Utc>,
        category: &str,
        count: u32,
    ) -> Vec<IncidentReport> {
        (0..count)
            .map(|i| report(start_id + i64::from(i), created_at, category, 2))
            .collect()
    }

    #[test]
    fn buckets_by_day_hour_and_category() {
        // 2025-06-22 was a Sunday.
        let sunday_21 = Utc.with_ymd_and_hms(2025, 6, 22, 21, 0, 0).unwrap();
        let reports = vec![
            report(1, sunday_21, "theft", 2),
            report(2, sunday_21, "theft", 4),
            report(3, sunday_21, "robbery", 3),
        ];

        let patterns = classify(&reports, &TemporalConfig::default(), run_time());

        assert_eq!(patterns.len(), 2);
        // Ordered by (day, hour, category).
        assert_eq!(patterns[0].category, "robbery");
        assert_eq!(patterns[0].day_of_week, 0);
        assert_eq!(patterns[0].hour_of_day, 21);
        assert_eq!(patterns[0].incident_count, 1);

        assert_eq!(patterns[1].category, "theft");
        assert_eq!(patterns[1].incident_count, 2);
        assert!((patterns[1].avg_severity - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reports_outside_lookback_are_ignored() {
        let recent = run_time() - Duration::days(10);
        let stale = run_time() - Duration::days(120);
        let reports = vec![report(1, recent, "theft", 2), report(2, stale, "theft", 2)];

        let patterns = classify(&reports, &TemporalConfig::default(), run_time());

        let total: u32 = patterns.iter().map(|p| p.incident_count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn tied_buckets_rank_at_or_above_smaller_buckets() {
        let base = Utc.with_ymd_and_hms(2025, 6, 23, 0, 0, 0).unwrap();
        let mut reports = Vec::new();
        reports.extend(bucket_reports(100, base, "theft", 10));
        reports.extend(bucket_reports(200, base + Duration::hours(1), "theft", 10));
        reports.extend(bucket_reports(300, base + Duration::hours(2), "theft", 10));
        reports.extend(bucket_reports(400, base + Duration::hours(3), "theft", 1));

        let patterns = classify(&reports, &TemporalConfig::default(), run_time());
        assert_eq!(patterns.len(), 4);

        // n=4: one high, one medium, two low.
        let high: Vec<_> = patterns
            .iter()
            .filter(|p| p.risk_level == RiskLevel::High)
            .collect();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].incident_count, 10, "top tier holds a max-count bucket");

        // The count-1 bucket never outranks a count-10 bucket.
        let small = patterns.iter().find(|p| p.incident_count == 1).unwrap();
        assert_eq!(small.risk_level, RiskLevel::Low);
    }

    #[test]
    fn quartiles_split_eight_buckets_two_two_four() {
        let base = Utc.with_ymd_and_hms(2025, 6, 23, 0, 0, 0).unwrap();
        let mut reports = Vec::new();
        for (i, count) in [8, 7, 6, 5, 4, 3, 2, 1].into_iter().enumerate() {
            let at = base + Duration::hours(i64::try_from(i).unwrap());
            reports.extend(bucket_reports(i64::try_from(i).unwrap() * 100, at, "theft", count));
        }

        let patterns = classify(&reports, &TemporalConfig::default(), run_time());
        assert_eq!(patterns.len(), 8);

        let tier_counts = |level: RiskLevel| {
            patterns
                .iter()
                .filter(|p| p.risk_level == level)
                .map(|p| p.incident_count)
                .collect::<Vec<_>>()
        };

        let mut high = tier_counts(RiskLevel::High);
        high.sort_unstable();
        assert_eq!(high, vec![7, 8]);

        let mut medium = tier_counts(RiskLevel::Medium);
        medium.sort_unstable();
        assert_eq!(medium, vec![5, 6]);

        assert_eq!(tier_counts(RiskLevel::Low).len(), 4);
    }

    #[test]
    fn single_bucket_classifies_as_high() {
        let at = run_time() - Duration::days(1);
        let patterns = classify(
            &bucket_reports(1, at, "theft", 3),
            &TemporalConfig::default(),
            run_time(),
        );
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn boundary_ties_resolve_by_stable_base_order() {
        // Four buckets with identical counts: ranks follow the
        // (day, hour, category) order, so the earliest bucket is High.
        let base = Utc.with_ymd_and_hms(2025, 6, 22, 0, 0, 0).unwrap();
        let mut reports = Vec::new();
        for hour in 0..4 {
            reports.extend(bucket_reports(
                i64::from(hour) * 100,
                base + Duration::hours(i64::from(hour)),
                "theft",
                2,
            ));
        }

        let first = classify(&reports, &TemporalConfig::default(), run_time());
        let second = classify(&reports, &TemporalConfig::default(), run_time());
        assert_eq!(first, second);

        assert_eq!(first[0].hour_of_day, 0);
        assert_eq!(first[0].risk_level, RiskLevel::High);
        assert_eq!(first[1].risk_level, RiskLevel::Medium);
        assert_eq!(first[2].risk_level, RiskLevel::Low);
        assert_eq!(first[3].risk_level, RiskLevel::Low);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        assert!(classify(&[], &TemporalConfig::default(), run_time()).is_empty());
    }
}
