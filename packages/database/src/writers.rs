//! Full-replace writers for the three derived tables.
//!
//! Each writer deletes the previous run's rows and inserts the new set
//! inside a single transaction, so readers either see the old result or
//! the new one, never a mix. The tables are exclusively owned by this
//! pipeline; nothing else writes them between runs.

use crime_signals_analytics_models::{CrimeCorrelationRecord, HotspotRecord, TemporalPatternRecord};
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

fn int32(value: u32) -> DatabaseValue {
    DatabaseValue::Int32(i32::try_from(value).unwrap_or(i32::MAX))
}

/// Replaces the contents of `hotspot_analysis` with this run's hotspots.
///
/// # Errors
///
/// Returns [`DbError`] if the transaction fails; the previous contents are
/// left untouched in that case.
pub async fn replace_hotspots(db: &dyn Database, records: &[HotspotRecord]) -> Result<(), DbError> {
    let txn = db.begin_transaction().await?;

    txn.exec_raw("DELETE FROM hotspot_analysis").await?;

    for record in records {
        txn.exec_raw_params(
            "INSERT INTO hotspot_analysis (
                hotspot_id, center_lat, center_lng, incident_count,
                avg_severity, max_severity, primary_category, radius_km,
                last_updated
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                DatabaseValue::Int32(record.hotspot_id),
                DatabaseValue::Real64(record.center_lat),
                DatabaseValue::Real64(record.center_lng),
                int32(record.incident_count),
                DatabaseValue::Real64(record.avg_severity),
                DatabaseValue::Int32(record.max_severity),
                DatabaseValue::String(record.primary_category.clone()),
                DatabaseValue::Real64(record.radius_km),
                DatabaseValue::DateTime(record.last_updated.naive_utc()),
            ],
        )
        .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Replaces the contents of `temporal_patterns` with this run's buckets.
///
/// # Errors
///
/// Returns [`DbError`] if the transaction fails; the previous contents are
/// left untouched in that case.
pub async fn replace_temporal_patterns(
    db: &dyn Database,
    records: &[TemporalPatternRecord],
) -> Result<(), DbError> {
    let txn = db.begin_transaction().await?;

    txn.exec_raw("DELETE FROM temporal_patterns").await?;

    for record in records {
        txn.exec_raw_params(
            "INSERT INTO temporal_patterns (
                day_of_week, hour_of_day, category, incident_count,
                avg_severity, risk_level, last_updated
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                int32(record.day_of_week),
                int32(record.hour_of_day),
                DatabaseValue::String(record.category.clone()),
                int32(record.incident_count),
                DatabaseValue::Real64(record.avg_severity),
                DatabaseValue::String(record.risk_level.to_string()),
                DatabaseValue::DateTime(record.last_updated.naive_utc()),
            ],
        )
        .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Replaces the contents of `crime_correlations` with this run's clusters.
///
/// # Errors
///
/// Returns [`DbError`] if the transaction fails; the previous contents are
/// left untouched in that case.
pub async fn replace_correlations(
    db: &dyn Database,
    records: &[CrimeCorrelationRecord],
) -> Result<(), DbError> {
    let txn = db.begin_transaction().await?;

    txn.exec_raw("DELETE FROM crime_correlations").await?;

    for record in records {
        txn.exec_raw_params(
            "INSERT INTO crime_correlations (
                cluster_id, category, incident_count, center_lat, center_lng,
                avg_severity, time_span_days, most_common_day,
                most_common_hour, is_likely_organized, confidence_score,
                last_updated
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            &[
                DatabaseValue::String(record.cluster_id.clone()),
                DatabaseValue::String(record.category.clone()),
                int32(record.incident_count),
                DatabaseValue::Real64(record.center_lat),
                DatabaseValue::Real64(record.center_lng),
                DatabaseValue::Real64(record.avg_severity),
                DatabaseValue::Int32(record.time_span_days),
                int32(record.most_common_day),
                int32(record.most_common_hour),
                DatabaseValue::Bool(record.is_likely_organized),
                DatabaseValue::Real64(record.confidence_score),
                DatabaseValue::DateTime(record.last_updated.naive_utc()),
            ],
        )
        .await?;
    }

    txn.commit().await?;
    Ok(())
}
