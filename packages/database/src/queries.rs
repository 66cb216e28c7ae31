//! Read-side queries against the external report store.

use crime_signals_database_models::IncidentReport;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Loads completed, coordinate-bearing reports from the last `window_days`
/// days, ordered by id so downstream clustering is reproducible.
///
/// Severity and category fall back to `1` / `"other"` when a report has no
/// analysis row. Rows that survive the SQL filters but carry out-of-range
/// coordinates are skipped with a warning rather than aborting the run.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn load_reports(db: &dyn Database, window_days: u32) -> Result<Vec<IncidentReport>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT r.id,
                    r.latitude::double precision as latitude,
                    r.longitude::double precision as longitude,
                    COALESCE(ra.category, 'other') as category,
                    COALESCE(ra.severity, 1) as severity,
                    r.created_at
             FROM reports r
             LEFT JOIN report_analysis ra ON ra.report_id = r.id
             WHERE r.latitude IS NOT NULL
               AND r.longitude IS NOT NULL
               AND r.created_at > NOW() - make_interval(days => $1)
               AND r.report_status IN ('complete', 'completed')
             ORDER BY r.id",
            &[DatabaseValue::Int32(
                i32::try_from(window_days).unwrap_or(i32::MAX),
            )],
        )
        .await?;

    let mut reports = Vec::with_capacity(rows.len());

    for row in &rows {
        let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse report id: {e}"),
        })?;

        let latitude: f64 = row.to_value("latitude").unwrap_or(f64::NAN);
        let longitude: f64 = row.to_value("longitude").unwrap_or(f64::NAN);
        if !valid_coordinates(latitude, longitude) {
            log::warn!("Skipping report {id}: invalid coordinates ({latitude}, {longitude})");
            continue;
        }

        let created_at_naive: Option<chrono::NaiveDateTime> =
            row.to_value("created_at").unwrap_or(None);
        let Some(created_at_naive) = created_at_naive else {
            log::warn!("Skipping report {id}: missing created_at");
            continue;
        };
        let created_at =
            chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(created_at_naive, chrono::Utc);

        reports.push(IncidentReport {
            id,
            latitude,
            longitude,
            category: row.to_value("category").unwrap_or_else(|_| "other".to_string()),
            severity: row.to_value("severity").unwrap_or(1),
            created_at,
        });
    }

    Ok(reports)
}

/// Rejects out-of-range values and the exact (0, 0) "null island"
/// placeholder some sources emit for unknown locations.
fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    if !latitude.is_finite() || !longitude.is_finite() {
        return false;
    }
    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        return false;
    }
    latitude != 0.0 || longitude != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_coordinates() {
        assert!(valid_coordinates(41.8781, -87.6298));
        assert!(valid_coordinates(-33.8688, 151.2093));
    }

    #[test]
    fn rejects_null_island() {
        assert!(!valid_coordinates(0.0, 0.0));
        // A zero on one axis alone is legitimate.
        assert!(valid_coordinates(0.0, -87.6298));
        assert!(valid_coordinates(41.8781, 0.0));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(!valid_coordinates(91.0, 0.0));
        assert!(!valid_coordinates(0.0, -181.0));
        assert!(!valid_coordinates(f64::NAN, -87.6298));
    }
}
