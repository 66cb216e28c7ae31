//! Run-scoped mutual exclusion via Postgres advisory locks.
//!
//! A scheduled run overlapping a manual trigger must not interleave two
//! full-replace cycles. The lock is session-scoped and non-blocking: a
//! run that cannot acquire it exits without touching any table and the
//! next scheduled invocation retries.

use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Advisory lock key for the whole analytics pipeline.
pub const RUN_LOCK_NAME: &str = "crime_signals_analytics";

/// Attempts to acquire the named advisory lock without blocking.
///
/// Returns `false` when another session already holds it.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn try_acquire_run_lock(db: &dyn Database, name: &str) -> Result<bool, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT pg_try_advisory_lock(hashtext($1)) as acquired",
            &[DatabaseValue::String(name.to_string())],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Advisory lock query returned no rows".to_string(),
    })?;

    let acquired: bool = row.to_value("acquired").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse advisory lock result: {e}"),
    })?;

    Ok(acquired)
}

/// Releases the named advisory lock held by this session.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn release_run_lock(db: &dyn Database, name: &str) -> Result<(), DbError> {
    db.query_raw_params(
        "SELECT pg_advisory_unlock(hashtext($1))",
        &[DatabaseValue::String(name.to_string())],
    )
    .await?;

    Ok(())
}
