#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the analytics pipeline.
//!
//! Each invocation is one batch run: load reports, run the requested
//! analyzers, commit each one's full-replace write, exit. There is no
//! in-process scheduler; cron or an orchestrator re-invokes this binary,
//! and that re-invocation is also the retry mechanism. A Postgres
//! advisory lock keeps overlapping invocations from interleaving; the
//! loser exits cleanly without touching any table.

use std::time::Instant;

use chrono::Utc;
use clap::{Parser, Subcommand};
use crime_signals_analytics::{correlation, hotspots, temporal};
use crime_signals_analytics_models::{CorrelationConfig, HotspotConfig, TemporalConfig};
use crime_signals_database::{db, lock, queries, run_migrations, writers};
use switchy_database::Database;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Parser)]
#[command(name = "crime_signals_runner", about = "Incident analytics pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all analyzers in sequence under one run lock
    All {
        /// Comma-separated list of analyzer IDs to run (overrides the
        /// `CRIME_SIGNALS_ANALYZERS` env var)
        #[arg(long)]
        analyzers: Option<String>,
        /// Compute and log results without writing any table
        #[arg(long)]
        dry_run: bool,
    },
    /// Detect spatial hotspots
    Hotspots {
        /// Override the report load window in days (default: 30)
        #[arg(long)]
        lookback_days: Option<u32>,
        /// Compute and log results without writing any table
        #[arg(long)]
        dry_run: bool,
    },
    /// Classify time-of-week risk patterns
    Temporal {
        /// Override the report load window in days (default: 90)
        #[arg(long)]
        lookback_days: Option<u32>,
        /// Compute and log results without writing any table
        #[arg(long)]
        dry_run: bool,
    },
    /// Cluster correlated incidents per category
    Correlations {
        /// Override the report load window in days (default: 60)
        #[arg(long)]
        lookback_days: Option<u32>,
        /// Compute and log results without writing any table
        #[arg(long)]
        dry_run: bool,
    },
    /// Run database migrations
    Migrate,
}

/// The three independent analyzers the pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Analyzer {
    Hotspots,
    Temporal,
    Correlations,
}

impl Analyzer {
    const ALL: &[Self] = &[Self::Hotspots, Self::Temporal, Self::Correlations];

    const fn id(self) -> &'static str {
        match self {
            Self::Hotspots => "hotspots",
            Self::Temporal => "temporal",
            Self::Correlations => "correlations",
        }
    }

    /// How far back to load reports for this analyzer, in days.
    const fn default_window_days(self) -> u32 {
        match self {
            Self::Hotspots => 30,
            Self::Temporal => 90,
            Self::Correlations => 60,
        }
    }
}

/// Resolves which analyzers an `all` run executes: the explicit CLI filter
/// wins, then the `CRIME_SIGNALS_ANALYZERS` env var, then everything.
/// Unknown ids are logged and skipped.
fn enabled_analyzers(filter: Option<String>) -> Vec<Analyzer> {
    let filter = filter.or_else(|| std::env::var("CRIME_SIGNALS_ANALYZERS").ok());

    let Some(filter) = filter else {
        return Analyzer::ALL.to_vec();
    };

    let mut analyzers = Vec::new();
    for id in filter.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some(analyzer) = Analyzer::ALL.iter().find(|a| a.id() == id) {
            if !analyzers.contains(analyzer) {
                analyzers.push(*analyzer);
            }
        } else {
            log::warn!("Unknown analyzer id '{id}', skipping");
        }
    }
    analyzers
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        None => {
            let db = db::connect_from_env().await?;
            run_migrations(db.as_ref()).await?;
            run_locked(db.as_ref(), Analyzer::ALL, None, false).await
        }
        Some(Commands::Migrate) => {
            log::info!("Running database migrations...");
            let db = db::connect_from_env().await?;
            run_migrations(db.as_ref()).await?;
            log::info!("Migrations complete.");
            Ok(())
        }
        Some(Commands::All { analyzers, dry_run }) => {
            let analyzers = enabled_analyzers(analyzers);
            if analyzers.is_empty() {
                log::warn!("No analyzers selected, nothing to do");
                return Ok(());
            }
            let db = db::connect_from_env().await?;
            run_migrations(db.as_ref()).await?;
            run_locked(db.as_ref(), &analyzers, None, dry_run).await
        }
        Some(Commands::Hotspots {
            lookback_days,
            dry_run,
        }) => single(Analyzer::Hotspots, lookback_days, dry_run).await,
        Some(Commands::Temporal {
            lookback_days,
            dry_run,
        }) => single(Analyzer::Temporal, lookback_days, dry_run).await,
        Some(Commands::Correlations {
            lookback_days,
            dry_run,
        }) => single(Analyzer::Correlations, lookback_days, dry_run).await,
    }
}

async fn single(
    analyzer: Analyzer,
    lookback_days: Option<u32>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_from_env().await?;
    run_migrations(db.as_ref()).await?;
    run_locked(db.as_ref(), &[analyzer], lookback_days, dry_run).await
}

/// Runs the given analyzers under the pipeline's advisory lock.
///
/// Lock contention is a soft skip (exit 0), not an error. A failure in
/// one analyzer is logged and does not stop the others from running and
/// committing; the process exits non-zero if any of them failed.
async fn run_locked(
    db: &dyn Database,
    analyzers: &[Analyzer],
    lookback_days: Option<u32>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !lock::try_acquire_run_lock(db, lock::RUN_LOCK_NAME).await? {
        log::info!(
            "Another run holds the '{}' lock; exiting without writing",
            lock::RUN_LOCK_NAME
        );
        return Ok(());
    }

    let mut failures = 0u32;
    for analyzer in analyzers {
        if let Err(e) = run_analyzer(db, *analyzer, lookback_days, dry_run).await {
            log::error!("Analyzer '{}' failed: {e}", analyzer.id());
            failures += 1;
        }
    }

    lock::release_run_lock(db, lock::RUN_LOCK_NAME).await?;

    if failures > 0 {
        return Err(format!("{failures} analyzer(s) failed").into());
    }
    Ok(())
}

async fn run_analyzer(
    db: &dyn Database,
    analyzer: Analyzer,
    lookback_days: Option<u32>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let window = lookback_days.unwrap_or_else(|| analyzer.default_window_days());

    log::info!(
        "Running '{}' over reports from the last {window} day(s)...",
        analyzer.id()
    );
    let reports = queries::load_reports(db, window).await?;
    let now = Utc::now();

    let rows_written = match analyzer {
        Analyzer::Hotspots => {
            let records = hotspots::detect(&reports, &HotspotConfig::default(), now);
            log_hotspot_digest(&records);
            if !dry_run {
                writers::replace_hotspots(db, &records).await?;
            }
            records.len()
        }
        Analyzer::Temporal => {
            let config = TemporalConfig {
                lookback_days: window,
            };
            let records = temporal::classify(&reports, &config, now);
            log_temporal_digest(&records);
            if !dry_run {
                writers::replace_temporal_patterns(db, &records).await?;
            }
            records.len()
        }
        Analyzer::Correlations => {
            let records = correlation::correlate(&reports, &CorrelationConfig::default(), now);
            log_correlation_digest(&records);
            if !dry_run {
                writers::replace_correlations(db, &records).await?;
            }
            records.len()
        }
    };

    let elapsed = start.elapsed();
    log::info!(
        "Analyzer '{}' complete: {} reports analyzed, {rows_written} rows {} in {:.1}s",
        analyzer.id(),
        reports.len(),
        if dry_run { "computed (dry run)" } else { "written" },
        elapsed.as_secs_f64()
    );

    Ok(())
}

fn log_hotspot_digest(records: &[crime_signals_analytics_models::HotspotRecord]) {
    log::info!("Detected {} hotspot(s)", records.len());
    // Records are already ordered by descending incident count.
    for record in records.iter().take(5) {
        log::info!(
            "  Hotspot #{}: {} incidents | {} | avg severity {:.2} | radius {:.2} km",
            record.hotspot_id,
            record.incident_count,
            record.primary_category,
            record.avg_severity,
            record.radius_km
        );
    }
}

fn log_temporal_digest(records: &[crime_signals_analytics_models::TemporalPatternRecord]) {
    use crime_signals_analytics_models::RiskLevel;

    let mut high_risk: Vec<_> = records
        .iter()
        .filter(|r| r.risk_level == RiskLevel::High)
        .collect();
    high_risk.sort_by_key(|r| std::cmp::Reverse(r.incident_count));

    log::info!(
        "Classified {} bucket(s), {} high-risk",
        records.len(),
        high_risk.len()
    );
    for record in high_risk.iter().take(10) {
        log::info!(
            "  {} {:02}:00-{:02}:00 | {} | {} incidents | avg severity {:.2}",
            DAY_NAMES[record.day_of_week as usize % 7],
            record.hour_of_day,
            (record.hour_of_day + 1) % 24,
            record.category,
            record.incident_count,
            record.avg_severity
        );
    }
}

fn log_correlation_digest(records: &[crime_signals_analytics_models::CrimeCorrelationRecord]) {
    let mut organized: Vec<_> = records.iter().filter(|r| r.is_likely_organized).collect();
    organized.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::info!(
        "Found {} correlation cluster(s), {} likely organized",
        records.len(),
        organized.len()
    );
    for record in organized.iter().take(10) {
        log::info!(
            "  Cluster {}: {} incidents | {} {:02}:00 | confidence {:.2}",
            record.cluster_id,
            record.incident_count,
            DAY_NAMES[record.most_common_day as usize % 7],
            record.most_common_hour,
            record.confidence_score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_selects_and_orders_analyzers() {
        let analyzers = enabled_analyzers(Some("correlations, hotspots".to_string()));
        assert_eq!(analyzers, vec![Analyzer::Correlations, Analyzer::Hotspots]);
    }

    #[test]
    fn unknown_and_duplicate_ids_are_dropped() {
        let analyzers = enabled_analyzers(Some("temporal,bogus,temporal".to_string()));
        assert_eq!(analyzers, vec![Analyzer::Temporal]);
    }

    #[test]
    fn load_windows_match_analyzer_defaults() {
        assert_eq!(Analyzer::Hotspots.default_window_days(), 30);
        assert_eq!(Analyzer::Temporal.default_window_days(), 90);
        assert_eq!(Analyzer::Correlations.default_window_days(), 60);
    }
}
