#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! The three incident analyzers: spatial hotspots, time-of-week risk
//! patterns, and per-category correlation clusters.
//!
//! Each analyzer is a pure function from a report slice (plus config and
//! the run timestamp) to derived records; loading the reports and the
//! full-replace persistence both live in `crime_signals_database`. The
//! analyzers hold no state between runs, so running one twice on the same
//! input with the same timestamp yields identical output.
//!
//! All three sort their input by report id before clustering, which pins
//! down DBSCAN tie-breaking and makes the emitted rows reproducible for
//! identical datasets.

pub mod correlation;
pub mod hotspots;
pub mod stats;
pub mod temporal;
