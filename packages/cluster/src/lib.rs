#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Density-based clustering primitives shared by the analyzers.
//!
//! [`dbscan`] implements the clustering itself over an abstract neighbor
//! lookup, so the same core serves both great-circle clustering of raw
//! coordinates (via [`spatial::GeoIndex`]) and Euclidean clustering of
//! normalized feature vectors (via [`features`]).

pub mod dbscan;
pub mod features;
pub mod spatial;

pub use dbscan::dbscan;
