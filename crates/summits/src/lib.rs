//! High-level facade crate for the `summits-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - end-to-end helpers chaining correction, reference matching and the
//!   statistics passes on JSON documents
//! - (feature `cli`) the `summits` command-line tool
//!
//! ## Quickstart
//!
//! ```
//! use summits::core::{DistanceModel, LinearUnit, Point, SummitCandidate, SummitLayer};
//! use summits::merge::{io::merge_layers, ClusterParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut srtm = SummitLayer::new("SRTM");
//! srtm.candidates.extend(SummitCandidate::from_ridge(
//!     "srtm",
//!     vec![Point::new(0.0, 0.0), Point::new(0.01, 0.0)],
//!     1500.0,
//!     1200.0,
//! ));
//! let mut aster = SummitLayer::new("ASTER");
//! aster.candidates.extend(SummitCandidate::from_ridge(
//!     "aster",
//!     vec![Point::new(0.0, 0.0003), Point::new(0.01, 0.0)],
//!     1496.0,
//!     1204.0,
//! ));
//!
//! let report = merge_layers(
//!     vec![srtm, aster],
//!     ClusterParams::new(0.0005, LinearUnit::Degrees),
//!     DistanceModel::new(LinearUnit::Degrees),
//! )?;
//! assert_eq!(1, report.set.groups.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `summits::core`: candidates, distance model, DEM sources, rasters.
//! - `summits::merge`: clustering, ridges, corrections, reference matching.
//! - `summits::stats`: per-DEM prominence and accuracy statistics.
//! - `summits::pipeline`: end-to-end helpers used by the CLI.

pub use summits_core as core;
pub use summits_merge as merge;
pub use summits_stats as stats;

pub use summits_core::{DemSource, DistanceModel, LinearUnit, Point, SummitCandidate};
pub use summits_merge::{ClusterParams, MergeGroup, SummitSet};

pub mod pipeline;
