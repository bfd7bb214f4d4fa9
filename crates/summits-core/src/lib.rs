//! Core types for reconciling summit detections from several DEM sources.
//!
//! This crate is small and purely geometric. It does *not*
//! locate summits in elevation data and does not read any file format; it
//! only describes what an external detector produced and how to measure it.
//!
//! - [`SummitCandidate`]: one summit/col detection from one DEM source.
//! - [`DistanceModel`]: planar distances in a caller-chosen unit.
//! - [`DemSource`]: the fixed set of recognised DEM products.
//! - [`DemGrid`] / [`ElevationSampler`]: raster sampling with explicit no-data.

mod candidate;
mod distance;
mod logger;
mod raster;
mod source;

pub use candidate::{SummitCandidate, SummitLayer};
pub use distance::{DistanceError, DistanceModel, LinearUnit};
pub use raster::{DemGrid, ElevationSampler, GeoTransform, Interpolation, RasterError};
pub use source::DemSource;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, log_tally, LogTally};

/// Planar map coordinate in the layer's coordinate system.
pub type Point = nalgebra::Point2<f64>;
