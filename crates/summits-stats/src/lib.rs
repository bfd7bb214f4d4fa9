//! Statistics over merged summits: per-DEM prominence and detection accuracy.
//!
//! Both passes read elevations through [`summits_core::ElevationSampler`], so
//! any raster backend works; [`summits_core::DemGrid`] is the in-memory one.
//! A sample outside a raster or on a no-data cell is never replaced by a
//! default: the affected record is flagged `out_of_coverage` instead.
//!
//! ## Quickstart
//!
//! ```
//! use summits_core::{DemGrid, DemSource, GeoTransform, Interpolation, Point};
//! use summits_stats::sample_prominence;
//!
//! let dem = DemGrid::new(
//!     2,
//!     1,
//!     GeoTransform { origin_x: 0.0, origin_y: 1.0, pixel_width: 1.0, pixel_height: 1.0 },
//!     Some(-9999.0),
//!     vec![1500.0, 1200.0],
//! )?;
//! let r = sample_prominence(
//!     "S0001",
//!     DemSource::Srtm,
//!     &dem,
//!     &Point::new(0.5, 0.5),
//!     &Point::new(1.5, 0.5),
//!     Interpolation::Nearest,
//! );
//! assert_eq!(Some(300.0), r.prominence);
//! # Ok::<(), summits_core::RasterError>(())
//! ```

pub mod accuracy;
pub mod io;
mod prominence;

pub use accuracy::{AccuracyEngine, AccuracyParams, AccuracyRecord, AccuracyReport, SurveyedSummit};
pub use io::{load_dem, LoadedDem, StatsIoError};
pub use prominence::{
    sample_prominence, ProminenceCalculator, ProminenceError, ProminenceRecord, ProminenceRow,
    ProminenceTable, SampleAt,
};
