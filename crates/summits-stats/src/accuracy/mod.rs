//! Detection accuracy against surveyed summits.
//!
//! For every surveyed summit and every DEM that detected it the engine
//! reports the position error, the DEM elevation at the surveyed and at the
//! detected position, and a cross-match best guess: the reported elevation
//! of whichever DEM's detection lies closest to the surveyed summit.

mod engine;
mod record;
mod summary;

pub use engine::{AccuracyEngine, AccuracyParams, AccuracyReport};
pub use record::{AccuracyRecord, SourceDetection, SurveyedSummit};
pub use summary::{
    summarize_crossmatch, summarize_sources, CrossmatchSummary, ErrorStats, SourceSummary,
};
