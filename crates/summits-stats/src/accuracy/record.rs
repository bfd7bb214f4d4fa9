use serde::{Deserialize, Serialize};
use summits_core::{DemSource, Point};
use summits_merge::{MergeGroup, SummitSet};

/// One DEM's detection of a surveyed summit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDetection {
    /// Name carrying the DEM token, e.g. a layer or field name.
    pub source_name: String,
    /// Detected ridge, summit first and col last.
    pub ridge: Vec<Point>,
    /// Elevation reported by the detector.
    pub elevation: f64,
    pub col_elevation: f64,
}

impl SourceDetection {
    pub fn position(&self) -> Option<Point> {
        self.ridge.first().copied()
    }

    pub fn col_position(&self) -> Option<Point> {
        if self.ridge.len() < 2 {
            return None;
        }
        self.ridge.last().copied()
    }

    pub fn source(&self) -> Option<DemSource> {
        DemSource::recognize(&self.source_name)
    }
}

/// A summit with surveyed attributes and its per-DEM detections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyedSummit {
    pub id: String,
    pub position: Point,
    pub elevation: f64,
    pub col_position: Point,
    #[serde(default)]
    pub col_elevation: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub detections: Vec<SourceDetection>,
}

impl SurveyedSummit {
    /// Build from a resolved group; `None` without a surveyed elevation.
    pub fn from_group(set: &SummitSet, group: &MergeGroup) -> Option<Self> {
        let truth = group.truth.as_ref()?;
        let elevation = truth.elevation?;
        let detections = set
            .members(group)
            .map(|c| SourceDetection {
                source_name: c.source_id.clone(),
                ridge: c.ridge_line.clone(),
                elevation: c.elevation,
                col_elevation: c.col_elevation,
            })
            .collect();
        Some(Self {
            id: group.id.clone(),
            position: truth.position,
            elevation,
            col_position: truth.col_position,
            col_elevation: truth.col_elevation,
            notes: group.notes.clone(),
            detections,
        })
    }

    /// Every active group carrying a surveyed elevation.
    pub fn collect(set: &SummitSet) -> Vec<Self> {
        set.active_groups()
            .filter_map(|g| Self::from_group(set, g))
            .collect()
    }

    pub fn prominence(&self) -> Option<f64> {
        Some(self.elevation - self.col_elevation?)
    }
}

/// Comparison of one DEM's detection against a surveyed summit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    pub summit: String,
    pub source: DemSource,
    /// Distance between surveyed and detected summit.
    pub position_error: f64,
    /// Distance between surveyed and detected col.
    pub col_position_error: Option<f64>,
    pub elevation_actual: f64,
    pub col_elevation_actual: Option<f64>,
    /// DEM sample at the surveyed summit position.
    pub elevation_sampled_at_actual_position: Option<f64>,
    pub col_elevation_sampled_at_actual_position: Option<f64>,
    /// DEM prominence between the surveyed summit and col positions.
    pub prominence_sampled_at_actual_position: Option<f64>,
    /// DEM sample at the detected summit position.
    pub elevation_detected: Option<f64>,
    pub elevation_reported: f64,
    pub prominence_reported: f64,
    /// Reported elevation of the closest detection among all DEMs.
    pub elevation_crossmatch_best_guess: Option<f64>,
    pub crossmatch_source: Option<DemSource>,
    /// No raster was supplied for this DEM.
    pub raster_missing: bool,
    /// A raster was supplied but one of the samples fell outside it.
    pub out_of_coverage: bool,
}
