use super::summary::{summarize_crossmatch, summarize_sources, CrossmatchSummary, SourceSummary};
use super::{AccuracyRecord, SourceDetection, SurveyedSummit};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use summits_core::{
    DemSource, DistanceError, DistanceModel, ElevationSampler, Interpolation, LinearUnit, Point,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

fn default_skip_notes() -> Vec<String> {
    vec!["check".to_string()]
}

fn map_units() -> LinearUnit {
    LinearUnit::MapUnits
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccuracyParams {
    /// Unit of all reported distances.
    #[serde(default = "map_units")]
    pub unit: LinearUnit,
    /// Summits whose notes equal one of these (case-insensitive) are left out.
    #[serde(default = "default_skip_notes")]
    pub skip_notes: Vec<String>,
    /// Raster sampling mode for every sampled elevation.
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl Default for AccuracyParams {
    fn default() -> Self {
        Self {
            unit: LinearUnit::MapUnits,
            skip_notes: default_skip_notes(),
            interpolation: Interpolation::Nearest,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub records: Vec<AccuracyRecord>,
    pub summaries: Vec<SourceSummary>,
    pub crossmatch: CrossmatchSummary,
    /// Summits skipped because of their notes.
    pub skipped: usize,
    /// Source names without a recognised DEM token.
    pub unrecognized_sources: Vec<String>,
}

/// Compares per-DEM detections against surveyed summits.
pub struct AccuracyEngine<'a> {
    model: DistanceModel,
    params: AccuracyParams,
    rasters: BTreeMap<DemSource, &'a dyn ElevationSampler>,
}

struct Scored<'s> {
    index: usize,
    source: DemSource,
    detection: &'s SourceDetection,
    position: Point,
    position_error: f64,
    col_position_error: Option<f64>,
}

impl<'a> AccuracyEngine<'a> {
    pub fn new(model: DistanceModel, params: AccuracyParams) -> Self {
        Self {
            model,
            params,
            rasters: BTreeMap::new(),
        }
    }

    /// Register the raster of one DEM; a later call replaces an earlier one.
    pub fn with_raster(mut self, source: DemSource, dem: &'a dyn ElevationSampler) -> Self {
        self.rasters.insert(source, dem);
        self
    }

    fn skipped(&self, summit: &SurveyedSummit) -> bool {
        let notes = summit.notes.trim();
        self.params
            .skip_notes
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(notes))
    }

    /// Records for every (summit, recognised DEM) pair, plus summaries.
    ///
    /// Unrecognised source names are skipped with a warning; only a unit the
    /// distance model cannot express is an error.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, summits), fields(summits = summits.len()))
    )]
    pub fn run(&self, summits: &[SurveyedSummit]) -> Result<AccuracyReport, DistanceError> {
        let unit = self.params.unit;
        let mut report = AccuracyReport::default();
        let mut unrecognized = BTreeSet::new();

        for summit in summits {
            if self.skipped(summit) {
                debug!("{}: skipped ({})", summit.id, summit.notes.trim());
                report.skipped += 1;
                continue;
            }

            let mut scored = Vec::new();
            for (index, detection) in summit.detections.iter().enumerate() {
                let Some(source) = detection.source() else {
                    if unrecognized.insert(detection.source_name.clone()) {
                        warn!(
                            "no DEM token in source '{}', skipped",
                            detection.source_name
                        );
                    }
                    continue;
                };
                let Some(position) = detection.position() else {
                    warn!("{}: empty {} ridge, skipped", summit.id, source);
                    continue;
                };
                let col_position_error = match detection.col_position() {
                    Some(col) => Some(self.model.distance(&summit.col_position, &col, unit)?),
                    None => None,
                };
                scored.push(Scored {
                    index,
                    source,
                    detection,
                    position,
                    position_error: self.model.distance(&summit.position, &position, unit)?,
                    col_position_error,
                });
            }

            let best = best_guess(&scored, summit.elevation);
            for s in &scored {
                report.records.push(self.record(summit, s, best));
            }
        }

        report.unrecognized_sources = unrecognized.into_iter().collect();
        report.summaries = summarize_sources(&report.records);
        report.crossmatch = summarize_crossmatch(&report.records);
        info!(
            "accuracy: {} record(s), {} skipped summit(s), {} unrecognised source(s)",
            report.records.len(),
            report.skipped,
            report.unrecognized_sources.len()
        );
        Ok(report)
    }

    fn record(
        &self,
        summit: &SurveyedSummit,
        s: &Scored<'_>,
        best: Option<&Scored<'_>>,
    ) -> AccuracyRecord {
        let dem = self.rasters.get(&s.source).copied();
        let mode = self.params.interpolation;
        let sample = |p: &Point| dem.and_then(|d| d.sample_with(p, mode));

        let elevation_sampled_at_actual_position = sample(&summit.position);
        let col_elevation_sampled_at_actual_position = sample(&summit.col_position);
        let elevation_detected = sample(&s.position);
        let prominence_sampled_at_actual_position = elevation_sampled_at_actual_position
            .zip(col_elevation_sampled_at_actual_position)
            .map(|(z, c)| z - c);

        let out_of_coverage = dem.is_some()
            && (elevation_sampled_at_actual_position.is_none()
                || col_elevation_sampled_at_actual_position.is_none()
                || elevation_detected.is_none());

        AccuracyRecord {
            summit: summit.id.clone(),
            source: s.source,
            position_error: s.position_error,
            col_position_error: s.col_position_error,
            elevation_actual: summit.elevation,
            col_elevation_actual: summit.col_elevation,
            elevation_sampled_at_actual_position,
            col_elevation_sampled_at_actual_position,
            prominence_sampled_at_actual_position,
            elevation_detected,
            elevation_reported: s.detection.elevation,
            prominence_reported: s.detection.elevation - s.detection.col_elevation,
            elevation_crossmatch_best_guess: best.map(|b| b.detection.elevation),
            crossmatch_source: best.map(|b| b.source),
            raster_missing: dem.is_none(),
            out_of_coverage,
        }
    }
}

/// Smallest position error, then closest reported elevation, then DEM
/// order, then input order.
fn best_guess<'s, 'd>(scored: &'s [Scored<'d>], actual: f64) -> Option<&'s Scored<'d>> {
    scored.iter().min_by(|a, b| {
        a.position_error
            .total_cmp(&b.position_error)
            .then_with(|| {
                (a.detection.elevation - actual)
                    .abs()
                    .total_cmp(&(b.detection.elevation - actual).abs())
            })
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.index.cmp(&b.index))
    })
}
