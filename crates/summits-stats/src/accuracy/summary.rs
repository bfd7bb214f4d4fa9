use super::AccuracyRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use summits_core::DemSource;

/// Aggregate of signed errors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub count: usize,
    /// Mean signed error (bias).
    pub mean: f64,
    pub mae: f64,
    pub rmse: f64,
    pub max_abs: f64,
}

impl ErrorStats {
    /// `None` for an empty sequence.
    pub fn from_errors(errors: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let (mut sum, mut abs, mut sq, mut max_abs) = (0.0, 0.0, 0.0, 0.0f64);
        for e in errors {
            count += 1;
            sum += e;
            abs += e.abs();
            sq += e * e;
            max_abs = max_abs.max(e.abs());
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self {
            count,
            mean: sum / n,
            mae: abs / n,
            rmse: (sq / n).sqrt(),
            max_abs,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: DemSource,
    pub records: usize,
    /// Summit position errors (all non-negative, so `mean` is the mean error).
    pub position: Option<ErrorStats>,
    pub col_position: Option<ErrorStats>,
    /// Reported minus surveyed elevation.
    pub elevation_reported: Option<ErrorStats>,
    /// DEM sample at the surveyed position minus surveyed elevation.
    pub elevation_sampled: Option<ErrorStats>,
    /// DEM prominence at the surveyed positions minus surveyed prominence.
    pub prominence_sampled: Option<ErrorStats>,
    pub out_of_coverage: usize,
    pub raster_missing: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossmatchSummary {
    pub summits: usize,
    /// Best-guess minus surveyed elevation, one value per summit.
    pub elevation: Option<ErrorStats>,
    /// How often each DEM provided the best guess.
    pub picks: BTreeMap<DemSource, usize>,
}

/// Per-DEM summaries in DEM order.
pub fn summarize_sources(records: &[AccuracyRecord]) -> Vec<SourceSummary> {
    let mut by_source: BTreeMap<DemSource, Vec<&AccuracyRecord>> = BTreeMap::new();
    for r in records {
        by_source.entry(r.source).or_default().push(r);
    }
    by_source
        .into_iter()
        .map(|(source, rs)| SourceSummary {
            source,
            records: rs.len(),
            position: ErrorStats::from_errors(rs.iter().map(|r| r.position_error)),
            col_position: ErrorStats::from_errors(rs.iter().filter_map(|r| r.col_position_error)),
            elevation_reported: ErrorStats::from_errors(
                rs.iter().map(|r| r.elevation_reported - r.elevation_actual),
            ),
            elevation_sampled: ErrorStats::from_errors(rs.iter().filter_map(|r| {
                r.elevation_sampled_at_actual_position
                    .map(|z| z - r.elevation_actual)
            })),
            prominence_sampled: ErrorStats::from_errors(rs.iter().filter_map(|r| {
                let actual = r.elevation_actual - r.col_elevation_actual?;
                Some(r.prominence_sampled_at_actual_position? - actual)
            })),
            out_of_coverage: rs.iter().filter(|r| r.out_of_coverage).count(),
            raster_missing: rs.iter().filter(|r| r.raster_missing).count(),
        })
        .collect()
}

/// Best-guess statistics, counting each summit once.
pub fn summarize_crossmatch(records: &[AccuracyRecord]) -> CrossmatchSummary {
    let mut per_summit: BTreeMap<&str, &AccuracyRecord> = BTreeMap::new();
    for r in records {
        per_summit.entry(r.summit.as_str()).or_insert(r);
    }
    let mut summary = CrossmatchSummary {
        summits: per_summit.len(),
        ..Default::default()
    };
    let mut errors = Vec::new();
    for r in per_summit.values() {
        if let (Some(guess), Some(source)) = (r.elevation_crossmatch_best_guess, r.crossmatch_source)
        {
            errors.push(guess - r.elevation_actual);
            *summary.picks.entry(source).or_default() += 1;
        }
    }
    summary.elevation = ErrorStats::from_errors(errors);
    summary
}
