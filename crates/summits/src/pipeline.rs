use crate::{core, merge, stats};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the end-to-end helpers.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    MergeIo(#[from] merge::io::MergeIoError),

    #[error(transparent)]
    StatsIo(#[from] stats::StatsIoError),

    #[error(transparent)]
    Correction(#[from] merge::CorrectionError),

    #[error(transparent)]
    Distance(#[from] core::DistanceError),

    #[error(transparent)]
    Prominence(#[from] stats::ProminenceError),
}

/// Outcome of matching a summit set against a reference list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub automatic: merge::ReferenceMatchReport,
    /// Groups updated from reviewer-filled `match_id` fields.
    pub manual: usize,
}

/// Apply correction directives to a merge report in place.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(report), fields(groups = report.set.groups.len()))
)]
pub fn resolve(
    report: &mut merge::io::MergeReport,
) -> Result<merge::CorrectionReport, PipelineError> {
    Ok(merge::resolve_corrections(&mut report.set)?)
}

/// Automatic proximity matching followed by reviewer-filled matches.
pub fn match_all(
    set: &mut merge::SummitSet,
    references: &[merge::ReferenceSummit],
    model: &core::DistanceModel,
    params: &merge::ReferenceMatchParams,
) -> Result<MatchOutcome, PipelineError> {
    let automatic = merge::match_references(set, references, model, params)?;
    let manual = merge::apply_manual_matches(set, references);
    Ok(MatchOutcome { automatic, manual })
}

/// Per-DEM prominence of every active group.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(set, dems), fields(dems = dems.len()))
)]
pub fn prominence_table(
    set: &merge::SummitSet,
    dems: &[stats::LoadedDem],
    sample_at: stats::SampleAt,
    interpolation: core::Interpolation,
) -> Result<stats::ProminenceTable, PipelineError> {
    let rasters = dems
        .iter()
        .map(|d| (d.source, &d.grid as &dyn core::ElevationSampler))
        .collect();
    let calculator = stats::ProminenceCalculator::new(rasters)?
        .with_sample_at(sample_at)
        .with_interpolation(interpolation);
    Ok(calculator.run(set))
}

/// Accuracy of every DEM's detections against the surveyed groups of `set`.
pub fn accuracy_report(
    set: &merge::SummitSet,
    dems: &[stats::LoadedDem],
    model: core::DistanceModel,
    params: stats::AccuracyParams,
) -> Result<stats::AccuracyReport, PipelineError> {
    let surveyed = stats::SurveyedSummit::collect(set);
    let engine = dems
        .iter()
        .fold(stats::AccuracyEngine::new(model, params), |engine, d| {
            engine.with_raster(d.source, &d.grid)
        });
    Ok(engine.run(&surveyed)?)
}
