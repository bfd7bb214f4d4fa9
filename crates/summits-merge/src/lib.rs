//! Reconcile summit detections from several DEMs into canonical summits.
//!
//! Pipeline:
//! 1. [`collect_layers`] gathers per-DEM detection layers in a fixed order.
//! 2. [`ClusterBuilder`] links detections closer than a neighbourhood
//!    distance and turns each connected component into a [`MergeGroup`],
//!    with a multi-part [`CombinedRidge`] and `Merge`/`Cross` review hints.
//! 3. [`resolve_corrections`] applies reviewer codes (exchange col, merge
//!    into) to the resulting [`SummitSet`].
//! 4. [`match_references`] attaches surveyed ground truth.
//!
//! ## Quickstart
//!
//! ```
//! use summits_core::{DistanceModel, LinearUnit, Point, SummitCandidate};
//! use summits_merge::{ClusterBuilder, ClusterParams};
//!
//! let ridge = |x: f64, y: f64| vec![Point::new(x, y), Point::new(x + 0.01, y)];
//! let candidates = vec![
//!     SummitCandidate::from_ridge("SRTM", ridge(0.0, 0.0), 1500.0, 1200.0).unwrap(),
//!     SummitCandidate::from_ridge("ASTER", ridge(0.0, 0.0003), 1496.0, 1205.0).unwrap(),
//! ];
//! let builder = ClusterBuilder::new(
//!     ClusterParams::new(0.0005, LinearUnit::Degrees),
//!     DistanceModel::new(LinearUnit::Degrees),
//! )?;
//! let set = builder.build(candidates);
//! assert_eq!(1, set.groups.len());
//! assert_eq!("S0001", set.groups[0].id);
//! # Ok::<(), summits_merge::ClusterError>(())
//! ```

mod cluster;
mod correction;
mod group;
pub mod io;
mod layers;
mod reference;
mod ridge;

pub use cluster::{
    cluster_candidates, group_id, ClusterBuilder, ClusterError, ClusterParams, LinkMode,
};
pub use correction::{
    group_directive, resolve_corrections, AppliedCorrection, CorrectionDirective,
    CorrectionError, CorrectionReport, DirectiveError, MalformedNote,
};
pub use group::{CandidateId, GroundTruth, MergeGroup, SetError, SummitSet};
pub use layers::{collect_layers, CollectedLayers, LayerError};
pub use reference::{
    apply_manual_matches, match_references, ReferenceMatch, ReferenceMatchParams,
    ReferenceMatchReport, ReferenceSummit, RemainingReference,
};
pub use ridge::{aggregate_ridge, CombinedRidge, RidgeOrigin, RidgePart};
