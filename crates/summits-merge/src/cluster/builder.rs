use super::graph::{connected_components, NeighborGraph, PointIndex};
use super::{ClusterParams, LinkMode};
use crate::group::{CandidateId, MergeGroup, SummitSet};
use crate::ridge::aggregate_ridge;
use log::{debug, info};
use std::collections::BTreeSet;
use summits_core::{DistanceError, DistanceModel, Point, SummitCandidate};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error(transparent)]
    Distance(#[from] DistanceError),
    #[error("neighbourhood distance must be finite and non-negative, got {0}")]
    InvalidNeighborhood(f64),
}

/// Groups same-summit detections across DEM layers.
///
/// Two candidates are linked when their summits lie within the neighbourhood
/// distance of each other; a group is a connected component of that graph,
/// so detections can chain through intermediate ones.
#[derive(Clone, Debug)]
pub struct ClusterBuilder {
    params: ClusterParams,
    radius: f64,
}

impl ClusterBuilder {
    /// Validate the parameters and resolve the threshold into map units.
    pub fn new(params: ClusterParams, model: DistanceModel) -> Result<Self, ClusterError> {
        let d = params.neighborhood_distance;
        if !d.is_finite() || d < 0.0 {
            return Err(ClusterError::InvalidNeighborhood(d));
        }
        let radius = model.to_map_units(d, params.unit)?;
        Ok(Self { params, radius })
    }

    #[inline]
    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Neighbourhood distance in coordinate units.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Cluster `candidates` into a fresh [`SummitSet`].
    ///
    /// Every candidate ends up in exactly one group. Groups are ordered by
    /// mean detector prominence, highest first, and named `S0001`, `S0002`, ...
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, candidates), fields(candidates = candidates.len()))
    )]
    pub fn build(&self, candidates: Vec<SummitCandidate>) -> SummitSet {
        let summits = PointIndex::new(candidates.iter().map(|c| c.position).collect());
        let cols: Vec<Point> = candidates.iter().map(|c| c.col_position).collect();
        let col_filter = match self.params.link {
            LinkMode::Summit => None,
            LinkMode::SummitAndCol => Some(cols.as_slice()),
        };
        let graph = NeighborGraph::build(&summits, col_filter, self.radius);
        let mut components = connected_components(&graph);

        let mean_prominence = |members: &[CandidateId]| {
            members
                .iter()
                .map(|&m| candidates[m].prominence())
                .sum::<f64>()
                / members.len() as f64
        };
        components.sort_by(|a, b| {
            mean_prominence(b)
                .total_cmp(&mean_prominence(a))
                .then(a[0].cmp(&b[0]))
        });

        let groups = components
            .into_iter()
            .enumerate()
            .map(|(i, members)| {
                let first = members[0];
                let combined_ridge = aggregate_ridge(&candidates, &members, first, self.radius);
                let group = MergeGroup {
                    id: group_id(i),
                    canonical_position: candidates[first].position,
                    selected_col: first,
                    combined_ridge,
                    members,
                    merge: Vec::new(),
                    cross: Vec::new(),
                    notes: String::new(),
                    directive: None,
                    absorbed_into: None,
                    truth: None,
                };
                debug!(
                    "{}: {} member(s), canonical ({:.6}, {:.6})",
                    group.id,
                    group.members.len(),
                    group.canonical_position.x,
                    group.canonical_position.y
                );
                group
            })
            .collect();

        let mut set = SummitSet { candidates, groups };
        if self.params.suggest_links {
            self.suggest_links(&mut set, &summits, cols);
        }
        info!(
            "clustered {} candidate(s) into {} group(s) (radius {} map units)",
            set.candidates.len(),
            set.groups.len(),
            self.radius
        );
        set
    }

    /// Fill `merge` with groups owning a summit near one of ours and `cross`
    /// with groups owning a col near one of ours.
    fn suggest_links(&self, set: &mut SummitSet, summits: &PointIndex, cols: Vec<Point>) {
        let mut owner = vec![0usize; set.candidates.len()];
        for (g, group) in set.groups.iter().enumerate() {
            for &m in &group.members {
                owner[m] = g;
            }
        }
        let col_index = PointIndex::new(cols);

        let mut merge = vec![BTreeSet::new(); set.groups.len()];
        let mut cross = vec![BTreeSet::new(); set.groups.len()];
        for (i, c) in set.candidates.iter().enumerate() {
            let g = owner[i];
            for j in summits.within(&c.position, self.radius) {
                if owner[j] != g {
                    merge[g].insert(owner[j]);
                }
            }
            for j in col_index.within(&c.col_position, self.radius) {
                if owner[j] != g {
                    cross[g].insert(owner[j]);
                }
            }
        }

        let ids: Vec<String> = set.groups.iter().map(|g| g.id.clone()).collect();
        for (g, group) in set.groups.iter_mut().enumerate() {
            group.merge = merge[g].iter().map(|&o| ids[o].clone()).collect();
            group.cross = cross[g].iter().map(|&o| ids[o].clone()).collect();
        }
    }
}

/// Identifier of the `index`-th group (zero-based).
pub fn group_id(index: usize) -> String {
    format!("S{:04}", index + 1)
}

/// Cluster `candidates` in one call.
pub fn cluster_candidates(
    candidates: Vec<SummitCandidate>,
    params: ClusterParams,
    model: DistanceModel,
) -> Result<SummitSet, ClusterError> {
    Ok(ClusterBuilder::new(params, model)?.build(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use summits_core::LinearUnit;

    fn cand(source: &str, x: f64, y: f64, ele: f64, col: (f64, f64), col_ele: f64) -> SummitCandidate {
        SummitCandidate::from_ridge(
            source,
            vec![Point::new(x, y), Point::new(col.0, col.1)],
            ele,
            col_ele,
        )
        .unwrap()
    }

    fn partition(set: &SummitSet) -> Vec<Vec<CandidateId>> {
        let mut p: Vec<_> = set.groups.iter().map(|g| g.members.clone()).collect();
        p.sort();
        p
    }

    fn degrees(d: f64) -> ClusterBuilder {
        ClusterBuilder::new(
            ClusterParams::new(d, LinearUnit::Degrees),
            DistanceModel::new(LinearUnit::Degrees),
        )
        .unwrap()
    }

    #[test]
    fn threshold_decides_merge() {
        let cands = vec![
            cand("SRTM", 0.0, 0.0, 1000.0, (0.01, 0.0), 900.0),
            cand("ASTER", 0.0, 0.0003, 1005.0, (0.01, 0.0), 900.0),
        ];
        let merged = degrees(0.0005).build(cands.clone());
        assert_eq!(vec![vec![0, 1]], partition(&merged));

        let split = degrees(0.0001).build(cands);
        assert_eq!(vec![vec![0], vec![1]], partition(&split));
    }

    #[test]
    fn canonical_is_first_member() {
        let cands = vec![
            cand("SRTM", 5.0, 5.0, 100.0, (6.0, 5.0), 50.0),
            cand("ASTER", 5.2, 5.0, 120.0, (6.0, 5.0), 50.0),
        ];
        let set = degrees(0.5).build(cands);
        let g = &set.groups[0];
        assert_eq!(Point::new(5.0, 5.0), g.canonical_position);
        assert_eq!(0, g.selected_col);
    }

    #[test]
    fn groups_ordered_by_mean_prominence() {
        let cands = vec![
            cand("SRTM", 0.0, 0.0, 1100.0, (1.0, 0.0), 1000.0),
            cand("SRTM", 10.0, 0.0, 1500.0, (11.0, 0.0), 1000.0),
            cand("SRTM", 20.0, 0.0, 1100.0, (21.0, 0.0), 1000.0),
        ];
        let set = degrees(0.5).build(cands);
        let order: Vec<_> = set
            .groups
            .iter()
            .map(|g| (g.id.as_str(), g.members[0]))
            .collect();
        assert_eq!(vec![("S0001", 1), ("S0002", 0), ("S0003", 2)], order);
    }

    #[test]
    fn suggestions_fill_merge_and_cross() {
        // 0 and 1 share a summit but not a col; 2 shares a col with 0.
        let cands = vec![
            cand("SRTM", 0.0, 0.0, 1000.0, (5.0, 0.0), 800.0),
            cand("ASTER", 0.1, 0.0, 990.0, (0.0, 5.0), 700.0),
            cand("ALOS", 9.0, 0.0, 900.0, (5.1, 0.0), 800.0),
        ];
        let builder = ClusterBuilder::new(
            ClusterParams::new(0.5, LinearUnit::MapUnits).with_link(LinkMode::SummitAndCol),
            DistanceModel::map_units(),
        )
        .unwrap();
        let set = builder.build(cands);
        assert_eq!(3, set.groups.len());
        let by_member = |m: CandidateId| set.group_of(m).unwrap();
        assert_eq!(vec![by_member(1).id.clone()], by_member(0).merge);
        assert_eq!(vec![by_member(2).id.clone()], by_member(0).cross);
        assert_eq!(vec![by_member(0).id.clone()], by_member(2).cross);
        assert!(by_member(2).merge.is_empty());
    }

    #[test]
    fn rejects_bad_threshold_and_units() {
        let model = DistanceModel::new(LinearUnit::Degrees);
        assert_eq!(
            ClusterError::InvalidNeighborhood(-1.0),
            ClusterBuilder::new(ClusterParams::new(-1.0, LinearUnit::Degrees), model).unwrap_err()
        );
        assert!(matches!(
            ClusterBuilder::new(ClusterParams::new(500.0, LinearUnit::Meters), model),
            Err(ClusterError::Distance(_))
        ));
    }

    #[test]
    fn threshold_in_other_linear_unit() {
        let model = DistanceModel::new(LinearUnit::Meters);
        let builder =
            ClusterBuilder::new(ClusterParams::new(0.5, LinearUnit::Kilometers), model).unwrap();
        assert!((builder.radius() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let set = degrees(1.0).build(Vec::new());
        assert!(set.groups.is_empty());
    }
}
