use crate::correction::CorrectionDirective;
use crate::ridge::CombinedRidge;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use summits_core::{Point, SummitCandidate};

/// Index of a candidate inside [`SummitSet::candidates`].
pub type CandidateId = usize;

/// Surveyed (ground-truth) attributes attached to a merged summit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Point,
    #[serde(default)]
    pub elevation: Option<f64>,
    pub col_position: Point,
    #[serde(default)]
    pub col_elevation: Option<f64>,
}

impl GroundTruth {
    /// Actual prominence, when both elevations are known.
    pub fn prominence(&self) -> Option<f64> {
        Some(self.elevation? - self.col_elevation?)
    }
}

/// Canonical summit: detections from several DEMs believed to be one peak.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeGroup {
    /// Stable identifier (`S0001`, ...), used by the `Merge`/`Cross` fields.
    pub id: String,
    pub members: Vec<CandidateId>,
    pub canonical_position: Point,
    /// Candidate whose col is the group's prominence reference.
    pub selected_col: CandidateId,
    pub combined_ridge: CombinedRidge,
    /// `Merge` field: groups whose summits lie within the neighbourhood.
    #[serde(default)]
    pub merge: Vec<String>,
    /// `Cross` field: groups whose cols lie within the neighbourhood.
    #[serde(default)]
    pub cross: Vec<String>,
    #[serde(default)]
    pub notes: String,
    /// Structured correction; takes precedence over a code in `notes`.
    #[serde(default)]
    pub directive: Option<CorrectionDirective>,
    /// Set once the group has been absorbed by a merge directive.
    #[serde(default)]
    pub absorbed_into: Option<String>,
    #[serde(default)]
    pub truth: Option<GroundTruth>,
}

impl MergeGroup {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.absorbed_into.is_none()
    }
}

/// Inconsistency in a summit set, typically from a hand-edited document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    #[error("group {group}: candidate {candidate} out of range ({len} candidates)")]
    CandidateOutOfRange {
        group: String,
        candidate: CandidateId,
        len: usize,
    },
    #[error("duplicate group id '{0}'")]
    DuplicateGroupId(String),
}

/// Candidate arena plus the groups built over it.
///
/// Groups refer to candidates by index and to each other by id; nothing
/// holds a direct reference, so absorbing a group never leaves a dangling
/// link behind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummitSet {
    pub candidates: Vec<SummitCandidate>,
    pub groups: Vec<MergeGroup>,
}

impl SummitSet {
    /// Check that group ids are unique and that every member and selected
    /// col indexes into `candidates`.
    pub fn validate(&self) -> Result<(), SetError> {
        let len = self.candidates.len();
        let mut ids = HashSet::with_capacity(self.groups.len());
        for group in &self.groups {
            if !ids.insert(group.id.as_str()) {
                return Err(SetError::DuplicateGroupId(group.id.clone()));
            }
            let bad = group
                .members
                .iter()
                .chain(std::iter::once(&group.selected_col))
                .find(|&&c| c >= len);
            if let Some(&candidate) = bad {
                return Err(SetError::CandidateOutOfRange {
                    group: group.id.clone(),
                    candidate,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Map from group id to its index in `groups`.
    pub fn index_by_id(&self) -> HashMap<&str, usize> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect()
    }

    pub fn group(&self, id: &str) -> Option<&MergeGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut MergeGroup> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Groups that have not been absorbed into another group.
    pub fn active_groups(&self) -> impl Iterator<Item = &MergeGroup> {
        self.groups.iter().filter(|g| g.is_active())
    }

    pub fn members<'a>(
        &'a self,
        group: &'a MergeGroup,
    ) -> impl Iterator<Item = &'a SummitCandidate> + 'a {
        group.members.iter().map(move |&m| &self.candidates[m])
    }

    /// Candidate providing the group's col.
    pub fn selected_col(&self, group: &MergeGroup) -> &SummitCandidate {
        &self.candidates[group.selected_col]
    }

    /// Mean detector prominence over the group members.
    pub fn mean_prominence(&self, group: &MergeGroup) -> Option<f64> {
        if group.members.is_empty() {
            return None;
        }
        let sum: f64 = self.members(group).map(SummitCandidate::prominence).sum();
        Some(sum / group.members.len() as f64)
    }

    /// `(source_id, elevation, col_elevation)` for every member, in member order.
    pub fn source_elevations(&self, group: &MergeGroup) -> Vec<(String, f64, f64)> {
        self.members(group)
            .map(|c| (c.source_id.clone(), c.elevation, c.col_elevation))
            .collect()
    }

    /// The group a candidate currently belongs to.
    pub fn group_of(&self, candidate: CandidateId) -> Option<&MergeGroup> {
        self.groups.iter().find(|g| g.members.contains(&candidate))
    }
}
