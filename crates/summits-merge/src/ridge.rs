//! Multi-part ridge geometry of a merged summit.
//!
//! Parts are kept separate and tagged with where they came from, so a
//! reviewer can tell which DEM contributed which line. Overlapping parts
//! are never deduplicated.

use crate::group::CandidateId;
use serde::{Deserialize, Serialize};
use summits_core::{Point, SummitCandidate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RidgeOrigin {
    /// Canonical summit → selected col.
    Representative,
    /// Ridge line as detected for one member.
    Member { candidate: CandidateId },
    /// Segment joining the selected col to a separately detected member col.
    ColLink { from: CandidateId, to: CandidateId },
    /// Ridge of the candidate whose col was taken over by an exchange.
    LinkedCol { candidate: CandidateId },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RidgePart {
    pub origin: RidgeOrigin,
    pub line: Vec<Point>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedRidge {
    pub parts: Vec<RidgePart>,
}

impl CombinedRidge {
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, origin: RidgeOrigin, line: Vec<Point>) {
        self.parts.push(RidgePart { origin, line });
    }

    /// Replace (or insert first) the representative segment.
    pub fn set_representative(&mut self, summit: Point, col: Point) {
        let line = vec![summit, col];
        match self
            .parts
            .iter_mut()
            .find(|p| p.origin == RidgeOrigin::Representative)
        {
            Some(part) => part.line = line,
            None => self.parts.insert(
                0,
                RidgePart {
                    origin: RidgeOrigin::Representative,
                    line,
                },
            ),
        }
    }

    pub fn representative(&self) -> Option<&RidgePart> {
        self.parts
            .iter()
            .find(|p| p.origin == RidgeOrigin::Representative)
    }

    /// Detected member ridges, in member order.
    pub fn member_parts(&self) -> impl Iterator<Item = (CandidateId, &[Point])> {
        self.parts.iter().filter_map(|p| match p.origin {
            RidgeOrigin::Member { candidate } => Some((candidate, p.line.as_slice())),
            _ => None,
        })
    }

    /// Union with the parts of an absorbed group.
    pub fn absorb(&mut self, other: CombinedRidge) {
        self.parts.extend(other.parts);
    }
}

/// Build the combined ridge of a freshly clustered group.
///
/// The result holds the representative segment, every member ridge in
/// member order, and a [`RidgeOrigin::ColLink`] for each member col that
/// differs from the selected col but lies within `col_link_radius`
/// (map units) of it.
pub fn aggregate_ridge(
    candidates: &[SummitCandidate],
    members: &[CandidateId],
    selected_col: CandidateId,
    col_link_radius: f64,
) -> CombinedRidge {
    let mut ridge = CombinedRidge::default();
    let Some(&first) = members.first() else {
        return ridge;
    };
    let col = candidates[selected_col].col_position;
    ridge.set_representative(candidates[first].position, col);

    for &m in members {
        ridge.push(
            RidgeOrigin::Member { candidate: m },
            candidates[m].ridge_line.clone(),
        );
    }

    for &m in members {
        let other = candidates[m].col_position;
        if m == selected_col || other == col {
            continue;
        }
        if nalgebra::distance(&col, &other) <= col_link_radius {
            ridge.push(
                RidgeOrigin::ColLink {
                    from: selected_col,
                    to: m,
                },
                vec![col, other],
            );
        }
    }

    ridge
}
