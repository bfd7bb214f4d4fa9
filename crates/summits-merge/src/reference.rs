//! Attaching surveyed reference summits (ground truth) to merge groups.

use crate::cluster::graph::PointIndex;
use crate::group::{GroundTruth, MergeGroup, SummitSet};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use summits_core::{DistanceError, DistanceModel, LinearUnit, Point};

fn ok_action() -> String {
    "ok".to_string()
}

/// One entry of a surveyed summit list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSummit {
    /// Reference code, e.g. `YO/EC-012`.
    pub reference: String,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Point,
    pub col_position: Point,
    /// Surveyed summit elevation; free text when uncertain.
    #[serde(default)]
    pub check_elevation: Option<String>,
    #[serde(default)]
    pub check_col: Option<String>,
    /// `ok`, `delete`, `switch`, `move`, or any reviewer remark.
    #[serde(default = "ok_action")]
    pub action: String,
    /// Group id filled in by hand for references that did not match.
    #[serde(default)]
    pub match_id: Option<String>,
}

impl ReferenceSummit {
    fn is_deleted(&self) -> bool {
        self.action == "delete"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMatchParams {
    /// Search radius around a group summit.
    pub summit_tolerance: f64,
    /// Search radius around a group's selected col.
    pub col_tolerance: f64,
    #[serde(default = "map_units")]
    pub unit: LinearUnit,
}

fn map_units() -> LinearUnit {
    LinearUnit::MapUnits
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMatch {
    pub group: String,
    pub reference: String,
}

/// A reference no group took, with the group whose summit alone matched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemainingReference {
    /// Position in the input list.
    pub index: usize,
    pub reference: ReferenceSummit,
    pub candidate: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMatchReport {
    pub matched: Vec<ReferenceMatch>,
    pub remainder: Vec<RemainingReference>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Automatic,
    Manual,
}

/// Match active groups against reference summits by proximity.
///
/// A group matches the reference summit nearest to its canonical position
/// within `summit_tolerance`, provided that the same reference's col is also
/// the nearest reference col to the group's selected col within
/// `col_tolerance`. References marked `delete` take no part; `switch`
/// references lend their attributes but stay in the remainder.
pub fn match_references(
    set: &mut SummitSet,
    references: &[ReferenceSummit],
    model: &DistanceModel,
    params: &ReferenceMatchParams,
) -> Result<ReferenceMatchReport, DistanceError> {
    let summit_radius = model.to_map_units(params.summit_tolerance, params.unit)?;
    let col_radius = model.to_map_units(params.col_tolerance, params.unit)?;

    let live: Vec<usize> = (0..references.len())
        .filter(|&i| !references[i].is_deleted())
        .collect();
    let summits = PointIndex::new(live.iter().map(|&i| references[i].position).collect());
    let cols = PointIndex::new(live.iter().map(|&i| references[i].col_position).collect());

    let mut report = ReferenceMatchReport::default();
    let mut taken = vec![false; live.len()];
    let mut candidate: HashMap<usize, String> = HashMap::new();

    for g in 0..set.groups.len() {
        if !set.groups[g].is_active() {
            continue;
        }
        let summit = set.groups[g].canonical_position;
        let col = set.selected_col(&set.groups[g]).col_position;
        let Some(k) = summits.nearest_within(&summit, summit_radius) else {
            continue;
        };
        if cols.nearest_within(&col, col_radius) != Some(k) {
            candidate.insert(k, set.groups[g].id.clone());
            continue;
        }
        let rf = &references[live[k]];
        let switch = rf.action.contains("switch");
        if !switch {
            taken[k] = true;
        }
        let group = &mut set.groups[g];
        apply_reference(group, col, rf, Mode::Automatic);
        debug!("{} matched {}", group.id, rf.reference);
        if !switch {
            report.matched.push(ReferenceMatch {
                group: group.id.clone(),
                reference: rf.reference.clone(),
            });
        }
    }

    for (k, &i) in live.iter().enumerate() {
        if taken[k] {
            continue;
        }
        report.remainder.push(RemainingReference {
            index: i,
            reference: references[i].clone(),
            candidate: candidate.remove(&k),
        });
    }
    info!(
        "reference matching: {} matched, {} remaining",
        report.matched.len(),
        report.remainder.len()
    );
    Ok(report)
}

/// Apply references whose `match_id` was filled in by a reviewer.
///
/// Returns the number of groups updated. A `move` action keeps the
/// reference code off the group; ids naming no active group are reported
/// with a warning.
pub fn apply_manual_matches(set: &mut SummitSet, references: &[ReferenceSummit]) -> usize {
    let mut by_id: HashMap<&str, &ReferenceSummit> = HashMap::new();
    for rf in references {
        if let Some(id) = rf.match_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            by_id.insert(id, rf);
        }
    }

    let mut applied = 0;
    for g in 0..set.groups.len() {
        if !set.groups[g].is_active() {
            continue;
        }
        let Some(rf) = by_id.remove(set.groups[g].id.as_str()) else {
            continue;
        };
        let col = set.selected_col(&set.groups[g]).col_position;
        apply_reference(&mut set.groups[g], col, rf, Mode::Manual);
        applied += 1;
    }
    let mut unknown: Vec<_> = by_id.into_keys().collect();
    unknown.sort_unstable();
    for id in unknown {
        warn!("manual match names unknown group '{id}'");
    }
    applied
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

fn apply_reference(group: &mut MergeGroup, col: Point, rf: &ReferenceSummit, mode: Mode) {
    let keep_code = match mode {
        Mode::Automatic => !rf.action.contains("switch"),
        Mode::Manual => !rf.action.contains("move"),
    };
    let quiet = match mode {
        Mode::Automatic => rf.action == "ok",
        Mode::Manual => rf.action == "ok" || rf.action == "move",
    };

    let canonical = group.canonical_position;
    let truth = group.truth.get_or_insert_with(|| GroundTruth {
        reference: None,
        name: None,
        position: canonical,
        elevation: None,
        col_position: col,
        col_elevation: None,
    });
    let mut notes = Vec::new();
    if keep_code {
        truth.reference = Some(rf.reference.clone());
        if !quiet {
            notes.push(rf.action.clone());
        }
    }
    if truth.name.is_none() {
        truth.name.clone_from(&rf.name);
    }

    if truth.elevation.is_none() {
        if let Some(check) = rf.check_elevation.as_deref().map(str::trim) {
            if is_number(check) {
                truth.elevation = check.parse().ok();
                truth.position = rf.position;
            } else if !check.is_empty() {
                notes.push(format!("ele:{check}"));
            }
            if mode == Mode::Manual && !check.is_empty() {
                truth.position = rf.position;
            }
        }
    }
    if truth.col_elevation.is_none() {
        if let Some(check) = rf.check_col.as_deref().map(str::trim) {
            if is_number(check) {
                truth.col_elevation = check.parse().ok();
                truth.col_position = rf.col_position;
            } else if !check.is_empty() {
                notes.push(format!("col:{check}"));
            }
            if mode == Mode::Manual && !check.is_empty() {
                truth.col_position = rf.col_position;
            }
        }
    }

    if !notes.is_empty() {
        let extra = notes.join("; ");
        if group.notes.trim().is_empty() {
            group.notes = extra;
        } else {
            group.notes = format!("{}; {extra}", group.notes);
        }
    }
}
