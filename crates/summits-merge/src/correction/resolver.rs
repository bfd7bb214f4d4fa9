use super::{CorrectionDirective, CorrectionError, DirectiveError};
use crate::group::{MergeGroup, SummitSet};
use crate::ridge::RidgeOrigin;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One directive that changed the set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCorrection {
    pub group: String,
    pub directive: CorrectionDirective,
    /// Group the directive finally resolved to after following chains.
    pub resolved_to: String,
}

/// Notes that started like a correction code but could not be used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedNote {
    pub group: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub exchanged: Vec<AppliedCorrection>,
    pub absorbed: Vec<AppliedCorrection>,
    pub malformed: Vec<MalformedNote>,
    /// Iterations the fixed-point resolution needed.
    pub passes: usize,
}

/// Directive of a group: the structured field wins over a code in the notes.
pub fn group_directive(group: &MergeGroup) -> Result<Option<CorrectionDirective>, DirectiveError> {
    match &group.directive {
        Some(d) => Ok(Some(d.clone())),
        None => CorrectionDirective::from_notes(&group.notes, &group.merge, &group.cross),
    }
}

/// Apply every reviewer directive of the active groups.
///
/// Chains (`A -> B -> C`) resolve to their final root. References are
/// checked and cycles detected before anything is changed, so on error the
/// set is left untouched. Malformed codes are skipped and reported.
///
/// `ExchangeCol` replaces the group's selected col with the root's col and
/// appends the donor's ridge; `MergeInto` moves members and ridge parts into
/// the root and marks the group as absorbed. The root keeps its selected col.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(set), fields(groups = set.groups.len()))
)]
pub fn resolve_corrections(set: &mut SummitSet) -> Result<CorrectionReport, CorrectionError> {
    set.validate()?;
    let n = set.groups.len();
    let index: HashMap<String, usize> = set
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| (g.id.clone(), i))
        .collect();

    let mut report = CorrectionReport::default();
    let mut directives: Vec<Option<CorrectionDirective>> = vec![None; n];
    let mut exchange_links = vec![None; n];
    let mut merge_links = vec![None; n];

    for (i, group) in set.groups.iter().enumerate() {
        if !group.is_active() {
            continue;
        }
        let directive = match group_directive(group) {
            Ok(Some(d)) => d,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}: {e}", group.id);
                report.malformed.push(MalformedNote {
                    group: group.id.clone(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        let target = live_target(set, &index, &group.id, directive.target())?;
        match directive {
            CorrectionDirective::ExchangeCol(_) => exchange_links[i] = Some(target),
            CorrectionDirective::MergeInto(_) => merge_links[i] = Some(target),
        }
        directives[i] = Some(directive);
    }

    let cyclic = |chain: Vec<usize>| CorrectionError::CyclicMerge {
        chain: chain.into_iter().map(|i| set.groups[i].id.clone()).collect(),
    };
    let (exchange_roots, p1) = resolve_links(&exchange_links).map_err(cyclic)?;
    let (merge_roots, p2) = resolve_links(&merge_links).map_err(cyclic)?;
    report.passes = p1.max(p2);

    let original_cols: Vec<_> = set.groups.iter().map(|g| g.selected_col).collect();
    for i in 0..n {
        let root = exchange_roots[i];
        if exchange_links[i].is_none() {
            continue;
        }
        let donor = original_cols[root];
        if set.groups[i].selected_col != donor {
            debug!(
                "{}: col from candidate {} via {}",
                set.groups[i].id, donor, set.groups[root].id
            );
            let col = &set.candidates[donor];
            let group = &mut set.groups[i];
            group.selected_col = donor;
            group
                .combined_ridge
                .set_representative(group.canonical_position, col.col_position);
            group.combined_ridge.push(
                RidgeOrigin::LinkedCol { candidate: donor },
                col.ridge_line.clone(),
            );
        }
        if let Some(d) = directives[i].clone() {
            report.exchanged.push(AppliedCorrection {
                group: set.groups[i].id.clone(),
                directive: d,
                resolved_to: set.groups[root].id.clone(),
            });
        }
    }

    for i in 0..n {
        let root = merge_roots[i];
        if merge_links[i].is_none() {
            continue;
        }
        let root_id = set.groups[root].id.clone();
        let absorbed = &mut set.groups[i];
        let members = std::mem::take(&mut absorbed.members);
        let ridge = std::mem::take(&mut absorbed.combined_ridge);
        absorbed.absorbed_into = Some(root_id.clone());
        debug!("{} absorbed into {root_id}", absorbed.id);
        let group_id = absorbed.id.clone();

        let target = &mut set.groups[root];
        target.members.extend(members);
        target.members.sort_unstable();
        target.combined_ridge.absorb(ridge);

        if let Some(d) = directives[i].clone() {
            report.absorbed.push(AppliedCorrection {
                group: group_id,
                directive: d,
                resolved_to: root_id,
            });
        }
    }

    info!(
        "corrections: {} col exchange(s), {} merge(s), {} malformed",
        report.exchanged.len(),
        report.absorbed.len(),
        report.malformed.len()
    );
    Ok(report)
}

/// Index of the group `reference` names, following earlier absorptions.
fn live_target(
    set: &SummitSet,
    index: &HashMap<String, usize>,
    from: &str,
    reference: &str,
) -> Result<usize, CorrectionError> {
    let unresolved = |reference: &str| CorrectionError::UnresolvedReference {
        group: from.to_string(),
        reference: reference.to_string(),
    };
    let mut at = *index.get(reference).ok_or_else(|| unresolved(reference))?;
    let mut chain = vec![at];
    while let Some(next) = &set.groups[at].absorbed_into {
        at = *index.get(next.as_str()).ok_or_else(|| unresolved(next.as_str()))?;
        if chain.contains(&at) {
            chain.push(at);
            return Err(CorrectionError::CyclicMerge {
                chain: chain.into_iter().map(|i| set.groups[i].id.clone()).collect(),
            });
        }
        chain.push(at);
    }
    Ok(at)
}

/// Follow `links` to their roots by repeated pointer jumping.
///
/// Returns the root of every node and the number of passes, or the chain of
/// indices of a cycle. Passes are bounded by the node count.
fn resolve_links(links: &[Option<usize>]) -> Result<(Vec<usize>, usize), Vec<usize>> {
    let n = links.len();
    let mut root: Vec<usize> = links
        .iter()
        .enumerate()
        .map(|(i, l)| l.unwrap_or(i))
        .collect();

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for i in 0..n {
            let next = root[root[i]];
            if next != root[i] {
                root[i] = next;
                changed = true;
            }
        }
        if !changed || passes > n {
            break;
        }
    }

    match (0..n).find(|&i| links[root[i]].is_some()) {
        Some(start) => Err(cycle_chain(links, start)),
        None => Ok((root, passes)),
    }
}

fn cycle_chain(links: &[Option<usize>], start: usize) -> Vec<usize> {
    let mut chain = vec![start];
    let mut at = start;
    while let Some(next) = links[at] {
        let seen = chain.contains(&next);
        chain.push(next);
        if seen {
            break;
        }
        at = next;
    }
    chain
}
