/// A correction code that cannot be read.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("malformed directive '{text}': {reason}")]
    MalformedDirective { text: String, reason: String },
}

use crate::group::SetError;

/// Errors that abort a correction pass.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("group {group} refers to unknown group '{reference}'")]
    UnresolvedReference { group: String, reference: String },
    #[error("cyclic correction: {}", chain.join(" -> "))]
    CyclicMerge { chain: Vec<String> },
    #[error(transparent)]
    InvalidSet(#[from] SetError),
}
