//! Reviewer corrections: col exchange and group absorption.

mod directive;
mod error;
mod resolver;

pub use directive::CorrectionDirective;
pub use error::{CorrectionError, DirectiveError};
pub use resolver::{
    group_directive, resolve_corrections, AppliedCorrection, CorrectionReport, MalformedNote,
};
