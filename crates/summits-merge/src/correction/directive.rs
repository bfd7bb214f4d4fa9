use super::DirectiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reviewer correction attached to a merge group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", content = "target", rename_all = "snake_case")]
pub enum CorrectionDirective {
    /// Take the selected col of the referenced group.
    ExchangeCol(String),
    /// Absorb this group into the referenced group.
    MergeInto(String),
}

impl CorrectionDirective {
    pub fn target(&self) -> &str {
        match self {
            CorrectionDirective::ExchangeCol(t) | CorrectionDirective::MergeInto(t) => t,
        }
    }

    /// Read the legacy one-letter code at the start of a `Notes` field.
    ///
    /// The first word of the notes must be exactly `x` or `m`
    /// (case-insensitive, optionally followed by `:`, `,` or `;`); anything
    /// else is ordinary free text and yields `Ok(None)`. A code letter
    /// joined to further text, as in `xS0004` or `m-S0004`, is free text too;
    /// only a standalone leading letter counts. The target comes from the
    /// `Merge` field, or for `m` from the `Cross` field when `Merge` is
    /// empty, never from the notes.
    pub fn from_notes(
        notes: &str,
        merge: &[String],
        cross: &[String],
    ) -> Result<Option<Self>, DirectiveError> {
        let code = notes
            .trim()
            .split(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | ';'))
            .next()
            .unwrap_or_default();
        let (directive, target): (fn(String) -> Self, Option<&String>) =
            if code.eq_ignore_ascii_case("x") {
                (CorrectionDirective::ExchangeCol, merge.first())
            } else if code.eq_ignore_ascii_case("m") {
                (
                    CorrectionDirective::MergeInto,
                    merge.first().or_else(|| cross.first()),
                )
            } else {
                return Ok(None);
            };
        match target {
            Some(t) if !t.trim().is_empty() => Ok(Some(directive(t.trim().to_string()))),
            _ => Err(DirectiveError::MalformedDirective {
                text: notes.to_string(),
                reason: "no target in the Merge/Cross field".into(),
            }),
        }
    }
}

impl fmt::Display for CorrectionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionDirective::ExchangeCol(t) => write!(f, "exchange-col {t}"),
            CorrectionDirective::MergeInto(t) => write!(f, "merge-into {t}"),
        }
    }
}

impl FromStr for CorrectionDirective {
    type Err = DirectiveError;

    /// Parse a structured directive: `<code> <target>` where code is one of
    /// `x`, `exchange-col`, `m`, `merge-into`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| DirectiveError::MalformedDirective {
            text: s.to_string(),
            reason: reason.to_string(),
        };
        let mut words = s.split_whitespace();
        let code = words.next().ok_or_else(|| malformed("empty directive"))?;
        let target = words.next().ok_or_else(|| malformed("missing target"))?;
        if words.next().is_some() {
            return Err(malformed("trailing text after target"));
        }
        let code = code.to_ascii_lowercase().replace('_', "-");
        match code.as_str() {
            "x" | "exchange-col" => Ok(CorrectionDirective::ExchangeCol(target.to_string())),
            "m" | "merge-into" => Ok(CorrectionDirective::MergeInto(target.to_string())),
            _ => Err(malformed("unknown code")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn notes_codes() {
        let merge = ids(&["S0004"]);
        let cross = ids(&["S0009"]);
        assert_eq!(
            Some(CorrectionDirective::ExchangeCol("S0004".into())),
            CorrectionDirective::from_notes("x", &merge, &cross).unwrap()
        );
        assert_eq!(
            Some(CorrectionDirective::MergeInto("S0004".into())),
            CorrectionDirective::from_notes("M: same peak", &merge, &cross).unwrap()
        );
        assert_eq!(
            Some(CorrectionDirective::MergeInto("S0009".into())),
            CorrectionDirective::from_notes("m", &[], &cross).unwrap()
        );
    }

    #[test]
    fn free_text_is_not_a_directive() {
        let merge = ids(&["S0004"]);
        for notes in [
            "",
            "check",
            "xenon mine",
            "main summit",
            "  ",
            "ele:2104?",
            "xS0004",
            "m-S0004",
        ] {
            assert_eq!(
                None,
                CorrectionDirective::from_notes(notes, &merge, &[]).unwrap(),
                "{notes:?}"
            );
        }
    }

    #[test]
    fn separated_code_still_reads_target_from_merge_field() {
        let merge = ids(&["S0004"]);
        assert_eq!(
            Some(CorrectionDirective::ExchangeCol("S0004".into())),
            CorrectionDirective::from_notes("x, S0007 has the better col", &merge, &[]).unwrap()
        );
    }

    #[test]
    fn code_without_target_is_malformed() {
        assert!(matches!(
            CorrectionDirective::from_notes("x", &[], &ids(&["S0002"])),
            Err(DirectiveError::MalformedDirective { .. })
        ));
        assert!(CorrectionDirective::from_notes("m", &[], &[]).is_err());
    }

    #[test]
    fn structured_field() {
        assert_eq!(
            CorrectionDirective::MergeInto("S0012".into()),
            "merge_into S0012".parse().unwrap()
        );
        assert_eq!(
            CorrectionDirective::ExchangeCol("S0003".into()),
            "X S0003".parse().unwrap()
        );
        assert!("swap S0003".parse::<CorrectionDirective>().is_err());
        assert!("m".parse::<CorrectionDirective>().is_err());
        assert!("m S1 S2".parse::<CorrectionDirective>().is_err());
    }

    #[test]
    fn serde_shape() {
        let d = CorrectionDirective::ExchangeCol("S0001".into());
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(r#"{"code":"exchange_col","target":"S0001"}"#, json);
        assert_eq!(d, serde_json::from_str(&json).unwrap());
    }
}
