use serde::{Deserialize, Serialize};
use std::fmt;

/// DEM products the toolkit knows how to attribute detections to.
///
/// The declaration order is the canonical output order: candidates, ridge
/// parts and report columns are always listed SRTM first, GLO30 last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DemSource {
    Srtm,
    Aster,
    Alos,
    Tdx,
    Glo30,
}

impl DemSource {
    pub const ALL: [DemSource; 5] = [
        DemSource::Srtm,
        DemSource::Aster,
        DemSource::Alos,
        DemSource::Tdx,
        DemSource::Glo30,
    ];

    /// Upper-case token as it appears in layer and field names.
    pub fn token(self) -> &'static str {
        match self {
            DemSource::Srtm => "SRTM",
            DemSource::Aster => "ASTER",
            DemSource::Alos => "ALOS",
            DemSource::Tdx => "TDX",
            DemSource::Glo30 => "GLO30",
        }
    }

    /// Infer the DEM product from a layer, raster or field name.
    ///
    /// Matching is a case-insensitive substring search. When several tokens
    /// occur, the leftmost one wins (`"srtm_vs_aster"` is SRTM).
    pub fn recognize(name: &str) -> Option<DemSource> {
        let upper = name.to_ascii_uppercase();
        Self::ALL
            .iter()
            .filter_map(|&src| upper.find(src.token()).map(|at| (at, src)))
            .min_by_key(|&(at, src)| (at, src))
            .map(|(_, src)| src)
    }
}

impl fmt::Display for DemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_tokens_case_insensitively() {
        assert_eq!(Some(DemSource::Srtm), DemSource::recognize("srtm_summits"));
        assert_eq!(Some(DemSource::Aster), DemSource::recognize("Aster GDEM v3"));
        assert_eq!(Some(DemSource::Alos), DemSource::recognize("AW3D30-alos"));
        assert_eq!(Some(DemSource::Tdx), DemSource::recognize("tdx90"));
        assert_eq!(Some(DemSource::Glo30), DemSource::recognize("cop_glo30"));
        assert_eq!(None, DemSource::recognize("lidar_1m"));
    }

    #[test]
    fn leftmost_token_wins() {
        assert_eq!(Some(DemSource::Aster), DemSource::recognize("aster_minus_srtm"));
        assert_eq!(Some(DemSource::Srtm), DemSource::recognize("srtm_minus_aster"));
    }

    #[test]
    fn serializes_as_token() {
        let json = serde_json::to_string(&DemSource::Glo30).unwrap();
        assert_eq!("\"GLO30\"", json);
        let back: DemSource = serde_json::from_str("\"TDX\"").unwrap();
        assert_eq!(DemSource::Tdx, back);
    }
}
