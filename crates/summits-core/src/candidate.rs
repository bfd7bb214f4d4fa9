use crate::{DemSource, Point};
use serde::{Deserialize, Serialize};

/// One summit/col detection produced from one DEM by an external detector.
///
/// Records are immutable once produced; the merge stages refer to them by
/// index and never edit them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummitCandidate {
    /// Name of the DEM (or layer) the detection came from, e.g. `"srtm_1as"`.
    pub source_id: String,
    pub position: Point,
    pub elevation: f64,
    /// Key col used as the prominence reference.
    pub col_position: Point,
    pub col_elevation: f64,
    /// Detected path from the summit to its col.
    pub ridge_line: Vec<Point>,
}

impl SummitCandidate {
    /// Build a candidate from a detected ridge line running summit → col.
    ///
    /// Returns `None` for lines with fewer than two vertices.
    pub fn from_ridge(
        source_id: impl Into<String>,
        ridge_line: Vec<Point>,
        elevation: f64,
        col_elevation: f64,
    ) -> Option<Self> {
        if ridge_line.len() < 2 {
            return None;
        }
        let position = *ridge_line.first()?;
        let col_position = *ridge_line.last()?;
        Some(Self {
            source_id: source_id.into(),
            position,
            elevation,
            col_position,
            col_elevation,
            ridge_line,
        })
    }

    /// Prominence as reported by the detector.
    #[inline]
    pub fn prominence(&self) -> f64 {
        self.elevation - self.col_elevation
    }

    /// DEM product inferred from `source_id`.
    pub fn dem_source(&self) -> Option<DemSource> {
        DemSource::recognize(&self.source_id)
    }
}

/// All detections exported from one DEM.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummitLayer {
    /// Layer name; it must contain a DEM token (`SRTM`, `ASTER`, ...).
    pub name: String,
    pub candidates: Vec<SummitCandidate>,
}

impl SummitLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidates: Vec::new(),
        }
    }

    pub fn dem_source(&self) -> Option<DemSource> {
        DemSource::recognize(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ridge_endpoints_become_summit_and_col() {
        let ridge = vec![
            Point::new(10.0, 10.0),
            Point::new(10.5, 10.2),
            Point::new(11.0, 10.1),
        ];
        let c = SummitCandidate::from_ridge("ASTER", ridge, 1820.0, 1495.0).unwrap();
        assert_eq!(Point::new(10.0, 10.0), c.position);
        assert_eq!(Point::new(11.0, 10.1), c.col_position);
        assert_eq!(325.0, c.prominence());
        assert_eq!(Some(DemSource::Aster), c.dem_source());
    }

    #[test]
    fn degenerate_ridge_is_rejected() {
        assert!(SummitCandidate::from_ridge("SRTM", vec![Point::new(0.0, 0.0)], 1.0, 0.0).is_none());
    }
}
