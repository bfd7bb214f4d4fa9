//! Prominence of merged summits as seen by each DEM.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use summits_core::{DemSource, ElevationSampler, Interpolation, Point};
use summits_merge::{MergeGroup, SummitSet};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProminenceError {
    #[error("at least one DEM raster is required")]
    NoRasters,
    #[error("more than one raster given for {0}")]
    DuplicateRaster(DemSource),
}

/// Prominence of one group on one DEM.
///
/// `prominence` is only present when both samples are; otherwise the record
/// is flagged `out_of_coverage`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProminenceRecord {
    pub group: String,
    pub source: DemSource,
    pub summit_elevation_sampled: Option<f64>,
    pub col_elevation_sampled: Option<f64>,
    pub prominence: Option<f64>,
    pub out_of_coverage: bool,
}

impl ProminenceRecord {
    pub fn from_samples(
        group: impl Into<String>,
        source: DemSource,
        summit: Option<f64>,
        col: Option<f64>,
    ) -> Self {
        let prominence = match (summit, col) {
            (Some(s), Some(c)) => Some(s - c),
            _ => None,
        };
        Self {
            group: group.into(),
            source,
            summit_elevation_sampled: summit,
            col_elevation_sampled: col,
            prominence,
            out_of_coverage: prominence.is_none(),
        }
    }
}

/// Sample `dem` at a summit and its col.
pub fn sample_prominence(
    group: &str,
    source: DemSource,
    dem: &dyn ElevationSampler,
    summit: &Point,
    col: &Point,
    mode: Interpolation,
) -> ProminenceRecord {
    ProminenceRecord::from_samples(
        group,
        source,
        dem.sample_with(summit, mode),
        dem.sample_with(col, mode),
    )
}

/// Where summits and cols are sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleAt {
    /// Canonical position and selected col of every active group.
    #[default]
    Detected,
    /// Surveyed positions; groups without ground truth are left out.
    Surveyed,
}

/// One group across all DEMs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProminenceRow {
    pub group: String,
    /// Surveyed prominence, when both surveyed elevations are known.
    pub actual_prominence: Option<f64>,
    pub records: Vec<ProminenceRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProminenceTable {
    pub sources: Vec<DemSource>,
    pub rows: Vec<ProminenceRow>,
    pub out_of_coverage: usize,
}

/// Computes prominence for every group on a fixed set of DEMs.
pub struct ProminenceCalculator<'a> {
    rasters: Vec<(DemSource, &'a dyn ElevationSampler)>,
    sample_at: SampleAt,
    interpolation: Interpolation,
}

impl<'a> ProminenceCalculator<'a> {
    /// Rasters are reported in DEM order regardless of the order given.
    pub fn new(
        mut rasters: Vec<(DemSource, &'a dyn ElevationSampler)>,
    ) -> Result<Self, ProminenceError> {
        if rasters.is_empty() {
            return Err(ProminenceError::NoRasters);
        }
        rasters.sort_by_key(|(source, _)| *source);
        if let Some(w) = rasters.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ProminenceError::DuplicateRaster(w[0].0));
        }
        Ok(Self {
            rasters,
            sample_at: SampleAt::Detected,
            interpolation: Interpolation::Nearest,
        })
    }

    pub fn with_sample_at(mut self, sample_at: SampleAt) -> Self {
        self.sample_at = sample_at;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn sources(&self) -> Vec<DemSource> {
        self.rasters.iter().map(|(s, _)| *s).collect()
    }

    fn points(&self, set: &SummitSet, group: &MergeGroup) -> Option<(Point, Point)> {
        match self.sample_at {
            SampleAt::Detected => Some((
                group.canonical_position,
                set.selected_col(group).col_position,
            )),
            SampleAt::Surveyed => group.truth.as_ref().map(|t| (t.position, t.col_position)),
        }
    }

    /// Prominence of one group on every DEM.
    pub fn row(&self, set: &SummitSet, group: &MergeGroup) -> Option<ProminenceRow> {
        let (summit, col) = self.points(set, group)?;
        let records = self
            .rasters
            .iter()
            .map(|&(source, dem)| {
                sample_prominence(&group.id, source, dem, &summit, &col, self.interpolation)
            })
            .collect();
        Some(ProminenceRow {
            group: group.id.clone(),
            actual_prominence: group.truth.as_ref().and_then(|t| t.prominence()),
            records,
        })
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, set), fields(groups = set.groups.len()))
    )]
    pub fn run(&self, set: &SummitSet) -> ProminenceTable {
        let mut table = ProminenceTable {
            sources: self.sources(),
            ..Default::default()
        };
        for group in set.active_groups() {
            let Some(row) = self.row(set, group) else {
                debug!("{}: no surveyed position, skipped", group.id);
                continue;
            };
            table.out_of_coverage += row.records.iter().filter(|r| r.out_of_coverage).count();
            table.rows.push(row);
        }
        info!(
            "prominence: {} group(s) on {} DEM(s), {} out of coverage",
            table.rows.len(),
            table.sources.len(),
            table.out_of_coverage
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Fixed(Vec<(Point, f64)>);

    impl ElevationSampler for Fixed {
        fn sample(&self, p: &Point) -> Option<f64> {
            self.0.iter().find(|(q, _)| q == p).map(|&(_, z)| z)
        }
    }

    #[test]
    fn prominence_is_summit_minus_col() {
        let dem = Fixed(vec![(Point::new(0.0, 0.0), 1500.0), (Point::new(1.0, 0.0), 1200.0)]);
        let r = sample_prominence(
            "S0001",
            DemSource::Srtm,
            &dem,
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            Interpolation::Nearest,
        );
        assert_relative_eq!(300.0, r.prominence.unwrap());
        assert!(!r.out_of_coverage);
    }

    #[test]
    fn missing_col_sample_flags_record() {
        let dem = Fixed(vec![(Point::new(0.0, 0.0), 1500.0)]);
        let r = sample_prominence(
            "S0001",
            DemSource::Aster,
            &dem,
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            Interpolation::Nearest,
        );
        assert_eq!(None, r.prominence);
        assert_eq!(Some(1500.0), r.summit_elevation_sampled);
        assert!(r.out_of_coverage);
    }

    #[test]
    fn bilinear_mode_reaches_the_grid() {
        use summits_core::{DemGrid, GeoTransform};

        // centres at x = 0.5 and 1.5 on both rows
        let dem = DemGrid::new(
            2,
            2,
            GeoTransform {
                origin_x: 0.0,
                origin_y: 2.0,
                pixel_width: 1.0,
                pixel_height: 1.0,
            },
            None,
            vec![1500.0, 1400.0, 1500.0, 1400.0],
        )
        .unwrap();
        let summit = Point::new(0.5, 1.0);
        let col = Point::new(1.0, 1.0);
        let nearest = sample_prominence(
            "S0001",
            DemSource::Glo30,
            &dem,
            &summit,
            &col,
            Interpolation::Nearest,
        );
        assert_eq!(Some(100.0), nearest.prominence);
        let bilinear = sample_prominence(
            "S0001",
            DemSource::Glo30,
            &dem,
            &summit,
            &col,
            Interpolation::Bilinear,
        );
        assert_relative_eq!(50.0, bilinear.prominence.unwrap());
    }

    #[test]
    fn calculator_needs_distinct_rasters() {
        assert_eq!(
            Some(ProminenceError::NoRasters),
            ProminenceCalculator::new(Vec::new()).err()
        );
        let dem = Fixed(Vec::new());
        let rasters: Vec<(DemSource, &dyn ElevationSampler)> =
            vec![(DemSource::Tdx, &dem), (DemSource::Tdx, &dem)];
        assert_eq!(
            Some(ProminenceError::DuplicateRaster(DemSource::Tdx)),
            ProminenceCalculator::new(rasters).err()
        );
    }
}
