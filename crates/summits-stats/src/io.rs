//! JSON helpers for rasters and statistics reports.

use crate::accuracy::{AccuracyParams, AccuracyReport, SurveyedSummit};
use crate::prominence::{ProminenceError, ProminenceTable};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};
use summits_core::{DemGrid, DemSource, DistanceError, RasterError};

#[derive(thiserror::Error, Debug)]
pub enum StatsIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Prominence(#[from] ProminenceError),
    #[error(transparent)]
    Distance(#[from] DistanceError),
    #[error("no DEM token in raster name '{0}'")]
    UnknownDem(String),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StatsIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), StatsIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// A raster grid read from disk together with the DEM it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDem {
    pub source: DemSource,
    pub grid: DemGrid,
}

/// Load a [`DemGrid`] JSON document.
///
/// The DEM is taken from `source` when given, otherwise recognised from the
/// file name (`srtm_n45e010.json` is SRTM).
pub fn load_dem(
    path: impl AsRef<Path>,
    source: Option<DemSource>,
) -> Result<LoadedDem, StatsIoError> {
    let path = path.as_ref();
    let source = match source {
        Some(s) => s,
        None => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            DemSource::recognize(&name).ok_or(StatsIoError::UnknownDem(name))?
        }
    };
    let grid: DemGrid = read_json(path)?;
    grid.validate()?;
    log::debug!(
        "loaded {} raster {}x{} from {}",
        source,
        grid.width,
        grid.height,
        path.display()
    );
    Ok(LoadedDem { source, grid })
}

pub fn load_surveyed(path: impl AsRef<Path>) -> Result<Vec<SurveyedSummit>, StatsIoError> {
    read_json(path.as_ref())
}

pub fn load_accuracy_params(path: impl AsRef<Path>) -> Result<AccuracyParams, StatsIoError> {
    read_json(path.as_ref())
}

impl ProminenceTable {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StatsIoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), StatsIoError> {
        write_json(self, path.as_ref())
    }
}

impl AccuracyReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, StatsIoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), StatsIoError> {
        write_json(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summits_core::GeoTransform;

    fn grid() -> DemGrid {
        DemGrid::new(
            2,
            1,
            GeoTransform {
                origin_x: 0.0,
                origin_y: 1.0,
                pixel_width: 1.0,
                pixel_height: 1.0,
            },
            None,
            vec![100.0, 90.0],
        )
        .unwrap()
    }

    #[test]
    fn dem_source_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alos_tile_03.json");
        fs::write(&path, serde_json::to_string(&grid()).unwrap()).unwrap();

        let dem = load_dem(&path, None).unwrap();
        assert_eq!(DemSource::Alos, dem.source);
        assert_eq!(grid(), dem.grid);

        let forced = load_dem(&path, Some(DemSource::Tdx)).unwrap();
        assert_eq!(DemSource::Tdx, forced.source);
    }

    #[test]
    fn unnamed_raster_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.json");
        fs::write(&path, serde_json::to_string(&grid()).unwrap()).unwrap();
        assert!(matches!(
            load_dem(&path, None),
            Err(StatsIoError::UnknownDem(name)) if name == "tile.json"
        ));
    }

    #[test]
    fn short_buffer_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("srtm.json");
        let mut bad = grid();
        bad.data.pop();
        fs::write(&path, serde_json::to_string(&bad).unwrap()).unwrap();
        assert!(matches!(
            load_dem(&path, None),
            Err(StatsIoError::Raster(RasterError::InvalidBuffer { expected: 2, got: 1 }))
        ));
    }
}
