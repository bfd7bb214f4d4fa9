//! JSON configuration and report helpers for the merge pipeline.

use crate::cluster::{ClusterBuilder, ClusterError, ClusterParams};
use crate::layers::{collect_layers, LayerError};
use crate::reference::ReferenceSummit;
use crate::{SetError, SummitSet};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use summits_core::{DemSource, DistanceError, DistanceModel, SummitLayer};

#[derive(thiserror::Error, Debug)]
pub enum MergeIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    #[error(transparent)]
    Distance(#[from] DistanceError),
    #[error(transparent)]
    InvalidSet(#[from] SetError),
}

/// Read any of the crate's documents from a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, MergeIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write a document as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), MergeIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Configuration of a merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Paths of per-DEM layer documents ([`SummitLayer`] JSON).
    pub layers: Vec<String>,
    /// Unit name of the layers' coordinate system; unknown when absent.
    #[serde(default)]
    pub crs_unit: Option<String>,
    pub cluster: ClusterParams,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl MergeConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MergeIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MergeIoError> {
        write_json(self, path)
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("summits_merged.json"))
    }

    pub fn distance_model(&self) -> Result<DistanceModel, DistanceError> {
        match &self.crs_unit {
            Some(unit) => DistanceModel::from_crs_unit(unit),
            None => Ok(DistanceModel::map_units()),
        }
    }

    /// Load the layers, collect and cluster them.
    pub fn run(&self) -> Result<MergeReport, MergeIoError> {
        let layers = self
            .layers
            .iter()
            .map(|path| read_json(path))
            .collect::<Result<Vec<SummitLayer>, _>>()?;
        merge_layers(layers, self.cluster.clone(), self.distance_model()?)
    }
}

/// Outcome of a merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub sources: Vec<DemSource>,
    #[serde(default)]
    pub skipped_layers: Vec<String>,
    pub set: SummitSet,
}

impl MergeReport {
    /// Load a report and check its summit set.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MergeIoError> {
        let report: Self = read_json(path)?;
        report.set.validate()?;
        Ok(report)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MergeIoError> {
        write_json(self, path)
    }
}

/// Collect layers and cluster their candidates.
pub fn merge_layers(
    layers: Vec<SummitLayer>,
    params: ClusterParams,
    model: DistanceModel,
) -> Result<MergeReport, MergeIoError> {
    let builder = ClusterBuilder::new(params, model)?;
    let collected = collect_layers(layers)?;
    let set = builder.build(collected.candidates);
    Ok(MergeReport {
        sources: collected.sources,
        skipped_layers: collected.skipped,
        set,
    })
}

impl SummitSet {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MergeIoError> {
        let set: Self = read_json(path)?;
        set.validate()?;
        Ok(set)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MergeIoError> {
        write_json(self, path)
    }
}

/// Load a reference summit list.
pub fn load_references(path: impl AsRef<Path>) -> Result<Vec<ReferenceSummit>, MergeIoError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use summits_core::{LinearUnit, Point, SummitCandidate};

    fn layer(name: &str, at: (f64, f64)) -> SummitLayer {
        let mut l = SummitLayer::new(name);
        l.candidates.push(
            SummitCandidate::from_ridge(
                name,
                vec![Point::new(at.0, at.1), Point::new(at.0 + 0.01, at.1)],
                1200.0,
                1000.0,
            )
            .unwrap(),
        );
        l
    }

    #[test]
    fn config_run_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let srtm = dir.path().join("srtm.json");
        let aster = dir.path().join("aster.json");
        write_json(&layer("SRTM", (10.0, 45.0)), &srtm).unwrap();
        write_json(&layer("ASTER", (10.0002, 45.0)), &aster).unwrap();

        let cfg = MergeConfig {
            layers: vec![
                aster.to_string_lossy().into_owned(),
                srtm.to_string_lossy().into_owned(),
            ],
            crs_unit: Some("degree".into()),
            cluster: ClusterParams::new(0.0005, LinearUnit::Degrees),
            output_path: None,
        };
        let cfg_path = dir.path().join("merge.json");
        cfg.write_json(&cfg_path).unwrap();
        let loaded = MergeConfig::load_json(&cfg_path).unwrap();
        assert_eq!(PathBuf::from("summits_merged.json"), loaded.output_path());

        let report = loaded.run().unwrap();
        assert_eq!(vec![DemSource::Srtm, DemSource::Aster], report.sources);
        assert_eq!(1, report.set.groups.len());
        assert_eq!("SRTM", report.set.candidates[0].source_id);

        let out = dir.path().join("report.json");
        report.write_json(&out).unwrap();
        let back = MergeReport::load_json(&out).unwrap();
        assert_eq!(report.sources, back.sources);
        assert_eq!(report.set.groups[0].id, back.set.groups[0].id);
        assert_eq!(report.set.groups[0].members, back.set.groups[0].members);
    }

    #[test]
    fn unknown_crs_unit_is_reported() {
        let cfg = MergeConfig {
            layers: Vec::new(),
            crs_unit: Some("league".into()),
            cluster: ClusterParams::new(1.0, LinearUnit::MapUnits),
            output_path: None,
        };
        assert!(matches!(cfg.run(), Err(MergeIoError::Distance(_))));
    }

    #[test]
    fn edited_report_with_bad_indices_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let report = merge_layers(
            vec![layer("SRTM", (10.0, 45.0)), layer("ASTER", (11.0, 45.0))],
            ClusterParams::new(0.0005, LinearUnit::Degrees),
            DistanceModel::new(LinearUnit::Degrees),
        )
        .unwrap();
        let mut edited = report.clone();
        edited.set.groups[1].selected_col = 7;
        let path = dir.path().join("edited.json");
        edited.write_json(&path).unwrap();
        assert!(matches!(
            MergeReport::load_json(&path),
            Err(MergeIoError::InvalidSet(SetError::CandidateOutOfRange { candidate: 7, .. }))
        ));
        edited.set.write_json(&path).unwrap();
        assert!(matches!(
            SummitSet::load_json(&path),
            Err(MergeIoError::InvalidSet(_))
        ));

        report.write_json(&path).unwrap();
        assert_eq!(2, MergeReport::load_json(&path).unwrap().set.groups.len());
    }

    #[test]
    fn missing_layer_file_is_io_error() {
        let cfg = MergeConfig {
            layers: vec!["/nonexistent/srtm.json".into()],
            crs_unit: None,
            cluster: ClusterParams::new(1.0, LinearUnit::MapUnits),
            output_path: None,
        };
        assert!(matches!(cfg.run(), Err(MergeIoError::Io(_))));
    }
}
