use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use summits_core::{DemSource, SummitCandidate, SummitLayer};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("layers '{previous}' and '{layer}' both hold {dem} detections")]
    DuplicateSource {
        layer: String,
        previous: String,
        dem: DemSource,
    },
}

/// Candidates gathered from per-DEM layers, ready for clustering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedLayers {
    pub candidates: Vec<SummitCandidate>,
    /// DEMs that contributed, in emission order.
    pub sources: Vec<DemSource>,
    /// Names of layers without a recognised DEM token.
    pub skipped: Vec<String>,
}

/// Gather candidates from per-DEM layers in the fixed DEM order.
///
/// Each layer name must carry a DEM token (`SRTM`, `ASTER`, `ALOS`, `TDX`,
/// `GLO30`). Layers without one are skipped with a warning; two layers for
/// the same DEM are an error. Candidates with an empty `source_id` inherit
/// the layer name.
pub fn collect_layers(layers: Vec<SummitLayer>) -> Result<CollectedLayers, LayerError> {
    let mut by_source: BTreeMap<DemSource, SummitLayer> = BTreeMap::new();
    let mut skipped = Vec::new();

    for layer in layers {
        let Some(dem) = layer.dem_source() else {
            warn!("layer '{}' has no recognised DEM token, skipped", layer.name);
            skipped.push(layer.name);
            continue;
        };
        if let Some(previous) = by_source.get(&dem) {
            return Err(LayerError::DuplicateSource {
                layer: layer.name,
                previous: previous.name.clone(),
                dem,
            });
        }
        by_source.insert(dem, layer);
    }

    let mut out = CollectedLayers {
        skipped,
        ..Default::default()
    };
    for (dem, layer) in by_source {
        info!("{dem}: {} candidate(s) from '{}'", layer.candidates.len(), layer.name);
        out.sources.push(dem);
        let name = layer.name;
        out.candidates
            .extend(layer.candidates.into_iter().map(|mut c| {
                if c.source_id.is_empty() {
                    c.source_id = name.clone();
                }
                c
            }));
    }
    Ok(out)
}
