use serde::{Deserialize, Serialize};
use summits_core::LinearUnit;

/// Which detections must be close for two candidates to be linked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Summit positions only.
    #[default]
    Summit,
    /// Summit positions and col positions.
    SummitAndCol,
}

/// Parameters of the cluster builder.
///
/// There is no `Default`; the neighbourhood distance is always supplied by
/// the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Maximum distance between two linked detections.
    pub neighborhood_distance: f64,
    /// Unit `neighborhood_distance` is expressed in.
    #[serde(default = "map_units")]
    pub unit: LinearUnit,
    #[serde(default)]
    pub link: LinkMode,
    /// Fill the `Merge`/`Cross` review fields after clustering.
    #[serde(default = "enabled")]
    pub suggest_links: bool,
}

fn map_units() -> LinearUnit {
    LinearUnit::MapUnits
}

fn enabled() -> bool {
    true
}

impl ClusterParams {
    pub fn new(neighborhood_distance: f64, unit: LinearUnit) -> Self {
        Self {
            neighborhood_distance,
            unit,
            link: LinkMode::Summit,
            suggest_links: true,
        }
    }

    pub fn with_link(mut self, link: LinkMode) -> Self {
        self.link = link;
        self
    }
}
