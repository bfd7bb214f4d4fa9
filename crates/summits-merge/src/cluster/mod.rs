//! Cross-DEM clustering of summit detections.
//!
//! Candidates are nodes of an undirected graph with an edge between any two
//! detections closer than the neighbourhood distance; each connected
//! component becomes one [`MergeGroup`](crate::MergeGroup).

mod builder;
pub(crate) mod graph;
mod params;

pub use builder::{cluster_candidates, group_id, ClusterBuilder, ClusterError};
pub use params::{ClusterParams, LinkMode};
