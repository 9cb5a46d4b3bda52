//! Node-to-facility network in node-link JSON form.
//!
//! ```json
//! {
//!   "nodes": [{"id": 0, "lat": 18.64, "lon": -74.11, "population": 230}, …],
//!   "links": [{"source": 0, "target": 200, "weight": 0.7}, …]
//! }
//! ```
//!
//! The graph is undirected: a link adds each endpoint to the other's
//! neighbor list.  A repeated link replaces the earlier weight.  Extra keys
//! on nodes, links and the top level are ignored.

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use gt_core::GeoPoint;

use crate::{HealthError, HealthResult};

/// A node identifier as it appears in the JSON: an integer or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(n) => write!(f, "{n}"),
            NodeId::Str(s) => f.write_str(s),
        }
    }
}

// ── JSON records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeLinkData {
    nodes: Vec<NodeRecord>,
    #[serde(alias = "edges")]
    links: Vec<LinkRecord>,
}

#[derive(Deserialize)]
struct NodeRecord {
    id:         NodeId,
    lat:        Option<f64>,
    lon:        Option<f64>,
    population: Option<f64>,
}

#[derive(Deserialize)]
struct LinkRecord {
    source: NodeId,
    target: NodeId,
    weight: f64,
}

// ── HealthNetwork ─────────────────────────────────────────────────────────────

/// One network node.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthNode {
    pub id:         NodeId,
    pub pos:        GeoPoint,
    pub population: Option<f64>,
}

/// Undirected weighted graph, nodes in file order.
#[derive(Clone, Debug, Default)]
pub struct HealthNetwork {
    nodes:     Vec<HealthNode>,
    index:     FxHashMap<NodeId, usize>,
    /// `(neighbor index, link weight)` per node, in first-seen order.
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl HealthNetwork {
    /// Read a node-link JSON file.
    pub fn load(path: &Path) -> HealthResult<Self> {
        let bytes =
            std::fs::read(path).map_err(|source| HealthError::Open { path: path.to_path_buf(), source })?;
        let net = Self::from_json(&bytes)?;
        info!(path = %path.display(), nodes = net.len(), links = net.link_count(), "loaded network");
        Ok(net)
    }

    /// Parse node-link JSON.
    pub fn from_json(bytes: &[u8]) -> HealthResult<Self> {
        let data: NodeLinkData = serde_json::from_slice(bytes)?;
        let mut net = Self::default();

        for rec in data.nodes {
            let lat = rec.lat.ok_or_else(|| missing(&rec.id, "lat"))?;
            let lon = rec.lon.ok_or_else(|| missing(&rec.id, "lon"))?;
            net.add_node(HealthNode { id: rec.id, pos: GeoPoint::new(lat, lon), population: rec.population })?;
        }
        for link in data.links {
            net.add_link(&link.source, &link.target, link.weight)?;
        }
        Ok(net)
    }

    /// Append a node.  Ids must be unique.
    pub fn add_node(&mut self, node: HealthNode) -> HealthResult<()> {
        if self.index.contains_key(&node.id) {
            return Err(HealthError::DuplicateNode { id: node.id.to_string() });
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        self.neighbors.push(Vec::new());
        Ok(())
    }

    /// Connect `a` and `b` in both directions.
    pub fn add_link(&mut self, a: &NodeId, b: &NodeId, weight: f64) -> HealthResult<()> {
        let unknown = |missing: &NodeId| HealthError::UnknownEndpoint {
            source_id: a.to_string(),
            target_id: b.to_string(),
            missing:   missing.to_string(),
        };
        let ia = *self.index.get(a).ok_or_else(|| unknown(a))?;
        let ib = *self.index.get(b).ok_or_else(|| unknown(b))?;

        set_neighbor(&mut self.neighbors[ia], ib, weight);
        if ia != ib {
            set_neighbor(&mut self.neighbors[ib], ia, weight);
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct undirected links.
    pub fn link_count(&self) -> usize {
        let self_loops = self.neighbors.iter().enumerate().filter(|(i, ns)| ns.iter().any(|&(n, _)| n == *i)).count();
        let directed: usize = self.neighbors.iter().map(Vec::len).sum();
        (directed + self_loops) / 2
    }

    pub fn nodes(&self) -> &[HealthNode] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> &HealthNode {
        &self.nodes[idx]
    }

    /// `(neighbor, weight)` of node `idx`.
    pub fn neighbors(&self, idx: usize) -> &[(usize, f64)] {
        &self.neighbors[idx]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }
}

fn missing(id: &NodeId, field: &'static str) -> HealthError {
    HealthError::MissingCoordinates { id: id.to_string(), field }
}

fn set_neighbor(list: &mut Vec<(usize, f64)>, n: usize, weight: f64) {
    match list.iter_mut().find(|(m, _)| *m == n) {
        Some(entry) => entry.1 = weight,
        None => list.push((n, weight)),
    }
}
