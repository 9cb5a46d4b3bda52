//! Local-connectivity graph between surviving nodes.
//!
//! # Construction
//!
//! Every node scans the `(2R + 1)²` square of cells centred on its own cell,
//! `dx` outer and `dy` inner, and records a directed edge to each surviving
//! cell it finds.  Weight = geodesic distance in km between centroids.  The
//! reverse edge is found independently when the neighbor runs its own scan;
//! nothing is deduplicated.
//!
//! Cost is O(N · (2R + 1)²) hash lookups, which is fine for tens of
//! thousands of nodes at single-digit radii.
//!
//! # Data layout
//!
//! Edges are stored in **Compressed Sparse Row (CSR)** form.  Because nodes
//! are scanned in label order, edges come out already sorted by source and
//! the neighbors of node `n` occupy
//!
//! ```text
//! edge_to[ row_start[n] .. row_start[n+1] ]
//! ```
//!
//! in scan order.

use tracing::info;

use gt_core::{GeoPoint, NodeLabel, SelfLoops};

use crate::NodeTable;

// ── AdjacencyList ─────────────────────────────────────────────────────────────

/// Directed, distance-weighted neighbor lists indexed by `NodeLabel`.
#[derive(Clone, Debug)]
pub struct AdjacencyList {
    /// CSR row pointer.  Length = `node_count + 1`.
    pub row_start: Vec<usize>,
    /// Destination of each edge.
    pub edge_to: Vec<NodeLabel>,
    /// Edge weight in kilometres.
    pub edge_km: Vec<f64>,
}

impl AdjacencyList {
    /// A graph with no nodes.
    pub fn empty() -> Self {
        Self { row_start: vec![0], edge_to: Vec::new(), edge_km: Vec::new() }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.row_start.len() - 1
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// `(neighbor, km)` pairs of `node`, in scan order.
    #[inline]
    pub fn neighbors(&self, node: NodeLabel) -> impl Iterator<Item = (NodeLabel, f64)> + '_ {
        let start = self.row_start[node.index()];
        let end   = self.row_start[node.index() + 1];
        (start..end).map(|e| (self.edge_to[e], self.edge_km[e]))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeLabel) -> usize {
        self.row_start[node.index() + 1] - self.row_start[node.index()]
    }

    /// Weight of the edge `from → to`, if present.
    pub fn weight(&self, from: NodeLabel, to: NodeLabel) -> Option<f64> {
        self.neighbors(from).find(|&(n, _)| n == to).map(|(_, km)| km)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Scan a `hop_radius` square around every node in `table`.
///
/// The scan radius is capped at the largest cell coordinate in the table;
/// offsets past it cannot reach a node.
pub fn build_adjacency(table: &NodeTable, hop_radius: u32, self_loops: SelfLoops) -> AdjacencyList {
    let span = table.iter().map(|n| n.cell.ix.max(n.cell.iy)).max().unwrap_or(0);
    let r = hop_radius.min(span) as i64;

    let mut row_start = Vec::with_capacity(table.len() + 1);
    let mut edge_to   = Vec::with_capacity(table.len());
    let mut edge_km   = Vec::with_capacity(table.len());
    row_start.push(0usize);

    for node in table.iter() {
        for dx in -r..=r {
            for dy in -r..=r {
                if dx == 0 && dy == 0 && self_loops == SelfLoops::Drop {
                    continue;
                }
                let Some(cand) = node.cell.offset(dx, dy) else { continue };
                let Some(neighbor) = table.lookup(cand) else { continue };

                edge_to.push(neighbor);
                edge_km.push(edge_weight_km(node.centroid, table.node(neighbor).centroid));
            }
        }
        row_start.push(edge_to.len());
    }

    info!(
        nodes = table.len(),
        edges = edge_to.len(),
        hop_radius,
        "built adjacency list"
    );
    AdjacencyList { row_start, edge_to, edge_km }
}

/// Geodesic km between two centroids.
///
/// The pair is put in a fixed order first so `a → b` and `b → a` yield
/// bit-identical weights.
fn edge_weight_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (p, q) = if (a.lat, a.lon) <= (b.lat, b.lon) { (a, b) } else { (b, a) };
    p.distance_km(q)
}
