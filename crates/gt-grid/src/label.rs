//! Node labeler.
//!
//! Surviving cells are enumerated in filter-output order and receive
//! `NodeLabel(0)`, `NodeLabel(1)`, ….  The table keeps a cell → label map so
//! adjacency construction and facility labeling can resolve a grid position
//! in O(1).

use rustc_hash::FxHashMap;

use gt_core::{CellIndex, GeoPoint, LabelScheme, NodeLabel};

use crate::Grid;

/// One surviving cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub label:    NodeLabel,
    pub cell:     CellIndex,
    pub centroid: GeoPoint,
    /// Accumulated weight of the cell, including any facility bump.
    pub weight:   f64,
}

/// All nodes of one run, indexed by `NodeLabel`.
#[derive(Clone, Debug, Default)]
pub struct NodeTable {
    nodes:   Vec<Node>,
    by_cell: FxHashMap<CellIndex, NodeLabel>,
    scheme:  LabelScheme,
}

impl NodeTable {
    /// A table with no nodes.  Produced by degenerate runs.
    pub fn empty(scheme: LabelScheme) -> Self {
        Self { scheme, ..Self::default() }
    }

    /// Label `cells` in the order given.
    ///
    /// `cells` must be distinct and in bounds for `grid`, which is what
    /// [`filter_cells`](crate::filter_cells) produces.
    pub fn label_cells(grid: &Grid, cells: &[CellIndex], scheme: LabelScheme) -> Self {
        let mut nodes = Vec::with_capacity(cells.len());
        let mut by_cell = FxHashMap::with_capacity_and_hasher(cells.len(), Default::default());

        for (i, &cell) in cells.iter().enumerate() {
            let label = NodeLabel(i as u32);
            let prev = by_cell.insert(cell, label);
            debug_assert!(prev.is_none(), "cell {cell} labeled twice");
            nodes.push(Node {
                label,
                cell,
                centroid: grid.centroid(cell),
                weight: grid.weight(cell),
            });
        }

        Self { nodes, by_cell, scheme }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn scheme(&self) -> LabelScheme {
        self.scheme
    }

    /// Label of the node occupying `cell`, if that cell survived.
    #[inline]
    pub fn lookup(&self, cell: CellIndex) -> Option<NodeLabel> {
        self.by_cell.get(&cell).copied()
    }

    #[inline]
    pub fn node(&self, label: NodeLabel) -> &Node {
        &self.nodes[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// The label as written to output files under the table's scheme.
    pub fn external_label(&self, label: NodeLabel) -> String {
        match self.scheme {
            LabelScheme::Positional => label.to_string(),
            LabelScheme::CellIndex => self.node(label).cell.to_string(),
        }
    }
}
