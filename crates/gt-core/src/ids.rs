//! Cell and node identifiers.
//!
//! A [`CellIndex`] is a position on the grid and never changes for a given
//! grid geometry.  A [`NodeLabel`] is the enumeration index a surviving cell
//! received from the labeler; it is only meaningful within one run.

use std::fmt;

/// Grid position `(ix, iy)` of a cell: `ix` runs along longitude, `iy`
/// along latitude.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellIndex {
    pub ix: u32,
    pub iy: u32,
}

impl CellIndex {
    #[inline(always)]
    pub fn new(ix: u32, iy: u32) -> Self {
        Self { ix, iy }
    }

    /// Offset by `(dx, dy)`, or `None` if the result would be negative or
    /// overflow `u32`.
    #[inline]
    pub fn offset(self, dx: i64, dy: i64) -> Option<CellIndex> {
        let ix = u32::try_from(self.ix as i64 + dx).ok()?;
        let iy = u32::try_from(self.iy as i64 + dy).ok()?;
        Some(CellIndex { ix, iy })
    }

    /// Chebyshev (king-move) distance in cells.
    #[inline]
    pub fn hops_to(self, other: CellIndex) -> u32 {
        self.ix.abs_diff(other.ix).max(self.iy.abs_diff(other.iy))
    }
}

/// Renders the stable composite key `"{ix}_{iy}"`.
impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.ix, self.iy)
    }
}

/// Positional label of a surviving node: `0..N` in filter-output order.
///
/// Opaque outside the run that produced it: rerunning with different
/// filter parameters renumbers every node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeLabel(pub u32);

impl NodeLabel {
    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Renders the bare integer, which is the external form in every artifact.
impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NodeLabel> for usize {
    #[inline(always)]
    fn from(label: NodeLabel) -> usize {
        label.0 as usize
    }
}

impl TryFrom<usize> for NodeLabel {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<NodeLabel, Self::Error> {
        u32::try_from(n).map(NodeLabel)
    }
}
