//! Cell filter: density threshold plus optional shape membership.

use tracing::debug;

use gt_core::CellIndex;

use crate::{Grid, ShapeIndex};

/// Surviving cells in x-major scan order.
///
/// A cell survives when its weight is strictly greater than `threshold` and,
/// if `shapes` is given, its centroid lies inside at least one shape.
pub fn filter_cells(grid: &Grid, threshold: f64, shapes: Option<&ShapeIndex>) -> Vec<CellIndex> {
    let mut dense = 0usize;
    let kept: Vec<CellIndex> = grid
        .cells()
        .filter(|&cell| grid.weight(cell) > threshold)
        .inspect(|_| dense += 1)
        .filter(|&cell| shapes.is_none_or(|s| s.contains(grid.centroid(cell))))
        .collect();

    debug!(
        cells = grid.len(),
        above_threshold = dense,
        kept = kept.len(),
        "filtered grid cells"
    );
    kept
}
