//! Grid rasterizer: a weighted 2-D histogram over `(lon, lat)`.
//!
//! # Geometry
//!
//! The number of cells per axis comes from the *metric* size of the bounding
//! box (geodesic length of its bottom and left edges divided by the cell
//! size), but the cell boundaries themselves are a uniform linear
//! subdivision in degrees:
//!
//! ```text
//! x_edges[i] = lon_lo + i * (lon_hi - lon_lo) / num_cells_x     i ∈ [0, num_cells_x]
//! ```
//!
//! Cells are therefore only approximately square, and only near the box's
//! reference latitude.
//!
//! # Bin convention
//!
//! Bins are half-open `[edge_i, edge_{i+1})` except the last, which is
//! closed.  A value lying exactly on an interior edge goes to the
//! higher-index bin.  Values outside `[edge_0, edge_n]` are not binned.
//!
//! # Layout
//!
//! Weights are stored x-major (`ix * num_cells_y + iy`), which is also the
//! native scan order of [`Grid::cells`].

use tracing::{debug, info};

use gt_core::{BinExtent, BoundingBox, CellIndex, GeoPoint, WeightedPoint};

use crate::{GridError, GridResult};

/// Upper bound on `num_cells_x * num_cells_y`.  Guards against a cell size
/// typo turning into a multi-gigabyte allocation.
pub const MAX_CELLS: usize = 100_000_000;

// ── Grid ──────────────────────────────────────────────────────────────────────

/// Accumulated weight per cell plus the edge and centroid coordinates.
#[derive(Clone, Debug)]
pub struct Grid {
    /// Longitude edges, length `num_cells_x + 1`.
    pub x_edges: Vec<f64>,
    /// Latitude edges, length `num_cells_y + 1`.
    pub y_edges: Vec<f64>,
    /// Longitude of each column's centroid (midpoint of adjacent edges).
    pub x_mid: Vec<f64>,
    /// Latitude of each row's centroid.
    pub y_mid: Vec<f64>,

    weights: Vec<f64>,
}

impl Grid {
    /// Build an all-zero grid from explicit edge arrays.
    ///
    /// Both arrays must be non-decreasing with at least two entries.
    pub fn from_edges(x_edges: Vec<f64>, y_edges: Vec<f64>) -> Self {
        debug_assert!(x_edges.len() >= 2 && y_edges.len() >= 2);
        let x_mid = midpoints(&x_edges);
        let y_mid = midpoints(&y_edges);
        let weights = vec![0.0; x_mid.len() * y_mid.len()];
        Self { x_edges, y_edges, x_mid, y_mid, weights }
    }

    #[inline]
    pub fn num_cells_x(&self) -> usize {
        self.x_mid.len()
    }

    #[inline]
    pub fn num_cells_y(&self) -> usize {
        self.y_mid.len()
    }

    /// Total number of cells, surviving or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, cell: CellIndex) -> bool {
        (cell.ix as usize) < self.num_cells_x() && (cell.iy as usize) < self.num_cells_y()
    }

    #[inline]
    fn offset(&self, cell: CellIndex) -> usize {
        cell.ix as usize * self.num_cells_y() + cell.iy as usize
    }

    /// Accumulated weight of `cell`.
    ///
    /// # Panics
    /// Panics if `cell` is out of bounds.
    #[inline]
    pub fn weight(&self, cell: CellIndex) -> f64 {
        self.weights[self.offset(cell)]
    }

    /// Add `w` to the weight of `cell`.
    #[inline]
    pub fn add_weight(&mut self, cell: CellIndex, w: f64) {
        let i = self.offset(cell);
        self.weights[i] += w;
    }

    /// Planar midpoint of the cell in degrees.  Not geodesically corrected.
    #[inline]
    pub fn centroid(&self, cell: CellIndex) -> GeoPoint {
        GeoPoint::new(self.y_mid[cell.iy as usize], self.x_mid[cell.ix as usize])
    }

    /// The cell whose edge ranges contain `pos`, using the same convention as
    /// rasterization.  `None` outside the grid extent.
    pub fn cell_containing(&self, pos: GeoPoint) -> Option<CellIndex> {
        let ix = bin_of(&self.x_edges, pos.lon)?;
        let iy = bin_of(&self.y_edges, pos.lat)?;
        Some(CellIndex::new(ix as u32, iy as u32))
    }

    /// Every cell index in x-major order (`ix` outer, `iy` inner).
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        let ny = self.num_cells_y() as u32;
        (0..self.num_cells_x() as u32).flat_map(move |ix| (0..ny).map(move |iy| CellIndex::new(ix, iy)))
    }

    /// Sum of all cell weights.
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

// ── Rasterization ─────────────────────────────────────────────────────────────

/// `(num_cells_x, num_cells_y)` for `bbox` at `cell_size_m`.
///
/// Each axis gets `floor(edge_length / cell_size) + 1` cells so a fractional
/// remainder is still covered.  Counts are formed in `f64` and refused above
/// [`MAX_CELLS`] before any integer cast.
pub fn cell_counts(bbox: &BoundingBox, cell_size_m: f64) -> GridResult<(usize, usize)> {
    let nx = (bbox.width_m() / cell_size_m).floor() + 1.0;
    let ny = (bbox.height_m() / cell_size_m).floor() + 1.0;
    if !(nx.is_finite() && ny.is_finite()) || nx * ny > MAX_CELLS as f64 {
        return Err(GridError::TooManyCells {
            num_cells_x: nx as usize,
            num_cells_y: ny as usize,
            limit:       MAX_CELLS,
        });
    }
    Ok((nx as usize, ny as usize))
}

/// Bin `points` into a grid over `bbox`.
///
/// Points are expected to have been box-filtered already; any that fall
/// outside the edge range are skipped and counted in the debug log.
pub fn rasterize(
    points:      &[WeightedPoint],
    bbox:        &BoundingBox,
    cell_size_m: f64,
    extent:      BinExtent,
) -> GridResult<Grid> {
    let (nx, ny) = cell_counts(bbox, cell_size_m)?;

    let ((lon_lo, lon_hi), (lat_lo, lat_hi)) = match extent {
        BinExtent::BoundingBox => ((bbox.lon_min, bbox.lon_max), (bbox.lat_min, bbox.lat_max)),
        BinExtent::DataRange => data_range(points)
            .unwrap_or(((bbox.lon_min, bbox.lon_max), (bbox.lat_min, bbox.lat_max))),
    };

    let mut grid = Grid::from_edges(linspace(lon_lo, lon_hi, nx), linspace(lat_lo, lat_hi, ny));

    let mut skipped = 0usize;
    for p in points {
        match grid.cell_containing(p.pos) {
            Some(cell) => grid.add_weight(cell, p.weight),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "points outside the grid extent were not binned");
    }

    info!(
        num_cells_x = nx,
        num_cells_y = ny,
        points = points.len() - skipped,
        total_weight = grid.total_weight(),
        "rasterized points into grid"
    );
    Ok(grid)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `n + 1` evenly spaced edges from `lo` to `hi` inclusive.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / n as f64;
    let mut edges: Vec<f64> = (0..=n).map(|i| lo + step * i as f64).collect();
    edges[n] = hi;
    edges
}

fn midpoints(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

/// Bin index of `v` in `edges`, half-open except for the closed last bin.
fn bin_of(edges: &[f64], v: f64) -> Option<usize> {
    let n = edges.len() - 1;
    // NaN fails both comparisons and falls through to `None`.
    if !(v >= edges[0] && v <= edges[n]) {
        return None;
    }
    if v == edges[n] {
        return Some(n - 1);
    }
    Some(edges.partition_point(|&e| e <= v) - 1)
}

/// Min/max lon and lat of `points`; a zero-width axis is widened by ±0.5°.
fn data_range(points: &[WeightedPoint]) -> Option<((f64, f64), (f64, f64))> {
    let first = points.first()?;
    let mut lon = (first.pos.lon, first.pos.lon);
    let mut lat = (first.pos.lat, first.pos.lat);
    for p in &points[1..] {
        lon = (lon.0.min(p.pos.lon), lon.1.max(p.pos.lon));
        lat = (lat.0.min(p.pos.lat), lat.1.max(p.pos.lat));
    }
    let widen = |(lo, hi): (f64, f64)| if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
    Some((widen(lon), widen(lat)))
}
