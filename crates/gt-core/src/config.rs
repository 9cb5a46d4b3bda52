//! Run parameters for grid construction.
//!
//! Every knob of the grid builder lives in [`GridConfig`].  Applications
//! usually deserialize it from a JSON file (feature `serde`) and then apply
//! command-line overrides field by field.

use crate::{BoundingBox, CoreError, CoreResult};

pub const DEFAULT_CELL_SIZE_M: f64 = 500.0;
pub const DEFAULT_WEIGHT_THRESHOLD: f64 = 5.0;
pub const DEFAULT_HOP_RADIUS: u32 = 3;
pub const DEFAULT_AVG_UNIT_SIZE: f64 = 4.5;

// ── Policy enums ──────────────────────────────────────────────────────────────

/// What to do with the `c → c` edge every node finds when it scans its own
/// cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SelfLoops {
    /// Emit a zero-weight self-edge per node.
    #[default]
    Keep,
    /// Skip the `dx = dy = 0` candidate.
    Drop,
}

/// How node identities are rendered in output artifacts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LabelScheme {
    /// `"0"`, `"1"`, … in filter-output order.
    #[default]
    Positional,
    /// `"{ix}_{iy}"`, stable across reruns on the same grid geometry.
    CellIndex,
}

/// Which coordinate range the grid edges subdivide.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BinExtent {
    /// Edges span the configured bounding box.
    #[default]
    BoundingBox,
    /// Edges span the min/max of the binned points; cell counts are still
    /// derived from the bounding box.
    DataRange,
}

/// Weight given to each record of a households file without a `pop` column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum UnitWeight {
    /// Each record weighs 1; the threshold counts units and population is
    /// derived at output time.
    #[default]
    Count,
    /// Each record weighs `avg_unit_size`; the threshold counts people.
    AvgUnitSize,
}

/// Picks filter shapes out of a GeoJSON collection by one property value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeSelector {
    /// Feature property to compare, e.g. `"commune"`.
    pub property: String,
    /// Value to match after name folding, e.g. `"jeremie"`.
    pub name: String,
}

// ── GridConfig ────────────────────────────────────────────────────────────────

/// Parameters of one grid-topology build.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Nominal cell side in metres.  Only decides how many cells the box is
    /// split into; cells are a linear subdivision in degrees.
    #[cfg_attr(feature = "serde", serde(default = "default_cell_size_m"))]
    pub cell_size_m: f64,

    /// A cell survives only if its accumulated weight is strictly greater
    /// than this.
    #[cfg_attr(feature = "serde", serde(default = "default_weight_threshold"))]
    pub weight_threshold: f64,

    /// Neighborhood radius in cells for adjacency construction.
    #[cfg_attr(feature = "serde", serde(default = "default_hop_radius"))]
    pub hop_radius: u32,

    /// People per counted unit (household or structure) when the input has
    /// no explicit population column.
    #[cfg_attr(feature = "serde", serde(default = "default_avg_unit_size"))]
    pub avg_unit_size: f64,

    #[cfg_attr(feature = "serde", serde(default))]
    pub unit_weight: UnitWeight,

    pub bbox: BoundingBox,

    #[cfg_attr(feature = "serde", serde(default))]
    pub shape_filter: Option<ShapeSelector>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub self_loops: SelfLoops,

    #[cfg_attr(feature = "serde", serde(default))]
    pub labels: LabelScheme,

    #[cfg_attr(feature = "serde", serde(default))]
    pub extent: BinExtent,
}

#[cfg(feature = "serde")]
fn default_cell_size_m() -> f64 {
    DEFAULT_CELL_SIZE_M
}

#[cfg(feature = "serde")]
fn default_weight_threshold() -> f64 {
    DEFAULT_WEIGHT_THRESHOLD
}

#[cfg(feature = "serde")]
fn default_hop_radius() -> u32 {
    DEFAULT_HOP_RADIUS
}

#[cfg(feature = "serde")]
fn default_avg_unit_size() -> f64 {
    DEFAULT_AVG_UNIT_SIZE
}

impl GridConfig {
    /// A config over `bbox` with every other field at its default.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            cell_size_m:      DEFAULT_CELL_SIZE_M,
            weight_threshold: DEFAULT_WEIGHT_THRESHOLD,
            hop_radius:       DEFAULT_HOP_RADIUS,
            avg_unit_size:    DEFAULT_AVG_UNIT_SIZE,
            unit_weight:      UnitWeight::default(),
            bbox,
            shape_filter:     None,
            self_loops:       SelfLoops::default(),
            labels:           LabelScheme::default(),
            extent:           BinExtent::default(),
        }
    }

    /// Check every field before any input is touched.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.cell_size_m.is_finite() && self.cell_size_m > 0.0) {
            return Err(CoreError::Config(format!(
                "cell_size_m must be a positive number, got {}",
                self.cell_size_m
            )));
        }
        if !self.weight_threshold.is_finite() {
            return Err(CoreError::Config(format!(
                "weight_threshold must be finite, got {}",
                self.weight_threshold
            )));
        }
        if !(self.avg_unit_size.is_finite() && self.avg_unit_size > 0.0) {
            return Err(CoreError::Config(format!(
                "avg_unit_size must be a positive number, got {}",
                self.avg_unit_size
            )));
        }
        if let Some(sel) = &self.shape_filter {
            if sel.property.trim().is_empty() {
                return Err(CoreError::Config("shape_filter.property is empty".into()));
            }
        }
        self.bbox.validate()
    }
}
