//! End-to-end grid topology build.

use tracing::{info, warn};

use gt_core::{GridConfig, WeightedPoint};

use crate::{
    build_adjacency, filter_cells, label_facilities, place_facilities, rasterize, AdjacencyList,
    Facility, FacilityAssignment, Grid, GridResult, NodeTable, ShapeIndex,
};

/// Why a run produced no nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DegenerateReason {
    /// The bounding box has zero width or height.
    CollapsedBoundingBox,
    /// No input point lies strictly inside the bounding box.
    NoPointsInBox,
    /// Cells were built but none passed the threshold and shape filter.
    NoSurvivingCells,
}

/// Outcome of a build that did not fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TopologyStatus {
    Built,
    Degenerate(DegenerateReason),
}

impl TopologyStatus {
    #[inline]
    pub fn is_degenerate(self) -> bool {
        matches!(self, TopologyStatus::Degenerate(_))
    }
}

/// Everything a build produces.
#[derive(Clone, Debug)]
pub struct GridTopology {
    pub status:     TopologyStatus,
    /// The rasterized grid after facility placement.  `None` when the run
    /// stopped before rasterization.
    pub grid:       Option<Grid>,
    pub nodes:      NodeTable,
    pub adjacency:  AdjacencyList,
    /// One entry per facility inside the bounding box, in input order.
    pub facilities: Vec<FacilityAssignment>,
}

/// Fluent builder for a [`GridTopology`].
///
/// # Example
///
/// ```rust,ignore
/// let topo = TopologyBuilder::new(&config, &points)
///     .facilities(&hospitals)
///     .shapes(&shape_index)
///     .build()?;
/// ```
pub struct TopologyBuilder<'a> {
    config:     &'a GridConfig,
    points:     &'a [WeightedPoint],
    facilities: &'a [Facility],
    shapes:     Option<&'a ShapeIndex>,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(config: &'a GridConfig, points: &'a [WeightedPoint]) -> Self {
        Self { config, points, facilities: &[], shapes: None }
    }

    /// Facilities to force onto the grid.
    pub fn facilities(mut self, facilities: &'a [Facility]) -> Self {
        self.facilities = facilities;
        self
    }

    /// Keep only cells whose centroid lies inside the union of `shapes`.
    pub fn shapes(mut self, shapes: &'a ShapeIndex) -> Self {
        self.shapes = Some(shapes);
        self
    }

    /// Validate the config, then run every stage.
    ///
    /// Configuration problems are the only errors; an input that yields no
    /// nodes comes back as [`TopologyStatus::Degenerate`] with empty tables.
    pub fn build(self) -> GridResult<GridTopology> {
        let cfg = self.config;
        cfg.validate()?;

        let bbox = &cfg.bbox;
        let facilities: Vec<Facility> =
            self.facilities.iter().filter(|f| bbox.contains_strict(f.pos)).cloned().collect();
        if facilities.len() < self.facilities.len() {
            info!(
                dropped = self.facilities.len() - facilities.len(),
                "facilities outside the bounding box were dropped"
            );
        }

        if bbox.is_collapsed() {
            warn!(%bbox, "bounding box is collapsed; no grid was built");
            return Ok(self.degenerate(DegenerateReason::CollapsedBoundingBox, &facilities));
        }

        let points: Vec<WeightedPoint> =
            self.points.iter().filter(|p| bbox.contains_strict(p.pos)).copied().collect();
        info!(total = self.points.len(), in_box = points.len(), "applied bounding box filter");
        if points.is_empty() {
            warn!(%bbox, "no input points inside the bounding box; outputs will be empty");
            return Ok(self.degenerate(DegenerateReason::NoPointsInBox, &facilities));
        }

        let mut grid = rasterize(&points, bbox, cfg.cell_size_m, cfg.extent)?;
        let placements = place_facilities(&mut grid, &facilities, cfg.weight_threshold);

        let cells = filter_cells(&grid, cfg.weight_threshold, self.shapes);
        let nodes = NodeTable::label_cells(&grid, &cells, cfg.labels);
        let facilities = label_facilities(&facilities, &placements, &nodes);

        if nodes.is_empty() {
            warn!(
                threshold = cfg.weight_threshold,
                shape_filter = self.shapes.is_some(),
                "no grid cell survived filtering; outputs will be empty"
            );
            return Ok(GridTopology {
                status: TopologyStatus::Degenerate(DegenerateReason::NoSurvivingCells),
                grid: Some(grid),
                nodes,
                adjacency: AdjacencyList::empty(),
                facilities,
            });
        }

        let adjacency = build_adjacency(&nodes, cfg.hop_radius, cfg.self_loops);
        info!(nodes = nodes.len(), edges = adjacency.edge_count(), "grid topology built");

        Ok(GridTopology {
            status: TopologyStatus::Built,
            grid: Some(grid),
            nodes,
            adjacency,
            facilities,
        })
    }

    /// Empty result for a run that stopped before rasterization.
    fn degenerate(&self, reason: DegenerateReason, facilities: &[Facility]) -> GridTopology {
        GridTopology {
            status: TopologyStatus::Degenerate(reason),
            grid: None,
            nodes: NodeTable::empty(self.config.labels),
            adjacency: AdjacencyList::empty(),
            facilities: facilities
                .iter()
                .map(|f| FacilityAssignment { facility: f.clone(), node: None })
                .collect(),
        }
    }
}
