//! Facility placement: force point-type records (hospitals, clinics, …) onto
//! the grid regardless of population density.
//!
//! Placement runs on the raw grid, before the cell filter.  The containing
//! cell receives `existing + (existing + threshold + 1)`, which is always
//! strictly above `threshold` for non-negative weights, so the cell
//! survives the density test.  A shape filter can still drop it; that and
//! facilities outside the grid extent surface as an unassigned facility
//! rather than an error.

use tracing::{debug, warn};

use gt_core::{CellIndex, GeoPoint, NodeLabel};

use crate::{Grid, NodeTable};

/// A located facility with a free-form category (`"hospital"`, `"clinic"`, …).
#[derive(Clone, Debug, PartialEq)]
pub struct Facility {
    pub pos:  GeoPoint,
    pub kind: String,
}

impl Facility {
    pub fn new(lat: f64, lon: f64, kind: impl Into<String>) -> Self {
        Self { pos: GeoPoint::new(lat, lon), kind: kind.into() }
    }
}

/// A facility together with the node it ended up in.
#[derive(Clone, Debug, PartialEq)]
pub struct FacilityAssignment {
    pub facility: Facility,
    /// `None` when the facility's cell did not survive (written as
    /// `"No cell"`).
    pub node:     Option<NodeLabel>,
}

/// Locate each facility's cell and bump its weight past `threshold`.
///
/// Returns one entry per facility, in input order.  Two facilities sharing a
/// cell bump it twice.
pub fn place_facilities(grid: &mut Grid, facilities: &[Facility], threshold: f64) -> Vec<Option<CellIndex>> {
    facilities
        .iter()
        .map(|f| {
            let cell = grid.cell_containing(f.pos)?;
            let existing = grid.weight(cell);
            grid.add_weight(cell, existing + threshold + 1.0);
            debug!(kind = %f.kind, pos = %f.pos, %cell, existing, "placed facility");
            Some(cell)
        })
        .collect()
}

/// Resolve each placed cell to its node label after filtering.
pub fn label_facilities(
    facilities: &[Facility],
    placements: &[Option<CellIndex>],
    table:      &NodeTable,
) -> Vec<FacilityAssignment> {
    debug_assert_eq!(facilities.len(), placements.len());

    facilities
        .iter()
        .zip(placements)
        .map(|(f, cell)| {
            let node = cell.and_then(|c| table.lookup(c));
            if node.is_none() {
                warn!(kind = %f.kind, pos = %f.pos, "facility has no surviving cell");
            }
            FacilityAssignment { facility: f.clone(), node }
        })
        .collect()
}
