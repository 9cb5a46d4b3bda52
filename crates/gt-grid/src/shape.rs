//! Polygon union membership for the cell filter.
//!
//! An R-tree over each shape's bounding rectangle narrows a point query to
//! the few shapes whose boxes contain it; the exact point-in-polygon test
//! then runs only on those.

use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};

use gt_core::GeoPoint;

/// Bounding rectangle of one shape, pointing back into `ShapeIndex::shapes`.
#[derive(Debug, Clone)]
struct ShapeEnvelope {
    idx:  usize,
    rect: Rect<f64>,
}

impl RTreeObject for ShapeEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.rect.min().into(), self.rect.max().into())
    }
}

/// A union of filter shapes in `(lon, lat)` coordinates.
#[derive(Debug, Clone)]
pub struct ShapeIndex {
    shapes: Vec<MultiPolygon<f64>>,
    rtree:  RTree<ShapeEnvelope>,
}

impl ShapeIndex {
    /// Index `shapes`.  Empty geometries have no bounding rectangle and can
    /// never contain a point, so they are left out of the tree.
    pub fn new(shapes: Vec<MultiPolygon<f64>>) -> Self {
        let entries = shapes
            .iter()
            .enumerate()
            .filter_map(|(idx, shape)| shape.bounding_rect().map(|rect| ShapeEnvelope { idx, rect }))
            .collect();
        Self { rtree: RTree::bulk_load(entries), shapes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// `true` if `pos` lies in the interior of at least one shape.  Points on
    /// a shape boundary are not contained.
    pub fn contains(&self, pos: GeoPoint) -> bool {
        let pt = Point::new(pos.lon, pos.lat);
        let env = AABB::from_point([pos.lon, pos.lat]);
        self.rtree
            .locate_in_envelope_intersecting(&env)
            .any(|cand| self.shapes[cand.idx].contains(&pt))
    }
}
