//! Rasterization extent.

use crate::{CoreError, CoreResult, GeoPoint};

/// An axis-aligned `(lon, lat)` rectangle in degrees.
///
/// The box defines both which input records are kept (see
/// [`contains_strict`](Self::contains_strict)) and the extent that the grid
/// subdivides.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self { lon_min, lon_max, lat_min, lat_max }
    }

    /// Reject non-finite or inverted boxes.
    ///
    /// A box with `min == max` on an axis passes: it is degenerate rather
    /// than invalid, and the pipeline reports it as such instead of failing.
    pub fn validate(&self) -> CoreResult<()> {
        let all = [self.lon_min, self.lon_max, self.lat_min, self.lat_max];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::BoundingBox(format!("non-finite coordinate in {self}")));
        }
        if self.lon_min > self.lon_max {
            return Err(CoreError::BoundingBox(format!(
                "lon_min {} exceeds lon_max {}",
                self.lon_min, self.lon_max
            )));
        }
        if self.lat_min > self.lat_max {
            return Err(CoreError::BoundingBox(format!(
                "lat_min {} exceeds lat_max {}",
                self.lat_min, self.lat_max
            )));
        }
        Ok(())
    }

    /// `true` when the box has zero width or zero height.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.lon_min >= self.lon_max || self.lat_min >= self.lat_max
    }

    /// Open-interval containment on both axes.  Records lying exactly on the
    /// box boundary are excluded.
    #[inline]
    pub fn contains_strict(&self, p: GeoPoint) -> bool {
        p.lon > self.lon_min && p.lon < self.lon_max && p.lat > self.lat_min && p.lat < self.lat_max
    }

    /// Geodesic length of the bottom edge (`lat_min`, `lon_min → lon_max`)
    /// in metres.
    pub fn width_m(&self) -> f64 {
        GeoPoint::new(self.lat_min, self.lon_min).distance_m(GeoPoint::new(self.lat_min, self.lon_max))
    }

    /// Geodesic length of the left edge (`lon_min`, `lat_min → lat_max`)
    /// in metres.
    pub fn height_m(&self) -> f64 {
        GeoPoint::new(self.lat_min, self.lon_min).distance_m(GeoPoint::new(self.lat_max, self.lon_min))
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[lon {} .. {}, lat {} .. {}]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}
