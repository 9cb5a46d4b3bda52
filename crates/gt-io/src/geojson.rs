//! GeoJSON shape loader and named-shape selection.
//!
//! Only `Polygon` and `MultiPolygon` features are kept; both become a
//! `geo::MultiPolygon` in `(lon, lat)` order.  Features with any other
//! geometry type (or a `null` geometry) are skipped with a warning.  A
//! polygon feature whose coordinates are malformed is a fatal error.

use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};
use tracing::{info, warn};

use gt_core::ShapeSelector;

use crate::{InputError, InputResult};

/// One polygonal feature and its properties.
#[derive(Clone, Debug)]
pub struct FilterShape {
    pub properties: Map<String, Value>,
    pub geometry:   MultiPolygon<f64>,
}

impl FilterShape {
    /// `true` if `properties[selector.property]` folds to the same name as
    /// `selector.name`.  Numeric properties compare by their JSON text.
    pub fn matches(&self, selector: &ShapeSelector) -> bool {
        let value = match self.properties.get(&selector.property) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return false,
        };
        fold_name(&value) == fold_name(&selector.name)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Read every polygonal feature of a GeoJSON FeatureCollection.
pub fn load_shapes(path: &Path) -> InputResult<Vec<FilterShape>> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Open { path: path.to_path_buf(), source })?;
    parse_shapes(&bytes, path)
}

/// Like [`load_shapes`] but parses bytes already in memory.  `path` is only
/// used in error messages.
pub fn parse_shapes(bytes: &[u8], path: &Path) -> InputResult<Vec<FilterShape>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let features = value["features"]
        .as_array()
        .ok_or_else(|| InputError::NotFeatureCollection { path: path.to_path_buf() })?;

    let geometry_error =
        |feature: usize, message: String| InputError::Geometry { path: path.to_path_buf(), feature, message };

    let mut shapes = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        let properties = feature["properties"].as_object().cloned().unwrap_or_default();
        let geometry = &feature["geometry"];
        let coords = &geometry["coordinates"];

        let polygons = match geometry["type"].as_str() {
            Some("Polygon") => vec![parse_polygon(coords).map_err(|m| geometry_error(i, m))?],
            Some("MultiPolygon") => coords
                .as_array()
                .ok_or_else(|| geometry_error(i, "MultiPolygon coordinates must be an array".into()))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|m| geometry_error(i, m))?,
            other => {
                warn!(feature = i, geometry_type = other.unwrap_or("null"), "skipping non-polygon feature");
                continue;
            }
        };
        shapes.push(FilterShape { properties, geometry: MultiPolygon(polygons) });
    }

    info!(path = %path.display(), features = features.len(), shapes = shapes.len(), "loaded shapes");
    Ok(shapes)
}

/// Keep the geometries of shapes matching `selector`.  Matching nothing is
/// an error.
pub fn select_shapes(
    shapes:   Vec<FilterShape>,
    selector: &ShapeSelector,
    path:     &Path,
) -> InputResult<Vec<MultiPolygon<f64>>> {
    let selected: Vec<MultiPolygon<f64>> =
        shapes.into_iter().filter(|s| s.matches(selector)).map(|s| s.geometry).collect();

    if selected.is_empty() {
        return Err(InputError::NoShapesSelected {
            path:     path.to_path_buf(),
            property: selector.property.clone(),
            name:     selector.name.clone(),
        });
    }
    info!(property = %selector.property, name = %selector.name, selected = selected.len(), "selected shapes");
    Ok(selected)
}

/// Normalize a place name for comparison: lower-case, Latin diacritics
/// removed, hyphens as spaces, surrounding whitespace trimmed.
///
/// `"Jérémie"` and `"jeremie"` fold to the same string, as do
/// `"Port-au-Prince"` and `"port au prince"`.
pub fn fold_name(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            '-' => ' ',
            c => c,
        })
        .collect()
}

// ── Coordinate parsing ────────────────────────────────────────────────────────

/// `[exterior, hole, hole, …]`
fn parse_polygon(coords: &Value) -> Result<Polygon<f64>, String> {
    let rings = coords.as_array().ok_or("polygon coordinates must be an array of rings")?;
    let (exterior, holes) = rings.split_first().ok_or("polygon has no exterior ring")?;
    let interiors = holes.iter().map(parse_ring).collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(parse_ring(exterior)?, interiors))
}

/// `[[x, y], [x, y], …]`, closed if the input is not.
fn parse_ring(coords: &Value) -> Result<LineString<f64>, String> {
    let positions = coords.as_array().ok_or("ring must be an array of positions")?;
    let mut points = Vec::with_capacity(positions.len() + 1);
    for pos in positions {
        let (x, y) = match pos.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => (x.as_f64(), y.as_f64()),
            _ => (None, None),
        };
        match (x, y) {
            (Some(x), Some(y)) => points.push(Coord { x, y }),
            _ => return Err(format!("invalid position {pos}")),
        }
    }
    if points.len() < 3 {
        return Err(format!("ring has {} positions; at least 3 are required", points.len()));
    }
    if points.first() != points.last() {
        points.push(points[0]);
    }
    Ok(LineString(points))
}
