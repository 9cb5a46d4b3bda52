//! Households and facility CSV loaders.
//!
//! # Households
//!
//! ```csv
//! lat,lon
//! 18.6412,-74.1173
//! 18.6409,-74.1180
//! ```
//!
//! `lat` and `lon` are required.  An optional `pop` column switches the file
//! to population weighting: each row then carries `pop` as its weight instead
//! of counting as one unit.  Other columns are ignored.  A unit-count file can
//! be reweighted to a fixed population per record with
//! [`LoadedPoints::with_unit_weight`].
//!
//! # Facilities
//!
//! ```csv
//! lat,lon,type
//! 18.6500,-74.1150,hospital
//! ```
//!
//! All three columns are required; `type` is free text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use gt_core::{UnitWeight, WeightedPoint};
use gt_grid::Facility;

use crate::{InputError, InputResult};

/// How household weights are to be interpreted downstream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Weighting {
    /// Every record counts as one unit (one household, one structure).
    UnitCount,
    /// Every record carries its own population in a `pop` column.
    Population,
    /// Every record weighs `avg_unit_size` people, so cell weights are
    /// populations from the start.
    DefaultPerUnit,
}

/// Households file contents.
#[derive(Clone, Debug)]
pub struct LoadedPoints {
    pub points:    Vec<WeightedPoint>,
    pub weighting: Weighting,
}

impl LoadedPoints {
    /// Apply `unit_weight` to a unit-count file.  With
    /// [`UnitWeight::AvgUnitSize`] every record's weight becomes
    /// `avg_unit_size`.  Files with a `pop` column are returned unchanged.
    pub fn with_unit_weight(mut self, unit_weight: UnitWeight, avg_unit_size: f64) -> Self {
        match (unit_weight, self.weighting) {
            (UnitWeight::AvgUnitSize, Weighting::UnitCount) => {
                for p in &mut self.points {
                    p.weight = avg_unit_size;
                }
                self.weighting = Weighting::DefaultPerUnit;
            }
            (UnitWeight::AvgUnitSize, Weighting::Population) => {
                debug!("households carry a pop column; per-unit weight ignored");
            }
            _ => {}
        }
        self
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a households CSV.  Fails on an empty file.
pub fn load_households_csv(path: &Path) -> InputResult<LoadedPoints> {
    let file = open(path)?;
    load_households_reader(file, path)
}

/// Like [`load_households_csv`] but reads from any `Read` source.  `path` is
/// only used in error messages.
pub fn load_households_reader<R: Read>(reader: R, path: &Path) -> InputResult<LoadedPoints> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let lat = require(&headers, "lat", path)?;
    let lon = require(&headers, "lon", path)?;
    let pop = find(&headers, "pop");

    let weighting = if pop.is_some() { Weighting::Population } else { Weighting::UnitCount };

    let mut points = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let weight = match pop {
            Some(col) => {
                let w = field_f64(&record, col, "pop", row, path)?;
                if w < 0.0 {
                    return Err(parse_error(path, row, "pop", format!("negative population {w}")));
                }
                w
            }
            None => 1.0,
        };
        points.push(WeightedPoint::new(
            field_f64(&record, lat, "lat", row, path)?,
            field_f64(&record, lon, "lon", row, path)?,
            weight,
        ));
    }

    if points.is_empty() {
        return Err(InputError::Empty { path: path.to_path_buf() });
    }

    info!(path = %path.display(), records = points.len(), ?weighting, "loaded households");
    Ok(LoadedPoints { points, weighting })
}

/// Load a facility CSV.  An empty file yields no facilities.
pub fn load_facilities_csv(path: &Path) -> InputResult<Vec<Facility>> {
    let file = open(path)?;
    load_facilities_reader(file, path)
}

/// Like [`load_facilities_csv`] but reads from any `Read` source.
pub fn load_facilities_reader<R: Read>(reader: R, path: &Path) -> InputResult<Vec<Facility>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let lat = require(&headers, "lat", path)?;
    let lon = require(&headers, "lon", path)?;
    let kind = require(&headers, "type", path)?;

    let mut facilities = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        facilities.push(Facility::new(
            field_f64(&record, lat, "lat", row, path)?,
            field_f64(&record, lon, "lon", row, path)?,
            record.get(kind).unwrap_or_default().trim(),
        ));
    }

    info!(path = %path.display(), records = facilities.len(), "loaded facilities");
    Ok(facilities)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open(path: &Path) -> InputResult<File> {
    File::open(path).map_err(|source| InputError::Open { path: path.to_path_buf(), source })
}

fn find(headers: &StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == column)
}

fn require(headers: &StringRecord, column: &'static str, path: &Path) -> InputResult<usize> {
    find(headers, column).ok_or_else(|| InputError::MissingColumn { path: path.to_path_buf(), column })
}

fn parse_error(path: &Path, row: usize, column: &'static str, message: String) -> InputError {
    InputError::Parse { path: path.to_path_buf(), row, column, message }
}

/// Parse a finite float from `record[idx]`.
fn field_f64(
    record: &StringRecord,
    idx:    usize,
    column: &'static str,
    row:    usize,
    path:   &Path,
) -> InputResult<f64> {
    let raw = record.get(idx).unwrap_or_default().trim();
    let v: f64 = raw
        .parse()
        .map_err(|_| parse_error(path, row, column, format!("{raw:?} is not a number")))?;
    if !v.is_finite() {
        return Err(parse_error(path, row, column, format!("{raw:?} is not finite")));
    }
    Ok(v)
}
