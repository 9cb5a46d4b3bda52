//! Batched elevation lookup for node centroids.
//!
//! Remote elevation services cap the number of locations per request, so
//! lookups are queued and sent `batch_size` at a time.  The service itself
//! sits behind [`ElevationSource`]; no network client ships with this crate.
//!
//! ```rust,ignore
//! let mut batcher = ElevationBatcher::new(my_source);
//! for (label, pos) in load_node_locations(&pop_csv)? {
//!     batcher.push(label, pos)?;
//! }
//! let elevations = batcher.finish()?;
//! write_elevations_csv(&pop_csv, &out_csv, &elevations)?;
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use tracing::debug;

use gt_core::GeoPoint;

use crate::{InputError, InputResult, OutputError, OutputResult};

/// Locations per request.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Something that can return the elevation (metres) of several points.
///
/// Callers implement this over their lookup service (or a local DEM) and
/// pass it to [`ElevationBatcher::new`]; the module docs show the full
/// flow from a population CSV to an elevation CSV.  `&mut S` works as a
/// source too, so a caller can keep ownership of a stateful client.
pub trait ElevationSource {
    /// Elevations for `batch`, in the same order.  Must return exactly one
    /// value per input point.
    fn lookup(&mut self, batch: &[GeoPoint]) -> InputResult<Vec<f64>>;
}

impl<S: ElevationSource + ?Sized> ElevationSource for &mut S {
    fn lookup(&mut self, batch: &[GeoPoint]) -> InputResult<Vec<f64>> {
        (**self).lookup(batch)
    }
}

/// Queues `(label, point)` requests and forwards them to an
/// [`ElevationSource`] in fixed-size batches.
pub struct ElevationBatcher<S> {
    source:     S,
    batch_size: usize,
    pending:    Vec<(String, GeoPoint)>,
    results:    Vec<(String, f64)>,
    batches:    usize,
}

impl<S: ElevationSource> ElevationBatcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_batch_size(source, DEFAULT_BATCH_SIZE)
    }

    /// A batch size of 0 is treated as 1.
    pub fn with_batch_size(source: S, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self { source, batch_size, pending: Vec::with_capacity(batch_size), results: Vec::new(), batches: 0 }
    }

    /// Queue one request; sends the batch once it is full.
    pub fn push(&mut self, label: impl Into<String>, pos: GeoPoint) -> InputResult<()> {
        self.pending.push((label.into(), pos));
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Send any partial batch and return `(label, elevation)` in request
    /// order.
    pub fn finish(mut self) -> InputResult<Vec<(String, f64)>> {
        self.flush()?;
        debug!(requests = self.results.len(), batches = self.batches, "elevation lookup finished");
        Ok(self.results)
    }

    fn flush(&mut self) -> InputResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let points: Vec<GeoPoint> = self.pending.iter().map(|&(_, p)| p).collect();
        let elevations = self.source.lookup(&points)?;
        if elevations.len() != points.len() {
            return Err(InputError::Elevation(format!(
                "requested {} elevations, received {}",
                points.len(),
                elevations.len()
            )));
        }
        self.batches += 1;
        self.results
            .extend(self.pending.drain(..).zip(elevations).map(|((label, _), e)| (label, e)));
        Ok(())
    }
}

// ── Node table I/O ────────────────────────────────────────────────────────────

/// `(node_label, centroid)` for every row of a population CSV.
pub fn load_node_locations(path: &Path) -> InputResult<Vec<(String, GeoPoint)>> {
    let file = File::open(path).map_err(|source| InputError::Open { path: path.to_path_buf(), source })?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr.headers()?.clone();
    let col = |column: &'static str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| InputError::MissingColumn { path: path.to_path_buf(), column })
    };
    let (label, lat, lon) = (col("node_label")?, col("lat")?, col("lon")?);

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let coord = |idx: usize, column: &'static str| -> InputResult<f64> {
            let raw = record.get(idx).unwrap_or_default();
            raw.parse().map_err(|_| InputError::Parse {
                path: path.to_path_buf(),
                row: i + 1,
                column,
                message: format!("{raw:?} is not a number"),
            })
        };
        let pos = GeoPoint::new(coord(lat, "lat")?, coord(lon, "lon")?);
        out.push((record.get(label).unwrap_or_default().to_owned(), pos));
    }
    Ok(out)
}

/// Copy the population CSV at `nodes_csv` to `out`, appending an
/// `elevation` column.  Labels without an elevation get `NaN`.
pub fn write_elevations_csv(nodes_csv: &Path, out: &Path, elevations: &[(String, f64)]) -> OutputResult<()> {
    let by_label: HashMap<&str, f64> = elevations.iter().map(|(l, e)| (l.as_str(), *e)).collect();

    let mut rdr = csv::Reader::from_path(nodes_csv)?;
    let mut headers = rdr.headers()?.clone();
    let label = headers
        .iter()
        .position(|h| h == "node_label")
        .ok_or_else(|| OutputError::MissingColumn { path: nodes_csv.to_path_buf(), column: "node_label" })?;
    headers.push_field("elevation");

    let mut w = csv::Writer::from_path(out)?;
    w.write_record(&headers)?;
    for result in rdr.records() {
        let mut record = result?;
        let elevation = record.get(label).and_then(|l| by_label.get(l)).copied().unwrap_or(f64::NAN);
        record.push_field(&elevation.to_string());
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}
