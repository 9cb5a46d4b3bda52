//! Output writers.
//!
//! | File                               | Function                 |
//! |------------------------------------|--------------------------|
//! | `pop_gridded.csv`                  | [`write_population_csv`] |
//! | `gridded_households_adj_list.json` | [`write_adjacency_json`] |
//! | `hospitals_node_labeled.csv`       | [`write_facilities_csv`] |
//!
//! Every writer overwrites its target.  A degenerate run still produces
//! each file: a header-only CSV or an empty JSON object.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

use gt_core::NodeLabel;
use gt_grid::{AdjacencyList, FacilityAssignment, NodeTable};

use crate::{OutputResult, Weighting};

/// Sentinel written in place of a node label for an unplaced facility.
pub const NO_CELL: &str = "No cell";

/// Indent used by every JSON output.
pub const JSON_INDENT: &[u8] = b"   ";

// ── Population nodes ──────────────────────────────────────────────────────────

/// Population of a node with accumulated `weight`.
///
/// Unit-count input scales by `avg_unit_size`; population and per-unit
/// input are already people.  All are rounded to the nearest integer.
pub fn node_population(weight: f64, weighting: Weighting, avg_unit_size: f64) -> i64 {
    match weighting {
        Weighting::UnitCount => (weight * avg_unit_size).round() as i64,
        Weighting::Population | Weighting::DefaultPerUnit => weight.round() as i64,
    }
}

/// Write `node_label,lat,lon,pop[,num_hhs]`, one row per node in label order.
/// `num_hhs` (the raw unit count, as float text) is present only for
/// unit-count input.
pub fn write_population_csv(
    path:          &Path,
    nodes:         &NodeTable,
    weighting:     Weighting,
    avg_unit_size: f64,
) -> OutputResult<()> {
    write_population(File::create(path)?, nodes, weighting, avg_unit_size)
}

/// Like [`write_population_csv`] but writes to any `Write` sink.
pub fn write_population<W: Write>(
    sink:          W,
    nodes:         &NodeTable,
    weighting:     Weighting,
    avg_unit_size: f64,
) -> OutputResult<()> {
    let mut w = csv::Writer::from_writer(sink);
    match weighting {
        Weighting::UnitCount => w.write_record(["node_label", "lat", "lon", "pop", "num_hhs"])?,
        Weighting::Population | Weighting::DefaultPerUnit => {
            w.write_record(["node_label", "lat", "lon", "pop"])?
        }
    }

    for node in nodes.iter() {
        let mut row = vec![
            nodes.external_label(node.label),
            node.centroid.lat.to_string(),
            node.centroid.lon.to_string(),
            node_population(node.weight, weighting, avg_unit_size).to_string(),
        ];
        if weighting == Weighting::UnitCount {
            row.push(format!("{:?}", node.weight));
        }
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

// ── Adjacency ─────────────────────────────────────────────────────────────────

/// Write `{ "label": { "neighbor": km, … }, … }` with a 3-space indent.
///
/// Nodes appear in label order and neighbors in scan order.
pub fn write_adjacency_json(path: &Path, nodes: &NodeTable, adjacency: &AdjacencyList) -> OutputResult<()> {
    write_json_pretty(path, &AdjacencyJson { nodes, adjacency })
}

/// Serializes an adjacency list as nested JSON objects in insertion order.
pub struct AdjacencyJson<'a> {
    pub nodes:     &'a NodeTable,
    pub adjacency: &'a AdjacencyList,
}

struct NeighborsJson<'a> {
    nodes:     &'a NodeTable,
    adjacency: &'a AdjacencyList,
    node:      NodeLabel,
}

impl Serialize for AdjacencyJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.adjacency.node_count()))?;
        for node in self.nodes.iter() {
            map.serialize_entry(
                &self.nodes.external_label(node.label),
                &NeighborsJson { nodes: self.nodes, adjacency: self.adjacency, node: node.label },
            )?;
        }
        map.end()
    }
}

impl Serialize for NeighborsJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.adjacency.out_degree(self.node)))?;
        for (neighbor, km) in self.adjacency.neighbors(self.node) {
            map.serialize_entry(&self.nodes.external_label(neighbor), &km)?;
        }
        map.end()
    }
}

// ── Facilities ────────────────────────────────────────────────────────────────

/// Write `lat,lon,type,node_label`, one row per facility in input order.
pub fn write_facilities_csv(path: &Path, facilities: &[FacilityAssignment], nodes: &NodeTable) -> OutputResult<()> {
    write_facilities(File::create(path)?, facilities, nodes)
}

/// Like [`write_facilities_csv`] but writes to any `Write` sink.
pub fn write_facilities<W: Write>(sink: W, facilities: &[FacilityAssignment], nodes: &NodeTable) -> OutputResult<()> {
    let mut w = csv::Writer::from_writer(sink);
    w.write_record(["lat", "lon", "type", "node_label"])?;
    for a in facilities {
        let label = match a.node {
            Some(label) => nodes.external_label(label),
            None => NO_CELL.to_owned(),
        };
        w.write_record([
            a.facility.pos.lat.to_string(),
            a.facility.pos.lon.to_string(),
            a.facility.kind.clone(),
            label,
        ])?;
    }
    w.flush()?;
    Ok(())
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Serialize `value` to `path`, pretty-printed with [`JSON_INDENT`].
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    to_writer_pretty(&mut out, value)?;
    out.flush()?;
    Ok(())
}

/// Serialize `value` into `sink` with [`JSON_INDENT`].
pub fn to_writer_pretty<W: Write, T: Serialize + ?Sized>(sink: W, value: &T) -> OutputResult<()> {
    let mut ser = serde_json::Serializer::with_formatter(sink, PrettyFormatter::with_indent(JSON_INDENT));
    value.serialize(&mut ser)?;
    Ok(())
}
