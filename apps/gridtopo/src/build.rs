//! `gridtopo build`: load, build, write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use gt_grid::{GridTopology, ShapeIndex, TopologyBuilder, TopologyStatus};
use gt_io::{
    load_facilities_csv, load_households_csv, load_shapes, select_shapes, write_adjacency_json,
    write_facilities_csv, write_population_csv,
};

use crate::cli::BuildArgs;

pub const POPULATION_FILE: &str = "pop_gridded.csv";
pub const ADJACENCY_FILE: &str = "gridded_households_adj_list.json";
pub const FACILITIES_FILE: &str = "hospitals_node_labeled.csv";

/// Paths written by one run.
#[derive(Debug)]
pub struct BuildOutputs {
    pub status:     TopologyStatus,
    pub population: PathBuf,
    pub adjacency:  PathBuf,
    pub facilities: Option<PathBuf>,
}

pub fn run(args: &BuildArgs) -> Result<BuildOutputs> {
    // ── Validate config and load every input before computing ─────────────
    let cfg = args.grid_config()?;
    info!(?cfg, "resolved grid configuration");

    let households = load_households_csv(&args.households)
        .with_context(|| format!("loading households from {}", args.households.display()))?
        .with_unit_weight(cfg.unit_weight, cfg.avg_unit_size);

    let facilities = match &args.facilities {
        Some(path) => {
            load_facilities_csv(path).with_context(|| format!("loading facilities from {}", path.display()))?
        }
        None => Vec::new(),
    };

    let shapes = match &args.shapes {
        Some(path) => {
            let all = load_shapes(path).with_context(|| format!("loading shapes from {}", path.display()))?;
            let polygons = match &cfg.shape_filter {
                Some(selector) => select_shapes(all, selector, path)?,
                None => all.into_iter().map(|s| s.geometry).collect(),
            };
            Some(ShapeIndex::new(polygons))
        }
        None => None,
    };

    // ── Build ─────────────────────────────────────────────────────────────
    let mut builder = TopologyBuilder::new(&cfg, &households.points).facilities(&facilities);
    if let Some(index) = &shapes {
        builder = builder.shapes(index);
    }
    let topo = builder.build()?;

    // ── Write ─────────────────────────────────────────────────────────────
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    let outputs = write_outputs(args, &topo, households.weighting, cfg.avg_unit_size)?;
    match topo.status {
        TopologyStatus::Built => info!(
            nodes = topo.nodes.len(),
            edges = topo.adjacency.edge_count(),
            dir = %args.out_dir.display(),
            "grid topology written"
        ),
        TopologyStatus::Degenerate(reason) => warn!(
            ?reason,
            dir = %args.out_dir.display(),
            "degenerate grid; empty outputs written"
        ),
    }
    Ok(outputs)
}

fn write_outputs(
    args:          &BuildArgs,
    topo:          &GridTopology,
    weighting:     gt_io::Weighting,
    avg_unit_size: f64,
) -> Result<BuildOutputs> {
    let population = args.out_dir.join(POPULATION_FILE);
    write_population_csv(&population, &topo.nodes, weighting, avg_unit_size)
        .with_context(|| format!("writing {}", population.display()))?;

    let adjacency = args.out_dir.join(ADJACENCY_FILE);
    write_adjacency_json(&adjacency, &topo.nodes, &topo.adjacency)
        .with_context(|| format!("writing {}", adjacency.display()))?;

    let facilities = match args.facilities {
        Some(_) => {
            let path = args.out_dir.join(FACILITIES_FILE);
            write_facilities_csv(&path, &topo.facilities, &topo.nodes)
                .with_context(|| format!("writing {}", path.display()))?;
            Some(path)
        }
        None => None,
    };

    Ok(BuildOutputs { status: topo.status, population, adjacency, facilities })
}
