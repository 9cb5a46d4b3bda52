//! Command-line surface and config resolution.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use gt_core::{BinExtent, BoundingBox, GridConfig, LabelScheme, SelfLoops, ShapeSelector, UnitWeight};
use gt_health::HealthSeekingConfig;

/// `gridtopo` - population grid graphs from household locations.
///
/// `build` bins household (or structure) points into a regular grid, keeps
/// the dense cells, labels them and connects nearby cells into a
/// distance-weighted graph.  `health-seeking` turns a node-to-facility
/// network into per-node care-seeking rates.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, env = "GRIDTOPO_LOG_JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the grid graph and write population, adjacency and facility files.
    Build(BuildArgs),
    /// Compute health-seeking rates from a node-link network.
    HealthSeeking(HealthArgs),
}

// ── build ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Households / structures CSV with `lat`, `lon` and optionally `pop`.
    #[arg(long)]
    pub households: PathBuf,

    /// Facility CSV with `lat`, `lon`, `type`.
    #[arg(long)]
    pub facilities: Option<PathBuf>,

    /// GeoJSON FeatureCollection of filter shapes.
    #[arg(long)]
    pub shapes: Option<PathBuf>,

    /// Feature property compared against `--shape-name`.
    #[arg(long, requires = "shape_name")]
    pub shape_property: Option<String>,

    /// Shape name to select, compared case- and accent-insensitively.
    #[arg(long, requires = "shape_property")]
    pub shape_name: Option<String>,

    /// JSON file with `GridConfig` fields; flags below override it.
    #[arg(long, env = "GRIDTOPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for output files; created if missing.
    #[arg(long)]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub overrides: GridOverrides,
}

/// Per-field overrides for [`GridConfig`].
#[derive(Args, Debug, Default)]
pub struct GridOverrides {
    /// Bounding box as `lon_min,lon_max,lat_min,lat_max`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bbox: Option<Vec<f64>>,

    /// Nominal cell side in metres.
    #[arg(long)]
    pub cell_size_m: Option<f64>,

    /// Cells need strictly more weight than this to survive.
    #[arg(long)]
    pub weight_threshold: Option<f64>,

    /// Neighborhood radius in cells.
    #[arg(long)]
    pub hop_radius: Option<u32>,

    /// People per household when the input has no `pop` column.
    #[arg(long)]
    pub avg_unit_size: Option<f64>,

    /// Weigh each record as one unit or as `avg_unit_size` people.
    #[arg(long, value_enum)]
    pub unit_weight: Option<UnitWeightArg>,

    #[arg(long, value_enum)]
    pub self_loops: Option<SelfLoopsArg>,

    #[arg(long, value_enum)]
    pub labels: Option<LabelsArg>,

    #[arg(long, value_enum)]
    pub extent: Option<ExtentArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SelfLoopsArg {
    Keep,
    Drop,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnitWeightArg {
    Count,
    AvgUnitSize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LabelsArg {
    Positional,
    CellIndex,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtentArg {
    BoundingBox,
    DataRange,
}

impl From<SelfLoopsArg> for SelfLoops {
    fn from(a: SelfLoopsArg) -> Self {
        match a {
            SelfLoopsArg::Keep => SelfLoops::Keep,
            SelfLoopsArg::Drop => SelfLoops::Drop,
        }
    }
}

impl From<UnitWeightArg> for UnitWeight {
    fn from(a: UnitWeightArg) -> Self {
        match a {
            UnitWeightArg::Count => UnitWeight::Count,
            UnitWeightArg::AvgUnitSize => UnitWeight::AvgUnitSize,
        }
    }
}

impl From<LabelsArg> for LabelScheme {
    fn from(a: LabelsArg) -> Self {
        match a {
            LabelsArg::Positional => LabelScheme::Positional,
            LabelsArg::CellIndex => LabelScheme::CellIndex,
        }
    }
}

impl From<ExtentArg> for BinExtent {
    fn from(a: ExtentArg) -> Self {
        match a {
            ExtentArg::BoundingBox => BinExtent::BoundingBox,
            ExtentArg::DataRange => BinExtent::DataRange,
        }
    }
}

impl BuildArgs {
    /// Config file (if any) with flag overrides applied, validated.
    pub fn grid_config(&self) -> Result<GridConfig> {
        let base = match &self.config {
            Some(path) => Some(read_json::<GridConfig>(path)?),
            None => None,
        };
        let mut cfg = self.overrides.apply(base)?;

        if let (Some(property), Some(name)) = (&self.shape_property, &self.shape_name) {
            cfg.shape_filter = Some(ShapeSelector { property: property.clone(), name: name.clone() });
        }
        if cfg.shape_filter.is_some() && self.shapes.is_none() {
            bail!("a shape filter is configured but no --shapes file was given");
        }

        cfg.validate().context("invalid grid configuration")?;
        Ok(cfg)
    }
}

impl GridOverrides {
    /// Apply every flag that was given to `base`.  Without a base config the
    /// bounding box flag is required.
    pub fn apply(&self, base: Option<GridConfig>) -> Result<GridConfig> {
        let bbox = self.bbox.as_deref().map(|v| match v {
            &[lon_min, lon_max, lat_min, lat_max] => Ok(BoundingBox::new(lon_min, lon_max, lat_min, lat_max)),
            _ => Err(anyhow::anyhow!("--bbox takes exactly four values")),
        });
        let bbox = bbox.transpose()?;

        let mut cfg = match (base, bbox) {
            (Some(mut cfg), Some(bbox)) => {
                cfg.bbox = bbox;
                cfg
            }
            (Some(cfg), None) => cfg,
            (None, Some(bbox)) => GridConfig::new(bbox),
            (None, None) => bail!("no bounding box: pass --bbox or a --config file with `bbox`"),
        };

        if let Some(v) = self.cell_size_m {
            cfg.cell_size_m = v;
        }
        if let Some(v) = self.weight_threshold {
            cfg.weight_threshold = v;
        }
        if let Some(v) = self.hop_radius {
            cfg.hop_radius = v;
        }
        if let Some(v) = self.avg_unit_size {
            cfg.avg_unit_size = v;
        }
        if let Some(v) = self.unit_weight {
            cfg.unit_weight = v.into();
        }
        if let Some(v) = self.self_loops {
            cfg.self_loops = v.into();
        }
        if let Some(v) = self.labels {
            cfg.labels = v.into();
        }
        if let Some(v) = self.extent {
            cfg.extent = v.into();
        }
        Ok(cfg)
    }
}

// ── health-seeking ────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Node-link JSON network of grid nodes and facilities.
    #[arg(long)]
    pub network: PathBuf,

    /// Directory for output files; created if missing.
    #[arg(long)]
    pub out_dir: PathBuf,

    /// JSON file with `HealthSeekingConfig` fields; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Power-law exponent.
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Distance (km) up to which the near rate applies.
    #[arg(long)]
    pub d_min_km: Option<f64>,

    /// Rate for a facility within `d_min_km`.
    #[arg(long)]
    pub near_rate: Option<f64>,

    /// Rate bin width.
    #[arg(long)]
    pub bin_size: Option<f64>,
}

impl HealthArgs {
    pub fn health_config(&self) -> Result<HealthSeekingConfig> {
        let mut cfg = match &self.config {
            Some(path) => read_json::<HealthSeekingConfig>(path)?,
            None => HealthSeekingConfig::default(),
        };
        if let Some(v) = self.alpha {
            cfg.alpha = v;
        }
        if let Some(v) = self.d_min_km {
            cfg.d_min_km = v;
        }
        if let Some(v) = self.near_rate {
            cfg.near_rate = v;
        }
        if let Some(v) = self.bin_size {
            cfg.bin_size = v;
        }
        cfg.validate().context("invalid health-seeking configuration")?;
        Ok(cfg)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
}
