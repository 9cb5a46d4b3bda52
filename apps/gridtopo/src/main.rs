//! gridtopo: population grid graphs and health-seeking rates.
//!
//! ```text
//! gridtopo build --households structures_households.csv \
//!                --facilities structures_hospitals.csv \
//!                --bbox -74.34,-74.09,18.51,18.70 --out-dir out/
//!
//! gridtopo health-seeking --network hfs_network_node_link.json --out-dir out/
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` overrides the default `info` level and
//! `--json` switches to JSON lines.

mod build;
mod cli;
mod health;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);

    match &cli.command {
        Command::Build(args) => {
            build::run(args)?;
        }
        Command::HealthSeeking(args) => {
            health::run(args)?;
        }
    }
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
