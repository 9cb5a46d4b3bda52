//! `gridtopo health-seeking`: network in, two rate maps out.

use anyhow::{Context, Result};

use gt_health::{compute_rates, write_rates, HealthNetwork, HealthSeekingRates};

use crate::cli::HealthArgs;

pub fn run(args: &HealthArgs) -> Result<HealthSeekingRates> {
    let cfg = args.health_config()?;
    let net = HealthNetwork::load(&args.network)
        .with_context(|| format!("loading network from {}", args.network.display()))?;

    let rates = compute_rates(&net, &cfg)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;
    write_rates(&args.out_dir, &rates).context("writing health-seeking rates")?;
    Ok(rates)
}
