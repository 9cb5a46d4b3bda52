//! `gt-health`: health-seeking rates from a node-to-facility network.
//!
//! Each node's rate is the sum, over the facilities it links to, of a
//! power-law decay on distance scaled by the link weight.  See [`rates`] for
//! the formula.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`network`] | `HealthNetwork`, `NodeId` (node-link JSON loader)       |
//! | [`rates`]   | `HealthSeekingConfig`, `compute_rates`, JSON views      |
//! | [`error`]   | `HealthError`, `HealthResult<T>`                        |

pub mod error;
pub mod network;
pub mod rates;

#[cfg(test)]
mod tests;

use std::path::Path;

use tracing::info;

pub use error::{HealthError, HealthResult};
pub use network::{HealthNetwork, HealthNode, NodeId};
pub use rates::{compute_rates, HealthSeekingConfig, HealthSeekingRates};

/// File name of the node → raw rate map.
pub const NODE_TO_RATE_FILE: &str = "node_2_hs_rate.json";

/// File name of the binned rate → nodes map.
pub const RATE_TO_NODES_FILE: &str = "hs_rates_2_nodes.json";

/// Write both rate maps into `out_dir`.
pub fn write_rates(out_dir: &Path, rates: &HealthSeekingRates) -> HealthResult<()> {
    gt_io::write_json_pretty(&out_dir.join(NODE_TO_RATE_FILE), &rates.by_node())?;
    gt_io::write_json_pretty(&out_dir.join(RATE_TO_NODES_FILE), &rates.by_rate())?;
    info!(dir = %out_dir.display(), "saved health-seeking rates");
    Ok(())
}
