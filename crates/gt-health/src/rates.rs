//! Distance-decay health-seeking rates.
//!
//! For node `n` with facility neighbors `H(n)`:
//!
//! ```text
//! rate(n) = Σ_{h ∈ H(n)}  f(d(n, h)) · w(n, h)
//!
//! f(d) = near_rate                                   d ≤ d_min
//!      = ((alpha − 1) / d_min) · (d / d_min)^(−alpha)   d > d_min
//!
//! w(n, h) = 1            if |H(n)| = 1
//!         = link weight  otherwise
//! ```
//!
//! `d` is the geodesic distance in km.  Rates are then binned down to a
//! multiple of `bin_size` and nodes are grouped by bin.

use rustc_hash::FxHashMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{HealthError, HealthNetwork, HealthResult, NodeId};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Power-law parameters and binning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSeekingConfig {
    /// Power-law exponent.
    pub alpha:     f64,
    /// Distance (km) at or below which `near_rate` applies.
    pub d_min_km:  f64,
    pub near_rate: f64,
    /// Width of a rate bin.
    pub bin_size:  f64,
}

impl Default for HealthSeekingConfig {
    fn default() -> Self {
        Self { alpha: 2.0, d_min_km: 2.25, near_rate: 0.9, bin_size: 0.01 }
    }
}

impl HealthSeekingConfig {
    pub fn validate(&self) -> HealthResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(HealthError::Config(format!("{name} must be a positive number, got {v}")))
            }
        };
        positive("d_min_km", self.d_min_km)?;
        positive("bin_size", self.bin_size)?;
        if !self.alpha.is_finite() {
            return Err(HealthError::Config(format!("alpha must be finite, got {}", self.alpha)));
        }
        if !(self.near_rate.is_finite() && self.near_rate >= 0.0) {
            return Err(HealthError::Config(format!("near_rate must be non-negative, got {}", self.near_rate)));
        }
        Ok(())
    }

    /// `f(d)` for one facility at `d_km`.
    pub fn fractional_rate(&self, d_km: f64) -> f64 {
        if d_km <= self.d_min_km {
            self.near_rate
        } else {
            ((self.alpha - 1.0) / self.d_min_km) * (d_km / self.d_min_km).powf(-self.alpha)
        }
    }

    /// Index of the bin holding `rate`.
    #[inline]
    pub fn bin_of(&self, rate: f64) -> i64 {
        (rate / self.bin_size).floor() as i64
    }
}

// ── Result ────────────────────────────────────────────────────────────────────

/// Rates for every node of a network.
#[derive(Clone, Debug)]
pub struct HealthSeekingRates {
    /// `(node, raw rate)` in network order.
    pub rates:    Vec<(NodeId, f64)>,
    /// `(bin index, nodes)` in order of first appearance.
    pub groups:   Vec<(i64, Vec<NodeId>)>,
    pub bin_size: f64,
}

impl HealthSeekingRates {
    /// Lower edge of bin `k`.
    #[inline]
    pub fn bin_rate(&self, k: i64) -> f64 {
        k as f64 * self.bin_size
    }

    /// Mean of the binned rates over all nodes; 0 for an empty network.
    pub fn average_binned_rate(&self) -> f64 {
        if self.rates.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.groups.iter().map(|(k, ids)| self.bin_rate(*k) * ids.len() as f64).sum();
        sum / self.rates.len() as f64
    }

    /// `{ "node id": rate, … }`
    pub fn by_node(&self) -> RatesByNode<'_> {
        RatesByNode(self)
    }

    /// `{ "binned rate": [node id, …], … }`
    pub fn by_rate(&self) -> NodesByRate<'_> {
        NodesByRate(self)
    }
}

/// JSON view of [`HealthSeekingRates::rates`].
pub struct RatesByNode<'a>(&'a HealthSeekingRates);

/// JSON view of [`HealthSeekingRates::groups`].
pub struct NodesByRate<'a>(&'a HealthSeekingRates);

impl Serialize for RatesByNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.rates.len()))?;
        for (id, rate) in &self.0.rates {
            map.serialize_entry(&id.to_string(), rate)?;
        }
        map.end()
    }
}

impl Serialize for NodesByRate<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.groups.len()))?;
        for (k, ids) in &self.0.groups {
            map.serialize_entry(&rate_key(self.0.bin_rate(*k)), ids)?;
        }
        map.end()
    }
}

/// Render a binned rate as a JSON object key, e.g. `"0.9"` or `"1.0"`.
fn rate_key(rate: f64) -> String {
    serde_json::Number::from_f64(rate).map_or_else(|| rate.to_string(), |n| n.to_string())
}

// ── Computation ───────────────────────────────────────────────────────────────

/// Rate of every node in `net`.  Every neighbor of a node counts as a
/// facility it can reach.
pub fn compute_rates(net: &HealthNetwork, config: &HealthSeekingConfig) -> HealthResult<HealthSeekingRates> {
    config.validate()?;

    let mut rates = Vec::with_capacity(net.len());
    let mut groups: Vec<(i64, Vec<NodeId>)> = Vec::new();
    let mut group_of: FxHashMap<i64, usize> = FxHashMap::default();

    for (idx, node) in net.nodes().iter().enumerate() {
        let facilities = net.neighbors(idx);
        let rate: f64 = facilities
            .iter()
            .map(|&(h, weight)| {
                let hf_weight = if facilities.len() == 1 { 1.0 } else { weight };
                let d = node.pos.distance_km(net.node(h).pos);
                config.fractional_rate(d) * hf_weight
            })
            .sum();

        rates.push((node.id.clone(), rate));

        let k = config.bin_of(rate);
        let slot = *group_of.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(node.id.clone());
    }

    let result = HealthSeekingRates { rates, groups, bin_size: config.bin_size };
    if result.rates.is_empty() {
        warn!("network has no nodes; no rates computed");
    } else {
        info!(
            nodes = result.rates.len(),
            bins = result.groups.len(),
            average_binned_rate = result.average_binned_rate(),
            "computed health-seeking rates"
        );
    }
    Ok(result)
}
