//! Unit tests for gt-health.

#[cfg(test)]
mod config {
    use crate::{HealthError, HealthSeekingConfig};

    #[test]
    fn near_rate_up_to_d_min_inclusive() {
        let cfg = HealthSeekingConfig::default();
        assert_eq!(cfg.fractional_rate(0.0), 0.9);
        assert_eq!(cfg.fractional_rate(2.25), 0.9);
    }

    #[test]
    fn power_law_beyond_d_min() {
        let cfg = HealthSeekingConfig::default();
        // (1 / 2.25) · 2^-2
        let expected = 1.0 / 2.25 / 4.0;
        assert!((cfg.fractional_rate(4.5) - expected).abs() < 1e-12);
        assert!(cfg.fractional_rate(10.0) < cfg.fractional_rate(5.0));
    }

    #[test]
    fn binning_floors() {
        let cfg = HealthSeekingConfig::default();
        assert_eq!(cfg.bin_of(0.9), 90);
        assert_eq!(cfg.bin_of(0.4567), 45);
        assert_eq!(cfg.bin_of(0.0), 0);
    }

    #[test]
    fn invalid_values_rejected() {
        let bad = [
            HealthSeekingConfig { bin_size: 0.0, ..Default::default() },
            HealthSeekingConfig { d_min_km: -1.0, ..Default::default() },
            HealthSeekingConfig { alpha: f64::NAN, ..Default::default() },
            HealthSeekingConfig { near_rate: -0.1, ..Default::default() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(HealthError::Config(_))), "{cfg:?}");
        }
        assert!(HealthSeekingConfig::default().validate().is_ok());
    }
}

#[cfg(test)]
mod network {
    use crate::{HealthError, HealthNetwork, NodeId};

    const NETWORK: &str = r#"{
        "directed": false,
        "multigraph": false,
        "graph": {},
        "nodes": [
            {"id": 0, "lat": 0.0, "lon": 0.0,  "population": 120},
            {"id": 1, "lat": 0.0, "lon": 0.01, "population": 0},
            {"id": 2, "lat": 0.0, "lon": 0.05},
            {"id": 3, "lat": 0.0, "lon": 0.2},
            {"id": 4, "lat": 1.0, "lon": 1.0}
        ],
        "links": [
            {"source": 0, "target": 1, "weight": 0.5},
            {"source": 2, "target": 1, "weight": 0.25, "sx": 0.05, "sy": 0.0},
            {"source": 2, "target": 3, "weight": 0.75}
        ]
    }"#;

    #[test]
    fn links_are_undirected() {
        let net = HealthNetwork::from_json(NETWORK.as_bytes()).unwrap();
        assert_eq!(net.len(), 5);
        assert_eq!(net.link_count(), 3);
        assert_eq!(net.neighbors(1), &[(0, 0.5), (2, 0.25)]);
        assert_eq!(net.neighbors(2), &[(1, 0.25), (3, 0.75)]);
        assert!(net.neighbors(4).is_empty());
        assert_eq!(net.node(0).population, Some(120.0));
        assert_eq!(net.index_of(&NodeId::Int(3)), Some(3));
    }

    #[test]
    fn repeated_link_replaces_weight() {
        let text = r#"{"nodes": [{"id": "a", "lat": 0, "lon": 0}, {"id": "b", "lat": 0, "lon": 1}],
                       "links": [{"source": "a", "target": "b", "weight": 1.0},
                                 {"source": "b", "target": "a", "weight": 0.3}]}"#;
        let net = HealthNetwork::from_json(text.as_bytes()).unwrap();
        assert_eq!(net.neighbors(0), &[(1, 0.3)]);
        assert_eq!(net.link_count(), 1);
        assert_eq!(net.node(1).id, NodeId::Str("b".into()));
    }

    #[test]
    fn self_loop_counted_once() {
        let text = r#"{"nodes": [{"id": 7, "lat": 0, "lon": 0}],
                       "links": [{"source": 7, "target": 7, "weight": 1.0}]}"#;
        let net = HealthNetwork::from_json(text.as_bytes()).unwrap();
        assert_eq!(net.neighbors(0), &[(0, 1.0)]);
        assert_eq!(net.link_count(), 1);
    }

    #[test]
    fn unknown_endpoint_is_an_error() {
        let text = r#"{"nodes": [{"id": 0, "lat": 0, "lon": 0}],
                       "links": [{"source": 0, "target": 9, "weight": 1.0}]}"#;
        match HealthNetwork::from_json(text.as_bytes()).unwrap_err() {
            HealthError::UnknownEndpoint { missing, .. } => assert_eq!(missing, "9"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_coordinates_is_an_error() {
        let text = r#"{"nodes": [{"id": 0, "lat": 0}], "links": []}"#;
        let err = HealthNetwork::from_json(text.as_bytes()).unwrap_err();
        assert!(matches!(err, HealthError::MissingCoordinates { field: "lon", .. }));
    }

    #[test]
    fn duplicate_node_is_an_error() {
        let text = r#"{"nodes": [{"id": 0, "lat": 0, "lon": 0}, {"id": 0, "lat": 1, "lon": 1}], "links": []}"#;
        assert!(matches!(HealthNetwork::from_json(text.as_bytes()), Err(HealthError::DuplicateNode { .. })));
    }

    #[test]
    fn edges_alias_accepted() {
        let text = r#"{"nodes": [{"id": 0, "lat": 0, "lon": 0}, {"id": 1, "lat": 0, "lon": 0.1}],
                       "edges": [{"source": 0, "target": 1, "weight": 1.0}]}"#;
        let net = HealthNetwork::from_json(text.as_bytes()).unwrap();
        assert_eq!(net.link_count(), 1);
    }

    pub fn sample() -> HealthNetwork {
        HealthNetwork::from_json(NETWORK.as_bytes()).unwrap()
    }
}

#[cfg(test)]
mod rates {
    use gt_core::GeoPoint;

    use crate::{compute_rates, HealthNetwork, HealthSeekingConfig, NodeId};

    fn km(a: (f64, f64), b: (f64, f64)) -> f64 {
        GeoPoint::new(a.0, a.1).distance_km(GeoPoint::new(b.0, b.1))
    }

    #[test]
    fn single_facility_gets_full_weight() {
        let cfg = HealthSeekingConfig::default();
        let rates = compute_rates(&super::network::sample(), &cfg).unwrap();
        // Node 0 has one neighbor 1.1 km away: weight 0.5 is ignored.
        assert_eq!(rates.rates[0], (NodeId::Int(0), 0.9));
    }

    #[test]
    fn several_facilities_use_link_weights() {
        let cfg = HealthSeekingConfig::default();
        let rates = compute_rates(&super::network::sample(), &cfg).unwrap();

        let d21 = km((0.0, 0.05), (0.0, 0.01));
        let d23 = km((0.0, 0.05), (0.0, 0.2));
        assert!(d21 > 2.25 && d23 > 2.25);
        let expected = cfg.fractional_rate(d21) * 0.25 + cfg.fractional_rate(d23) * 0.75;
        assert!((rates.rates[2].1 - expected).abs() < 1e-12);

        let d12 = km((0.0, 0.01), (0.0, 0.05));
        let expected1 = 0.9 * 0.5 + cfg.fractional_rate(d12) * 0.25;
        assert!((rates.rates[1].1 - expected1).abs() < 1e-12);
    }

    #[test]
    fn isolated_node_has_zero_rate() {
        let rates = compute_rates(&super::network::sample(), &HealthSeekingConfig::default()).unwrap();
        assert_eq!(rates.rates[4], (NodeId::Int(4), 0.0));
    }

    #[test]
    fn groups_by_bin_in_first_seen_order() {
        let cfg = HealthSeekingConfig::default();
        let rates = compute_rates(&super::network::sample(), &cfg).unwrap();

        assert_eq!(rates.groups[0].0, cfg.bin_of(0.9));
        assert_eq!(rates.groups[0].1[0], NodeId::Int(0));
        let total: usize = rates.groups.iter().map(|(_, ids)| ids.len()).sum();
        assert_eq!(total, 5);
        for (k, ids) in &rates.groups {
            for id in ids {
                let (_, rate) = rates.rates.iter().find(|(n, _)| n == id).unwrap();
                assert_eq!(cfg.bin_of(*rate), *k);
            }
        }

        let expected: f64 = rates.rates.iter().map(|(_, r)| cfg.bin_of(*r) as f64 * cfg.bin_size).sum::<f64>() / 5.0;
        assert!((rates.average_binned_rate() - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_network() {
        let net = HealthNetwork::from_json(br#"{"nodes": [], "links": []}"#).unwrap();
        let rates = compute_rates(&net, &HealthSeekingConfig::default()).unwrap();
        assert!(rates.rates.is_empty());
        assert_eq!(rates.average_binned_rate(), 0.0);
    }

    #[test]
    fn invalid_config_fails_before_computing() {
        let cfg = HealthSeekingConfig { bin_size: -1.0, ..Default::default() };
        assert!(compute_rates(&super::network::sample(), &cfg).is_err());
    }
}

#[cfg(test)]
mod output {
    use crate::{compute_rates, write_rates, HealthSeekingConfig, NODE_TO_RATE_FILE, RATE_TO_NODES_FILE};

    #[test]
    fn both_maps_written_with_three_space_indent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let rates = compute_rates(&super::network::sample(), &HealthSeekingConfig::default()).unwrap();
        write_rates(dir.path(), &rates).unwrap();

        let by_node = std::fs::read_to_string(dir.path().join(NODE_TO_RATE_FILE)).unwrap();
        assert!(by_node.starts_with("{\n   \"0\": 0.9,\n   \"1\": "), "{by_node}");

        let by_rate = std::fs::read_to_string(dir.path().join(RATE_TO_NODES_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&by_rate).unwrap();
        assert_eq!(value["0.9"], serde_json::json!([0]));
        // Node 3 is a single facility 16.7 km away; node 4 has none.
        assert_eq!(value["0.0"], serde_json::json!([3, 4]));
    }
}
