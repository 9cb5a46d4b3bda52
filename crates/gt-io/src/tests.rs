//! Unit tests for gt-io.

#[cfg(test)]
mod households {
    use std::io::Cursor;
    use std::path::Path;

    use gt_core::UnitWeight;

    use crate::{load_households_csv, load_households_reader, InputError, Weighting};

    fn load(text: &str) -> Result<crate::LoadedPoints, InputError> {
        load_households_reader(Cursor::new(text), Path::new("households.csv"))
    }

    #[test]
    fn unit_count_without_pop_column() {
        let loaded = load("lat,lon,osm_id\n18.64,-74.11,1\n18.65,-74.12,2\n").unwrap();
        assert_eq!(loaded.weighting, Weighting::UnitCount);
        assert_eq!(loaded.points.len(), 2);
        assert_eq!(loaded.points[1].pos.lat, 18.65);
        assert_eq!(loaded.points[1].pos.lon, -74.12);
        assert!(loaded.points.iter().all(|p| p.weight == 1.0));
    }

    #[test]
    fn per_unit_weight_replaces_unit_count() {
        let loaded = load("lat,lon\n18.64,-74.11\n18.65,-74.12\n")
            .unwrap()
            .with_unit_weight(UnitWeight::AvgUnitSize, 5.0);
        assert_eq!(loaded.weighting, Weighting::DefaultPerUnit);
        assert!(loaded.points.iter().all(|p| p.weight == 5.0));

        let counted = load("lat,lon\n18.64,-74.11\n").unwrap().with_unit_weight(UnitWeight::Count, 5.0);
        assert_eq!(counted.weighting, Weighting::UnitCount);
        assert_eq!(counted.points[0].weight, 1.0);
    }

    #[test]
    fn per_unit_weight_leaves_pop_column_alone() {
        let loaded = load("lat,lon,pop\n18.64,-74.11,7\n").unwrap().with_unit_weight(UnitWeight::AvgUnitSize, 5.0);
        assert_eq!(loaded.weighting, Weighting::Population);
        assert_eq!(loaded.points[0].weight, 7.0);
    }

    /// Threshold 20 people at 5 per structure: five structures survive, four
    /// do not.
    #[test]
    fn per_unit_threshold_counts_people() {
        use gt_core::{BoundingBox, GridConfig};
        use gt_grid::TopologyBuilder;

        let mut text = String::from("lat,lon\n");
        for _ in 0..5 {
            text.push_str("0.25,0.25\n");
        }
        for _ in 0..4 {
            text.push_str("0.75,0.75\n");
        }
        let loaded = load(&text).unwrap().with_unit_weight(UnitWeight::AvgUnitSize, 5.0);

        let mut cfg = GridConfig::new(BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        cfg.cell_size_m = 100_000.0;
        cfg.weight_threshold = 20.0;
        cfg.avg_unit_size = 5.0;
        let topo = TopologyBuilder::new(&cfg, &loaded.points).build().unwrap();

        assert_eq!(topo.nodes.len(), 1);
        let node = topo.nodes.iter().next().unwrap();
        assert_eq!(node.weight, 25.0);
        assert_eq!(node.centroid.lat, 0.25);
    }

    #[test]
    fn pop_column_becomes_weight() {
        let loaded = load("lon,lat,pop\n-74.11,18.64,6\n-74.12,18.65,2.5\n").unwrap();
        assert_eq!(loaded.weighting, Weighting::Population);
        assert_eq!(loaded.points[0].weight, 6.0);
        assert_eq!(loaded.points[1].weight, 2.5);
    }

    #[test]
    fn missing_column_is_named() {
        let err = load("lat,longitude\n18.6,-74.1\n").unwrap_err();
        match err {
            InputError::MissingColumn { column, path } => {
                assert_eq!(column, "lon");
                assert_eq!(path, Path::new("households.csv"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_coordinate_reports_row_and_column() {
        let err = load("lat,lon\n18.6,-74.1\nabc,-74.1\n").unwrap_err();
        match err {
            InputError::Parse { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "lat");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_rejected() {
        assert!(matches!(load("lat,lon\nNaN,-74.1\n"), Err(InputError::Parse { column: "lat", .. })));
        assert!(matches!(load("lat,lon\n18.6,inf\n"), Err(InputError::Parse { column: "lon", .. })));
        assert!(matches!(load("lat,lon,pop\n18.6,-74.1,-3\n"), Err(InputError::Parse { column: "pop", .. })));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(load("lat,lon\n"), Err(InputError::Empty { .. })));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_households_csv(Path::new("/nonexistent/households.csv")).unwrap_err();
        assert!(matches!(err, InputError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/households.csv"));
    }
}

#[cfg(test)]
mod facilities {
    use std::io::Cursor;
    use std::path::Path;

    use crate::{load_facilities_reader, InputError};

    #[test]
    fn type_column_required() {
        let err = load_facilities_reader(Cursor::new("lat,lon\n1,2\n"), Path::new("h.csv")).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn { column: "type", .. }));
    }

    #[test]
    fn loads_kind_and_position() {
        let text = "name,type,lat,lon\nSt. Antoine,hospital,18.65,-74.115\nX,clinic,18.60,-74.2\n";
        let fs = load_facilities_reader(Cursor::new(text), Path::new("h.csv")).unwrap();
        assert_eq!(fs.len(), 2);
        assert_eq!(fs[0].kind, "hospital");
        assert_eq!(fs[0].pos.lat, 18.65);
        assert_eq!(fs[1].pos.lon, -74.2);
    }

    #[test]
    fn empty_file_yields_no_facilities() {
        let fs = load_facilities_reader(Cursor::new("lat,lon,type\n"), Path::new("h.csv")).unwrap();
        assert!(fs.is_empty());
    }
}

#[cfg(test)]
mod geojson {
    use std::path::Path;

    use gt_core::ShapeSelector;

    use crate::{fold_name, parse_shapes, select_shapes, InputError};

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"commune": "Jérémie", "id": 1},
                "geometry": {"type": "Polygon", "coordinates": [[[-74.2, 18.5], [-74.0, 18.5], [-74.0, 18.7], [-74.2, 18.7]]]}
            },
            {
                "type": "Feature",
                "properties": {"commune": "Port-au-Prince", "id": 2},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[-72.4, 18.5], [-72.2, 18.5], [-72.2, 18.6], [-72.4, 18.5]]],
                    [[[-72.1, 18.5], [-72.0, 18.5], [-72.0, 18.6], [-72.1, 18.5]]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"commune": "Jérémie"},
                "geometry": {"type": "Point", "coordinates": [-74.1, 18.6]}
            },
            {
                "type": "Feature",
                "properties": {"commune": "Nowhere"},
                "geometry": null
            }
        ]
    }"#;

    fn path() -> &'static Path {
        Path::new("communes.geojson")
    }

    #[test]
    fn folding() {
        assert_eq!(fold_name("Jérémie"), "jeremie");
        assert_eq!(fold_name("  Port-au-Prince "), "port au prince");
        assert_eq!(fold_name("ANSE-À-VEAU"), "anse a veau");
    }

    #[test]
    fn only_polygonal_features_are_kept() {
        let shapes = parse_shapes(COLLECTION.as_bytes(), path()).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].geometry.0.len(), 1);
        assert_eq!(shapes[1].geometry.0.len(), 2);
        // Unclosed ring gets closed.
        let ring = shapes[0].geometry.0[0].exterior();
        assert_eq!(ring.0.first(), ring.0.last());
        assert_eq!(ring.0.len(), 5);
    }

    #[test]
    fn selector_matches_folded_name() {
        let shapes = parse_shapes(COLLECTION.as_bytes(), path()).unwrap();
        let sel = ShapeSelector { property: "commune".into(), name: "jeremie".into() };
        let selected = select_shapes(shapes, &sel, path()).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn selector_matches_numeric_property() {
        let shapes = parse_shapes(COLLECTION.as_bytes(), path()).unwrap();
        let sel = ShapeSelector { property: "id".into(), name: "2".into() };
        let selected = select_shapes(shapes, &sel, path()).unwrap();
        assert_eq!(selected[0].0.len(), 2);
    }

    #[test]
    fn selector_without_match_is_an_error() {
        let shapes = parse_shapes(COLLECTION.as_bytes(), path()).unwrap();
        let sel = ShapeSelector { property: "commune".into(), name: "Les Cayes".into() };
        let err = select_shapes(shapes, &sel, path()).unwrap_err();
        assert!(matches!(err, InputError::NoShapesSelected { .. }));
    }

    #[test]
    fn malformed_polygon_names_the_feature() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0, 0], ["x", 0], [1, 1]]]}}
        ]}"#;
        match parse_shapes(text.as_bytes(), path()).unwrap_err() {
            InputError::Geometry { feature, .. } => assert_eq!(feature, 1),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn degenerate_ring_is_rejected() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0]]]}}
        ]}"#;
        assert!(matches!(parse_shapes(text.as_bytes(), path()), Err(InputError::Geometry { .. })));
    }

    #[test]
    fn not_a_feature_collection() {
        let err = parse_shapes(br#"{"type": "Polygon"}"#, path()).unwrap_err();
        assert!(matches!(err, InputError::NotFeatureCollection { .. }));
        assert!(matches!(parse_shapes(b"{", path()), Err(InputError::Json(_))));
    }
}

#[cfg(test)]
mod writer {
    use gt_core::{BoundingBox, GridConfig, LabelScheme, WeightedPoint};
    use gt_grid::{Facility, GridTopology, TopologyBuilder};

    use crate::writer::{to_writer_pretty, write_facilities, write_population, AdjacencyJson};
    use crate::{node_population, Weighting, NO_CELL};

    fn quad_topology(labels: LabelScheme, facilities: &[Facility]) -> GridTopology {
        let mut cfg = GridConfig::new(BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        cfg.cell_size_m = 100_000.0;
        cfg.weight_threshold = 2.0;
        cfg.hop_radius = 1;
        cfg.labels = labels;
        let pts = vec![
            WeightedPoint::new(0.25, 0.25, 3.0),
            WeightedPoint::new(0.75, 0.25, 3.0),
            WeightedPoint::new(0.25, 0.75, 3.0),
            WeightedPoint::new(0.75, 0.75, 3.0),
        ];
        TopologyBuilder::new(&cfg, &pts).facilities(facilities).build().unwrap()
    }

    fn to_string<F: FnOnce(&mut Vec<u8>)>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn population_rounding() {
        assert_eq!(node_population(3.0, Weighting::UnitCount, 4.5), 14);
        assert_eq!(node_population(2.0, Weighting::UnitCount, 4.5), 9);
        assert_eq!(node_population(12.4, Weighting::Population, 4.5), 12);
        assert_eq!(node_population(25.0, Weighting::DefaultPerUnit, 5.0), 25);
    }

    #[test]
    fn population_csv_per_unit_has_no_unit_column() {
        let topo = quad_topology(LabelScheme::Positional, &[]);
        let text = to_string(|b| write_population(b, &topo.nodes, Weighting::DefaultPerUnit, 4.5).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "node_label,lat,lon,pop");
        assert_eq!(lines[1], "0,0.25,0.25,3");
    }

    #[test]
    fn population_csv_unit_count() {
        let topo = quad_topology(LabelScheme::Positional, &[]);
        let text = to_string(|b| write_population(b, &topo.nodes, Weighting::UnitCount, 4.5).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "node_label,lat,lon,pop,num_hhs");
        assert_eq!(lines[1], "0,0.25,0.25,14,3.0");
        assert_eq!(lines[2], "1,0.75,0.25,14,3.0");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn population_csv_population_weighted() {
        let topo = quad_topology(LabelScheme::CellIndex, &[]);
        let text = to_string(|b| write_population(b, &topo.nodes, Weighting::Population, 4.5).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "node_label,lat,lon,pop");
        assert_eq!(lines[1], "0_0,0.25,0.25,3");
        assert_eq!(lines[4], "1_1,0.75,0.75,3");
    }

    #[test]
    fn adjacency_json_layout_and_order() {
        let topo = quad_topology(LabelScheme::Positional, &[]);
        let text = to_string(|b| {
            to_writer_pretty(b, &AdjacencyJson { nodes: &topo.nodes, adjacency: &topo.adjacency }).unwrap()
        });
        assert!(text.starts_with("{\n   \"0\": {\n      \"0\": 0.0,\n      \"1\": "), "{text}");

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for (a, neighbors) in obj {
            let neighbors = neighbors.as_object().unwrap();
            assert_eq!(neighbors.len(), 4);
            for (b, w) in neighbors {
                assert_eq!(value[b][a], *w);
            }
        }
        let km = value["0"]["2"].as_f64().unwrap();
        assert!((km - 55.66).abs() < 0.1, "{km}");
    }

    #[test]
    fn empty_outputs_for_degenerate_run() {
        let mut cfg = GridConfig::new(BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        cfg.weight_threshold = 1e9;
        let topo = TopologyBuilder::new(&cfg, &[WeightedPoint::new(0.5, 0.5, 1.0)]).build().unwrap();
        assert!(topo.status.is_degenerate());

        let json = to_string(|b| {
            to_writer_pretty(b, &AdjacencyJson { nodes: &topo.nodes, adjacency: &topo.adjacency }).unwrap()
        });
        assert_eq!(json, "{}");
        let csv = to_string(|b| write_population(b, &topo.nodes, Weighting::UnitCount, 4.5).unwrap());
        assert_eq!(csv, "node_label,lat,lon,pop,num_hhs\n");
    }

    #[test]
    fn facility_csv_with_sentinel() {
        let mut cfg = GridConfig::new(BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        cfg.cell_size_m = 100_000.0;
        cfg.weight_threshold = 2.0;
        let shapes = gt_grid::ShapeIndex::new(vec![]);
        let pts = [WeightedPoint::new(0.25, 0.25, 3.0)];
        let hospitals = [Facility::new(0.3, 0.3, "hospital")];
        // An empty shape union drops every cell, including the hospital's.
        let topo = TopologyBuilder::new(&cfg, &pts).facilities(&hospitals).shapes(&shapes).build().unwrap();

        let text = to_string(|b| write_facilities(b, &topo.facilities, &topo.nodes).unwrap());
        assert_eq!(text, format!("lat,lon,type,node_label\n0.3,0.3,hospital,{NO_CELL}\n"));
    }

    #[test]
    fn facility_csv_with_label() {
        let hospitals = [Facility::new(0.8, 0.2, "clinic")];
        let topo = quad_topology(LabelScheme::Positional, &hospitals);
        let text = to_string(|b| write_facilities(b, &topo.facilities, &topo.nodes).unwrap());
        // Cell (0, 1): x-major label 1.
        assert_eq!(text.lines().nth(1), Some("0.8,0.2,clinic,1"));
    }

    #[test]
    fn files_are_written() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let topo = quad_topology(LabelScheme::Positional, &[]);
        let adj = dir.path().join("adj.json");
        let pop = dir.path().join("pop.csv");
        crate::write_adjacency_json(&adj, &topo.nodes, &topo.adjacency).unwrap();
        crate::write_population_csv(&pop, &topo.nodes, Weighting::UnitCount, 4.5).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&std::fs::read(&adj).unwrap()).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 4);
        let mut rdr = csv::Reader::from_path(&pop).unwrap();
        assert_eq!(rdr.records().count(), 4);
    }
}

#[cfg(test)]
mod elevation {
    use gt_core::GeoPoint;

    use crate::{load_node_locations, write_elevations_csv, ElevationBatcher, ElevationSource, InputError, InputResult};

    /// Returns `lat * 100` and remembers every batch size.
    #[derive(Default)]
    struct FakeSource {
        batches: Vec<usize>,
        short:   bool,
    }

    impl ElevationSource for FakeSource {
        fn lookup(&mut self, batch: &[GeoPoint]) -> InputResult<Vec<f64>> {
            self.batches.push(batch.len());
            let mut out: Vec<f64> = batch.iter().map(|p| p.lat * 100.0).collect();
            if self.short {
                out.pop();
            }
            Ok(out)
        }
    }

    #[test]
    fn batches_of_twenty_in_request_order() {
        let mut source = FakeSource::default();
        let mut batcher = ElevationBatcher::new(&mut source);
        for i in 0..45 {
            batcher.push(i.to_string(), GeoPoint::new(i as f64, 0.0)).unwrap();
        }
        let result = batcher.finish().unwrap();

        assert_eq!(source.batches, vec![20, 20, 5]);
        assert_eq!(result.len(), 45);
        for (i, (label, elevation)) in result.iter().enumerate() {
            assert_eq!(label, &i.to_string());
            assert_eq!(*elevation, i as f64 * 100.0);
        }
    }

    #[test]
    fn finish_without_requests_sends_nothing() {
        let mut source = FakeSource::default();
        let result = ElevationBatcher::with_batch_size(&mut source, 3).finish().unwrap();
        assert!(result.is_empty());
        assert!(source.batches.is_empty());
    }

    #[test]
    fn short_response_is_an_error() {
        let mut source = FakeSource { short: true, ..FakeSource::default() };
        let mut batcher = ElevationBatcher::with_batch_size(&mut source, 2);
        batcher.push("a", GeoPoint::new(1.0, 1.0)).unwrap();
        let err = batcher.push("b", GeoPoint::new(2.0, 2.0)).unwrap_err();
        assert!(matches!(err, InputError::Elevation(_)));
    }

    #[test]
    fn elevation_column_appended() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let nodes = dir.path().join("pop_gridded.csv");
        let out = dir.path().join("pop_gridded_alts.csv");
        std::fs::write(&nodes, "node_label,lat,lon,pop\n0,18.5,-74.1,10\n1,18.6,-74.2,20\n").unwrap();

        let locations = load_node_locations(&nodes).unwrap();
        assert_eq!(locations[1], ("1".to_owned(), GeoPoint::new(18.6, -74.2)));

        write_elevations_csv(&nodes, &out, &[("0".to_owned(), 312.5)]).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "node_label,lat,lon,pop,elevation");
        assert_eq!(lines[1], "0,18.5,-74.1,10,312.5");
        assert_eq!(lines[2], "1,18.6,-74.2,20,NaN");
    }
}
