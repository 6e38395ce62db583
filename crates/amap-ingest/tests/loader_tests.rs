use amap_core::{Crs, FacilityCategory, LoadWarning, Projector, RunConfig, TravelMode};
use amap_ingest::{
    load_facilities, load_network, load_population_raster, load_population_vector, load_units,
    IngestError,
};
use amap_graph::NodeLocator;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

const METRIC: Crs = Crs::STUDY_DEFAULT;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

fn projector() -> Projector {
    Projector::new(METRIC).unwrap()
}

/// Two 100 m segments in metric coordinates, second one one-way
const NETWORK: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "highway": "residential" },
      "geometry": { "type": "LineString", "coordinates": [[1000.0, 500.0], [1100.0, 500.0]] }
    },
    {
      "type": "Feature",
      "properties": { "highway": "residential", "oneway": "yes" },
      "geometry": { "type": "LineString", "coordinates": [[1100.0, 500.0], [1200.0, 500.0]] }
    },
    {
      "type": "Feature",
      "properties": {},
      "geometry": { "type": "LineString", "coordinates": [[1300.0, 500.0], [1300.0, 500.0]] }
    }
  ]
}"#;

fn walk_config() -> RunConfig {
    RunConfig {
        mode: TravelMode::Walk,
        ..RunConfig::new()
    }
}

#[test]
fn network_loader_builds_connected_graph() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "roads.geojson", NETWORK);
    let (graph, warnings) = load_network(&path, METRIC, &projector(), &walk_config()).unwrap();

    // Three distinct endpoints shared between the two good segments
    assert_eq!(graph.node_count(), 3);
    // Undirected first segment (2 directed edges) + one-way second
    assert_eq!(graph.edge_count(), 3);
    // The zero-length third feature got skipped with a warning
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings.as_slice()[0],
        LoadWarning::DegenerateEdge { feature_index: 2, .. }
    ));
}

#[test]
fn network_loader_rejects_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.geojson");
    let err = load_network(&path, METRIC, &projector(), &walk_config()).unwrap_err();
    assert!(matches!(err, IngestError::DataSource { .. }));
}

#[test]
fn network_loader_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "roads.geojson", "this is not geojson");
    let err = load_network(&path, METRIC, &projector(), &walk_config()).unwrap_err();
    assert!(matches!(err, IngestError::Malformed { .. }));
}

#[test]
fn facility_csv_snaps_and_reports_unsnapped() {
    let dir = TempDir::new().unwrap();
    let net = write_file(&dir, "roads.geojson", NETWORK);
    let (graph, _) = load_network(&net, METRIC, &projector(), &walk_config()).unwrap();
    let locator = NodeLocator::build(&graph);

    // First row 20 m from a node, second 5 km away
    let csv = write_file(
        &dir,
        "clinics.csv",
        "id,name,X,Y\nC1,Near Clinic,1000.0,520.0\nC2,Far Clinic,6000.0,500.0\n",
    );
    let category = FacilityCategory::new("clinic").unwrap();
    let (facilities, warnings) = load_facilities(
        &csv,
        METRIC,
        &category,
        &locator,
        &projector(),
        &walk_config(),
    )
    .unwrap();

    assert_eq!(facilities.len(), 1);
    assert_eq!(facilities[0].id.as_str(), "C1");
    assert!((facilities[0].snap_distance_m - 20.0).abs() < 1e-6);

    let unsnapped = warnings.unsnapped_facilities();
    assert_eq!(unsnapped.len(), 1);
    match unsnapped[0] {
        LoadWarning::UnsnappedFacility {
            id, nearest_node_m, ..
        } => {
            assert_eq!(id.as_str(), "C2");
            assert!(*nearest_node_m > 150.0);
        }
        other => panic!("unexpected warning {other:?}"),
    }
}

#[test]
fn facility_csv_filters_by_category_column() {
    let dir = TempDir::new().unwrap();
    let net = write_file(&dir, "roads.geojson", NETWORK);
    let (graph, _) = load_network(&net, METRIC, &projector(), &walk_config()).unwrap();
    let locator = NodeLocator::build(&graph);

    // Mixed CSV: the school row must not seed the clinic catchment
    let csv = write_file(
        &dir,
        "mixed.csv",
        "id,category,x,y\nC1,clinic,1000.0,510.0\nS1,school,1010.0,500.0\nM1,Clinic,1020.0,500.0\n",
    );
    let clinic = FacilityCategory::new("clinic").unwrap();
    let (facilities, warnings) = load_facilities(
        &csv,
        METRIC,
        &clinic,
        &locator,
        &projector(),
        &walk_config(),
    )
    .unwrap();

    // Case-insensitive match keeps C1 and M1, the school row is skipped
    let ids: Vec<&str> = facilities.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["C1", "M1"]);
    assert!(warnings.is_empty());
}

#[test]
fn facility_geojson_filters_by_category() {
    let dir = TempDir::new().unwrap();
    let net = write_file(&dir, "roads.geojson", NETWORK);
    let (graph, _) = load_network(&net, METRIC, &projector(), &walk_config()).unwrap();
    let locator = NodeLocator::build(&graph);

    let fac = write_file(
        &dir,
        "points.geojson",
        r#"{
          "type": "FeatureCollection",
          "features": [
            { "type": "Feature", "properties": { "id": "S1", "amenity": "school" },
              "geometry": { "type": "Point", "coordinates": [1010.0, 500.0] } },
            { "type": "Feature", "properties": { "id": "C9", "amenity": "clinic" },
              "geometry": { "type": "Point", "coordinates": [1020.0, 500.0] } }
          ]
        }"#,
    );
    let school = FacilityCategory::new("school").unwrap();
    let (facilities, warnings) = load_facilities(
        &fac,
        METRIC,
        &school,
        &locator,
        &projector(),
        &walk_config(),
    )
    .unwrap();
    assert_eq!(facilities.len(), 1);
    assert_eq!(facilities[0].id.as_str(), "S1");
    assert!(warnings.is_empty());
}

#[test]
fn raster_loader_clamps_negatives_and_skips_nodata() {
    let dir = TempDir::new().unwrap();
    let asc = write_file(
        &dir,
        "pop.asc",
        "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 100\nNODATA_value -9999\n\
         10 -9999\n-5 20\n",
    );
    let (cells, warnings) = load_population_raster(&asc, METRIC, &projector()).unwrap();
    // Only the two positive cells survive
    assert_eq!(cells.len(), 2);
    let total: f64 = cells.iter().map(|c| c.population).sum();
    assert!((total - 30.0).abs() < 1e-9);
    // One summary warning for the clamped negative value
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings.as_slice()[0],
        LoadWarning::NegativePopulation { .. }
    ));
}

#[test]
fn vector_population_splits_multipolygon_by_area() {
    let dir = TempDir::new().unwrap();
    // Two squares, 100x100 and 100x100 -> population split evenly
    let gj = write_file(
        &dir,
        "pop.geojson",
        r#"{
          "type": "FeatureCollection",
          "features": [
            { "type": "Feature", "properties": { "population": 80 },
              "geometry": { "type": "MultiPolygon", "coordinates": [
                [[[0,0],[100,0],[100,100],[0,100],[0,0]]],
                [[[500,0],[600,0],[600,100],[500,100],[500,0]]]
              ] } }
          ]
        }"#,
    );
    let (cells, warnings) = load_population_vector(&gj, METRIC, &projector()).unwrap();
    assert_eq!(cells.len(), 2);
    assert!((cells[0].population - 40.0).abs() < 1e-9);
    assert!((cells[1].population - 40.0).abs() < 1e-9);
    assert!(warnings.is_empty());
}

#[test]
fn unit_loader_reads_ids_and_names() {
    let dir = TempDir::new().unwrap();
    let gj = write_file(
        &dir,
        "wards.geojson",
        r#"{
          "type": "FeatureCollection",
          "features": [
            { "type": "Feature", "properties": { "ADM2_PCODE": "KE047", "NAME": "Westlands" },
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1000,0],[1000,1000],[0,1000],[0,0]]] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Point", "coordinates": [5, 5] } }
          ]
        }"#,
    );
    let (units, warnings) = load_units(&gj, METRIC, &projector()).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].id.as_str(), "KE047");
    assert_eq!(units[0].name, "Westlands");
    // Point feature skipped with a warning
    assert_eq!(warnings.len(), 1);
}

#[test]
fn wgs84_inputs_are_reprojected_to_meters() {
    let dir = TempDir::new().unwrap();
    // ~0.001 degrees of longitude near Nairobi is ~111 m
    let gj = write_file(
        &dir,
        "roads.geojson",
        r#"{
          "type": "FeatureCollection",
          "features": [
            { "type": "Feature", "properties": {},
              "geometry": { "type": "LineString",
                "coordinates": [[36.8200, -1.2900], [36.8210, -1.2900]] } }
          ]
        }"#,
    );
    let (graph, _) = load_network(&gj, Crs::Wgs84, &projector(), &walk_config()).unwrap();
    assert_eq!(graph.node_count(), 2);
    let points: Vec<_> = graph.nodes().map(|(_, p)| p).collect();
    let d = (points[1].x() - points[0].x()).hypot(points[1].y() - points[0].y());
    assert!((d - 111.0).abs() < 2.0, "projected length {d}");
}
