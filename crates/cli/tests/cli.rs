//! End-to-end runs of the `rivernet` binary.

use std::path::Path;
use std::process::{Command, Output};

const NODES_CSV: &str = "\
node,receiver_node,source_key,longitude,latitude,elevation,flow_distance,drainage_area,m_chi,basin_key
1,2,0,-92.10,44.50,310.0,3200.0,150000.0,55.0,7
2,5,0,-92.09,44.49,290.0,2800.0,300000.0,60.0,7
3,4,1,-92.05,44.52,305.0,3100.0,120000.0,40.0,7
4,5,1,-92.06,44.50,288.0,2750.0,260000.0,45.0,7
5,6,0,-92.07,44.48,270.0,2300.0,900000.0,70.0,7
6,99,0,-92.06,44.46,250.0,1800.0,1000000.0,72.0,7
";

fn rivernet(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rivernet"))
        .args(args)
        .output()
        .expect("failed to run rivernet")
}

fn build(dir: &Path) -> (String, String) {
    let input = dir.join("chi_data_map.csv");
    std::fs::write(&input, NODES_CSV).unwrap();
    let output = dir.join("network");
    let out = rivernet(&[
        "build",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--legacy-columns",
        "-s",
        "-e",
        "-k",
        "--select",
        dir.join("select").to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    (
        dir.join("network.geojson").to_string_lossy().into_owned(),
        dir.join("network_nodes.csv").to_string_lossy().into_owned(),
    )
}

#[test]
fn test_build_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let (segments, nodes) = build(dir.path());

    let geojson = std::fs::read_to_string(&segments).unwrap();
    assert!(geojson.contains("\"toseg\""));
    assert!(geojson.contains("\"z mean\""));
    assert!(geojson.contains("\"ksn\""));
    assert!(!geojson.contains("\"chi\""));

    let export = std::fs::read_to_string(&nodes).unwrap();
    let header = export.lines().next().unwrap();
    assert!(header.starts_with("node,receiver_node,"));
    assert!(header.ends_with("segment_id,toseg,network_node_type"));
    assert!(export.contains("confluence"));

    let select = std::fs::read_to_string(dir.path().join("select.geojson")).unwrap();
    assert!(select.contains("\"segment_ID\""));
}

#[test]
fn test_path_writes_plots() {
    let dir = tempfile::tempdir().unwrap();
    let (_, nodes) = build(dir.path());
    let plots = dir.path().join("plots");

    let out = rivernet(&[
        "path",
        &nodes,
        "--legacy-columns",
        "--id",
        "1",
        "--lp",
        "--lp-all",
        "--lp-ksn",
        "--map",
        "--path-map",
        "--title",
        "Test River",
        "--out-dir",
        plots.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Path: 1 -> 2 -> outlet"));

    for name in [
        "PathChannelLongProfile",
        "AllChannelLongProfile",
        "KsnLongProfile",
        "NetworkMap",
        "PathMap",
    ] {
        let svg = std::fs::read_to_string(plots.join(format!("{}.svg", name))).unwrap();
        assert!(svg.contains("Test River"));
    }
}

#[test]
fn test_unknown_segment_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, nodes) = build(dir.path());

    let out = rivernet(&["path", &nodes, "--legacy-columns", "--id", "42"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No segment with id 42"));
}

#[test]
fn test_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("chi_data_map.csv");
    std::fs::write(&input, NODES_CSV).unwrap();

    // Default naming expects `NI`, which this table lacks.
    let out = rivernet(&["info", input.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("NI"));
}
