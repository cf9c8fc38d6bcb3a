//! Build a network, write the node export, reload it and extract paths from
//! the reloaded segments.

use rivernet_algorithms::network::{build_network, NetworkParams};
use rivernet_algorithms::path::extract_path;
use rivernet_algorithms::profile::LongProfile;
use rivernet_core::io::{read_network_export, read_node_table_from_reader, write_node_export};
use rivernet_core::schema::NodeSchema;
use rivernet_core::segment::{SegmentAttributes, SegmentId};

const NODES_CSV: &str = "\
NI,receiver_NI,source_key,longitude,latitude,elevation,flow_distance,drainage_area,chi,m_chi,basin_key
1,2,0,-92.10,44.50,310.0,3200.0,150000.0,4.1,55.0,7
2,5,0,-92.09,44.49,290.0,2800.0,300000.0,3.6,60.0,7
3,4,1,-92.05,44.52,305.0,3100.0,120000.0,4.0,40.0,7
4,5,1,-92.06,44.50,288.0,2750.0,260000.0,3.5,45.0,7
5,6,0,-92.07,44.48,270.0,2300.0,900000.0,2.9,70.0,7
6,7,0,-92.06,44.46,250.0,1800.0,1000000.0,2.2,72.0,7
7,99,0,-92.05,44.44,230.0,1200.0,1100000.0,1.5,75.0,7
";

#[test]
fn test_export_reload_path() {
    let schema = NodeSchema::default();
    let nodes = read_node_table_from_reader(NODES_CSV.as_bytes(), &schema).unwrap();
    let params = NetworkParams {
        attributes: SegmentAttributes::all(),
        ..NetworkParams::default()
    };
    let network = build_network(&nodes, &params).unwrap();
    assert_eq!(network.segments.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("network_nodes.csv");
    write_node_export(&export, &network.nodes, &network.segments, &network.node_kinds(), &schema).unwrap();

    let reloaded = read_network_export(&export, &schema).unwrap();
    assert_eq!(reloaded.nodes.len(), nodes.len());
    assert_eq!(reloaded.segments.len(), network.segments.len());
    for (a, b) in network.segments.iter().zip(&reloaded.segments) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.toseg, b.toseg);
        assert_eq!(a.nodes, b.nodes);
    }

    let start = network
        .segments
        .iter()
        .find(|s| s.first_node() == Some(3))
        .map(|s| s.id)
        .unwrap();
    let built = extract_path(&network.segments, start).unwrap();
    let loaded = extract_path(&reloaded.segments, start).unwrap();
    assert_eq!(built.ids(), loaded.ids());
    assert_eq!(loaded.node_ids(), vec![3, 4, 5, 6, 7]);

    let profile = LongProfile::for_path(&loaded, &reloaded.nodes).unwrap();
    assert_eq!(profile.distance_range(), Some((1.2, 3.1)));
    assert_eq!(reloaded.nodes.get(7).and_then(|n| n.m_chi), Some(75.0));
}

#[test]
fn test_reloaded_missing_segment() {
    let schema = NodeSchema::default();
    let nodes = read_node_table_from_reader(NODES_CSV.as_bytes(), &schema).unwrap();
    let network = build_network(&nodes, &NetworkParams::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("network_nodes.csv");
    write_node_export(&export, &network.nodes, &network.segments, &network.node_kinds(), &schema).unwrap();

    let reloaded = read_network_export(&export, &schema).unwrap();
    assert!(extract_path(&reloaded.segments, SegmentId(40)).is_err());
}
