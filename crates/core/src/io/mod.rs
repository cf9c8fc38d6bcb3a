//! I/O for node tables and network outputs
//!
//! Every reader and writer has a path-based form and a `*_reader` /
//! `*_writer` form for in-memory buffers.

mod export;
mod geojson_io;
mod table;

pub use export::{
    read_network_export, read_network_export_from_reader, write_node_export,
    write_node_export_to_writer, NetworkExport, NODE_TYPE_COLUMN, SEGMENT_ID_COLUMN, TOSEG_COLUMN,
};
pub use geojson_io::{to_geojson, write_geojson, write_geojson_to_writer};
pub use table::{read_node_table, read_node_table_from_reader};
