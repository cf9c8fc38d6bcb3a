//! Node export CSV
//!
//! One row per (segment, member node): every input column followed by
//! `segment_id`, `toseg` and `network_node_type`. Nodes shared by two
//! segments at a confluence appear once per segment, so the file alone is
//! enough to rebuild the segment collection on a later run.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::table::{ColumnIndex, Field};
use crate::node::{Node, NodeId, NodeKind, NodeTable};
use crate::schema::NodeSchema;
use crate::segment::{Segment, SegmentId, ToSegment};

pub const SEGMENT_ID_COLUMN: &str = "segment_id";
pub const TOSEG_COLUMN: &str = "toseg";
pub const NODE_TYPE_COLUMN: &str = "network_node_type";

const RESERVED: [&str; 3] = [SEGMENT_ID_COLUMN, TOSEG_COLUMN, NODE_TYPE_COLUMN];

fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn header_row(nodes: &NodeTable, schema: &NodeSchema) -> Vec<String> {
    let cols = nodes.columns();
    let mut header: Vec<String> = schema.required().iter().map(|(_, name)| name.to_string()).collect();
    if cols.chi {
        header.push(schema.chi.clone());
    }
    if cols.m_chi {
        header.push(schema.m_chi.clone());
    }
    if cols.basin_key {
        header.push(schema.basin_key.clone());
    }
    header.extend(nodes.extra_columns().iter().cloned());
    header.extend(RESERVED.iter().map(|c| c.to_string()));
    header
}

fn node_row(node: &Node, nodes: &NodeTable) -> Vec<String> {
    let cols = nodes.columns();
    let mut row = vec![
        node.id.to_string(),
        format_optional(node.receiver),
        node.source_key.to_string(),
        node.longitude.to_string(),
        node.latitude.to_string(),
        node.elevation.to_string(),
        node.flow_distance.to_string(),
        node.drainage_area.to_string(),
    ];
    if cols.chi {
        row.push(format_optional(node.chi));
    }
    if cols.m_chi {
        row.push(format_optional(node.m_chi));
    }
    if cols.basin_key {
        row.push(format_optional(node.basin_key));
    }
    row.extend(node.extra.iter().cloned());
    row
}

/// Write the node export for `segments` to any writer.
///
/// `kinds` tags nodes with their network role; untagged nodes are plain
/// channel nodes.
pub fn write_node_export_to_writer<W: Write>(
    writer: W,
    nodes: &NodeTable,
    segments: &[Segment],
    kinds: &HashMap<NodeId, NodeKind>,
    schema: &NodeSchema,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header_row(nodes, schema))?;

    for segment in segments {
        for &id in &segment.nodes {
            let node = nodes.require(id)?;
            let kind = kinds.get(&id).copied().unwrap_or(NodeKind::Channel);
            let mut row = node_row(node, nodes);
            row.push(segment.id.to_string());
            row.push(segment.toseg.to_string());
            row.push(kind.as_str().to_string());
            wtr.write_record(row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write the node export to a CSV file.
pub fn write_node_export(
    path: impl AsRef<Path>,
    nodes: &NodeTable,
    segments: &[Segment],
    kinds: &HashMap<NodeId, NodeKind>,
    schema: &NodeSchema,
) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_node_export_to_writer(BufWriter::new(file), nodes, segments, kinds, schema)
}

/// Nodes and segments recovered from a node export.
#[derive(Debug, Clone)]
pub struct NetworkExport {
    pub nodes: NodeTable,
    pub segments: Vec<Segment>,
}

/// Rebuild nodes and segments from a node export file.
pub fn read_network_export(path: impl AsRef<Path>, schema: &NodeSchema) -> Result<NetworkExport> {
    let file = File::open(path.as_ref())?;
    read_network_export_from_reader(BufReader::new(file), schema)
}

/// Rebuild nodes and segments from a node export.
///
/// Segments keep the ids written in the file; they are ordered by first
/// appearance. Statistics are not persisted in the node export and come
/// back empty.
pub fn read_network_export_from_reader<R: Read>(reader: R, schema: &NodeSchema) -> Result<NetworkExport> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers, schema, &RESERVED)?;
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Schema(format!("missing required column `{}`", name)))
    };
    let segment_col = position(SEGMENT_ID_COLUMN)?;
    let toseg_col = position(TOSEG_COLUMN)?;

    let mut nodes = NodeTable::with_columns(columns.optional_columns(), columns.extra_names());
    let mut segments: Vec<Segment> = Vec::new();
    let mut by_id: HashMap<SegmentId, usize> = HashMap::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);
        let field = Field { record: &record, line };

        let raw_id = field.id(segment_col, SEGMENT_ID_COLUMN)?;
        let id = u32::try_from(raw_id)
            .map(SegmentId)
            .map_err(|_| Error::Schema(format!("line {}: invalid segment id {}", line, raw_id)))?;
        let raw_toseg = field.id(toseg_col, TOSEG_COLUMN)?;
        let toseg = ToSegment::from_raw(raw_toseg)
            .ok_or_else(|| Error::Schema(format!("line {}: invalid toseg {}", line, raw_toseg)))?;

        let node = columns.parse(&record, schema, line)?;
        let node_id = node.id;
        nodes.push_or_keep(node);

        let index = *by_id.entry(id).or_insert_with(|| {
            segments.push(Segment::new(id, toseg, Vec::new()));
            segments.len() - 1
        });
        let segment = &mut segments[index];
        if segment.toseg != toseg {
            return Err(Error::Schema(format!(
                "line {}: segment {} has conflicting toseg values {} and {}",
                line, id, segment.toseg, toseg
            )));
        }
        segment.nodes.push(node_id);
    }

    debug!("Reloaded {} segments over {} nodes", segments.len(), nodes.len());
    Ok(NetworkExport { nodes, segments })
}
