//! Node table CSV reader

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeTable, OptionalColumns};
use crate::schema::NodeSchema;

/// Column positions resolved against a header row.
#[derive(Debug, Clone)]
pub(crate) struct ColumnIndex {
    node_id: usize,
    receiver: usize,
    source_key: usize,
    longitude: usize,
    latitude: usize,
    elevation: usize,
    flow_distance: usize,
    drainage_area: usize,
    chi: Option<usize>,
    m_chi: Option<usize>,
    basin_key: Option<usize>,
    /// (position, name) of columns the schema does not interpret
    pub(crate) extra: Vec<(usize, String)>,
}

impl ColumnIndex {
    /// Resolve the schema against `headers`. Columns listed in `reserved`
    /// are neither interpreted nor carried as extra columns.
    pub(crate) fn resolve(headers: &StringRecord, schema: &NodeSchema, reserved: &[&str]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |field: &str, name: &str| {
            find(name).ok_or_else(|| {
                Error::Schema(format!("missing required column `{}` (for {})", name, field))
            })
        };

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !schema.knows(h.trim()) && !reserved.contains(&h.trim()))
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        Ok(Self {
            node_id: require("node_id", &schema.node_id)?,
            receiver: require("receiver", &schema.receiver)?,
            source_key: require("source_key", &schema.source_key)?,
            longitude: require("longitude", &schema.longitude)?,
            latitude: require("latitude", &schema.latitude)?,
            elevation: require("elevation", &schema.elevation)?,
            flow_distance: require("flow_distance", &schema.flow_distance)?,
            drainage_area: require("drainage_area", &schema.drainage_area)?,
            chi: find(&schema.chi),
            m_chi: find(&schema.m_chi),
            basin_key: find(&schema.basin_key),
            extra,
        })
    }

    pub(crate) fn optional_columns(&self) -> OptionalColumns {
        OptionalColumns {
            chi: self.chi.is_some(),
            m_chi: self.m_chi.is_some(),
            basin_key: self.basin_key.is_some(),
        }
    }

    pub(crate) fn extra_names(&self) -> Vec<String> {
        self.extra.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Parse one data row. `line` is used in error messages.
    pub(crate) fn parse(&self, record: &StringRecord, schema: &NodeSchema, line: u64) -> Result<Node> {
        let field = Field { record, line };
        Ok(Node {
            id: field.id(self.node_id, &schema.node_id)?,
            receiver: field.optional_id(self.receiver, &schema.receiver)?,
            source_key: field.id(self.source_key, &schema.source_key)?,
            longitude: field.float(self.longitude, &schema.longitude)?,
            latitude: field.float(self.latitude, &schema.latitude)?,
            elevation: field.float(self.elevation, &schema.elevation)?,
            flow_distance: field.float(self.flow_distance, &schema.flow_distance)?,
            drainage_area: field.float(self.drainage_area, &schema.drainage_area)?,
            chi: self
                .chi
                .map(|i| field.optional_float(i, &schema.chi))
                .transpose()?
                .flatten(),
            m_chi: self
                .m_chi
                .map(|i| field.optional_float(i, &schema.m_chi))
                .transpose()?
                .flatten(),
            basin_key: self
                .basin_key
                .map(|i| field.optional_id(i, &schema.basin_key))
                .transpose()?
                .flatten(),
            extra: self
                .extra
                .iter()
                .map(|(i, _)| record.get(*i).unwrap_or("").to_string())
                .collect(),
        })
    }
}

/// Typed access to the cells of one record.
pub(crate) struct Field<'a> {
    pub(crate) record: &'a StringRecord,
    pub(crate) line: u64,
}

impl Field<'_> {
    fn raw(&self, index: usize) -> &str {
        self.record.get(index).unwrap_or("").trim()
    }

    fn bad(&self, column: &str, value: &str, expected: &str) -> Error {
        Error::Schema(format!(
            "line {}: column `{}` has value `{}`, expected {}",
            self.line, column, value, expected
        ))
    }

    pub(crate) fn float(&self, index: usize, column: &str) -> Result<f64> {
        let value = self.raw(index);
        value.parse().map_err(|_| self.bad(column, value, "a number"))
    }

    pub(crate) fn optional_float(&self, index: usize, column: &str) -> Result<Option<f64>> {
        if self.raw(index).is_empty() {
            return Ok(None);
        }
        self.float(index, column).map(Some)
    }

    /// Integer id. Whole-valued floats such as `12.0` are accepted.
    pub(crate) fn id(&self, index: usize, column: &str) -> Result<NodeId> {
        let value = self.raw(index);
        if let Ok(id) = value.parse::<i64>() {
            return Ok(id);
        }
        match value.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
            _ => Err(self.bad(column, value, "an integer id")),
        }
    }

    pub(crate) fn optional_id(&self, index: usize, column: &str) -> Result<Option<NodeId>> {
        if self.raw(index).is_empty() {
            return Ok(None);
        }
        self.id(index, column).map(Some)
    }
}

/// Read a node table from a CSV file.
pub fn read_node_table(path: impl AsRef<Path>, schema: &NodeSchema) -> Result<NodeTable> {
    let file = File::open(path.as_ref())?;
    read_node_table_from_reader(BufReader::new(file), schema)
}

/// Read a node table from any CSV source.
///
/// Duplicate node ids are rejected.
pub fn read_node_table_from_reader<R: Read>(reader: R, schema: &NodeSchema) -> Result<NodeTable> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers, schema, &[])?;

    let mut table = NodeTable::with_columns(columns.optional_columns(), columns.extra_names());
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);
        table.push(columns.parse(&record, schema, line)?)?;
    }

    debug!(
        "Read {} nodes ({} extra columns)",
        table.len(),
        table.extra_columns().len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CSV: &str = "\
NI,receiver_NI,source_key,longitude,latitude,elevation,flow_distance,drainage_area,m_chi,basin_key,lith
10,11,0,-92.5,44.1,310.5,1200.0,5000.0,12.5,3,granite
11,12,0,-92.6,44.2,300.0,1100.0,6000.0,,3,shale
12,12,0,-92.7,44.3,290.0,1000.0,7000.0,14.0,3,
";

    #[test]
    fn test_read_lsdtt_columns() {
        let table = read_node_table_from_reader(CSV.as_bytes(), &NodeSchema::default()).unwrap();
        assert_eq!(table.len(), 3);

        let first = table.get(10).unwrap();
        assert_eq!(first.receiver, Some(11));
        assert_eq!(first.m_chi, Some(12.5));
        assert_eq!(first.basin_key, Some(3));
        assert_eq!(first.extra, vec!["granite".to_string()]);
        assert_eq!(table.get(11).unwrap().m_chi, None);

        let cols = table.columns();
        assert!(!cols.chi);
        assert!(cols.m_chi);
        assert!(cols.basin_key);
        assert_eq!(table.extra_columns(), &["lith".to_string()]);
    }

    #[test]
    fn test_numeric_fields() {
        let table = read_node_table_from_reader(CSV.as_bytes(), &NodeSchema::default()).unwrap();
        let node = table.get(11).unwrap();
        assert_relative_eq!(node.longitude, -92.6);
        assert_relative_eq!(node.latitude, 44.2);
        assert_relative_eq!(node.elevation, 300.0);
        assert_relative_eq!(node.drainage_area, 6000.0);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chi_data_map.csv");
        std::fs::write(&path, CSV).unwrap();
        let table = read_node_table(&path, &NodeSchema::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_relative_eq!(table.get(12).unwrap().flow_distance, 1000.0);
    }

    #[test]
    fn test_missing_required_column() {
        let err = read_node_table_from_reader(CSV.as_bytes(), &NodeSchema::legacy()).unwrap_err();
        match err {
            Error::Schema(msg) => assert!(msg.contains("`node`"), "unexpected message: {}", msg),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_reports_line() {
        let csv = CSV.replace("310.5", "high");
        let err = read_node_table_from_reader(csv.as_bytes(), &NodeSchema::default()).unwrap_err();
        match err {
            Error::Schema(msg) => {
                assert!(msg.contains("line 2"), "unexpected message: {}", msg);
                assert!(msg.contains("elevation"), "unexpected message: {}", msg);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_float_formatted_ids() {
        let csv = CSV.replace("10,11,0", "10.0,11.0,0.0");
        let table = read_node_table_from_reader(csv.as_bytes(), &NodeSchema::default()).unwrap();
        assert_eq!(table.get(10).unwrap().receiver, Some(11));
    }

    #[test]
    fn test_empty_receiver_is_none() {
        let csv = CSV.replace("12,12,0", "12,,0");
        let table = read_node_table_from_reader(csv.as_bytes(), &NodeSchema::default()).unwrap();
        assert_eq!(table.get(12).unwrap().receiver, None);
    }
}
