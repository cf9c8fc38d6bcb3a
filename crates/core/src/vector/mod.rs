//! Vector features for network export
//!
//! Segments become 3-D line features. Coordinates are (longitude,
//! latitude, elevation).

use std::collections::BTreeMap;

use crate::node::NodeTable;
use crate::segment::{Segment, SegmentAttributes};

/// Attribute value types
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Int(i64),
    Float(f64),
}

impl From<Option<f64>> for AttributeValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => AttributeValue::Float(v),
            _ => AttributeValue::Null,
        }
    }
}

/// Feature geometry with elevation
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    LineString(Vec<[f64; 3]>),
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry,
    /// Feature attributes, ordered by name
    pub properties: BTreeMap<String, AttributeValue>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: BTreeMap::new(),
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Line feature for a segment carrying `id`, `toseg` and the requested statistics.
    pub fn from_segment(segment: &Segment, nodes: &NodeTable, attributes: &SegmentAttributes) -> Self {
        let mut feature = Self::new(Geometry::LineString(segment.coordinates(nodes)));
        feature.set_property("id", AttributeValue::Int(i64::from(segment.id.0)));
        feature.set_property("toseg", AttributeValue::Int(segment.toseg.to_raw()));
        for (name, value) in segment.stats.named(attributes) {
            feature.set_property(name, value.into());
        }
        feature
    }

    /// Reduced line feature used to pick a starting segment in a GIS.
    pub fn selection_from_segment(segment: &Segment, nodes: &NodeTable) -> Self {
        let mut feature = Self::new(Geometry::LineString(segment.coordinates(nodes)));
        feature.set_property("segment_ID", AttributeValue::Int(i64::from(segment.id.0)));
        feature.set_property("toseg", AttributeValue::Int(segment.toseg.to_raw()));
        feature
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::segment::{SegmentId, SegmentStats, ToSegment};

    fn table() -> NodeTable {
        let mut a = Node::new(1, Some(2), 0);
        a.longitude = -92.0;
        a.latitude = 44.0;
        a.elevation = 300.0;
        let mut b = Node::new(2, None, 0);
        b.longitude = -92.1;
        b.latitude = 44.1;
        b.elevation = 290.0;
        NodeTable::from_nodes(vec![a, b]).unwrap()
    }

    #[test]
    fn test_segment_feature_properties() {
        let mut segment = Segment::new(SegmentId(4), ToSegment::Outlet, vec![1, 2]);
        segment.stats = SegmentStats {
            slope: Some(0.02),
            ..SegmentStats::default()
        };
        let attrs = SegmentAttributes {
            slope: true,
            chi: true,
            ..SegmentAttributes::none()
        };

        let feature = Feature::from_segment(&segment, &table(), &attrs);
        assert_eq!(feature.get_property("id"), Some(&AttributeValue::Int(4)));
        assert_eq!(feature.get_property("toseg"), Some(&AttributeValue::Int(-1)));
        assert_eq!(feature.get_property("slope"), Some(&AttributeValue::Float(0.02)));
        assert_eq!(feature.get_property("chi"), Some(&AttributeValue::Null));
        assert_eq!(feature.get_property("ksn"), None);
        assert_eq!(
            feature.geometry,
            Geometry::LineString(vec![[-92.0, 44.0, 300.0], [-92.1, 44.1, 290.0]])
        );
    }

    #[test]
    fn test_selection_feature_has_only_links() {
        let segment = Segment::new(SegmentId(2), ToSegment::Segment(SegmentId(5)), vec![1, 2]);
        let feature = Feature::selection_from_segment(&segment, &table());
        assert_eq!(feature.properties.len(), 2);
        assert_eq!(feature.get_property("segment_ID"), Some(&AttributeValue::Int(2)));
        assert_eq!(feature.get_property("toseg"), Some(&AttributeValue::Int(5)));
    }

    #[test]
    fn test_non_finite_stat_is_null() {
        assert_eq!(AttributeValue::from(Some(f64::NAN)), AttributeValue::Null);
        assert_eq!(AttributeValue::from(None), AttributeValue::Null);
    }
}
