//! GeoJSON writer for network features

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{GeoJson, JsonObject, JsonValue};

use crate::error::Result;
use crate::vector::{AttributeValue, Feature, FeatureCollection, Geometry};

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Int(i) => JsonValue::from(*i),
        AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
    }
}

fn geometry_to_geojson(geometry: &Geometry) -> geojson::Geometry {
    let value = match geometry {
        Geometry::LineString(coords) => {
            geojson::Value::LineString(coords.iter().map(|c| c.to_vec()).collect())
        }
    };
    geojson::Geometry::new(value)
}

impl From<&Feature> for geojson::Feature {
    fn from(feature: &Feature) -> Self {
        let properties: JsonObject = feature
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), attribute_to_json(v)))
            .collect();
        geojson::Feature {
            bbox: None,
            geometry: Some(geometry_to_geojson(&feature.geometry)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Convert a feature collection to a GeoJSON document.
pub fn to_geojson(features: &FeatureCollection) -> GeoJson {
    GeoJson::FeatureCollection(geojson::FeatureCollection {
        bbox: None,
        features: features.iter().map(geojson::Feature::from).collect(),
        foreign_members: None,
    })
}

/// Write a feature collection as GeoJSON to any writer.
pub fn write_geojson_to_writer<W: Write>(mut writer: W, features: &FeatureCollection) -> Result<()> {
    writer.write_all(to_geojson(features).to_string().as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write a feature collection to a GeoJSON file.
pub fn write_geojson(path: impl AsRef<Path>, features: &FeatureCollection) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_geojson_to_writer(BufWriter::new(file), features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_feature_keeps_elevation() {
        let mut feature = Feature::new(Geometry::LineString(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
        feature.set_property("id", AttributeValue::Int(7));
        feature.set_property("slope", AttributeValue::Float(0.5));
        feature.set_property("chi", AttributeValue::Null);
        let collection: FeatureCollection = vec![feature].into_iter().collect();

        let mut buf = Vec::new();
        write_geojson_to_writer(&mut buf, &collection).unwrap();
        let parsed: GeoJson = String::from_utf8(buf).unwrap().parse().unwrap();

        let GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a feature collection");
        };
        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.property("id"), Some(&JsonValue::from(7)));
        assert_eq!(f.property("slope"), Some(&JsonValue::from(0.5)));
        assert_eq!(f.property("chi"), Some(&JsonValue::Null));
        match &f.geometry.as_ref().unwrap().value {
            geojson::Value::LineString(coords) => {
                assert_eq!(coords, &vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
            }
            other => panic!("expected a line string, got {:?}", other),
        }
    }
}
