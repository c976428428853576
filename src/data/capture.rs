use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};

/// GeoJSON geometry. Coordinates are kept untyped so any nesting depth
/// round-trips; the typed accessors cover the shapes this subsystem needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Value,
}

impl Geometry {
    pub fn point(lon: f64, lat: f64) -> Geometry {
        Geometry {
            geometry_type: "Point".to_string(),
            coordinates: serde_json::json!([lon, lat]),
        }
    }

    /// Coordinate pair of a `Point` geometry.
    pub fn point_coordinates(&self) -> Option<(f64, f64)> {
        if self.geometry_type != "Point" {
            return None;
        }
        pair_of(&self.coordinates)
    }

    /// First coordinate pair reachable by descending into the leading
    /// element at every nesting level. For a polygon this is the first
    /// vertex of the exterior ring.
    pub fn first_vertex(&self) -> Option<(f64, f64)> {
        leading_pair(&self.coordinates)
    }

    /// Every coordinate pair in the geometry, in encounter order.
    pub fn coordinate_pairs(&self) -> Vec<(f64, f64)> {
        let mut pairs = Vec::new();
        collect_pairs(&self.coordinates, &mut pairs);
        pairs
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`, or None for an empty geometry.
    pub fn bounding_box(&self) -> Option<Vec<f64>> {
        let pairs = self.coordinate_pairs();
        let (first_lon, first_lat) = *pairs.first()?;

        let mut bbox = vec![first_lon, first_lat, first_lon, first_lat];
        for (lon, lat) in pairs {
            bbox[0] = bbox[0].min(lon);
            bbox[1] = bbox[1].min(lat);
            bbox[2] = bbox[2].max(lon);
            bbox[3] = bbox[3].max(lat);
        }
        Some(bbox)
    }
}

fn pair_of(value: &Value) -> Option<(f64, f64)> {
    let arr = value.as_array()?;
    Some((arr.first()?.as_f64()?, arr.get(1)?.as_f64()?))
}

fn leading_pair(value: &Value) -> Option<(f64, f64)> {
    let arr = value.as_array()?;
    let first = arr.first()?;

    if first.is_number() {
        pair_of(value)
    } else {
        leading_pair(first)
    }
}

fn collect_pairs(value: &Value, pairs: &mut Vec<(f64, f64)>) {
    let Some(arr) = value.as_array() else {
        return;
    };

    match arr.first() {
        Some(first) if first.is_number() => {
            if let Some(pair) = pair_of(value) {
                pairs.push(pair);
            }
        }
        _ => {
            for inner in arr {
                collect_pairs(inner, pairs);
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_latitude: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A camera-pose annotation as submitted by the geotagging workflow. The
/// feature's geometry is the field-of-view polygon; the point-of-view is
/// derived, never stored as the capture's geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeotagCapture {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub properties: CaptureProperties,
    pub geometry: Geometry,
}

impl GeotagCapture {
    /// The visible-sector polygon.
    pub fn field_of_view(&self) -> &Geometry {
        &self.geometry
    }

    /// The camera location as a point geometry. Prefers the capture's
    /// explicit camera coordinates, falling back to the first vertex of the
    /// field-of-view polygon (its apex).
    pub fn point_of_view(&self) -> Result<Geometry> {
        if let (Some(lon), Some(lat)) = (
            self.properties.camera_longitude,
            self.properties.camera_latitude,
        ) {
            return Ok(Geometry::point(lon, lat));
        }

        match self.geometry.first_vertex() {
            Some((lon, lat)) => Ok(Geometry::point(lon, lat)),
            None => Err(Error::MalformedFeature(
                "capture has no camera coordinates and no field-of-view vertices".to_string(),
            )),
        }
    }
}
