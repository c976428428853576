use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::capture::Geometry;
use crate::errors::{Error, Result};

/// Properties this subsystem reads or writes, typed; everything else is
/// carried in the flattened passthrough map for round-trip fidelity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentProperties {
    #[serde(rename = "wof:id", skip_serializing_if = "Option::is_none")]
    pub wof_id: Option<i64>,
    #[serde(rename = "wof:repo", skip_serializing_if = "Option::is_none")]
    pub wof_repo: Option<String>,
    #[serde(rename = "wof:lastmodified", skip_serializing_if = "Option::is_none")]
    pub wof_lastmodified: Option<i64>,
    #[serde(rename = "src:geom", skip_serializing_if = "Option::is_none")]
    pub src_geom: Option<String>,
    #[serde(rename = "src:geom_alt", skip_serializing_if = "Option::is_none")]
    pub src_geom_alt: Option<Vec<String>>,
    #[serde(rename = "src:alt_label", skip_serializing_if = "Option::is_none")]
    pub src_alt_label: Option<String>,
    #[serde(rename = "lbl:longitude", skip_serializing_if = "Option::is_none")]
    pub lbl_longitude: Option<f64>,
    #[serde(rename = "lbl:latitude", skip_serializing_if = "Option::is_none")]
    pub lbl_latitude: Option<f64>,
    #[serde(rename = "geotag:angle", skip_serializing_if = "Option::is_none")]
    pub geotag_angle: Option<f64>,
    #[serde(rename = "geotag:bearing", skip_serializing_if = "Option::is_none")]
    pub geotag_bearing: Option<f64>,
    #[serde(rename = "geotag:distance", skip_serializing_if = "Option::is_none")]
    pub geotag_distance: Option<f64>,
    #[serde(
        rename = "geotag:camera_longitude",
        skip_serializing_if = "Option::is_none"
    )]
    pub geotag_camera_longitude: Option<f64>,
    #[serde(
        rename = "geotag:camera_latitude",
        skip_serializing_if = "Option::is_none"
    )]
    pub geotag_camera_latitude: Option<f64>,
    #[serde(
        rename = "geotag:target_longitude",
        skip_serializing_if = "Option::is_none"
    )]
    pub geotag_target_longitude: Option<f64>,
    #[serde(
        rename = "geotag:target_latitude",
        skip_serializing_if = "Option::is_none"
    )]
    pub geotag_target_latitude: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The primary, long-lived gazetteer record for a place. Owned by the store;
/// this subsystem only holds it for the span of one read-modify-write call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalDocument {
    pub id: i64,
    #[serde(rename = "type")]
    pub feature_type: String,
    pub properties: DocumentProperties,
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CanonicalDocument {
    pub fn from_bytes(body: &[u8]) -> Result<CanonicalDocument> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The repository name every processed document must carry.
    pub fn repo(&self) -> Result<&str> {
        self.properties
            .wof_repo
            .as_deref()
            .ok_or_else(|| Error::MalformedFeature("missing 'wof:repo' property".to_string()))
    }

    /// Records `label` as the active geometry source: `src:geom` is replaced
    /// and `src:geom_alt` becomes the active label followed by the existing
    /// list with duplicate occurrences of the active label removed, order
    /// preserved.
    pub fn apply_geom_source(&mut self, label: &str) {
        let existing = self.properties.src_geom_alt.take().unwrap_or_default();

        let mut geom_alt = vec![label.to_string()];
        for known in existing {
            if known != label {
                geom_alt.push(known);
            }
        }

        self.properties.src_geom = Some(label.to_string());
        self.properties.src_geom_alt = Some(geom_alt);
    }
}

/// A secondary record expressing an alternative geometry view of a place,
/// keyed by (place id, source label). Full-overwrite on rewrite; never
/// carries a bbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternateDocument {
    pub id: i64,
    #[serde(rename = "type")]
    pub feature_type: String,
    pub properties: DocumentProperties,
    pub geometry: Geometry,
}
