use serde_json::Value;

use crate::data::capture::GeotagCapture;
use crate::data::document::{AlternateDocument, DocumentProperties};
use crate::errors::{Error, Result};

fn required(value: Option<f64>, name: &str) -> Result<f64> {
    value.ok_or_else(|| Error::MalformedFeature(format!("missing '{}' property", name)))
}

/// Builds the alternate-geometry document for a capture. Pure: identical
/// inputs always yield an identical document. The document's geometry is the
/// capture's field-of-view polygon, never the derived point-of-view.
pub fn capture_to_alt_document(
    capture: &GeotagCapture,
    place_id: i64,
    repo: &str,
    storage_label: &str,
    provenance_label: &str,
) -> Result<AlternateDocument> {
    let angle = required(capture.properties.angle, "angle")?;
    let bearing = required(capture.properties.bearing, "bearing")?;
    let distance = required(capture.properties.distance, "distance")?;

    let properties = DocumentProperties {
        wof_id: Some(place_id),
        wof_repo: Some(repo.to_string()),
        src_alt_label: Some(storage_label.to_string()),
        src_geom: Some(provenance_label.to_string()),
        geotag_angle: Some(angle),
        geotag_bearing: Some(bearing),
        geotag_distance: Some(distance),
        geotag_camera_longitude: capture.properties.camera_longitude,
        geotag_camera_latitude: capture.properties.camera_latitude,
        geotag_target_longitude: capture.properties.target_longitude,
        geotag_target_latitude: capture.properties.target_latitude,
        ..Default::default()
    };

    Ok(AlternateDocument {
        id: place_id,
        feature_type: "Feature".to_string(),
        properties,
        geometry: capture.field_of_view().clone(),
    })
}

/// Normalized export of an alternate document: keys sorted at every level,
/// any `bbox` stripped. serde_json's map is BTree-backed, which is what
/// makes the key ordering stable.
pub fn alt_document_to_bytes(doc: &AlternateDocument) -> Result<Vec<u8>> {
    let mut value = serde_json::to_value(doc)?;

    if let Value::Object(map) = &mut value {
        map.remove("bbox");
    }

    Ok(serde_json::to_vec(&value)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::capture::{CaptureProperties, Geometry};

    fn sample_capture() -> GeotagCapture {
        GeotagCapture {
            feature_type: "Feature".to_string(),
            properties: CaptureProperties {
                angle: Some(33.3),
                bearing: Some(271.0),
                distance: Some(45.0),
                camera_longitude: Some(-122.386),
                camera_latitude: Some(37.616),
                target_longitude: Some(-122.390),
                target_latitude: Some(37.620),
                ..Default::default()
            },
            geometry: Geometry {
                geometry_type: "Polygon".to_string(),
                coordinates: serde_json::json!([[
                    [-122.386, 37.616],
                    [-122.390, 37.620],
                    [-122.382, 37.621],
                    [-122.386, 37.616]
                ]]),
            },
        }
    }

    #[test]
    fn properties_are_namespaced_and_labeled() {
        let doc =
            capture_to_alt_document(&sample_capture(), 85633041, "sfomuseum-data", "geotag", "geotag-fov")
                .unwrap();

        assert_eq!(doc.id, 85633041);
        assert_eq!(doc.feature_type, "Feature");
        assert_eq!(doc.properties.wof_id, Some(85633041));
        assert_eq!(doc.properties.wof_repo.as_deref(), Some("sfomuseum-data"));
        assert_eq!(doc.properties.src_alt_label.as_deref(), Some("geotag"));
        assert_eq!(doc.properties.src_geom.as_deref(), Some("geotag-fov"));
        assert_eq!(doc.properties.geotag_angle, Some(33.3));
        assert_eq!(doc.properties.geotag_bearing, Some(271.0));
        assert_eq!(doc.properties.geotag_distance, Some(45.0));
        assert_eq!(doc.properties.geotag_camera_longitude, Some(-122.386));
        assert_eq!(doc.properties.geotag_target_latitude, Some(37.620));
    }

    #[test]
    fn geometry_is_the_field_of_view() {
        let capture = sample_capture();
        let doc =
            capture_to_alt_document(&capture, 85633041, "sfomuseum-data", "geotag", "geotag").unwrap();

        assert_eq!(doc.geometry, capture.geometry);
        assert_eq!(doc.geometry.geometry_type, "Polygon");
    }

    #[test]
    fn missing_required_fields_are_malformed() {
        for strip in ["angle", "bearing", "distance"] {
            let mut capture = sample_capture();
            match strip {
                "angle" => capture.properties.angle = None,
                "bearing" => capture.properties.bearing = None,
                _ => capture.properties.distance = None,
            }

            let res = capture_to_alt_document(&capture, 1, "repo", "geotag", "geotag");
            assert!(matches!(res, Err(Error::MalformedFeature(_))), "{}", strip);
        }
    }

    #[test]
    fn export_is_byte_identical_across_invocations() {
        let capture = sample_capture();
        let first = alt_document_to_bytes(
            &capture_to_alt_document(&capture, 85633041, "sfomuseum-data", "geotag", "geotag")
                .unwrap(),
        )
        .unwrap();
        let second = alt_document_to_bytes(
            &capture_to_alt_document(&capture, 85633041, "sfomuseum-data", "geotag", "geotag")
                .unwrap(),
        )
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn export_never_contains_bbox() {
        let doc =
            capture_to_alt_document(&sample_capture(), 85633041, "sfomuseum-data", "geotag", "geotag")
                .unwrap();
        let body = alt_document_to_bytes(&doc).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();

        assert!(value.get("bbox").is_none());
    }

    #[test]
    fn export_orders_keys_stably() {
        let doc =
            capture_to_alt_document(&sample_capture(), 85633041, "sfomuseum-data", "geotag", "geotag")
                .unwrap();
        let body = String::from_utf8(alt_document_to_bytes(&doc).unwrap()).unwrap();

        let geometry_at = body.find("\"geometry\"").unwrap();
        let id_at = body.find("\"id\"").unwrap();
        let properties_at = body.find("\"properties\"").unwrap();
        let type_at = body.find("\"type\":\"Feature\"").unwrap();

        assert!(geometry_at < id_at);
        assert!(id_at < properties_at);
        assert!(properties_at < type_at);
    }
}
