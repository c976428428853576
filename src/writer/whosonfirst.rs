use log::info;
use url::Url;

use crate::data::capture::GeotagCapture;
use crate::data::document::CanonicalDocument;
use crate::errors::{Error, Result};
use crate::export;
use crate::store::{DocumentReader, DocumentWriter, StoreRegistry};
use crate::transform;
use crate::uri;
use crate::writer::FeatureWriter;

/// Persists captures as alternate-geometry records in a Who's On First style
/// gazetteer store, optionally propagating the derived point-of-view into
/// the canonical record.
///
/// Stateless across calls beyond this configuration; concurrent calls for
/// the same place are not coordinated here, so the last canonical update
/// wins. Callers needing per-place ordering must serialize upstream.
pub struct WhosOnFirstWriter {
    writer: Box<dyn DocumentWriter>,
    reader: Box<dyn DocumentReader>,
    update: bool,
    geom_source: String,
}

impl WhosOnFirstWriter {
    pub fn new(
        reader: Box<dyn DocumentReader>,
        writer: Box<dyn DocumentWriter>,
        update: bool,
        geom_source: Option<&str>,
    ) -> Result<WhosOnFirstWriter> {
        let geom_source = match geom_source {
            Some(label) => {
                uri::validate_source_label(label)?;
                label.to_string()
            }
            None => uri::GEOTAG_LABEL.to_string(),
        };

        Ok(WhosOnFirstWriter {
            writer,
            reader,
            update,
            geom_source,
        })
    }

    /// Builds the writer from a construction address. The `writer` and
    /// `reader` query parameters carry nested, percent-encoded store
    /// addresses resolved through the registry; `update=1` enables the
    /// canonical patch; `source` overrides the geometry-source label.
    pub fn from_address(address: &Url, stores: &StoreRegistry) -> Result<WhosOnFirstWriter> {
        let mut writer_uri = None;
        let mut reader_uri = None;
        let mut update = false;
        let mut source = None;

        for (key, value) in address.query_pairs() {
            match key.as_ref() {
                "writer" => writer_uri = Some(value.into_owned()),
                "reader" => reader_uri = Some(value.into_owned()),
                "update" => update = value == "1",
                // an empty override means unset, keep the default label
                "source" if !value.is_empty() => source = Some(value.into_owned()),
                _ => (),
            }
        }

        let writer_uri = writer_uri.ok_or(Error::MissingWriterParam)?;
        let reader_uri = reader_uri.ok_or(Error::MissingReaderParam)?;

        let writer = stores.new_writer(&writer_uri)?;
        let reader = stores.new_reader(&reader_uri)?;

        WhosOnFirstWriter::new(reader, writer, update, source.as_deref())
    }

    fn update_canonical(
        &self,
        mut main_doc: CanonicalDocument,
        rel_path: &str,
        capture: &GeotagCapture,
    ) -> Result<()> {
        let pov = capture.point_of_view()?;
        let (lon, lat) = pov.point_coordinates().ok_or_else(|| {
            Error::MalformedFeature("point-of-view is not a point".to_string())
        })?;

        main_doc.geometry = pov;
        main_doc.properties.lbl_longitude = Some(lon);
        main_doc.properties.lbl_latitude = Some(lat);

        main_doc.properties.geotag_angle = capture.properties.angle;
        main_doc.properties.geotag_bearing = capture.properties.bearing;
        main_doc.properties.geotag_distance = capture.properties.distance;
        main_doc.properties.geotag_camera_longitude = capture.properties.camera_longitude;
        main_doc.properties.geotag_camera_latitude = capture.properties.camera_latitude;
        main_doc.properties.geotag_target_longitude = capture.properties.target_longitude;
        main_doc.properties.geotag_target_latitude = capture.properties.target_latitude;

        main_doc.apply_geom_source(&self.geom_source);

        let main_body = export::export_canonical(&main_doc)?;
        self.writer.write(rel_path, &main_body)?;

        info!(id = main_doc.id, path = rel_path; "Updated canonical record");
        Ok(())
    }
}

impl FeatureWriter for WhosOnFirstWriter {
    fn write_feature(&self, target_uri: &str, capture: &GeotagCapture) -> Result<()> {
        let (id, uri_args) = uri::parse_uri(target_uri)?;

        if uri_args.is_alternate {
            return Err(Error::InvalidTarget(format!(
                "'{}' already designates an alternate record",
                target_uri
            )));
        }

        let rel_path = uri::id_to_rel_path(id)?;

        let main_body = self.reader.read(&rel_path)?;
        let main_doc = CanonicalDocument::from_bytes(&main_body)?;
        let repo = main_doc.repo()?.to_string();

        let alt_doc = transform::capture_to_alt_document(
            capture,
            id,
            &repo,
            &self.geom_source,
            &self.geom_source,
        )?;
        let alt_body = transform::alt_document_to_bytes(&alt_doc)?;

        let alt_path = uri::id_to_alt_rel_path(id, &self.geom_source)?;
        self.writer.write(&alt_path, &alt_body)?;

        info!(id = id, path = alt_path.as_str(); "Persisted alternate geometry");

        if !self.update {
            return Ok(());
        }

        // Not transactional with the alternate write above: a failure here
        // leaves the alternate record persisted and the canonical record
        // unpatched, surfaced to the caller via the returned error.
        self.update_canonical(main_doc, &rel_path, capture)
    }

    fn close(&self) -> Result<()> {
        self.writer.close()
    }
}
