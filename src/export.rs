use std::time::{SystemTime, UNIX_EPOCH};

use crate::data::document::CanonicalDocument;
use crate::errors::Result;

/// Normalization/export pipeline for canonical documents. Recomputes the
/// derived fields (`bbox` from the geometry, `wof:lastmodified`) and
/// serializes with keys sorted at every level. Used only on the
/// canonical-update path; alternate documents go through
/// `transform::alt_document_to_bytes`.
pub fn export_canonical(doc: &CanonicalDocument) -> Result<Vec<u8>> {
    export_canonical_at(doc, unix_now())
}

pub fn export_canonical_at(doc: &CanonicalDocument, lastmodified: i64) -> Result<Vec<u8>> {
    let mut doc = doc.clone();
    doc.bbox = doc.geometry.bounding_box();
    doc.properties.wof_lastmodified = Some(lastmodified);

    let value = serde_json::to_value(&doc)?;
    Ok(serde_json::to_vec(&value)?)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
