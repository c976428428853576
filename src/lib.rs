//! Persists geotag captures (camera-pose annotations) into a hierarchical,
//! path-addressed gazetteer store. A capture is transformed into an
//! alternate-geometry record tied to the place's canonical record, and the
//! derived point-of-view can optionally be propagated back into the canonical
//! record's label geometry and provenance metadata.

pub mod data;
pub mod errors;
pub mod export;
pub mod store;
pub mod transform;
pub mod uri;
pub mod writer;
