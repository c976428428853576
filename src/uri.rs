use regex::Regex;

use crate::errors::{Error, Result};

/// Default geometry-source label recorded on alternate records.
pub const GEOTAG_LABEL: &str = "geotag";

pub const SOURCE_LABEL_PATTERN: &str = r"^[a-zA-Z0-9_\-]+$";

const GEOJSON_EXTENSION: &str = ".geojson";
const ALT_SEPARATOR: &str = "-alt-";

/// Qualifier naming the alternate-geometry source a storage key belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltGeom {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriArgs {
    pub is_alternate: bool,
    pub alt_geom: Option<AltGeom>,
}

impl UriArgs {
    pub fn canonical() -> UriArgs {
        UriArgs {
            is_alternate: false,
            alt_geom: None,
        }
    }
}

pub fn validate_source_label(label: &str) -> Result<()> {
    let re = Regex::new(SOURCE_LABEL_PATTERN)?;

    if !re.is_match(label) {
        return Err(Error::InvalidSourceLabel(label.to_string()));
    }

    Ok(())
}

fn shard_id(id: i64) -> Result<String> {
    if id < 0 {
        return Err(Error::InvalidTarget(format!(
            "place id must be non-negative, got {}",
            id
        )));
    }

    let digits = id.to_string();
    let segments: Vec<&str> = digits
        .as_bytes()
        .chunks(3)
        // chunks of the decimal representation are always valid UTF-8
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect();

    Ok(segments.join("/"))
}

/// Relative storage path of the canonical record for a place.
pub fn id_to_rel_path(id: i64) -> Result<String> {
    let tree = shard_id(id)?;
    Ok(format!("{}/{}{}", tree, id, GEOJSON_EXTENSION))
}

/// Relative storage path of the alternate record for a (place, label) pair.
/// Distinct labels for the same place always yield distinct paths.
pub fn id_to_alt_rel_path(id: i64, label: &str) -> Result<String> {
    validate_source_label(label)?;

    let tree = shard_id(id)?;
    Ok(format!(
        "{}/{}{}{}{}",
        tree, id, ALT_SEPARATOR, label, GEOJSON_EXTENSION
    ))
}

/// Parses a write-target uri into a place id and its storage qualifiers.
/// Accepts a bare id, an `{id}.geojson` file name, a full relative path, or
/// an alternate file name `{id}-alt-{label}.geojson`.
pub fn parse_uri(uri: &str) -> Result<(i64, UriArgs)> {
    let fname = uri.rsplit('/').next().unwrap_or(uri);
    let fname = fname.strip_suffix(GEOJSON_EXTENSION).unwrap_or(fname);

    let (id_part, args) = match fname.split_once(ALT_SEPARATOR) {
        Some((id_part, label)) => {
            let args = UriArgs {
                is_alternate: true,
                alt_geom: Some(AltGeom {
                    source: label.to_string(),
                }),
            };
            (id_part, args)
        }
        None => (fname, UriArgs::canonical()),
    };

    let id: i64 = id_part
        .parse()
        .map_err(|_| Error::InvalidTarget(format!("'{}' is not a place id", uri)))?;

    if id < 0 {
        return Err(Error::InvalidTarget(format!(
            "place id must be non-negative, got {}",
            id
        )));
    }

    Ok((id, args))
}
