//! Marker documents for player plugins which skip or mute marked segments
//! automatically (in the format used by PlexAutoSkip).
//!
//! A document can describe many videos, each keyed by a content identifier.
//! We only ever touch the entries for our own identifier, so an existing
//! document is merged rather than replaced.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Map, Value};

use crate::{errors::Error, time::MuteInterval, Result};

/// The marker mode meaning "mute the audio".
pub const MODE_VOLUME: &str = "volume";

/// Users, clients and keys for which a document applies (or doesn't).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AccessList {
    /// User names.
    #[serde(default)]
    pub users: Vec<Value>,
    /// Client names.
    #[serde(default)]
    pub clients: Vec<Value>,
    /// Content keys.
    #[serde(default)]
    pub keys: Vec<Value>,
}

/// A single marked segment, in milliseconds.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Marker {
    /// Start of the segment.
    pub start: i64,
    /// End of the segment.
    pub end: i64,
    /// What the player should do.
    pub mode: String,
}

/// A marker document. Sections we don't populate are kept as raw JSON so
/// that merging never loses anything.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MarkerDocument {
    /// Marker lists, keyed by content identifier.
    #[serde(default)]
    pub markers: Map<String, Value>,
    /// Per-identifier offsets.
    #[serde(default)]
    pub offsets: Map<String, Value>,
    /// Per-tag settings.
    #[serde(default)]
    pub tags: Map<String, Value>,
    /// Who the markers apply to.
    #[serde(default)]
    pub allowed: AccessList,
    /// Who the markers don't apply to.
    #[serde(default)]
    pub blocked: AccessList,
    /// Per-client settings.
    #[serde(default)]
    pub clients: Map<String, Value>,
    /// Marker modes, keyed by content identifier.
    #[serde(default)]
    pub mode: Map<String, Value>,
    /// Anything else we found in an existing document.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarkerDocument {
    /// Read an existing document.
    pub fn from_path(path: &Path) -> Result<MarkerDocument> {
        let data = fs::read(path).map_err(|source| Error::CouldNotReadMarkers {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| Error::CouldNotParseMarkers {
            path: path.to_owned(),
            source,
        })
    }

    /// Replace the markers for `content_id` with one volume marker per
    /// interval, and set its mode to `"volume"`.
    pub fn set_mute_markers(&mut self, content_id: &str, intervals: &[MuteInterval]) -> Result<()> {
        let markers = intervals
            .iter()
            .map(|interval| {
                let interval = interval.clamped()?;
                Ok(Marker {
                    start: interval.start().as_millis(),
                    end: interval.end().as_millis(),
                    mode: MODE_VOLUME.to_owned(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let markers = serde_json::to_value(markers)
            .map_err(|source| Error::CouldNotSerializeMarkers { source })?;
        self.markers.insert(content_id.to_owned(), markers);
        self.mode
            .insert(content_id.to_owned(), Value::String(MODE_VOLUME.to_owned()));
        Ok(())
    }

    /// The markers for `content_id`, if any.
    pub fn markers_for(&self, content_id: &str) -> Option<Vec<Marker>> {
        self.markers
            .get(content_id)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Serialize with four-space indentation.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)
            .map_err(|source| Error::CouldNotSerializeMarkers { source })?;
        Ok(String::from_utf8(buf).expect("serde_json always writes UTF-8"))
    }
}

/// Write mute markers for `content_id` to `path`, merging them into any
/// document already there. Nothing is written when there are no intervals;
/// returns whether a file was written.
pub fn write_markers(path: &Path, content_id: &str, intervals: &[MuteInterval]) -> Result<bool> {
    if intervals.is_empty() {
        debug!("no mute intervals, not writing {}", path.display());
        return Ok(false);
    }
    let mut doc = if path.exists() {
        debug!("merging markers into existing {}", path.display());
        MarkerDocument::from_path(path)?
    } else {
        MarkerDocument::default()
    };
    doc.set_mute_markers(content_id, intervals)?;
    fs::write(path, doc.to_json()?).map_err(|source| Error::CouldNotWrite {
        path: path.to_owned(),
        source,
    })?;
    Ok(true)
}
