//! Versioned trace envelope shared by all container representations.
//!
//! Three on-disk representations carry the same data:
//!
//! - `.json` — one pretty-printed [`TraceFile`] object;
//! - `.cbor` — the same envelope in CBOR;
//! - `.jsonl` / `.ndjson` — a [`TraceHeader`] object on the first line,
//!   then one call object per line (the streaming representation).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracecut_core::Call;

/// Current container format version.
pub const TRACE_VERSION: u16 = 1;

/// Capture metadata carried alongside the calls and preserved verbatim by
/// every tool in the pipeline (process name, capture host, API level, …).
pub type PropertyMap = BTreeMap<String, String>;

/// Header shared by all representations: everything but the calls.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceHeader {
    /// Format/version tag for forward-compat.
    pub version: u16,
    /// Free-form capture metadata.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl Default for TraceHeader {
    fn default() -> Self {
        Self {
            version: TRACE_VERSION,
            properties: PropertyMap::new(),
        }
    }
}

/// Whole-trace envelope used by the `.json`/`.cbor` representations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraceFile {
    /// Format/version tag for forward-compat.
    pub version: u16,
    /// Free-form capture metadata.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Call records in capture stream order.
    pub calls: Vec<Call>,
}

impl TraceFile {
    /// Empty trace at the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: TRACE_VERSION,
            properties: PropertyMap::new(),
            calls: Vec::new(),
        }
    }

    /// Number of calls.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the trace holds no calls.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// The envelope's header view (version + properties).
    #[must_use]
    pub fn header(&self) -> TraceHeader {
        TraceHeader {
            version: self.version,
            properties: self.properties.clone(),
        }
    }
}

impl Default for TraceFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_tracks_envelope() {
        let mut tf = TraceFile::new();
        tf.properties.insert("process".into(), "demo".into());
        let h = tf.header();
        assert_eq!(h.version, TRACE_VERSION);
        assert_eq!(h.properties.get("process").map(String::as_str), Some("demo"));
        assert!(tf.is_empty());
    }

    #[test]
    fn header_without_properties_parses() {
        let h: TraceHeader = serde_json::from_str(r#"{"version":1}"#).unwrap();
        assert!(h.properties.is_empty());
    }
}
