//! Streaming trace reader.
//!
//! [`TraceReader::open`] auto-detects the representation from the file
//! extension, reads the header up front, and then yields calls one at a
//! time:
//!
//! - **`.jsonl` / `.ndjson`**: true streaming; one call is materialized at
//!   a time, with per-line error context. Blank lines are skipped.
//! - **`.json` / `.cbor`**: the envelope is loaded, then iterated (compat
//!   fallback; these representations are not line-oriented).
//!
//! Open failures and unsupported versions surface before any call is
//! yielded; mid-stream parse failures surface as `Err` items.

use crate::format::{TraceFile, TraceHeader, TRACE_VERSION};
use anyhow::{anyhow, bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracecut_core::Call;

/// Owning JSONL call iterator.
///
/// Holds the file and buffered reader internally to avoid lifetime pitfalls
/// of returning a borrowed `Lines<'_>` iterator.
#[derive(Debug)]
struct JsonlCallIter {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
}

impl Iterator for JsonlCallIter {
    type Item = Result<Call>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    self.line_no += 1;
                    // Trim a single trailing '\n' or '\r\n'.
                    if self.buf.ends_with('\n') {
                        self.buf.pop();
                        if self.buf.ends_with('\r') {
                            self.buf.pop();
                        }
                    }
                    if self.buf.trim().is_empty() {
                        continue;
                    }
                    let parsed: Result<Call> = serde_json::from_str(&self.buf)
                        .with_context(|| format!("parse call at line {}", self.line_no));
                    return Some(parsed);
                }
                Err(e) => {
                    return Some(
                        Err(e).with_context(|| format!("read line {}", self.line_no + 1)),
                    )
                }
            }
        }
    }
}

#[derive(Debug)]
enum CallSource {
    Jsonl(JsonlCallIter),
    Loaded(std::vec::IntoIter<Call>),
}

/// A trace opened for streaming reads.
///
/// The reader itself is the call iterator, so it can be handed directly to
/// `tracecut_core::trim_stream` after the header has been inspected.
#[derive(Debug)]
pub struct TraceReader {
    header: TraceHeader,
    source: CallSource,
}

impl TraceReader {
    /// Open `path`, auto-detecting the representation by extension
    /// (`.json`, `.cbor`, `.jsonl`/`.ndjson`, case-insensitive).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match ext_lower(path).as_deref() {
            Some("jsonl" | "ndjson") => Self::open_jsonl(path),
            Some("json") => {
                let f =
                    File::open(path).with_context(|| format!("open {}", path.display()))?;
                let tf: TraceFile = serde_json::from_reader(BufReader::new(f))
                    .with_context(|| format!("deserialize JSON trace {}", path.display()))?;
                Self::from_trace_file(tf, path)
            }
            Some("cbor") => {
                let f =
                    File::open(path).with_context(|| format!("open {}", path.display()))?;
                let mut rdr = BufReader::new(f);
                let tf: TraceFile = ciborium::de::from_reader(&mut rdr)
                    .with_context(|| format!("deserialize CBOR trace {}", path.display()))?;
                Self::from_trace_file(tf, path)
            }
            Some(other) => Err(anyhow!(
                "unsupported trace extension: {other} (supported: .json, .cbor, .jsonl, .ndjson)"
            )),
            None => Err(anyhow!(
                "path has no extension (expected .json, .cbor, .jsonl, or .ndjson)"
            )),
        }
    }

    fn open_jsonl(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut rdr = BufReader::new(f);

        let mut line = String::new();
        let n = rdr
            .read_line(&mut line)
            .with_context(|| format!("read header line of {}", path.display()))?;
        if n == 0 {
            bail!("{}: empty trace file (missing header line)", path.display());
        }
        let header: TraceHeader = serde_json::from_str(line.trim_end())
            .with_context(|| format!("parse header line of {}", path.display()))?;
        check_version(header.version, path)?;

        Ok(Self {
            header,
            source: CallSource::Jsonl(JsonlCallIter {
                rdr,
                buf: String::with_capacity(8 << 10),
                line_no: 1,
            }),
        })
    }

    fn from_trace_file(tf: TraceFile, path: &Path) -> Result<Self> {
        check_version(tf.version, path)?;
        Ok(Self {
            header: tf.header(),
            source: CallSource::Loaded(tf.calls.into_iter()),
        })
    }

    /// Container format version of the opened trace.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u16 {
        self.header.version
    }

    /// Capture metadata of the opened trace.
    #[inline]
    #[must_use]
    pub const fn properties(&self) -> &crate::format::PropertyMap {
        &self.header.properties
    }

    /// The header (version + properties), e.g. to seed an output writer.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &TraceHeader {
        &self.header
    }
}

impl Iterator for TraceReader {
    type Item = Result<Call>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            CallSource::Jsonl(it) => it.next(),
            CallSource::Loaded(it) => it.next().map(Ok),
        }
    }
}

/// Load a whole trace into a [`TraceFile`], whatever the representation.
///
/// Convenience for tools that want the envelope in memory; the trim
/// pipeline itself streams through [`TraceReader`] instead.
pub fn read_trace_file<P: AsRef<Path>>(path: P) -> Result<TraceFile> {
    let mut reader = TraceReader::open(path)?;
    let header = reader.header().clone();
    let mut calls = Vec::new();
    for call in &mut reader {
        calls.push(call?);
    }
    Ok(TraceFile {
        version: header.version,
        properties: header.properties,
        calls,
    })
}

fn check_version(version: u16, path: &Path) -> Result<()> {
    if version > TRACE_VERSION {
        bail!(
            "{}: trace version {version} is newer than supported version {TRACE_VERSION}",
            path.display()
        );
    }
    Ok(())
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}
