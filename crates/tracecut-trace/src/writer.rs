//! Trace writer — the output side of the trim pipeline.
//!
//! [`TraceWriter::create`] creates the destination file eagerly, so a
//! create failure aborts a trim before any input has been read. Calls are
//! then appended one at a time; [`TraceWriter::finish`] completes the file.
//!
//! The representation follows the extension: `.jsonl`/`.ndjson` streams
//! line by line; `.json`/`.cbor` accumulate the envelope in memory and
//! write it on finish. Unknown or missing extensions default to JSON, the
//! same policy the read side's auto-detection expects callers to respect.

use crate::format::{TraceFile, TraceHeader};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracecut_core::{Call, CallSink};

enum SinkKind {
    Jsonl(BufWriter<File>),
    Json { file: File, trace: TraceFile },
    Cbor { file: File, trace: TraceFile },
}

/// An output trace being written.
pub struct TraceWriter {
    kind: SinkKind,
}

impl TraceWriter {
    /// Create `path` (parents included) and write the header.
    ///
    /// The file exists on disk as soon as this returns; nothing about the
    /// input has to be known beyond its header.
    pub fn create<P: AsRef<Path>>(path: P, header: TraceHeader) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;

        let trace = TraceFile {
            version: header.version,
            properties: header.properties.clone(),
            calls: Vec::new(),
        };

        let kind = match ext_lower(path).as_deref() {
            Some("jsonl" | "ndjson") => {
                let mut w = BufWriter::new(file);
                serde_json::to_writer(&mut w, &header)
                    .with_context(|| format!("write header of {}", path.display()))?;
                w.write_all(b"\n")
                    .with_context(|| format!("write header of {}", path.display()))?;
                SinkKind::Jsonl(w)
            }
            Some("cbor") => SinkKind::Cbor { file, trace },
            _ => SinkKind::Json { file, trace },
        };

        Ok(Self { kind })
    }

    /// Append one call, preserving the record verbatim.
    pub fn write_call(&mut self, call: &Call) -> Result<()> {
        match &mut self.kind {
            SinkKind::Jsonl(w) => {
                serde_json::to_writer(&mut *w, call).context("serialize call to JSON line")?;
                w.write_all(b"\n").context("write newline")?;
            }
            SinkKind::Json { trace, .. } | SinkKind::Cbor { trace, .. } => {
                trace.calls.push(call.clone());
            }
        }
        Ok(())
    }

    /// Complete the file: flush the stream, or write the accumulated
    /// envelope for the non-streaming representations.
    pub fn finish(self) -> Result<()> {
        match self.kind {
            SinkKind::Jsonl(mut w) => w.flush().context("flush trace writer"),
            SinkKind::Json { file, trace } => {
                let mut w = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut w, &trace)
                    .context("serialize JSON trace")?;
                w.flush().context("flush trace writer")
            }
            SinkKind::Cbor { file, trace } => {
                let mut w = BufWriter::new(file);
                ciborium::ser::into_writer(&trace, &mut w).context("serialize CBOR trace")?;
                w.flush().context("flush trace writer")
            }
        }
    }
}

impl CallSink for TraceWriter {
    fn write_call(&mut self, call: &Call) -> Result<()> {
        Self::write_call(self, call)
    }
}

/// Write a whole [`TraceFile`] to `path` in one go.
pub fn write_trace_file<P: AsRef<Path>>(path: P, trace: &TraceFile) -> Result<()> {
    let mut w = TraceWriter::create(path, trace.header())?;
    for call in &trace.calls {
        w.write_call(call)?;
    }
    w.finish()
}

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}
