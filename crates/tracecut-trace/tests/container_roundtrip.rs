//! Container representation round-trips through the reader/writer pair.

use std::path::PathBuf;
use tracecut_trace::format::{TraceFile, TRACE_VERSION};
use tracecut_trace::generator::{generate_trace, GeneratorSpec};
use tracecut_trace::reader::{read_trace_file, TraceReader};
use tracecut_trace::writer::write_trace_file;

fn tmp_path(name: &str, ext: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("tracecut_trace_{name}_{nanos}.{ext}"));
    p
}

fn sample_trace() -> TraceFile {
    let mut trace = generate_trace(&GeneratorSpec {
        calls: 24,
        threads: 2,
        calls_per_frame: 8,
        disorder_window: 4,
        ..GeneratorSpec::default()
    });
    trace
        .properties
        .insert("process".to_owned(), "demo-app".to_owned());
    trace
}

#[test]
fn roundtrips_every_representation() {
    let trace = sample_trace();
    for ext in ["json", "cbor", "jsonl", "ndjson"] {
        let path = tmp_path("roundtrip", ext);
        write_trace_file(&path, &trace).unwrap();
        let back = read_trace_file(&path).unwrap();
        assert_eq!(back, trace, "mismatch for .{ext}");
        let _ = std::fs::remove_file(path);
    }
}

#[test]
fn reader_exposes_header_before_calls() {
    let trace = sample_trace();
    let path = tmp_path("header", "jsonl");
    write_trace_file(&path, &trace).unwrap();

    let reader = TraceReader::open(&path).unwrap();
    assert_eq!(reader.version(), TRACE_VERSION);
    assert_eq!(
        reader.properties().get("process").map(String::as_str),
        Some("demo-app")
    );

    let calls: Vec<_> = reader.map(Result::unwrap).collect();
    assert_eq!(calls, trace.calls);
    let _ = std::fs::remove_file(path);
}

#[test]
fn rejects_unknown_extension_and_missing_file() {
    assert!(TraceReader::open(tmp_path("nope", "txt")).is_err());
    assert!(TraceReader::open(tmp_path("missing", "json")).is_err());
}

#[test]
fn rejects_newer_version() {
    let mut trace = sample_trace();
    trace.version = TRACE_VERSION + 1;
    let path = tmp_path("newer", "json");
    write_trace_file(&path, &trace).unwrap();

    let err = TraceReader::open(&path).unwrap_err();
    assert!(err.to_string().contains("newer than supported"));
    let _ = std::fs::remove_file(path);
}

#[test]
fn jsonl_surfaces_malformed_lines_with_position() {
    let path = tmp_path("malformed", "jsonl");
    std::fs::write(
        &path,
        "{\"version\":1}\n{\"no\":0,\"thread_id\":0,\"name\":\"clear\"}\nnot json\n",
    )
    .unwrap();

    let mut reader = TraceReader::open(&path).unwrap();
    assert!(reader.next().unwrap().is_ok());
    let err = reader.next().unwrap().unwrap_err();
    assert!(err.to_string().contains("line 3"), "got: {err:#}");
    let _ = std::fs::remove_file(path);
}
