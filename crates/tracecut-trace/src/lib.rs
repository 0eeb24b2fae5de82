//! Trace container + tooling around `tracecut-core`'s call records.
//!
//! This crate provides the building blocks the CLI wires together:
//!
//! - `format`: a minimal, versioned trace envelope (`TraceFile`).
//! - `reader`: extension auto-detected open + streaming call iterator.
//! - `writer`: eager-create output sink implementing the core's `CallSink`.
//! - `generator`: a deterministic synthetic trace generator with a
//!   disorder knob, for tests/benches and the `generate` subcommand.
//! - `stats`: single-pass scan/disorder analyzers.
//!
//! The intent is to keep the container pipeline simple, testable, and easy
//! to replace with production sources later (a real capture tool or
//! importer).
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `tracecut_trace::reader::TraceReader`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Versioned trace envelope.
pub mod format;
/// Deterministic synthetic trace generator (for sims/benches).
pub mod generator;
/// Streaming trace reader with extension auto-detection.
pub mod reader;
/// Single-pass scan/disorder analyzers.
pub mod stats;
/// Trace writer (the trim pipeline's output sink).
pub mod writer;
