//! tracecut-core — call types, selection predicates, and the trim driver.
//!
//! This crate defines the **stable boundary** used across tracecut crates:
//! - canonical call-record types (`Call`, `CallFlags`, …),
//! - the `CallSet` range predicate (textual sets like `"1-5,10,20-"`),
//! - the `ContiguousTracker` watermark over out-of-order completion, and
//! - the container-agnostic trim driver (`trim_stream`).
//!
//! The driver consumes any `Iterator<Item = Result<Call>>` and writes kept
//! calls through the [`trim::CallSink`] trait, so on-disk container formats
//! stay in `tracecut-trace` and never leak in here.
//!
//! ```no_run
//! use tracecut_core::prelude::*;
//! # fn calls() -> Vec<anyhow::Result<Call>> { vec![] }
//! let mut options = TrimOptions::default();
//! options.calls.merge("5-10")?;
//! let mut kept: Vec<Call> = Vec::new();
//! let summary = trim_stream(calls(), &mut kept, &options)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Range-set selection predicate and its textual syntax.
pub mod callset;
/// Watermark over out-of-order call completion.
pub mod tracker;
/// The streaming trim driver.
pub mod trim;
/// Canonical call-record types shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use callset::*;
pub use tracker::*;
pub use trim::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use tracecut_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        callset::CallSet,
        tracker::ContiguousTracker,
        trim::{trim_stream, CallSink, TrimOptions, TrimSummary},
        types::*,
    };
}
