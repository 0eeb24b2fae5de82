//! Tiny synthetic trace generator used by the CLI `generate` subcommand
//! and by tests/benches.
//!
//! Produces a trace whose calls carry global capture numbers `0..calls`,
//! a thread id drawn from `0..threads`, and a frame boundary every
//! `calls_per_frame` calls. With `disorder_window > 1` the stream order is
//! shuffled inside disjoint windows of that size, so call numbers arrive
//! out of numeric order while staying a permutation, the shape a
//! multithreaded capture produces.

use crate::format::TraceFile;
use rand::seq::SliceRandom as _;
use rand::{rngs::StdRng, Rng as _, SeedableRng};
use tracecut_core::{Call, CallFlags};

/// Shape of a synthetic trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorSpec {
    /// Total number of calls.
    pub calls: u64,
    /// Number of recorder threads to attribute calls to (≥ 1).
    pub threads: u32,
    /// A frame boundary every this many calls (0 = no frames).
    pub calls_per_frame: u64,
    /// Shuffle stream order within disjoint windows of this size
    /// (≤ 1 = keep numeric order).
    pub disorder_window: usize,
    /// RNG seed; equal specs generate equal traces.
    pub seed: u64,
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        Self {
            calls: 64,
            threads: 1,
            calls_per_frame: 16,
            disorder_window: 0,
            seed: 42,
        }
    }
}

const CALL_NAMES: &[&str] = &[
    "clear",
    "bind_texture",
    "upload_buffer",
    "set_uniform",
    "draw_arrays",
];

/// Generate a synthetic trace for `spec`.
#[must_use]
pub fn generate_trace(spec: &GeneratorSpec) -> TraceFile {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let threads = spec.threads.max(1);

    let mut calls = Vec::with_capacity(spec.calls as usize);
    for no in 0..spec.calls {
        let end_frame = spec.calls_per_frame > 0 && (no + 1) % spec.calls_per_frame == 0;
        let (name, flags) = if end_frame {
            ("swap_buffers", CallFlags::END_FRAME)
        } else {
            (
                CALL_NAMES[rng.random_range(0..CALL_NAMES.len())],
                CallFlags::NONE,
            )
        };

        calls.push(Call {
            no,
            thread_id: rng.random_range(0..threads),
            flags,
            name: name.to_owned(),
            args: vec![serde_json::Value::from(rng.random_range(0u32..4096))],
            ret: None,
        });
    }

    // Windowed shuffle keeps the disorder distance below the window size.
    if spec.disorder_window > 1 {
        for chunk in calls.chunks_mut(spec.disorder_window) {
            chunk.shuffle(&mut rng);
        }
    }

    let mut trace = TraceFile::new();
    trace
        .properties
        .insert("generator".to_owned(), "tracecut synthetic".to_owned());
    trace
        .properties
        .insert("seed".to_owned(), spec.seed.to_string());
    trace.calls = calls;
    trace
}
