//! The streaming trim driver.
//!
//! One pass over an input call stream: apply thread/call/frame selection,
//! forward kept calls to a sink in input order, track frame boundaries, and
//! stop reading as soon as nothing further can be selected.
//!
//! The driver owns a [`ContiguousTracker`] and a frame counter for the
//! duration of one pass; both are discarded afterwards. Input and output
//! stay behind narrow seams (`Iterator<Item = Result<Call>>` in,
//! [`CallSink`] out) so container formats never appear here.

use crate::callset::CallSet;
use crate::tracker::ContiguousTracker;
use crate::types::{Call, ThreadId};
use anyhow::Result;

/// Selection criteria for one trim pass.
#[derive(Clone, Debug, Default)]
pub struct TrimOptions {
    /// Calls to include, by call number.
    pub calls: CallSet,
    /// Frames to include, by frame number.
    pub frames: CallSet,
    /// Only retain calls from this thread (`None` = all threads).
    pub thread: Option<ThreadId>,
}

impl TrimOptions {
    /// Apply the caller-side default: when neither calls nor frames were
    /// specified, select the entire set of calls.
    pub fn apply_default_selection(&mut self) {
        if self.calls.is_empty() && self.frames.is_empty() {
            self.calls = CallSet::all();
        }
    }
}

/// Destination for kept calls.
pub trait CallSink {
    /// Append one call to the output, preserving it verbatim.
    fn write_call(&mut self, call: &Call) -> Result<()>;
}

/// In-memory sink, mostly for tests.
impl CallSink for Vec<Call> {
    fn write_call(&mut self, call: &Call) -> Result<()> {
        self.push(call.clone());
        Ok(())
    }
}

/// Counters reported after a trim pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrimSummary {
    /// Calls read from the input (may be fewer than the input holds when
    /// the pass terminated early).
    pub calls_read: u64,
    /// Calls written to the sink.
    pub calls_written: u64,
    /// Frame boundaries seen in the consumed portion of the input.
    pub frames_seen: u64,
}

/// Run one trim pass: stream `calls`, write the selected subset to `sink`.
///
/// A call is kept iff its thread passes the filter *and* it matches the
/// call set **or** the current frame matches the frame set. Frame
/// accounting tracks the input stream, not the output: the counter
/// increments on every boundary call, selected or not, and only after the
/// selection test, so a boundary call counts under the frame it closes.
///
/// Reading stops early once the completion watermark has passed the call
/// set's bound and the frame counter has passed the frame set's bound (an
/// empty dimension is vacuously satisfied). The watermark, not the raw
/// call number, is compared: lower-numbered calls from other recorder
/// threads may still be in flight behind a numerically later call.
///
/// A mid-stream read error aborts the pass; whatever the sink already
/// holds stands (no rollback).
pub fn trim_stream<I, S>(calls: I, sink: &mut S, options: &TrimOptions) -> Result<TrimSummary>
where
    I: IntoIterator<Item = Result<Call>>,
    S: CallSink + ?Sized,
{
    let mut tracker = ContiguousTracker::new();
    let mut frame: u64 = 0;
    let mut summary = TrimSummary::default();

    for call in calls {
        let call = call?;
        summary.calls_read += 1;

        // Every call is marked finished, kept or not.
        let watermark = tracker.finish(call.no);

        let thread_ok = options.thread.map_or(true, |t| call.thread_id == t);
        if thread_ok
            && (options.calls.contains(call.no, call.flags)
                || options.frames.contains(frame, call.flags))
        {
            sink.write_call(&call)?;
            summary.calls_written += 1;
        }

        if call.is_end_frame() {
            frame += 1;
        }

        // No use doing any work past the last call and frame requested.
        if (options.calls.is_empty() || watermark > options.calls.last())
            && (options.frames.is_empty() || frame > options.frames.last())
        {
            break;
        }
    }

    summary.frames_seen = frame;
    Ok(summary)
}
