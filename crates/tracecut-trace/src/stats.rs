//! Single-pass trace analyzers backing the `scan` and `disorder`
//! subcommands.
//!
//! Both functions consume any call stream (a [`crate::reader::TraceReader`]
//! or an in-memory iterator) and never hold more than one call at a time.

use anyhow::Result;
use tracecut_core::{Call, CallNo};

/// Frame/call census of a trace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Total calls in the trace.
    pub calls: u64,
    /// Total frames (boundary calls) in the trace.
    pub frames: u64,
    /// Call number that closed each frame, in stream order.
    pub frame_ends: Vec<CallNo>,
}

/// Count frames and calls.
pub fn scan<I>(calls: I) -> Result<ScanReport>
where
    I: IntoIterator<Item = Result<Call>>,
{
    let mut report = ScanReport::default();
    for call in calls {
        let call = call?;
        report.calls += 1;
        if call.is_end_frame() {
            report.frames += 1;
            report.frame_ends.push(call.no);
        }
    }
    Ok(report)
}

/// Out-of-order numbering census of a trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisorderReport {
    /// Total calls in the trace.
    pub calls: u64,
    /// Calls whose number was not the successor of the previous call's.
    pub out_of_order: u64,
    /// Largest gap between a call's number and the expected successor.
    pub max_distance: u64,
}

impl DisorderReport {
    /// Out-of-order calls as a share of all calls (0 for an empty trace).
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.out_of_order as f64 / self.calls as f64
        }
    }
}

/// Identify out-of-order call numbers.
pub fn disorder<I>(calls: I) -> Result<DisorderReport>
where
    I: IntoIterator<Item = Result<Call>>,
{
    let mut report = DisorderReport::default();
    let mut expected: CallNo = 0;
    for call in calls {
        let call = call?;
        if call.no != expected {
            report.out_of_order += 1;
            report.max_distance = report.max_distance.max(call.no.abs_diff(expected));
        }
        expected = call.no + 1;
        report.calls += 1;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracecut_core::CallFlags;

    fn mk_call(no: CallNo, end_frame: bool) -> Result<Call> {
        Ok(Call {
            no,
            thread_id: 0,
            flags: if end_frame {
                CallFlags::END_FRAME
            } else {
                CallFlags::NONE
            },
            name: "call".into(),
            args: vec![],
            ret: None,
        })
    }

    #[test]
    fn scan_counts_frames_and_calls() {
        let calls = vec![
            mk_call(0, false),
            mk_call(1, true),
            mk_call(2, false),
            mk_call(3, true),
        ];
        let report = scan(calls).unwrap();
        assert_eq!(report.calls, 4);
        assert_eq!(report.frames, 2);
        assert_eq!(report.frame_ends, vec![1, 3]);
    }

    #[test]
    fn disorder_on_ordered_trace_is_zero() {
        let calls: Vec<_> = (0..10).map(|n| mk_call(n, false)).collect();
        let report = disorder(calls).unwrap();
        assert_eq!(report.out_of_order, 0);
        assert_eq!(report.max_distance, 0);
        assert!(report.ratio() < f64::EPSILON);
    }

    #[test]
    fn disorder_counts_gaps() {
        // 2 arrives first (distance 2), then 0 (distance 3 back from the
        // expected 3), then 1 in sequence, then 3 one past the expected 2.
        let calls = vec![mk_call(2, false), mk_call(0, false), mk_call(1, false), mk_call(3, false)];
        let report = disorder(calls).unwrap();
        assert_eq!(report.calls, 4);
        assert_eq!(report.out_of_order, 3);
        assert_eq!(report.max_distance, 3);
    }

    #[test]
    fn empty_trace_ratio_is_zero() {
        let report = disorder(Vec::<Result<Call>>::new()).unwrap();
        assert_eq!(report.calls, 0);
        assert!(report.ratio() < f64::EPSILON);
    }
}
