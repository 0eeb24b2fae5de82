//! Canonical call-record types used across the tracecut workspace.
//!
//! These live in `tracecut-core` and are broadly re-exported at the crate
//! root so other crates can import via `tracecut_core::Call`,
//! `tracecut_core::CallFlags`, etc.
//!
//! The design aims to keep serialized forms conservative and portable (serde).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Capture-time call number from the logical global order.
///
/// Unique across one trace; calls may still arrive out of numeric order when
/// the capture was multithreaded.
pub type CallNo = u64;

/// Identifier of the recorder thread that captured a call.
pub type ThreadId = u32;

/// Per-call flag bitmask.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CallFlags(pub u32);

impl CallFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// The call ends a rendering/logical frame.
    pub const END_FRAME: Self = Self(1 << 0);

    /// Returns `true` if every flag in `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the call carrying these flags closes a frame.
    #[inline]
    #[must_use]
    pub const fn is_end_frame(self) -> bool {
        self.contains(Self::END_FRAME)
    }
}

impl BitOr for CallFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for CallFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One recorded unit of work in a trace log.
///
/// The `name`/`args`/`ret` payload is opaque to the trimmer and passes
/// through to the output unmodified when a call is selected.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Call {
    /// Capture-time number (see [`CallNo`]).
    pub no: CallNo,
    /// Recorder thread that produced the call.
    pub thread_id: ThreadId,
    /// Flag bitmask; see [`CallFlags`].
    #[serde(default)]
    pub flags: CallFlags,
    /// Recorded function name.
    pub name: String,
    /// Recorded argument values, preserved verbatim.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    /// Recorded return value, preserved verbatim.
    #[serde(default)]
    pub ret: Option<serde_json::Value>,
}

impl Call {
    /// Whether this call closes a frame.
    #[inline]
    #[must_use]
    pub const fn is_end_frame(&self) -> bool {
        self.flags.is_end_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_contain_and_combine() {
        let f = CallFlags::END_FRAME | CallFlags(1 << 4);
        assert!(f.is_end_frame());
        assert!(f.contains(CallFlags(1 << 4)));
        assert!(!CallFlags::NONE.is_end_frame());
        assert!(CallFlags::NONE.is_empty());
    }

    #[test]
    fn call_json_shape_is_stable() {
        let call = Call {
            no: 7,
            thread_id: 1,
            flags: CallFlags::END_FRAME,
            name: "swap_buffers".into(),
            args: vec![],
            ret: None,
        };
        let text = serde_json::to_string(&call).unwrap();
        let back: Call = serde_json::from_str(&text).unwrap();
        assert_eq!(back, call);

        // Terse records without flags/args/ret still parse.
        let terse: Call =
            serde_json::from_str(r#"{"no":1,"thread_id":0,"name":"clear"}"#).unwrap();
        assert_eq!(terse.flags, CallFlags::NONE);
        assert!(terse.args.is_empty());
    }
}
