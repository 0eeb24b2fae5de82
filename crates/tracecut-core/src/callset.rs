//! Range-set selection predicate over call (or frame) numbers.
//!
//! A [`CallSet`] is built from a small textual syntax and answers
//! "is number N selected?" for the trim driver:
//!
//! - `*` — every number;
//! - `N` — exactly N;
//! - `N-M` — the inclusive range N..=M;
//! - `N-` / `-M` — open-ended ranges;
//! - a `/S` suffix keeps every S-th number of the range (`2-10/2`);
//! - `frame` — every number, but only on frame-boundary calls (`frame/2`
//!   keeps every second boundary);
//! - terms separated by commas or whitespace are merged;
//! - `@FILE` reads terms from a file, one or more per line.
//!
//! The same type serves both selection dimensions. For frame selection the
//! tested number is the driver's frame counter, and a boundary call is
//! tested under the frame it *closes* (the counter increments after the
//! test).

use crate::types::{CallFlags, CallNo};
use anyhow::{bail, Context, Result};
use std::fs;
use std::str::FromStr;

/// How calls inside a range match, beyond their number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frequency {
    /// Every call with a matching number.
    All,
    /// Only frame-boundary calls with a matching number.
    Frame,
}

/// One parsed term: an inclusive numeric range with a step and a frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallRange {
    /// First selected number (inclusive).
    pub first: CallNo,
    /// Last selected number (inclusive; `u64::MAX` when open-ended).
    pub last: CallNo,
    /// Keep every `step`-th number starting at `first` (≥ 1).
    pub step: u64,
    /// Flag gate applied on top of the numeric match.
    pub freq: Frequency,
}

impl CallRange {
    fn contains(&self, no: CallNo, flags: CallFlags) -> bool {
        no >= self.first
            && no <= self.last
            && (no - self.first) % self.step == 0
            && match self.freq {
                Frequency::All => true,
                Frequency::Frame => flags.is_end_frame(),
            }
    }
}

/// A set of [`CallRange`]s; a number is selected if any range contains it.
///
/// Ranges are kept as parsed (no normalization); [`CallSet::merge`] appends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallSet {
    ranges: Vec<CallRange>,
}

impl CallSet {
    /// The empty set (selects nothing).
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self { ranges: Vec::new() }
    }

    /// The full set (selects every number).
    #[must_use]
    pub fn all() -> Self {
        Self {
            ranges: vec![CallRange {
                first: 0,
                last: CallNo::MAX,
                step: 1,
                freq: Frequency::All,
            }],
        }
    }

    /// Whether the set selects nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether `no` is selected, given the call's flags.
    ///
    /// Pure and deterministic for a fixed set.
    #[must_use]
    pub fn contains(&self, no: CallNo, flags: CallFlags) -> bool {
        self.ranges.iter().any(|r| r.contains(no, flags))
    }

    /// Highest selected number across all ranges.
    ///
    /// `u64::MAX` for open-ended sets (which disables early termination);
    /// 0 for the empty set, where it is meaningless. Check
    /// [`Self::is_empty`] first, as the driver does.
    #[must_use]
    pub fn last(&self) -> CallNo {
        self.ranges.iter().map(|r| r.last).max().unwrap_or(0)
    }

    /// Parse `text` and append its ranges to this set.
    ///
    /// `@FILE` indirection is resolved here; nested `@` is rejected.
    pub fn merge(&mut self, text: &str) -> Result<()> {
        if let Some(path) = text.strip_prefix('@') {
            let contents =
                fs::read_to_string(path).with_context(|| format!("read call set file {path}"))?;
            for line in contents.lines() {
                if line.trim().starts_with('@') {
                    bail!("nested @FILE in call set file {path}");
                }
                self.merge_terms(line)?;
            }
            return Ok(());
        }
        self.merge_terms(text)
    }

    fn merge_terms(&mut self, text: &str) -> Result<()> {
        for term in text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            self.ranges.push(parse_term(term)?);
        }
        Ok(())
    }
}

impl FromStr for CallSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut set = Self::none();
        set.merge(s)?;
        Ok(set)
    }
}

fn parse_term(term: &str) -> Result<CallRange> {
    let (body, step) = match term.split_once('/') {
        Some((body, step)) => {
            let step: u64 = step
                .parse()
                .with_context(|| format!("invalid step in call set term {term:?}"))?;
            if step == 0 {
                bail!("step must be >= 1 in call set term {term:?}");
            }
            (body, step)
        }
        None => (term, 1),
    };

    let (first, last, freq) = match body {
        "*" => (0, CallNo::MAX, Frequency::All),
        "frame" => (0, CallNo::MAX, Frequency::Frame),
        _ => match body.split_once('-') {
            Some((lo, hi)) => {
                let first = if lo.is_empty() {
                    0
                } else {
                    parse_no(lo, term)?
                };
                let last = if hi.is_empty() {
                    CallNo::MAX
                } else {
                    parse_no(hi, term)?
                };
                (first, last, Frequency::All)
            }
            None => {
                let n = parse_no(body, term)?;
                (n, n, Frequency::All)
            }
        },
    };

    if first > last {
        bail!("inverted range in call set term {term:?}");
    }

    Ok(CallRange {
        first,
        last,
        step,
        freq,
    })
}

fn parse_no(text: &str, term: &str) -> Result<CallNo> {
    text.parse()
        .with_context(|| format!("invalid number in call set term {term:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const NONE: CallFlags = CallFlags::NONE;
    const FRAME: CallFlags = CallFlags::END_FRAME;

    #[test]
    fn parses_mixed_terms() {
        let set: CallSet = "1-5,10,20-".parse().unwrap();
        assert!(!set.is_empty());
        assert!(set.contains(1, NONE));
        assert!(set.contains(5, NONE));
        assert!(!set.contains(6, NONE));
        assert!(set.contains(10, NONE));
        assert!(!set.contains(19, NONE));
        assert!(set.contains(20, NONE));
        assert!(set.contains(1_000_000, NONE));
        assert_eq!(set.last(), u64::MAX);
    }

    #[test]
    fn bounded_last() {
        let set: CallSet = "5-10, 2".parse().unwrap();
        assert_eq!(set.last(), 10);
    }

    #[test]
    fn step_filters_within_range() {
        let set: CallSet = "2-10/2".parse().unwrap();
        assert!(set.contains(2, NONE));
        assert!(!set.contains(3, NONE));
        assert!(set.contains(4, NONE));
        assert!(set.contains(10, NONE));
        assert!(!set.contains(12, NONE));
    }

    #[test]
    fn open_start_range() {
        let set: CallSet = "-4".parse().unwrap();
        assert!(set.contains(0, NONE));
        assert!(set.contains(4, NONE));
        assert!(!set.contains(5, NONE));
        assert_eq!(set.last(), 4);
    }

    #[test]
    fn wildcard_and_frame_keyword() {
        let all: CallSet = "*".parse().unwrap();
        assert!(all.contains(0, NONE));
        assert!(all.contains(u64::MAX, NONE));

        let frames: CallSet = "frame".parse().unwrap();
        assert!(!frames.contains(9, NONE));
        assert!(frames.contains(9, FRAME));

        let every_other: CallSet = "frame/2".parse().unwrap();
        assert!(every_other.contains(0, FRAME));
        assert!(!every_other.contains(1, FRAME));
        assert!(every_other.contains(2, FRAME));
    }

    #[test]
    fn contains_is_deterministic() {
        let set: CallSet = "3-30/3".parse().unwrap();
        for no in 0..40 {
            assert_eq!(set.contains(no, NONE), set.contains(no, NONE));
        }
    }

    #[test]
    fn all_and_none_constructors() {
        assert!(CallSet::none().is_empty());
        let all = CallSet::all();
        assert!(!all.is_empty());
        assert!(all.contains(12345, NONE));
        assert_eq!(all.last(), u64::MAX);
    }

    #[test]
    fn merge_accumulates() {
        let mut set = CallSet::none();
        set.merge("1-3").unwrap();
        set.merge("8").unwrap();
        assert!(set.contains(2, NONE));
        assert!(set.contains(8, NONE));
        assert!(!set.contains(5, NONE));
    }

    #[test]
    fn at_file_indirection() {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("tracecut_callset_{nanos}.txt"));
        {
            let mut f = fs::File::create(&path).unwrap();
            writeln!(f, "0-4").unwrap();
            writeln!(f, "9").unwrap();
            writeln!(f).unwrap();
        }

        let spec = format!("@{}", path.display());
        let set: CallSet = spec.parse().unwrap();
        assert!(set.contains(3, NONE));
        assert!(set.contains(9, NONE));
        assert!(!set.contains(7, NONE));
        assert_eq!(set.last(), 9);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_malformed_terms() {
        assert!("abc".parse::<CallSet>().is_err());
        assert!("5-3".parse::<CallSet>().is_err());
        assert!("1-4/0".parse::<CallSet>().is_err());
        assert!("1-2-3".parse::<CallSet>().is_err());
        assert!("@/nonexistent/callset/file".parse::<CallSet>().is_err());
    }
}
