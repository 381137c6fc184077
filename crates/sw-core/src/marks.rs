//! Mark ledger and interval derivation.
//!
//! A sub channel records one mark per toggle, stamped with its head
//! channel's elapsed time rather than the wall clock. Intervals are never
//! stored: they are re-derived from the marks on every read.
//!
//! # Algorithm Summary
//!
//! 1. Scan marks in order; a `start` opens a span at its head time
//! 2. The next `pause` closes the open span and emits it
//! 3. A span still open at the end is emitted up to the head's current
//!    elapsed time only if the sub channel is running, otherwise dropped

use serde::{Deserialize, Serialize};

/// The state a sub channel entered when a mark was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkAction {
    Start,
    Pause,
}

impl MarkAction {
    /// The action matching a timer's state after a toggle.
    pub const fn for_running(running: bool) -> Self {
        if running { Self::Start } else { Self::Pause }
    }
}

/// A start/pause event anchored to the head channel's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub action: MarkAction,
    /// Head channel elapsed time when the mark was recorded.
    pub head_time_ms: i64,
}

/// A derived `[start, end]` active span, in milliseconds on the head timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Interval {
    /// Creates an interval, raising `end_ms` to `start_ms` if it lies before it.
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self {
            start_ms,
            end_ms: end_ms.max(start_ms),
        }
    }

    pub const fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Append-only log of marks for one sub channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkLedger {
    marks: Vec<Mark>,
}

impl MarkLedger {
    pub const fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// Appends a mark.
    pub fn record(&mut self, action: MarkAction, head_elapsed_ms: i64) {
        self.marks.push(Mark {
            action,
            head_time_ms: head_elapsed_ms,
        });
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn last(&self) -> Option<&Mark> {
        self.marks.last()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// See [`derive_intervals`].
    pub fn intervals(&self, currently_running: bool, head_elapsed_now_ms: i64) -> Vec<Interval> {
        derive_intervals(&self.marks, currently_running, head_elapsed_now_ms)
    }
}

/// Reduces a mark sequence to active intervals.
///
/// Pure: the same inputs always produce the same list. A `pause` with no
/// open `start` is ignored. A pause stamped before its start (possible only
/// if the head was reset mid-span) yields an empty interval at the start.
pub fn derive_intervals(
    marks: &[Mark],
    currently_running: bool,
    head_elapsed_now_ms: i64,
) -> Vec<Interval> {
    let mut intervals = Vec::with_capacity(marks.len() / 2 + 1);
    let mut open: Option<i64> = None;

    for mark in marks {
        match mark.action {
            MarkAction::Start => open = Some(mark.head_time_ms),
            MarkAction::Pause => {
                if let Some(start) = open.take() {
                    intervals.push(Interval::new(start, mark.head_time_ms));
                }
            }
        }
    }

    if let (Some(start), true) = (open, currently_running) {
        intervals.push(Interval::new(start, head_elapsed_now_ms));
    }

    intervals
}

/// Sum of interval durations.
pub fn total_ms(intervals: &[Interval]) -> i64 {
    intervals.iter().map(Interval::duration_ms).sum()
}

/// Union of possibly overlapping intervals, sorted by start.
/// Touching intervals are joined.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|i| (i.start_ms, i.end_ms));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start_ms <= last.end_ms => {
                last.end_ms = last.end_ms.max(interval.end_ms);
            }
            _ => merged.push(interval),
        }
    }
    merged
}
