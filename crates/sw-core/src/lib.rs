//! Core domain logic for splitwatch.
//!
//! This crate contains the fundamental types and logic for:
//! - Timers: running/paused state and elapsed time derived from timestamps
//! - Marks: start/pause events of sub channels anchored to their head's timeline
//! - Hierarchy: head channels with nested sub channels and a revisioned controller
//! - Builder: manually authored timelines over a duration or a clock range
//! - Notes: immutable text snapshots of the hierarchy

pub mod builder;
pub mod clock;
pub mod format;
pub mod hierarchy;
pub mod marks;
pub mod notes;
pub mod summary;
pub mod timer;
pub mod types;

pub use builder::{
    Bound, BuilderHead, BuilderInterval, BuilderSub, ClockTime, IntervalEdit, IntervalKind,
    TimeAxis, TimelineBuilder, TimelineDraft,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{format_clock_minutes, format_long, format_short};
pub use hierarchy::{ChannelController, HeadChannel, Hierarchy, Naming, SubChannel};
pub use marks::{
    Interval, Mark, MarkAction, MarkLedger, derive_intervals, merge_intervals, total_ms,
};
pub use notes::{Note, NoteStore};
pub use summary::{head_summary, hierarchy_snapshot, timeline_summary};
pub use timer::Timer;
pub use types::{ChannelId, IntervalId, ValidationError};
