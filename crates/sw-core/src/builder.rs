//! Manual timeline builder.
//!
//! A single builder covers both time axes: a plain duration in minutes, or a
//! wall-clock range. Interval bounds are stored as minute offsets from the
//! axis origin and every edit is clamped at the input boundary, so an
//! interval always satisfies `0 <= start < end <= total`.
//!
//! Cutoff intervals mark non-operational time. They are subtracted, as a
//! union, from the head's total to give its net duration.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::format::{format_clock_minutes, format_short};
use crate::marks::{Interval, merge_intervals, total_ms};
use crate::types::{ChannelId, IdCounter, IntervalId, ValidationError};

/// Smallest allowed interval width.
pub const MIN_INTERVAL_MIN: u32 = 1;

/// Width of a freshly added interval, before clamping.
pub const DEFAULT_INTERVAL_MIN: u32 = 10;

const MINUTES_PER_DAY: u32 = 24 * 60;
const MS_PER_MINUTE: i64 = 60_000;

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    /// Builds a clock time, wrapping minutes past midnight.
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes % MINUTES_PER_DAY)
    }

    /// Minutes since midnight.
    pub const fn minutes(self) -> u32 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| {
            ValidationError::InvalidClockTime {
                value: s.to_string(),
            }
        })?;
        Ok(Self(time.hour() * 60 + time.minute()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_clock_minutes(self.0))
    }
}

/// The axis a builder head is laid out against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeAxis {
    /// A total length in minutes, starting at zero.
    Duration { total_min: u32 },
    /// A clock range. An end at or before the start lies on the next day.
    Clock { start: ClockTime, end: ClockTime },
}

impl TimeAxis {
    /// Length of the axis in minutes, at least [`MIN_INTERVAL_MIN`].
    pub fn total_min(&self) -> u32 {
        let total = match *self {
            Self::Duration { total_min } => total_min,
            Self::Clock { start, end } => {
                if end > start {
                    end.minutes() - start.minutes()
                } else {
                    end.minutes() + MINUTES_PER_DAY - start.minutes()
                }
            }
        };
        total.max(MIN_INTERVAL_MIN)
    }

    pub const fn is_clock(&self) -> bool {
        matches!(self, Self::Clock { .. })
    }

    /// Offset on this axis for a clock-style input.
    ///
    /// On a clock axis `HH:MM` is a time of day; a time outside the range
    /// snaps to whichever edge is nearer on the 24h dial, so times shortly
    /// before the start give 0. On a duration axis it reads as hours and
    /// minutes into the timeline.
    pub fn offset_of(&self, time: ClockTime) -> u32 {
        match *self {
            Self::Duration { .. } => time.minutes(),
            Self::Clock { start, .. } => {
                let offset =
                    (time.minutes() + MINUTES_PER_DAY - start.minutes()) % MINUTES_PER_DAY;
                let total = self.total_min();
                if offset > total && offset - total > MINUTES_PER_DAY - offset {
                    0
                } else {
                    offset
                }
            }
        }
    }

    /// Resolves a bound given as minutes or `HH:MM`.
    pub fn resolve(&self, bound: Bound) -> u32 {
        match bound {
            Bound::Minutes(minutes) => minutes,
            Bound::Clock(time) => self.offset_of(time),
        }
    }

    /// Human label for an offset: a clock time, or a short duration.
    pub fn label(&self, offset_min: u32) -> String {
        match *self {
            Self::Duration { .. } => format_short(minutes_to_ms(offset_min)),
            Self::Clock { start, .. } => format_clock_minutes(start.minutes() + offset_min),
        }
    }
}

/// An interval bound as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Minutes(u32),
    Clock(ClockTime),
}

impl FromStr for Bound {
    type Err = ValidationError;

    /// Parses `"90"` as minutes and `"01:30"` as a clock time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains(':') {
            return trimmed.parse().map(Self::Clock);
        }
        trimmed
            .parse()
            .map(Self::Minutes)
            .map_err(|_| ValidationError::InvalidBound {
                value: s.to_string(),
            })
    }
}

/// Category of a builder interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    /// Active time.
    #[default]
    Normal,
    /// Non-operational time, subtracted from the head's net duration.
    Cutoff,
}

impl FromStr for IntervalKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "cutoff" => Ok(Self::Cutoff),
            _ => Err(ValidationError::InvalidIntervalKind {
                value: s.to_string(),
            }),
        }
    }
}

/// A user-authored span, in minute offsets from the axis origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderInterval {
    pub id: IntervalId,
    start_min: u32,
    end_min: u32,
    #[serde(default)]
    pub kind: IntervalKind,
}

impl BuilderInterval {
    pub const fn start_min(&self) -> u32 {
        self.start_min
    }

    pub const fn end_min(&self) -> u32 {
        self.end_min
    }

    pub const fn width_min(&self) -> u32 {
        self.end_min - self.start_min
    }

    /// The span in milliseconds, for the shared formatting and summation.
    pub fn to_interval(&self) -> Interval {
        Interval::new(minutes_to_ms(self.start_min), minutes_to_ms(self.end_min))
    }

    fn to_draft(&self) -> IntervalDraft {
        IntervalDraft {
            start: Bound::Minutes(self.start_min),
            end: Bound::Minutes(self.end_min),
            kind: self.kind,
        }
    }

    fn set_start(&mut self, value: u32) {
        self.start_min = value.min(self.end_min - MIN_INTERVAL_MIN);
    }

    fn set_end(&mut self, value: u32, total: u32) {
        self.end_min = value.max(self.start_min + MIN_INTERVAL_MIN).min(total);
    }

    /// Pulls both bounds inside a (possibly shrunk) axis.
    fn fit(&mut self, total: u32) {
        self.end_min = self.end_min.clamp(MIN_INTERVAL_MIN, total);
        self.start_min = self.start_min.min(self.end_min - MIN_INTERVAL_MIN);
    }
}

/// A builder sub channel: a named list of intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSub {
    pub id: ChannelId,
    pub name: String,
    #[serde(default)]
    intervals: Vec<BuilderInterval>,
}

impl BuilderSub {
    pub fn intervals(&self) -> &[BuilderInterval] {
        &self.intervals
    }

    fn interval_mut(&mut self, id: IntervalId) -> Option<&mut BuilderInterval> {
        self.intervals.iter_mut().find(|i| i.id == id)
    }

    fn to_draft(&self) -> SubDraft {
        SubDraft {
            name: Some(self.name.clone()),
            intervals: self
                .intervals
                .iter()
                .map(BuilderInterval::to_draft)
                .collect(),
        }
    }

    /// Intervals of one category, in milliseconds.
    pub fn spans(&self, kind: IntervalKind) -> Vec<Interval> {
        self.intervals
            .iter()
            .filter(|i| i.kind == kind)
            .map(BuilderInterval::to_interval)
            .collect()
    }

    /// Active time of the normal intervals. Overlaps count once.
    pub fn active_ms(&self) -> i64 {
        total_ms(&merge_intervals(&self.spans(IntervalKind::Normal)))
    }
}

/// A builder head: an axis plus sub channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderHead {
    pub id: ChannelId,
    pub name: String,
    axis: TimeAxis,
    #[serde(default)]
    subs: Vec<BuilderSub>,
}

impl BuilderHead {
    pub const fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn subs(&self) -> &[BuilderSub] {
        &self.subs
    }

    pub fn sub(&self, sub_id: ChannelId) -> Option<&BuilderSub> {
        self.subs.iter().find(|s| s.id == sub_id)
    }

    fn sub_mut(&mut self, sub_id: ChannelId) -> Option<&mut BuilderSub> {
        self.subs.iter_mut().find(|s| s.id == sub_id)
    }

    pub fn total_ms(&self) -> i64 {
        minutes_to_ms(self.axis.total_min())
    }

    /// Union of every cutoff interval across all sub channels.
    pub fn cutoff_ms(&self) -> i64 {
        let cutoffs: Vec<Interval> = self
            .subs
            .iter()
            .flat_map(|s| s.spans(IntervalKind::Cutoff))
            .collect();
        total_ms(&merge_intervals(&cutoffs))
    }

    /// Total minus cutoff time.
    pub fn net_ms(&self) -> i64 {
        (self.total_ms() - self.cutoff_ms()).max(0)
    }

    fn to_draft(&self) -> HeadDraft {
        HeadDraft {
            name: Some(self.name.clone()),
            axis: self.axis,
            subs: self.subs.iter().map(BuilderSub::to_draft).collect(),
        }
    }
}

/// Every editable field of a builder interval, for [`TimelineBuilder::edit_interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalEdit {
    Start(Bound),
    End(Bound),
    Kind(IntervalKind),
}

/// The collection of builder heads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBuilder {
    #[serde(default)]
    heads: Vec<BuilderHead>,
    #[serde(default)]
    next_id: IdCounter,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heads(&self) -> &[BuilderHead] {
        &self.heads
    }

    pub fn head(&self, head_id: ChannelId) -> Option<&BuilderHead> {
        self.heads.iter().find(|h| h.id == head_id)
    }

    fn head_mut(&mut self, head_id: ChannelId) -> Option<&mut BuilderHead> {
        self.heads.iter_mut().find(|h| h.id == head_id)
    }

    fn sub_mut(&mut self, head_id: ChannelId, sub_id: ChannelId) -> Option<&mut BuilderSub> {
        self.head_mut(head_id)?.sub_mut(sub_id)
    }

    pub fn add_head(&mut self, name: impl Into<String>, axis: TimeAxis) -> ChannelId {
        let id = ChannelId::new(self.next_id.next());
        self.heads.push(BuilderHead {
            id,
            name: name.into(),
            axis,
            subs: Vec::new(),
        });
        id
    }

    /// Replaces a head's axis and re-clamps its intervals into the new range.
    pub fn set_axis(&mut self, head_id: ChannelId, axis: TimeAxis) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        head.axis = axis;
        let total = axis.total_min();
        for interval in head.subs.iter_mut().flat_map(|s| s.intervals.iter_mut()) {
            interval.fit(total);
        }
        true
    }

    pub fn rename_head(&mut self, head_id: ChannelId, name: impl Into<String>) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        head.name = name.into();
        true
    }

    pub fn delete_head(&mut self, head_id: ChannelId) -> bool {
        let before = self.heads.len();
        self.heads.retain(|h| h.id != head_id);
        self.heads.len() != before
    }

    pub fn add_sub(&mut self, head_id: ChannelId, name: impl Into<String>) -> Option<ChannelId> {
        self.head(head_id)?;
        let id = ChannelId::new(self.next_id.next());
        self.head_mut(head_id)?.subs.push(BuilderSub {
            id,
            name: name.into(),
            intervals: Vec::new(),
        });
        Some(id)
    }

    pub fn rename_sub(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        name: impl Into<String>,
    ) -> bool {
        let Some(sub) = self.sub_mut(head_id, sub_id) else {
            return false;
        };
        sub.name = name.into();
        true
    }

    pub fn delete_sub(&mut self, head_id: ChannelId, sub_id: ChannelId) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        let before = head.subs.len();
        head.subs.retain(|s| s.id != sub_id);
        head.subs.len() != before
    }

    /// Appends an interval starting where the previous one ended.
    pub fn add_interval(&mut self, head_id: ChannelId, sub_id: ChannelId) -> Option<IntervalId> {
        let head = self.head(head_id)?;
        let start = head
            .sub(sub_id)?
            .intervals
            .last()
            .map_or(0, BuilderInterval::end_min);
        self.add_interval_at(
            head_id,
            sub_id,
            Bound::Minutes(start),
            Bound::Minutes(start.saturating_add(DEFAULT_INTERVAL_MIN)),
            IntervalKind::Normal,
        )
    }

    /// Appends an interval with explicit bounds, clamped into the head's range.
    pub fn add_interval_at(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        start: Bound,
        end: Bound,
        kind: IntervalKind,
    ) -> Option<IntervalId> {
        let axis = *self.head(head_id)?.axis();
        self.head(head_id)?.sub(sub_id)?;
        let total = axis.total_min();
        let id = IntervalId::new(self.next_id.next());

        let start_min = axis.resolve(start).min(total - MIN_INTERVAL_MIN);
        let mut interval = BuilderInterval {
            id,
            start_min,
            end_min: total,
            kind,
        };
        interval.set_end(axis.resolve(end), total);

        self.sub_mut(head_id, sub_id)?.intervals.push(interval);
        Some(id)
    }

    /// Edits one field of an interval, clamping bounds so the interval stays
    /// at least [`MIN_INTERVAL_MIN`] wide and inside the head's range.
    pub fn edit_interval(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        interval_id: IntervalId,
        edit: IntervalEdit,
    ) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        let axis = head.axis;
        let Some(interval) = head
            .sub_mut(sub_id)
            .and_then(|s| s.interval_mut(interval_id))
        else {
            return false;
        };
        match edit {
            IntervalEdit::Start(bound) => interval.set_start(axis.resolve(bound)),
            IntervalEdit::End(bound) => interval.set_end(axis.resolve(bound), axis.total_min()),
            IntervalEdit::Kind(kind) => interval.kind = kind,
        }
        true
    }

    pub fn set_interval_start(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        interval_id: IntervalId,
        start: Bound,
    ) -> bool {
        self.edit_interval(head_id, sub_id, interval_id, IntervalEdit::Start(start))
    }

    pub fn set_interval_end(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        interval_id: IntervalId,
        end: Bound,
    ) -> bool {
        self.edit_interval(head_id, sub_id, interval_id, IntervalEdit::End(end))
    }

    pub fn set_interval_kind(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        interval_id: IntervalId,
        kind: IntervalKind,
    ) -> bool {
        self.edit_interval(head_id, sub_id, interval_id, IntervalEdit::Kind(kind))
    }

    pub fn delete_interval(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        interval_id: IntervalId,
    ) -> bool {
        let Some(sub) = self.sub_mut(head_id, sub_id) else {
            return false;
        };
        let before = sub.intervals.len();
        sub.intervals.retain(|i| i.id != interval_id);
        sub.intervals.len() != before
    }

    pub fn clear(&mut self) {
        self.heads.clear();
    }

    /// The draft that rebuilds this timeline, with bounds as axis offsets.
    ///
    /// Only IDs are lost: [`from_draft`](Self::from_draft) reassigns them.
    pub fn to_draft(&self) -> TimelineDraft {
        TimelineDraft {
            heads: self.heads.iter().map(BuilderHead::to_draft).collect(),
        }
    }

    /// Builds a timeline by replaying a draft through the clamping setters.
    pub fn from_draft(draft: &TimelineDraft) -> Self {
        let mut builder = Self::new();
        for (i, head_draft) in draft.heads.iter().enumerate() {
            let name = head_draft
                .name
                .clone()
                .unwrap_or_else(|| format!("Timeline {}", i + 1));
            let head = builder.add_head(name, head_draft.axis);
            for (j, sub_draft) in head_draft.subs.iter().enumerate() {
                let name = sub_draft
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Sub {}", j + 1));
                let Some(sub) = builder.add_sub(head, name) else {
                    continue;
                };
                for interval in &sub_draft.intervals {
                    builder.add_interval_at(head, sub, interval.start, interval.end, interval.kind);
                }
            }
        }
        tracing::debug!(heads = builder.heads.len(), "built timeline from draft");
        builder
    }
}

/// Serializable description of a timeline, as written by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineDraft {
    #[serde(default)]
    pub heads: Vec<HeadDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub axis: TimeAxis,
    #[serde(default)]
    pub subs: Vec<SubDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub intervals: Vec<IntervalDraft>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalDraft {
    pub start: Bound,
    pub end: Bound,
    #[serde(default)]
    pub kind: IntervalKind,
}

fn minutes_to_ms(minutes: u32) -> i64 {
    i64::from(minutes) * MS_PER_MINUTE
}
