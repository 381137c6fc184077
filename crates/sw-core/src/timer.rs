//! Elapsed-time engine for a single timer.
//!
//! Elapsed time is never incremented per tick. It is derived on every read
//! from the banked total of completed segments plus the distance between
//! `now` and the start of the open segment, so missed ticks cannot drift.

use serde::{Deserialize, Serialize};

use crate::format::format_long;
use crate::types::ChannelId;

/// Running/elapsed state shared by head and sub channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Stable identifier, never reused.
    pub id: ChannelId,

    /// User-editable label.
    pub name: String,

    /// Time banked from completed run segments, in milliseconds.
    #[serde(default)]
    accumulated_ms: i64,

    /// Wall-clock start of the open run segment. Present iff running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<i64>,
}

impl Timer {
    /// Creates a stopped timer with zero elapsed time.
    pub fn new(id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            accumulated_ms: 0,
            started_at: None,
        }
    }

    /// Whether the timer is accumulating time.
    pub const fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Time banked from completed segments, excluding any open segment.
    pub const fn accumulated_ms(&self) -> i64 {
        self.accumulated_ms
    }

    /// Start of the open segment, if running.
    pub const fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    /// Returns elapsed time at `now`.
    ///
    /// A clock that steps backwards contributes nothing rather than a
    /// negative delta.
    pub fn elapsed_ms(&self, now: i64) -> i64 {
        let open = self
            .started_at
            .map_or(0, |started| now.saturating_sub(started).max(0));
        self.accumulated_ms.saturating_add(open)
    }

    /// Flips between running and paused. Returns the resulting running state.
    pub fn toggle(&mut self, now: i64) -> bool {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
        self.is_running()
    }

    /// Opens a run segment. Returns `false` if already running.
    pub const fn start(&mut self, now: i64) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Banks the open segment. Returns `false` if already paused.
    pub fn pause(&mut self, now: i64) -> bool {
        let Some(started) = self.started_at.take() else {
            return false;
        };
        let delta = now.saturating_sub(started).max(0);
        self.accumulated_ms = self.accumulated_ms.saturating_add(delta);
        true
    }

    /// Stops the timer and zeroes its elapsed time.
    pub const fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.started_at = None;
    }

    /// Stopwatch reading at `now`.
    pub fn display_time(&self, now: i64) -> String {
        format_long(self.elapsed_ms(now))
    }

    /// Label of the action a toggle would perform.
    pub const fn button_label(&self) -> &'static str {
        if self.is_running() { "Pause" } else { "Start" }
    }
}
