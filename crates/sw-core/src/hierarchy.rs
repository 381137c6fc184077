//! Head channels, their sub channels, and the controller that owns them.
//!
//! [`Hierarchy`] is a plain value with in-place mutators that report whether
//! anything changed. [`ChannelController`] is the single mutation path used
//! by front-ends: it applies each mutator to a copy of the current revision
//! and publishes the copy as a new `Arc` only if it changed, so a reader
//! holding an older snapshot never observes a partial update, and
//! `Arc::ptr_eq` tells a renderer whether anything happened.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::marks::{Interval, MarkAction, MarkLedger};
use crate::timer::Timer;
use crate::types::{ChannelId, IdCounter};

/// A dependent timer whose activity is anchored to its head's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChannel {
    #[serde(flatten)]
    pub timer: Timer,
    #[serde(default)]
    marks: MarkLedger,
}

impl SubChannel {
    pub fn new(id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            timer: Timer::new(id, name),
            marks: MarkLedger::new(),
        }
    }

    pub const fn id(&self) -> ChannelId {
        self.timer.id
    }

    pub const fn marks(&self) -> &MarkLedger {
        &self.marks
    }

    /// Toggles the timer and records the resulting action at `head_elapsed_ms`.
    fn toggle(&mut self, now: i64, head_elapsed_ms: i64) -> MarkAction {
        let action = MarkAction::for_running(self.timer.toggle(now));
        self.marks.record(action, head_elapsed_ms);
        action
    }

    /// Pauses if running, recording a pause mark. Returns whether it was running.
    fn pause(&mut self, now: i64, head_elapsed_ms: i64) -> bool {
        if !self.timer.pause(now) {
            return false;
        }
        self.marks.record(MarkAction::Pause, head_elapsed_ms);
        true
    }

    fn reset(&mut self) {
        self.timer.reset();
        self.marks.clear();
    }

    /// Active intervals on the head timeline, given the head's elapsed time now.
    pub fn intervals(&self, head_elapsed_now_ms: i64) -> Vec<Interval> {
        self.marks
            .intervals(self.timer.is_running(), head_elapsed_now_ms)
    }
}

/// A top-level timer owning an ordered list of sub channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadChannel {
    #[serde(flatten)]
    pub timer: Timer,
    #[serde(default)]
    subs: Vec<SubChannel>,
    /// Numbers handed to default sub names, so deleting a sub never causes
    /// the next default name to repeat.
    #[serde(default)]
    sub_numbers: IdCounter,
}

impl HeadChannel {
    pub fn new(id: ChannelId, name: impl Into<String>) -> Self {
        Self {
            timer: Timer::new(id, name),
            subs: Vec::new(),
            sub_numbers: IdCounter::default(),
        }
    }

    pub const fn id(&self) -> ChannelId {
        self.timer.id
    }

    /// Sub channels in display order.
    pub fn subs(&self) -> &[SubChannel] {
        &self.subs
    }

    pub fn sub(&self, sub_id: ChannelId) -> Option<&SubChannel> {
        self.subs.iter().find(|s| s.id() == sub_id)
    }

    fn sub_mut(&mut self, sub_id: ChannelId) -> Option<&mut SubChannel> {
        self.subs.iter_mut().find(|s| s.id() == sub_id)
    }

    /// Intervals of one sub channel at `now`.
    pub fn sub_intervals(&self, sub_id: ChannelId, now: i64) -> Option<Vec<Interval>> {
        let elapsed = self.timer.elapsed_ms(now);
        self.sub(sub_id).map(|s| s.intervals(elapsed))
    }

    /// Toggles the head. Pausing also pauses every running sub channel at
    /// the head's elapsed time; starting leaves sub channels alone.
    fn toggle(&mut self, now: i64) -> bool {
        let running = self.timer.toggle(now);
        if !running {
            self.pause_subs(now);
        }
        running
    }

    /// Pauses every running sub channel. Returns how many were paused.
    fn pause_subs(&mut self, now: i64) -> usize {
        let head_elapsed = self.timer.elapsed_ms(now);
        self.subs
            .iter_mut()
            .map(|sub| usize::from(sub.pause(now, head_elapsed)))
            .sum()
    }

    fn toggle_sub(&mut self, sub_id: ChannelId, now: i64) -> Option<MarkAction> {
        let head_elapsed = self.timer.elapsed_ms(now);
        self.sub_mut(sub_id)
            .map(|sub| sub.toggle(now, head_elapsed))
    }
}

/// The ordered collection of head channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default)]
    heads: Vec<HeadChannel>,
    #[serde(default)]
    next_id: IdCounter,
    #[serde(default)]
    head_numbers: IdCounter,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Head channels in display order.
    pub fn heads(&self) -> &[HeadChannel] {
        &self.heads
    }

    pub fn head(&self, head_id: ChannelId) -> Option<&HeadChannel> {
        self.heads.iter().find(|h| h.id() == head_id)
    }

    fn head_mut(&mut self, head_id: ChannelId) -> Option<&mut HeadChannel> {
        self.heads.iter_mut().find(|h| h.id() == head_id)
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Whether any head or sub channel is running.
    pub fn any_running(&self) -> bool {
        self.heads
            .iter()
            .any(|h| h.timer.is_running() || h.subs.iter().any(|s| s.timer.is_running()))
    }

    fn allocate_id(&mut self) -> ChannelId {
        ChannelId::new(self.next_id.next())
    }

    /// Default name for the next head channel. Numbers count every head
    /// added since the last [`delete_all`](Self::delete_all).
    pub fn next_head_name(&self, prefix: &str) -> String {
        format!("{prefix} {}", self.head_numbers.peek())
    }

    /// Default name for the next sub channel of `head_id`.
    pub fn next_sub_name(&self, head_id: ChannelId, prefix: &str) -> Option<String> {
        self.head(head_id)
            .map(|h| format!("{prefix} {}", h.sub_numbers.peek()))
    }

    pub fn add_head_channel(&mut self, name: impl Into<String>) -> ChannelId {
        let id = self.allocate_id();
        self.head_numbers.next();
        self.heads.push(HeadChannel::new(id, name));
        id
    }

    pub fn add_sub_channel(
        &mut self,
        head_id: ChannelId,
        name: impl Into<String>,
    ) -> Option<ChannelId> {
        // Check first so a missing head does not consume an ID.
        self.head(head_id)?;
        let id = self.allocate_id();
        let head = self.head_mut(head_id)?;
        head.sub_numbers.next();
        head.subs.push(SubChannel::new(id, name));
        Some(id)
    }

    pub fn rename_head_channel(&mut self, head_id: ChannelId, name: impl Into<String>) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        head.timer.name = name.into();
        true
    }

    pub fn rename_sub_channel(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        name: impl Into<String>,
    ) -> bool {
        let Some(sub) = self.head_mut(head_id).and_then(|h| h.sub_mut(sub_id)) else {
            return false;
        };
        sub.timer.name = name.into();
        true
    }

    /// Toggles a head channel. Returns its resulting running state.
    pub fn toggle_head_channel(&mut self, head_id: ChannelId, now: i64) -> Option<bool> {
        self.head_mut(head_id).map(|h| h.toggle(now))
    }

    /// Toggles a sub channel and records the mark. Returns the recorded action.
    pub fn toggle_sub_channel(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        now: i64,
    ) -> Option<MarkAction> {
        self.head_mut(head_id)?.toggle_sub(sub_id, now)
    }

    /// Resets a head channel's timer. Its sub channels keep their state.
    pub fn reset_head_channel(&mut self, head_id: ChannelId) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        head.timer.reset();
        true
    }

    /// Resets a sub channel's timer and clears its marks.
    pub fn reset_sub_channel(&mut self, head_id: ChannelId, sub_id: ChannelId) -> bool {
        let Some(sub) = self.head_mut(head_id).and_then(|h| h.sub_mut(sub_id)) else {
            return false;
        };
        sub.reset();
        true
    }

    /// Removes a head channel together with all its sub channels.
    pub fn delete_head_channel(&mut self, head_id: ChannelId) -> bool {
        let before = self.heads.len();
        self.heads.retain(|h| h.id() != head_id);
        self.heads.len() != before
    }

    pub fn delete_sub_channel(&mut self, head_id: ChannelId, sub_id: ChannelId) -> bool {
        let Some(head) = self.head_mut(head_id) else {
            return false;
        };
        let before = head.subs.len();
        head.subs.retain(|s| s.id() != sub_id);
        head.subs.len() != before
    }

    /// Resets every head and sub channel.
    pub fn reset_all_timers(&mut self) -> bool {
        for head in &mut self.heads {
            head.timer.reset();
            head.subs.iter_mut().for_each(SubChannel::reset);
        }
        !self.heads.is_empty()
    }

    /// Pauses every running head and sub channel without deleting anything.
    /// Returns how many timers were paused.
    pub fn close_all_channels(&mut self, now: i64) -> usize {
        self.heads
            .iter_mut()
            .map(|head| usize::from(head.timer.pause(now)) + head.pause_subs(now))
            .sum()
    }

    /// Removes every head channel. IDs already handed out stay retired;
    /// default names start over from 1.
    pub fn delete_all(&mut self) -> bool {
        let changed = !self.heads.is_empty();
        self.heads.clear();
        self.head_numbers = IdCounter::default();
        changed
    }
}

/// Default-name prefixes for new channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub head_prefix: String,
    pub sub_prefix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            head_prefix: "Channel".to_string(),
            sub_prefix: "Sub".to_string(),
        }
    }
}

/// Owns the current hierarchy revision and is its only mutation path.
#[derive(Debug)]
pub struct ChannelController<C> {
    current: Arc<Hierarchy>,
    revision: u64,
    clock: C,
    naming: Naming,
}

impl<C: Clock> ChannelController<C> {
    pub fn new(clock: C) -> Self {
        Self::from_hierarchy(Hierarchy::new(), clock)
    }

    /// Resumes from a previously saved hierarchy.
    pub fn from_hierarchy(hierarchy: Hierarchy, clock: C) -> Self {
        Self {
            current: Arc::new(hierarchy),
            revision: 0,
            clock,
            naming: Naming::default(),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// The current revision. Cheap to clone and never mutated afterwards.
    pub fn snapshot(&self) -> Arc<Hierarchy> {
        Arc::clone(&self.current)
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.current
    }

    /// Number of effective mutations since construction.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Applies `op` to a copy of the current revision, publishing the copy
    /// only if `op` reports a change.
    fn apply<T>(&mut self, op: impl FnOnce(&mut Hierarchy, i64) -> Option<T>) -> Option<T> {
        let now = self.clock.now_ms();
        let mut next = Hierarchy::clone(&self.current);
        let out = op(&mut next, now)?;
        self.publish(next);
        Some(out)
    }

    fn publish(&mut self, next: Hierarchy) {
        self.current = Arc::new(next);
        self.revision += 1;
    }

    pub fn add_head_channel(&mut self) -> ChannelId {
        let name = self.current.next_head_name(&self.naming.head_prefix);
        self.add_named_head_channel(name)
    }

    pub fn add_named_head_channel(&mut self, name: impl Into<String>) -> ChannelId {
        let mut next = Hierarchy::clone(&self.current);
        let id = next.add_head_channel(name);
        self.publish(next);
        tracing::debug!(head = %id, "added head channel");
        id
    }

    /// Adds a sub channel. No-op returning `None` if the head does not exist.
    pub fn add_sub_channel(&mut self, head_id: ChannelId) -> Option<ChannelId> {
        let name = self
            .current
            .next_sub_name(head_id, &self.naming.sub_prefix)?;
        self.add_named_sub_channel(head_id, name)
    }

    pub fn add_named_sub_channel(
        &mut self,
        head_id: ChannelId,
        name: impl Into<String>,
    ) -> Option<ChannelId> {
        let name = name.into();
        let id = self.apply(|h, _| h.add_sub_channel(head_id, name))?;
        tracing::debug!(head = %head_id, sub = %id, "added sub channel");
        Some(id)
    }

    pub fn rename_head_channel(&mut self, head_id: ChannelId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.apply(|h, _| h.rename_head_channel(head_id, name).then_some(()))
            .is_some()
    }

    pub fn rename_sub_channel(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
        name: impl Into<String>,
    ) -> bool {
        let name = name.into();
        self.apply(|h, _| h.rename_sub_channel(head_id, sub_id, name).then_some(()))
            .is_some()
    }

    /// Returns the head's running state after the toggle.
    pub fn toggle_head_channel(&mut self, head_id: ChannelId) -> Option<bool> {
        let running = self.apply(|h, now| h.toggle_head_channel(head_id, now))?;
        tracing::debug!(head = %head_id, running, "toggled head channel");
        Some(running)
    }

    /// Returns the mark recorded by the toggle.
    pub fn toggle_sub_channel(
        &mut self,
        head_id: ChannelId,
        sub_id: ChannelId,
    ) -> Option<MarkAction> {
        let action = self.apply(|h, now| h.toggle_sub_channel(head_id, sub_id, now))?;
        tracing::debug!(head = %head_id, sub = %sub_id, ?action, "toggled sub channel");
        Some(action)
    }

    pub fn reset_head_channel(&mut self, head_id: ChannelId) -> bool {
        self.apply(|h, _| h.reset_head_channel(head_id).then_some(()))
            .is_some()
    }

    pub fn reset_sub_channel(&mut self, head_id: ChannelId, sub_id: ChannelId) -> bool {
        self.apply(|h, _| h.reset_sub_channel(head_id, sub_id).then_some(()))
            .is_some()
    }

    pub fn delete_head_channel(&mut self, head_id: ChannelId) -> bool {
        let deleted = self
            .apply(|h, _| h.delete_head_channel(head_id).then_some(()))
            .is_some();
        tracing::debug!(head = %head_id, deleted, "delete head channel");
        deleted
    }

    pub fn delete_sub_channel(&mut self, head_id: ChannelId, sub_id: ChannelId) -> bool {
        self.apply(|h, _| h.delete_sub_channel(head_id, sub_id).then_some(()))
            .is_some()
    }

    pub fn reset_all_timers(&mut self) -> bool {
        self.apply(|h, _| h.reset_all_timers().then_some(()))
            .is_some()
    }

    /// Returns how many timers were paused.
    pub fn close_all_channels(&mut self) -> usize {
        let paused = self
            .apply(|h, now| Some(h.close_all_channels(now)).filter(|&n| n > 0))
            .unwrap_or(0);
        tracing::debug!(paused, "closed all channels");
        paused
    }

    pub fn delete_all(&mut self) -> bool {
        self.apply(|h, _| h.delete_all().then_some(())).is_some()
    }

    /// Stopwatch reading of a timer at the controller's current time.
    pub fn display_time(&self, timer: &Timer) -> String {
        timer.display_time(self.now())
    }

    pub const fn button_label(timer: &Timer) -> &'static str {
        timer.button_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::marks::Mark;

    type Controller<'a> = ChannelController<&'a ManualClock>;

    fn controller(clock: &ManualClock) -> Controller<'_> {
        ChannelController::new(clock)
    }

    fn head_names(h: &Hierarchy) -> Vec<&str> {
        h.heads().iter().map(|h| h.timer.name.as_str()).collect()
    }

    #[test]
    fn add_head_channel_uses_sequential_names() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let a = c.add_head_channel();
        let b = c.add_head_channel();
        assert_ne!(a, b);
        assert_eq!(head_names(c.hierarchy()), ["Channel 1", "Channel 2"]);
        assert!(c.hierarchy().heads().iter().all(|h| h.subs().is_empty()));
    }

    #[test]
    fn custom_naming_prefixes() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock).with_naming(Naming {
            head_prefix: "Run".to_string(),
            sub_prefix: "Lap".to_string(),
        });
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        let h = c.hierarchy().head(head).unwrap();
        assert_eq!(h.timer.name, "Run 1");
        assert_eq!(h.sub(sub).unwrap().timer.name, "Lap 1");
    }

    #[test]
    fn add_sub_channel_to_missing_head_is_noop() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let before = c.snapshot();
        assert_eq!(c.add_sub_channel(ChannelId::new(42)), None);
        assert!(Arc::ptr_eq(&before, &c.snapshot()));
        assert_eq!(c.revision(), 0);
    }

    #[test]
    fn ids_are_never_reused() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let first = c.add_head_channel();
        c.delete_all();
        let second = c.add_head_channel();
        assert!(second > first);
    }

    #[test]
    fn scenario_sub_interval_inside_head_segment() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();

        assert_eq!(c.toggle_head_channel(head), Some(true));
        clock.set(30_000);
        assert_eq!(c.toggle_sub_channel(head, sub), Some(MarkAction::Start));
        clock.set(90_000);
        assert_eq!(c.toggle_sub_channel(head, sub), Some(MarkAction::Pause));
        clock.set(120_000);
        assert_eq!(c.toggle_head_channel(head), Some(false));

        let h = c.hierarchy().head(head).unwrap();
        assert_eq!(
            h.sub_intervals(sub, clock.now_ms()).unwrap(),
            vec![Interval::new(30_000, 90_000)]
        );
        let sub_timer = &h.sub(sub).unwrap().timer;
        assert_eq!(c.display_time(sub_timer), "1:00");
        assert_eq!(c.display_time(&h.timer), "2:00");
    }

    #[test]
    fn pausing_head_pauses_running_subs_at_head_time() {
        let clock = ManualClock::new(1_000);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let a = c.add_sub_channel(head).unwrap();
        let b = c.add_sub_channel(head).unwrap();
        let idle = c.add_sub_channel(head).unwrap();

        c.toggle_head_channel(head);
        clock.advance(5_000);
        c.toggle_sub_channel(head, a);
        clock.advance(2_000);
        c.toggle_sub_channel(head, b);
        clock.advance(3_000);
        c.toggle_head_channel(head);

        let h = c.hierarchy().head(head).unwrap();
        let head_elapsed = h.timer.elapsed_ms(clock.now_ms());
        assert_eq!(head_elapsed, 10_000);
        for sub_id in [a, b] {
            let sub = h.sub(sub_id).unwrap();
            assert!(!sub.timer.is_running());
            assert_eq!(
                sub.marks().last(),
                Some(&Mark {
                    action: MarkAction::Pause,
                    head_time_ms: head_elapsed
                })
            );
        }
        assert!(h.sub(idle).unwrap().marks().is_empty());
    }

    #[test]
    fn starting_head_does_not_start_subs() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        let h = c.hierarchy().head(head).unwrap();
        assert!(h.timer.is_running());
        assert!(!h.sub(sub).unwrap().timer.is_running());
    }

    #[test]
    fn sub_mark_uses_head_elapsed_not_wall_clock() {
        let clock = ManualClock::new(50_000);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        clock.advance(4_000);
        c.toggle_sub_channel(head, sub);
        let sub = c.hierarchy().head(head).unwrap().sub(sub).unwrap();
        assert_eq!(
            sub.marks().marks(),
            &[Mark {
                action: MarkAction::Start,
                head_time_ms: 4_000
            }]
        );
    }

    #[test]
    fn running_sub_interval_tracks_head_now() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        clock.set(1_000);
        c.toggle_sub_channel(head, sub);
        clock.set(7_000);
        let h = c.hierarchy().head(head).unwrap();
        let intervals = h.sub_intervals(sub, clock.now_ms()).unwrap();
        assert_eq!(intervals, vec![Interval::new(1_000, 7_000)]);
    }

    #[test]
    fn resetting_head_keeps_sub_history() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        c.toggle_sub_channel(head, sub);
        clock.set(3_000);
        c.toggle_head_channel(head);

        assert!(c.reset_head_channel(head));
        let h = c.hierarchy().head(head).unwrap();
        assert_eq!(h.timer.elapsed_ms(clock.now_ms()), 0);
        let s = h.sub(sub).unwrap();
        assert_eq!(s.timer.elapsed_ms(clock.now_ms()), 3_000);
        assert_eq!(s.marks().len(), 2);
    }

    #[test]
    fn pausing_sub_after_head_reset_yields_empty_interval() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        clock.set(10_000);
        c.toggle_sub_channel(head, sub);

        // Reset mid-span, restart the head, then pause the sub at head time 3s.
        clock.set(20_000);
        c.reset_head_channel(head);
        c.toggle_head_channel(head);
        clock.set(23_000);
        assert_eq!(c.toggle_sub_channel(head, sub), Some(MarkAction::Pause));

        let h = c.hierarchy().head(head).unwrap();
        let s = h.sub(sub).unwrap();
        assert_eq!(
            s.marks().marks(),
            [
                Mark {
                    action: MarkAction::Start,
                    head_time_ms: 10_000
                },
                Mark {
                    action: MarkAction::Pause,
                    head_time_ms: 3_000
                },
            ]
        );
        let intervals = h.sub_intervals(sub, clock.now_ms()).unwrap();
        assert_eq!(intervals, vec![Interval::new(10_000, 10_000)]);
        assert_eq!(intervals[0].duration_ms(), 0);
        assert_eq!(c.display_time(&h.timer), "0:03");
        assert_eq!(c.display_time(&s.timer), "0:13");
        assert_eq!(Controller::button_label(&s.timer), "Start");
    }

    #[test]
    fn default_names_do_not_repeat_after_delete() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let first = c.add_head_channel();
        let second = c.add_head_channel();
        let a = c.add_sub_channel(second).unwrap();
        c.add_sub_channel(second).unwrap();

        c.delete_head_channel(first);
        c.delete_sub_channel(second, a);
        let third = c.add_head_channel();
        let sub = c.add_sub_channel(second).unwrap();

        let h = c.hierarchy();
        assert_eq!(head_names(h), ["Channel 2", "Channel 3"]);
        let subs = h.head(second).unwrap().subs();
        assert_eq!(subs.last().unwrap().id(), sub);
        assert_eq!(subs.last().unwrap().timer.name, "Sub 3");
        assert!(h.head(third).unwrap().subs().is_empty());

        c.delete_all();
        c.add_head_channel();
        assert_eq!(c.hierarchy().heads()[0].timer.name, "Channel 1");
    }

    #[test]
    fn resetting_sub_clears_marks() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_sub_channel(head, sub);
        clock.set(2_000);
        assert!(c.reset_sub_channel(head, sub));
        let s = c.hierarchy().head(head).unwrap().sub(sub).unwrap().clone();
        assert!(!s.timer.is_running());
        assert!(s.marks().is_empty());
        assert_eq!(s.timer.elapsed_ms(clock.now_ms()), 0);
    }

    #[test]
    fn deleting_head_removes_subs_and_later_ops_are_noops() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let subs: Vec<_> = (0..3).map(|_| c.add_sub_channel(head).unwrap()).collect();
        assert!(c.delete_head_channel(head));
        assert!(c.hierarchy().is_empty());

        let before = c.snapshot();
        for sub in subs {
            assert_eq!(c.toggle_sub_channel(head, sub), None);
            assert!(!c.reset_sub_channel(head, sub));
            assert!(!c.delete_sub_channel(head, sub));
            assert!(!c.rename_sub_channel(head, sub, "x"));
        }
        assert_eq!(c.toggle_head_channel(head), None);
        assert!(!c.delete_head_channel(head));
        assert!(Arc::ptr_eq(&before, &c.snapshot()));
    }

    #[test]
    fn delete_sub_channel_keeps_siblings_in_order() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let a = c.add_sub_channel(head).unwrap();
        let b = c.add_sub_channel(head).unwrap();
        let d = c.add_sub_channel(head).unwrap();
        assert!(c.delete_sub_channel(head, b));
        let h = c.hierarchy().head(head).unwrap();
        let ids: Vec<_> = h.subs().iter().map(SubChannel::id).collect();
        assert_eq!(ids, vec![a, d]);
    }

    #[test]
    fn rename_channels() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        assert!(c.rename_head_channel(head, "Deploy"));
        assert!(c.rename_sub_channel(head, sub, "Build"));
        let h = c.hierarchy().head(head).unwrap();
        assert_eq!(h.timer.name, "Deploy");
        assert_eq!(h.sub(sub).unwrap().timer.name, "Build");
        assert!(!c.rename_head_channel(ChannelId::new(999), "nope"));
    }

    #[test]
    fn close_all_pauses_everything_and_records_marks() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let h1 = c.add_head_channel();
        let h2 = c.add_head_channel();
        let s1 = c.add_sub_channel(h1).unwrap();
        let s2 = c.add_sub_channel(h2).unwrap();
        c.toggle_head_channel(h1);
        c.toggle_sub_channel(h1, s1);
        // Sub running under a paused head.
        c.toggle_sub_channel(h2, s2);
        clock.set(4_000);

        assert_eq!(c.close_all_channels(), 3);
        assert!(!c.hierarchy().any_running());
        let last_mark = |head, sub| {
            let s = c.hierarchy().head(head).unwrap().sub(sub).unwrap();
            s.marks().last().copied()
        };
        let pause_at = |head_time_ms| Mark {
            action: MarkAction::Pause,
            head_time_ms,
        };
        assert_eq!(last_mark(h1, s1), Some(pause_at(4_000)));
        assert_eq!(last_mark(h2, s2), Some(pause_at(0)));

        let before = c.snapshot();
        assert_eq!(c.close_all_channels(), 0);
        assert!(Arc::ptr_eq(&before, &c.snapshot()));
    }

    #[test]
    fn reset_all_resets_heads_and_subs() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        c.toggle_sub_channel(head, sub);
        clock.set(9_000);
        assert!(c.reset_all_timers());
        let h = c.hierarchy().head(head).unwrap();
        assert_eq!(h.timer.elapsed_ms(clock.now_ms()), 0);
        assert!(!h.timer.is_running());
        let s = h.sub(sub).unwrap();
        assert_eq!(s.timer.elapsed_ms(clock.now_ms()), 0);
        assert!(s.marks().is_empty());
    }

    #[test]
    fn delete_all_clears_collection() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.add_head_channel();
        c.add_head_channel();
        assert!(c.delete_all());
        assert!(c.hierarchy().is_empty());
        assert!(!c.delete_all());
    }

    #[test]
    fn old_snapshots_are_unaffected_by_mutation() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let old = c.snapshot();
        c.toggle_head_channel(head);
        assert!(!old.head(head).unwrap().timer.is_running());
        assert!(c.hierarchy().head(head).unwrap().timer.is_running());
        assert_eq!(c.revision(), 2);
    }

    #[test]
    fn button_labels_follow_running_state() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let timer = &c.hierarchy().head(head).unwrap().timer;
        assert_eq!(Controller::button_label(timer), "Start");
        c.toggle_head_channel(head);
        let timer = &c.hierarchy().head(head).unwrap().timer;
        assert_eq!(Controller::button_label(timer), "Pause");
    }

    #[test]
    fn hierarchy_serde_roundtrip_preserves_ids_and_marks() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let head = c.add_head_channel();
        let sub = c.add_sub_channel(head).unwrap();
        c.toggle_head_channel(head);
        c.toggle_sub_channel(head, sub);

        let json = serde_json::to_string(c.hierarchy()).unwrap();
        let parsed: Hierarchy = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, c.hierarchy());

        let mut resumed = ChannelController::from_hierarchy(parsed, &clock);
        let next = resumed.add_head_channel();
        assert!(next > sub);
    }
}
