//! Plain-text summaries for the clipboard and for notes.

use std::fmt::Write;

use crate::builder::{BuilderHead, IntervalKind};
use crate::format::format_short;
use crate::hierarchy::{HeadChannel, Hierarchy};

/// Clipboard block for one live head channel: the head line, then one line
/// per sub channel followed by its numbered intervals.
pub fn head_summary(head: &HeadChannel, now: i64) -> String {
    let mut out = String::new();
    let head_elapsed = head.timer.elapsed_ms(now);
    writeln!(out, "{}: {}", head.timer.name, format_short(head_elapsed)).unwrap();

    for sub in head.subs() {
        writeln!(
            out,
            "  {}: {}",
            sub.timer.name,
            format_short(sub.timer.elapsed_ms(now))
        )
        .unwrap();
        for (i, interval) in sub.intervals(head_elapsed).iter().enumerate() {
            writeln!(
                out,
                "    {}. {} - {}",
                i + 1,
                format_short(interval.start_ms),
                format_short(interval.end_ms)
            )
            .unwrap();
        }
    }
    out
}

/// Display state of every channel, used as note content.
pub fn hierarchy_snapshot(hierarchy: &Hierarchy, now: i64) -> String {
    let mut out = String::new();
    if hierarchy.is_empty() {
        writeln!(out, "No channels.").unwrap();
        return out;
    }
    for head in hierarchy.heads() {
        writeln!(out, "{}: {}", head.timer.name, head.timer.display_time(now)).unwrap();
        for sub in head.subs() {
            writeln!(out, "  {}: {}", sub.timer.name, sub.timer.display_time(now)).unwrap();
        }
    }
    out
}

/// Clipboard block for a builder head, with net and cutoff totals.
pub fn timeline_summary(head: &BuilderHead) -> String {
    let mut out = String::new();
    let axis = head.axis();
    write!(out, "{}: {}", head.name, format_short(head.total_ms())).unwrap();
    if axis.is_clock() {
        write!(
            out,
            " ({} - {})",
            axis.label(0),
            axis.label(axis.total_min())
        )
        .unwrap();
    }
    let cutoff = head.cutoff_ms();
    if cutoff > 0 {
        write!(
            out,
            ", net {} after {} cutoff",
            format_short(head.net_ms()),
            format_short(cutoff)
        )
        .unwrap();
    }
    writeln!(out).unwrap();

    for sub in head.subs() {
        writeln!(out, "  {}: {}", sub.name, format_short(sub.active_ms())).unwrap();
        for (i, interval) in sub.intervals().iter().enumerate() {
            let tag = match interval.kind {
                IntervalKind::Normal => "",
                IntervalKind::Cutoff => " [cutoff]",
            };
            writeln!(
                out,
                "    {}. {} - {}{tag}",
                i + 1,
                axis.label(interval.start_min()),
                axis.label(interval.end_min())
            )
            .unwrap();
        }
    }
    out
}
