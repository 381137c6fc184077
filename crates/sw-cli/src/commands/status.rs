//! Status command showing every channel, its reading and its intervals.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use sw_core::{Hierarchy, Interval, format_short};

/// Sub channel data for JSON output.
#[derive(Debug, Serialize)]
pub struct SubStatus {
    pub id: u64,
    pub name: String,
    pub running: bool,
    pub elapsed_ms: i64,
    pub display: String,
    pub intervals: Vec<Interval>,
}

/// Head channel data for JSON output.
#[derive(Debug, Serialize)]
pub struct HeadStatus {
    pub id: u64,
    pub name: String,
    pub running: bool,
    pub elapsed_ms: i64,
    pub display: String,
    pub subs: Vec<SubStatus>,
}

/// Derives the display state of every channel at `now`.
pub fn collect(hierarchy: &Hierarchy, now: i64) -> Vec<HeadStatus> {
    hierarchy
        .heads()
        .iter()
        .map(|head| {
            let head_elapsed = head.timer.elapsed_ms(now);
            HeadStatus {
                id: head.id().get(),
                name: head.timer.name.clone(),
                running: head.timer.is_running(),
                elapsed_ms: head_elapsed,
                display: head.timer.display_time(now),
                subs: head
                    .subs()
                    .iter()
                    .map(|sub| SubStatus {
                        id: sub.id().get(),
                        name: sub.timer.name.clone(),
                        running: sub.timer.is_running(),
                        elapsed_ms: sub.timer.elapsed_ms(now),
                        display: sub.timer.display_time(now),
                        intervals: sub.intervals(head_elapsed),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Human-readable status.
pub fn render(hierarchy: &Hierarchy, now: i64) -> String {
    let mut output = String::new();
    if hierarchy.is_empty() {
        writeln!(output, "No channels. Add one with 'sw head add'.").unwrap();
        return output;
    }

    for head in hierarchy.heads() {
        writeln!(
            output,
            "#{:<3} {:<24} {:>9}  [{}]",
            head.id(),
            head.timer.name,
            head.timer.display_time(now),
            head.timer.button_label()
        )
        .unwrap();

        let head_elapsed = head.timer.elapsed_ms(now);
        for sub in head.subs() {
            writeln!(
                output,
                "  #{:<3} {:<22} {:>9}  [{}]",
                sub.id(),
                sub.timer.name,
                sub.timer.display_time(now),
                sub.timer.button_label()
            )
            .unwrap();
            for interval in sub.intervals(head_elapsed) {
                writeln!(
                    output,
                    "        {} - {}",
                    format_short(interval.start_ms),
                    format_short(interval.end_ms)
                )
                .unwrap();
            }
        }
    }
    output
}

pub fn run<W: Write>(writer: &mut W, hierarchy: &Hierarchy, now: i64, json: bool) -> Result<()> {
    if json {
        let status = collect(hierarchy, now);
        writeln!(writer, "{}", serde_json::to_string_pretty(&status)?)?;
    } else {
        write!(writer, "{}", render(hierarchy, now))?;
    }
    Ok(())
}
