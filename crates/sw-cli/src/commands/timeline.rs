//! Timeline command: renders, and optionally edits, a hand-written draft.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use sw_core::{
    BuilderHead, BuilderSub, ChannelId, IntervalId, IntervalKind, TimeAxis, TimelineBuilder,
    TimelineDraft, timeline_summary,
};

use crate::TimelineEdit;

/// Number of cells in a timeline bar.
const BAR_WIDTH: u32 = 40;

/// Renders one sub channel across the head's axis.
///
/// A cell is filled when its midpoint falls inside an interval; cutoff
/// intervals win over normal ones.
pub fn timeline_bar(sub: &BuilderSub, total_min: u32) -> String {
    let total = u64::from(total_min.max(1));
    let cells = u64::from(BAR_WIDTH);
    (0..cells)
        .map(|cell| {
            // Midpoint in units of 1 / (2 * cells) minutes.
            let mid = (2 * cell + 1) * total;
            let covers = |kind: IntervalKind| {
                sub.intervals().iter().any(|i| {
                    i.kind == kind
                        && u64::from(i.start_min()) * 2 * cells <= mid
                        && mid < u64::from(i.end_min()) * 2 * cells
                })
            };
            if covers(IntervalKind::Cutoff) {
                '▒'
            } else if covers(IntervalKind::Normal) {
                '█'
            } else {
                '░'
            }
        })
        .collect()
}

/// Summary block plus one bar per sub channel.
pub fn render(head: &BuilderHead) -> String {
    let mut output = timeline_summary(head);
    let total = head.axis().total_min();
    for sub in head.subs() {
        writeln!(output, "  {:<20} {}", sub.name, timeline_bar(sub, total)).unwrap();
    }
    output
}

fn head_at(builder: &TimelineBuilder, head: usize) -> Option<ChannelId> {
    builder.heads().get(head.checked_sub(1)?).map(|h| h.id)
}

fn sub_at(builder: &TimelineBuilder, head: usize, sub: usize) -> Option<(ChannelId, ChannelId)> {
    let h = builder.heads().get(head.checked_sub(1)?)?;
    let s = h.subs().get(sub.checked_sub(1)?)?;
    Some((h.id, s.id))
}

fn interval_at(
    builder: &TimelineBuilder,
    head: usize,
    sub: usize,
    interval: usize,
) -> Option<(ChannelId, ChannelId, IntervalId)> {
    let (h, s) = sub_at(builder, head, sub)?;
    let i = builder
        .head(h)?
        .sub(s)?
        .intervals()
        .get(interval.checked_sub(1)?)?
        .id;
    Some((h, s, i))
}

/// Applies one edit through the builder's clamping setters.
///
/// Returns `false`, leaving the builder untouched, if a position does not
/// exist.
pub fn apply_edit(builder: &mut TimelineBuilder, edit: &TimelineEdit) -> bool {
    match *edit {
        TimelineEdit::Duration { head, total_min } => {
            let axis = TimeAxis::Duration { total_min };
            head_at(builder, head).is_some_and(|h| builder.set_axis(h, axis))
        }
        TimelineEdit::Range { head, start, end } => {
            let axis = TimeAxis::Clock { start, end };
            head_at(builder, head).is_some_and(|h| builder.set_axis(h, axis))
        }
        TimelineEdit::RenameHead { head, ref name } => {
            head_at(builder, head).is_some_and(|h| builder.rename_head(h, name.clone()))
        }
        TimelineEdit::DeleteHead { head } => {
            head_at(builder, head).is_some_and(|h| builder.delete_head(h))
        }
        TimelineEdit::AddSub { head, ref name } => {
            let Some(h) = head_at(builder, head) else {
                return false;
            };
            let name = name.clone().unwrap_or_else(|| {
                let count = builder.head(h).map_or(0, |h| h.subs().len());
                format!("Sub {}", count + 1)
            });
            builder.add_sub(h, name).is_some()
        }
        TimelineEdit::RenameSub {
            head,
            sub,
            ref name,
        } => {
            sub_at(builder, head, sub).is_some_and(|(h, s)| builder.rename_sub(h, s, name.clone()))
        }
        TimelineEdit::DeleteSub { head, sub } => {
            sub_at(builder, head, sub).is_some_and(|(h, s)| builder.delete_sub(h, s))
        }
        TimelineEdit::Add {
            head,
            sub,
            start,
            end,
            kind,
        } => {
            let Some((h, s)) = sub_at(builder, head, sub) else {
                return false;
            };
            let added = match (start, end) {
                (Some(start), Some(end)) => builder.add_interval_at(h, s, start, end, kind),
                _ => {
                    let id = builder.add_interval(h, s);
                    if let Some(id) = id {
                        builder.set_interval_kind(h, s, id, kind);
                    }
                    id
                }
            };
            added.is_some()
        }
        TimelineEdit::Start {
            head,
            sub,
            interval,
            bound,
        } => interval_at(builder, head, sub, interval)
            .is_some_and(|(h, s, i)| builder.set_interval_start(h, s, i, bound)),
        TimelineEdit::End {
            head,
            sub,
            interval,
            bound,
        } => interval_at(builder, head, sub, interval)
            .is_some_and(|(h, s, i)| builder.set_interval_end(h, s, i, bound)),
        TimelineEdit::Kind {
            head,
            sub,
            interval,
            kind,
        } => interval_at(builder, head, sub, interval)
            .is_some_and(|(h, s, i)| builder.set_interval_kind(h, s, i, kind)),
        TimelineEdit::Remove {
            head,
            sub,
            interval,
        } => interval_at(builder, head, sub, interval)
            .is_some_and(|(h, s, i)| builder.delete_interval(h, s, i)),
        TimelineEdit::Clear => {
            builder.clear();
            true
        }
    }
}

fn save_draft(path: &Path, draft: &TimelineDraft) -> Result<()> {
    let json = serde_json::to_string_pretty(draft)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write timeline draft {}", path.display()))?;
    tracing::debug!(path = %path.display(), heads = draft.heads.len(), "saved timeline draft");
    Ok(())
}

pub fn run<W: Write>(
    writer: &mut W,
    path: &Path,
    json: bool,
    edit: Option<&TimelineEdit>,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read timeline draft {}", path.display()))?;
    let draft: TimelineDraft = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse timeline draft {}", path.display()))?;
    let mut builder = TimelineBuilder::from_draft(&draft);

    if let Some(edit) = edit {
        if !apply_edit(&mut builder, edit) {
            writeln!(writer, "timeline position not found; nothing changed")?;
            return Ok(());
        }
        let edited = builder.to_draft();
        save_draft(path, &edited)?;
        builder = TimelineBuilder::from_draft(&edited);
    }

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&builder)?)?;
        return Ok(());
    }

    if builder.heads().is_empty() {
        writeln!(writer, "No timelines in draft.")?;
        return Ok(());
    }
    for (i, head) in builder.heads().iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        write!(writer, "{}", render(head))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    use insta::assert_snapshot;
    use sw_core::{Bound, ClockTime};

    fn draft_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn clock(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    const SHIFT: &str = r#"{"heads": [{
        "name": "Shift",
        "axis": {"kind": "clock", "start": "08:00", "end": "12:00"},
        "subs": [{
            "name": "Mill",
            "intervals": [
                {"start": "08:00", "end": "10:00"},
                {"start": "11:00", "end": "12:00", "kind": "cutoff"}
            ]
        }]
    }]}"#;

    #[test]
    fn bar_marks_normal_and_cutoff_cells() {
        let mut builder = TimelineBuilder::new();
        let head = builder.add_head("Line", TimeAxis::Duration { total_min: 40 });
        let sub = builder.add_sub(head, "Press").unwrap();
        builder.add_interval_at(
            head,
            sub,
            Bound::Minutes(0),
            Bound::Minutes(10),
            IntervalKind::Normal,
        );
        builder.add_interval_at(
            head,
            sub,
            Bound::Minutes(30),
            Bound::Minutes(40),
            IntervalKind::Cutoff,
        );

        let sub = &builder.head(head).unwrap().subs()[0];
        assert_eq!(
            timeline_bar(sub, 40),
            format!("{}{}{}", "█".repeat(10), "░".repeat(20), "▒".repeat(10))
        );
    }

    #[test]
    fn renders_clock_axis_draft() {
        let file = draft_file(SHIFT);

        let mut out = Vec::new();
        run(&mut out, file.path(), false, None).unwrap();
        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        Shift: 4h 0m (08:00 - 12:00), net 3h 0m after 1h 0m cutoff
          Mill: 2h 0m
            1. 08:00 - 10:00
            2. 11:00 - 12:00 [cutoff]
          Mill                 ████████████████████░░░░░░░░░░▒▒▒▒▒▒▒▒▒▒
        ");
    }

    #[test]
    fn json_output_shows_clamped_intervals() {
        let file = draft_file(
            r#"{"heads": [{"axis": {"kind": "duration", "total_min": 60},
                "subs": [{"intervals": [{"start": 50, "end": 90}]}]}]}"#,
        );
        let mut out = Vec::new();
        run(&mut out, file.path(), true, None).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let head = &value["heads"][0];
        assert_eq!(head["name"], "Timeline 1");
        assert_eq!(head["subs"][0]["name"], "Sub 1");
        assert_eq!(head["subs"][0]["intervals"][0]["end_min"], 60);
    }

    #[test]
    fn missing_draft_file_is_an_error() {
        let path = Path::new("/nonexistent/draft.json");
        let err = run(&mut Vec::new(), path, false, None).unwrap_err();
        assert!(err.to_string().contains("failed to read timeline draft"));
    }

    #[test]
    fn edits_address_positions_and_clamp() {
        let draft: TimelineDraft = serde_json::from_str(SHIFT).unwrap();
        let mut builder = TimelineBuilder::from_draft(&draft);

        let end = TimelineEdit::End {
            head: 1,
            sub: 1,
            interval: 1,
            bound: Bound::Clock(clock("07:00")),
        };
        assert!(apply_edit(&mut builder, &end));
        let add = TimelineEdit::Add {
            head: 1,
            sub: 1,
            start: None,
            end: None,
            kind: IntervalKind::Cutoff,
        };
        assert!(apply_edit(&mut builder, &add));
        let shrink = TimelineEdit::Range {
            head: 1,
            start: clock("08:00"),
            end: clock("11:30"),
        };
        assert!(apply_edit(&mut builder, &shrink));

        let sub = &builder.heads()[0].subs()[0];
        let spans: Vec<_> = sub
            .intervals()
            .iter()
            .map(|i| (i.start_min(), i.end_min(), i.kind))
            .collect();
        assert_eq!(
            spans,
            vec![
                (0, 1, IntervalKind::Normal),
                (180, 210, IntervalKind::Cutoff),
                (209, 210, IntervalKind::Cutoff),
            ]
        );
    }

    #[test]
    fn edit_on_missing_position_changes_nothing() {
        let file = draft_file(SHIFT);
        let remove = TimelineEdit::Remove {
            head: 1,
            sub: 2,
            interval: 1,
        };
        let mut out = Vec::new();
        run(&mut out, file.path(), false, Some(&remove)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "timeline position not found; nothing changed\n"
        );
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), SHIFT);

        let zero = TimelineEdit::DeleteHead { head: 0 };
        let draft: TimelineDraft = serde_json::from_str(SHIFT).unwrap();
        assert!(!apply_edit(&mut TimelineBuilder::from_draft(&draft), &zero));
    }

    #[test]
    fn edit_is_saved_back_to_the_draft() {
        let file = draft_file(SHIFT);
        let kind = TimelineEdit::Kind {
            head: 1,
            sub: 1,
            interval: 2,
            kind: IntervalKind::Normal,
        };
        run(&mut Vec::new(), file.path(), false, Some(&kind)).unwrap();
        let rename = TimelineEdit::RenameSub {
            head: 1,
            sub: 1,
            name: "Lathe".to_string(),
        };
        let mut out = Vec::new();
        run(&mut out, file.path(), false, Some(&rename)).unwrap();

        assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        Shift: 4h 0m (08:00 - 12:00)
          Lathe: 3h 0m
            1. 08:00 - 10:00
            2. 11:00 - 12:00
          Lathe                ████████████████████░░░░░░░░░░██████████
        ");
        let saved: TimelineDraft =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(saved.heads[0].subs[0].name.as_deref(), Some("Lathe"));
    }
}
