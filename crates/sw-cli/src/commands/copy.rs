//! Copy command: prints a head channel's clipboard summary.

use std::io::Write;

use anyhow::Result;
use sw_core::{ChannelId, Hierarchy, head_summary};

pub fn run<W: Write>(writer: &mut W, hierarchy: &Hierarchy, head: u64, now: i64) -> Result<()> {
    match hierarchy.head(ChannelId::new(head)) {
        Some(h) => write!(writer, "{}", head_summary(h, now))?,
        None => writeln!(writer, "head channel {head} not found; nothing changed")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::{ChannelController, Clock, ManualClock};

    #[test]
    fn copy_prints_head_and_sub_intervals() {
        let clock = ManualClock::new(0);
        let mut c = ChannelController::new(&clock);
        let head = c.add_named_head_channel("Deploy");
        let sub = c.add_named_sub_channel(head, "Tests").unwrap();
        c.toggle_head_channel(head);
        clock.set(60_000);
        c.toggle_sub_channel(head, sub);
        clock.set(150_000);
        c.toggle_sub_channel(head, sub);
        clock.set(180_000);

        let mut out = Vec::new();
        run(&mut out, c.hierarchy(), head.get(), clock.now_ms()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Deploy: 3m 0s\n  Tests: 1m 30s\n    1. 1m 0s - 2m 30s\n"
        );
    }

    #[test]
    fn copy_unknown_head_reports_not_found() {
        let mut out = Vec::new();
        run(&mut out, &Hierarchy::new(), 4, 0).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "head channel 4 not found; nothing changed\n"
        );
    }
}
