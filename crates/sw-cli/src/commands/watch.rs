//! Watch command: re-renders the status on every tick.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use sw_core::{Clock, Hierarchy};

use super::status;

/// Clears the terminal and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders frames until `ticks` frames were drawn, or, without a limit,
/// until nothing is running. Every frame renders a freshly loaded revision,
/// so mutations made from another shell show up. Returns the number of
/// frames drawn.
pub fn run<W, C, F>(
    writer: &mut W,
    mut load: F,
    clock: &C,
    interval: Duration,
    ticks: Option<u64>,
    clear: bool,
) -> Result<u64>
where
    W: Write,
    C: Clock,
    F: FnMut() -> Result<Hierarchy>,
{
    let mut frames = 0;
    loop {
        let hierarchy = load()?;
        if clear {
            write!(writer, "{CLEAR_SCREEN}")?;
        }
        write!(writer, "{}", status::render(&hierarchy, clock.now_ms()))?;
        writer.flush()?;
        frames += 1;

        let done = match ticks {
            Some(limit) => frames >= limit,
            None => !hierarchy.any_running(),
        };
        if done {
            break;
        }
        std::thread::sleep(interval);
    }
    tracing::debug!(frames, "watch finished");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_hierarchy;
    use sw_core::{ChannelController, ManualClock};
    use sw_db::Database;

    #[test]
    fn stops_after_one_frame_when_idle() {
        let clock = ManualClock::new(0);
        let mut c = ChannelController::new(&clock);
        c.add_head_channel();
        let hierarchy = c.hierarchy().clone();

        let mut out = Vec::new();
        let frames = run(
            &mut out,
            || Ok(hierarchy.clone()),
            &clock,
            Duration::ZERO,
            None,
            false,
        )
        .unwrap();
        assert_eq!(frames, 1);
        assert!(String::from_utf8(out).unwrap().contains("Channel 1"));
    }

    #[test]
    fn honors_tick_limit_while_running() {
        let clock = ManualClock::new(0);
        let mut c = ChannelController::new(&clock);
        let head = c.add_head_channel();
        c.toggle_head_channel(head);
        let hierarchy = c.hierarchy().clone();

        let mut out = Vec::new();
        let frames = run(
            &mut out,
            || Ok(hierarchy.clone()),
            &clock,
            Duration::ZERO,
            Some(3),
            true,
        )
        .unwrap();
        assert_eq!(frames, 3);
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches(CLEAR_SCREEN).count(), 3);
    }

    #[test]
    fn picks_up_changes_saved_between_frames() {
        let db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(0);
        let mut c = ChannelController::new(&clock);
        let head = c.add_named_head_channel("Kiln");
        c.toggle_head_channel(head);
        db.save_hierarchy(c.hierarchy()).unwrap();

        // Another invocation pauses the head after the first frame.
        let mut frame = 0;
        let load = || -> Result<Hierarchy> {
            frame += 1;
            if frame == 2 {
                clock.set(5_000);
                c.toggle_head_channel(head);
                db.save_hierarchy(c.hierarchy())?;
            }
            load_hierarchy(&db)
        };

        let mut out = Vec::new();
        let frames = run(&mut out, load, &clock, Duration::ZERO, None, false).unwrap();
        assert_eq!(frames, 2);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[Pause]"));
        assert!(out.ends_with("0:05  [Start]\n"));
    }
}
