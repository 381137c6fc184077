//! Head and sub channel mutations.
//!
//! Operations on unknown IDs are no-ops; they report "not found" and still
//! succeed.

use std::io::Write;

use anyhow::Result;
use sw_core::{ChannelController, ChannelId, Clock};

use crate::{HeadAction, SubAction};

/// Bulk operations over the whole hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    ResetAll,
    CloseAll,
    Clear,
}

fn not_found<W: Write>(writer: &mut W, what: &str) -> Result<()> {
    writeln!(writer, "{what} not found; nothing changed")?;
    Ok(())
}

fn head_name<C: Clock>(controller: &ChannelController<C>, head: ChannelId) -> String {
    controller
        .hierarchy()
        .head(head)
        .map(|h| h.timer.name.clone())
        .unwrap_or_default()
}

fn sub_name<C: Clock>(
    controller: &ChannelController<C>,
    head: ChannelId,
    sub: ChannelId,
) -> String {
    controller
        .hierarchy()
        .head(head)
        .and_then(|h| h.sub(sub))
        .map(|s| s.timer.name.clone())
        .unwrap_or_default()
}

const fn state_word(running: bool) -> &'static str {
    if running { "running" } else { "paused" }
}

pub fn head<W: Write, C: Clock>(
    writer: &mut W,
    controller: &mut ChannelController<C>,
    action: &HeadAction,
) -> Result<()> {
    match action {
        HeadAction::Add { name } => {
            let id = match name {
                Some(name) => controller.add_named_head_channel(name.clone()),
                None => controller.add_head_channel(),
            };
            writeln!(
                writer,
                "Added head channel {id}: {}",
                head_name(controller, id)
            )?;
        }
        HeadAction::Toggle { head } => {
            let id = ChannelId::new(*head);
            match controller.toggle_head_channel(id) {
                Some(running) => {
                    let display = controller
                        .hierarchy()
                        .head(id)
                        .map(|h| controller.display_time(&h.timer))
                        .unwrap_or_default();
                    writeln!(
                        writer,
                        "{} {} at {display}",
                        head_name(controller, id),
                        state_word(running)
                    )?;
                }
                None => not_found(writer, &format!("head channel {head}"))?,
            }
        }
        HeadAction::Reset { head } => {
            let id = ChannelId::new(*head);
            if controller.reset_head_channel(id) {
                writeln!(writer, "Reset {}", head_name(controller, id))?;
            } else {
                not_found(writer, &format!("head channel {head}"))?;
            }
        }
        HeadAction::Rename { head, name } => {
            if controller.rename_head_channel(ChannelId::new(*head), name.clone()) {
                writeln!(writer, "Renamed head channel {head} to {name}")?;
            } else {
                not_found(writer, &format!("head channel {head}"))?;
            }
        }
        HeadAction::Delete { head } => {
            let id = ChannelId::new(*head);
            let name = head_name(controller, id);
            if controller.delete_head_channel(id) {
                writeln!(writer, "Deleted {name}")?;
            } else {
                not_found(writer, &format!("head channel {head}"))?;
            }
        }
    }
    Ok(())
}

pub fn sub<W: Write, C: Clock>(
    writer: &mut W,
    controller: &mut ChannelController<C>,
    action: &SubAction,
) -> Result<()> {
    match action {
        SubAction::Add { head, name } => {
            let head_id = ChannelId::new(*head);
            let added = match name {
                Some(name) => controller.add_named_sub_channel(head_id, name.clone()),
                None => controller.add_sub_channel(head_id),
            };
            match added {
                Some(id) => writeln!(
                    writer,
                    "Added sub channel {id}: {} under {}",
                    sub_name(controller, head_id, id),
                    head_name(controller, head_id)
                )?,
                None => not_found(writer, &format!("head channel {head}"))?,
            }
        }
        SubAction::Toggle { head, sub } => {
            let (head_id, sub_id) = (ChannelId::new(*head), ChannelId::new(*sub));
            match controller.toggle_sub_channel(head_id, sub_id) {
                Some(action) => {
                    let mark = controller
                        .hierarchy()
                        .head(head_id)
                        .and_then(|h| h.sub(sub_id))
                        .and_then(|s| s.marks().last().copied());
                    let at = mark
                        .map(|m| sw_core::format_long(m.head_time_ms))
                        .unwrap_or_default();
                    writeln!(
                        writer,
                        "{} {} at head time {at}",
                        sub_name(controller, head_id, sub_id),
                        state_word(action == sw_core::MarkAction::Start)
                    )?;
                }
                None => not_found(writer, &format!("sub channel {head}/{sub}"))?,
            }
        }
        SubAction::Reset { head, sub } => {
            let (head_id, sub_id) = (ChannelId::new(*head), ChannelId::new(*sub));
            if controller.reset_sub_channel(head_id, sub_id) {
                writeln!(writer, "Reset {}", sub_name(controller, head_id, sub_id))?;
            } else {
                not_found(writer, &format!("sub channel {head}/{sub}"))?;
            }
        }
        SubAction::Rename { head, sub, name } => {
            let (head_id, sub_id) = (ChannelId::new(*head), ChannelId::new(*sub));
            if controller.rename_sub_channel(head_id, sub_id, name.clone()) {
                writeln!(writer, "Renamed sub channel {sub} to {name}")?;
            } else {
                not_found(writer, &format!("sub channel {head}/{sub}"))?;
            }
        }
        SubAction::Delete { head, sub } => {
            let (head_id, sub_id) = (ChannelId::new(*head), ChannelId::new(*sub));
            let name = sub_name(controller, head_id, sub_id);
            if controller.delete_sub_channel(head_id, sub_id) {
                writeln!(writer, "Deleted {name}")?;
            } else {
                not_found(writer, &format!("sub channel {head}/{sub}"))?;
            }
        }
    }
    Ok(())
}

pub fn bulk<W: Write, C: Clock>(
    writer: &mut W,
    controller: &mut ChannelController<C>,
    action: BulkAction,
) -> Result<()> {
    match action {
        BulkAction::ResetAll => {
            if controller.reset_all_timers() {
                writeln!(writer, "Reset all channels")?;
            } else {
                writeln!(writer, "No channels to reset")?;
            }
        }
        BulkAction::CloseAll => {
            let paused = controller.close_all_channels();
            writeln!(writer, "Paused {paused} running timer(s)")?;
        }
        BulkAction::Clear => {
            if controller.delete_all() {
                writeln!(writer, "Deleted all channels")?;
            } else {
                writeln!(writer, "No channels to delete")?;
            }
        }
    }
    Ok(())
}
