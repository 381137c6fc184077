//! CLI subcommand implementations.

pub mod channels;
pub mod copy;
pub mod notes;
pub mod status;
pub mod timeline;
pub mod watch;

use anyhow::{Context, Result};
use sw_core::{ChannelController, Clock, Hierarchy, Naming};
use sw_db::Database;

/// Reads the latest saved hierarchy, or an empty one.
pub fn load_hierarchy(db: &Database) -> Result<Hierarchy> {
    Ok(db
        .load_hierarchy()
        .context("failed to load saved channels")?
        .unwrap_or_default())
}

/// Resumes the controller from the saved hierarchy, or starts empty.
pub fn load_controller<C: Clock>(
    db: &Database,
    clock: C,
    naming: Naming,
) -> Result<ChannelController<C>> {
    let hierarchy = load_hierarchy(db)?;
    Ok(ChannelController::from_hierarchy(hierarchy, clock).with_naming(naming))
}

/// Saves the controller's hierarchy if any mutation took effect.
pub fn save_controller<C: Clock>(db: &Database, controller: &ChannelController<C>) -> Result<()> {
    if controller.revision() == 0 {
        tracing::debug!("no changes to save");
        return Ok(());
    }
    db.save_hierarchy(controller.hierarchy())
        .context("failed to save channels")
}
