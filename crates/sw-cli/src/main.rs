use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use sw_core::{ChannelController, SystemClock};
use tracing_subscriber::EnvFilter;

use sw_cli::commands::channels::BulkAction;
use sw_cli::commands::{
    channels, copy, load_controller, load_hierarchy, notes, save_controller, status, timeline,
    watch,
};
use sw_cli::{Cli, Commands, Config, NoteAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(sw_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = sw_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Opens the database and resumes the saved channels.
fn open_controller(
    config_path: Option<&Path>,
) -> Result<(sw_db::Database, Config, ChannelController<SystemClock>)> {
    let (db, config) = open_database(config_path)?;
    let controller = load_controller(&db, SystemClock, config.naming())?;
    Ok((db, config, controller))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();
    let config_path = cli.config.as_deref();

    match &cli.command {
        Some(Commands::Status { json }) => {
            let (_db, _config, controller) = open_controller(config_path)?;
            status::run(&mut stdout, controller.hierarchy(), controller.now(), *json)?;
        }
        Some(Commands::Watch { ticks }) => {
            let (db, config) = open_database(config_path)?;
            let clear = std::io::stdout().is_terminal();
            watch::run(
                &mut stdout,
                || load_hierarchy(&db),
                &SystemClock,
                config.tick_interval(),
                *ticks,
                clear,
            )?;
        }
        Some(Commands::Head(action)) => {
            let (db, _config, mut controller) = open_controller(config_path)?;
            channels::head(&mut stdout, &mut controller, action)?;
            save_controller(&db, &controller)?;
        }
        Some(Commands::Sub(action)) => {
            let (db, _config, mut controller) = open_controller(config_path)?;
            channels::sub(&mut stdout, &mut controller, action)?;
            save_controller(&db, &controller)?;
        }
        Some(command @ (Commands::ResetAll | Commands::CloseAll | Commands::Clear)) => {
            let action = match command {
                Commands::ResetAll => BulkAction::ResetAll,
                Commands::CloseAll => BulkAction::CloseAll,
                _ => BulkAction::Clear,
            };
            let (db, _config, mut controller) = open_controller(config_path)?;
            channels::bulk(&mut stdout, &mut controller, action)?;
            save_controller(&db, &controller)?;
        }
        Some(Commands::Copy { head }) => {
            let (_db, _config, controller) = open_controller(config_path)?;
            copy::run(&mut stdout, controller.hierarchy(), *head, controller.now())?;
        }
        Some(Commands::Note(action)) => {
            let (db, _config, controller) = open_controller(config_path)?;
            match action {
                NoteAction::Snapshot => notes::snapshot(
                    &mut stdout,
                    &db,
                    controller.hierarchy(),
                    controller.now(),
                    Utc::now(),
                )?,
                NoteAction::List { json } => notes::list(&mut stdout, &db, *json)?,
                NoteAction::Delete { id } => notes::delete(&mut stdout, &db, id)?,
            }
        }
        Some(Commands::Timeline { path, json, edit }) => {
            // Drafts are self-contained; no database needed
            timeline::run(&mut stdout, path, *json, edit.as_ref())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
