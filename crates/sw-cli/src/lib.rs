//! Multi-channel stopwatch CLI library.
//!
//! This crate provides the CLI interface for the stopwatch.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, HeadAction, NoteAction, SubAction, TimelineEdit};
pub use config::Config;
