//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sw_core::{Bound, ClockTime, IntervalKind};

/// Multi-channel stopwatch.
///
/// Tracks a head timer per activity with dependent sub timers anchored to
/// the head's timeline, and renders hand-authored timelines.
#[derive(Debug, Parser)]
#[command(name = "sw", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show every channel with its elapsed time and intervals.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Re-render the status on every tick.
    Watch {
        /// Stop after this many frames.
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Manage head channels.
    #[command(subcommand)]
    Head(HeadAction),

    /// Manage sub channels.
    #[command(subcommand)]
    Sub(SubAction),

    /// Reset every head and sub channel.
    ResetAll,

    /// Pause every running head and sub channel.
    CloseAll,

    /// Delete every channel.
    Clear,

    /// Print the clipboard summary of a head channel.
    Copy {
        /// Head channel ID.
        head: u64,
    },

    /// Capture, list and delete notes.
    #[command(subcommand)]
    Note(NoteAction),

    /// Render a timeline draft (JSON), optionally editing it first.
    Timeline {
        /// Path to the draft file.
        path: PathBuf,

        /// Output the clamped timeline as JSON.
        #[arg(long)]
        json: bool,

        /// Edit to apply and save back to the draft before rendering.
        #[command(subcommand)]
        edit: Option<TimelineEdit>,
    },
}

/// Head channel operations.
#[derive(Debug, Subcommand)]
pub enum HeadAction {
    /// Add a head channel.
    Add {
        /// Name (defaults to sequential numbering).
        #[arg(long)]
        name: Option<String>,
    },
    /// Start or pause a head channel. Pausing also pauses its sub channels.
    Toggle { head: u64 },
    /// Zero a head channel's timer. Sub channels are left untouched.
    Reset { head: u64 },
    /// Rename a head channel.
    Rename { head: u64, name: String },
    /// Delete a head channel and all its sub channels.
    Delete { head: u64 },
}

/// Sub channel operations.
#[derive(Debug, Subcommand)]
pub enum SubAction {
    /// Add a sub channel to a head channel.
    Add {
        head: u64,
        /// Name (defaults to sequential numbering).
        #[arg(long)]
        name: Option<String>,
    },
    /// Start or pause a sub channel.
    Toggle { head: u64, sub: u64 },
    /// Zero a sub channel's timer and clear its marks.
    Reset { head: u64, sub: u64 },
    /// Rename a sub channel.
    Rename { head: u64, sub: u64, name: String },
    /// Delete a sub channel.
    Delete { head: u64, sub: u64 },
}

/// Note operations.
#[derive(Debug, Subcommand)]
pub enum NoteAction {
    /// Capture the current display state as a note.
    Snapshot,
    /// List notes.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete a note.
    Delete { id: String },
}

/// Timeline draft edits. Heads, subs and intervals are addressed by their
/// 1-based position, as listed in the rendered summary.
#[derive(Debug, Subcommand)]
pub enum TimelineEdit {
    /// Lay a head out over a duration in minutes.
    Duration { head: usize, total_min: u32 },
    /// Lay a head out over a clock range (HH:MM); an end at or before the
    /// start lies on the next day.
    Range {
        head: usize,
        start: ClockTime,
        end: ClockTime,
    },
    /// Rename a head.
    RenameHead { head: usize, name: String },
    /// Delete a head and its sub channels.
    DeleteHead { head: usize },
    /// Add a sub channel to a head.
    AddSub {
        head: usize,
        /// Name (defaults to sequential numbering).
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename a sub channel.
    RenameSub {
        head: usize,
        sub: usize,
        name: String,
    },
    /// Delete a sub channel.
    DeleteSub { head: usize, sub: usize },
    /// Append an interval. Without bounds it continues after the last one.
    Add {
        head: usize,
        sub: usize,
        /// Start, as minutes or HH:MM.
        #[arg(long, requires = "end")]
        start: Option<Bound>,
        /// End, as minutes or HH:MM.
        #[arg(long, requires = "start")]
        end: Option<Bound>,
        /// normal or cutoff.
        #[arg(long, default_value = "normal")]
        kind: IntervalKind,
    },
    /// Move an interval's start (minutes or HH:MM).
    Start {
        head: usize,
        sub: usize,
        interval: usize,
        bound: Bound,
    },
    /// Move an interval's end (minutes or HH:MM).
    End {
        head: usize,
        sub: usize,
        interval: usize,
        bound: Bound,
    },
    /// Mark an interval as normal or cutoff.
    Kind {
        head: usize,
        sub: usize,
        interval: usize,
        kind: IntervalKind,
    },
    /// Delete an interval.
    Remove {
        head: usize,
        sub: usize,
        interval: usize,
    },
    /// Delete every head in the draft.
    Clear,
}
