//! Command-line arguments for the replay tool.

use clap::Parser;
use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "maptrack-replay")]
#[command(about = "Replay a recorded console memory session through the map tracker")]
#[command(version)]
pub struct Args {
    /// Recorded session (JSON)
    #[arg(short, long)]
    pub session: PathBuf,

    /// Tracker configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Trail length in samples, 0 for the whole log (overrides the config)
    #[arg(long)]
    pub history_len: Option<usize>,

    /// Unlock the map on race ROMs before the first poll
    #[arg(long)]
    pub race_override: bool,
}
