use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plantiful", version, about = "Plant care tracking TUI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Print reminder digests for users whose plants need care
    Remind,
    /// Dump the owner's gardens, plants and check-in history as JSON
    Export,
}
