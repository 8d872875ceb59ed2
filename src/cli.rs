use crate::calendar::Granularity;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "workcal", version, about = "Scrollable work-center timeline")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Seed file with lanes and tasks
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,
    /// Log level: trace, debug, info, warn, error or off
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the demo seed to ./.workcal/seed.yml
    Init {
        /// Overwrite an existing seed file
        #[arg(long)]
        force: bool,
    },
    /// List lanes and their tasks
    Lanes {
        /// Only show this lane id
        #[arg(long)]
        lane: Option<String>,
        /// Only show tasks with this status (open, blocked, in-progress, complete)
        #[arg(long)]
        status: Option<String>,
    },
    /// Print timeline geometry for the current window
    Layout {
        /// day, week or month (defaults to the configured view)
        #[arg(long)]
        view: Option<Granularity>,
        /// Viewport width in display units, for centering
        #[arg(long, default_value_t = 800.0)]
        viewport: f64,
    },
    /// Check whether a date range fits in a lane
    Check {
        /// Lane id
        #[arg(long)]
        lane: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Task being edited; its own range is ignored
        #[arg(long)]
        task: Option<String>,
    },
    /// Launch the interactive timeline
    Tui,
}
