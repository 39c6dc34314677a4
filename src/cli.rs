use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rewindcast")]
#[command(author, version, about = "Catch-up recorder for sliding-window live streams")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a time window and download the segment run for a track
    Fetch {
        /// Track address on the origin (e.g. 0_1_3524)
        #[arg(required = true)]
        track: String,

        /// Window start, as "YYYY-MM-DD HH:MM:SS" in the origin's local time
        #[arg(required = true)]
        start: String,

        /// Window end, same format as start
        #[arg(required = true)]
        end: String,

        /// Known anchor tick for the track (requires --anchor-time)
        #[arg(long)]
        anchor_tick: Option<i64>,

        /// Wall-clock time of the anchor tick (requires --anchor-tick)
        #[arg(long)]
        anchor_time: Option<String>,

        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the fetch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe the origin for valid ticks around a wall-clock time
    Probe {
        /// Track address on the origin
        #[arg(required = true)]
        track: String,

        /// Center of the probe window, as "YYYY-MM-DD HH:MM:SS"
        #[arg(required = true)]
        time: String,
    },

    /// Extract the key identifier from a segment file or directory
    KeyId {
        /// A segment file, or a directory of downloaded segments
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
