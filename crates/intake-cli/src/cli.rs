use std::path::PathBuf;

use clap::{Parser, Subcommand};

use intake_core::VERSION;

/// Intake - multi-step registration with encrypted local draft persistence
#[derive(Parser)]
#[command(name = "intake")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the draft database and session file
    #[arg(
        short,
        long,
        global = true,
        env = "INTAKE_DATA_DIR",
        default_value = ".intake"
    )]
    pub data_dir: PathBuf,

    /// Start a fresh session instead of resuming the current one
    #[arg(long, global = true)]
    pub new_session: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the registration wizard, resuming any saved draft
    Start,

    /// Show the current draft
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discard the saved draft and start over
    Discard,

    /// Delete the draft if it has outlived the retention window
    Sweep {
        /// Retention window in hours
        #[arg(long, default_value_t = 24)]
        retention_hours: u64,
    },
}
