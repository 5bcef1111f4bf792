use crate::commands::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SmartFS - manage the version history of files on a SmartFS mount
#[derive(Parser, Debug)]
#[command(name = "smartfs", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Optional log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all versions of a file
    List {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Create a manual snapshot
    Snapshot {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Snapshot message (default: "Manual Snapshot", or the configured message)
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Pin/Unpin a version (prevent auto-deletion)
    Pin {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Version ID (e.g., v1)
        #[arg(value_name = "VERSION")]
        version: String,
    },

    /// Display content of a historical version
    Cat {
        /// Path to the file, or FILE@vN when VERSION is omitted
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Version specifier (e.g., v1, 2h, yesterday)
        #[arg(value_name = "VERSION")]
        version: Option<String>,
    },

    /// Rollback file to a previous version
    ///
    /// Asks for confirmation before the current content is replaced.
    Recover {
        /// Path to the file, or FILE@vN when VERSION is omitted
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Version ID to restore from (e.g., v1)
        #[arg(value_name = "VERSION")]
        version: Option<String>,
    },
}
