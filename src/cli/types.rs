//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "greeter")]
#[command(about = "Greeter - cache-aside record store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to use instead of ./greeter.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a greeter
    Create {
        /// Greeter name
        name: String,

        /// Initial status
        #[arg(short, long, default_value_t = 0)]
        status: i32,
    },

    /// Show one greeter
    Get {
        /// Greeter ID
        id: i32,
    },

    /// List greeters with a status, highest id first
    List {
        /// Status partition to list
        #[arg(short, long, default_value_t = 1)]
        status: i32,

        /// Only ids below this one (applied when the index is rebuilt)
        #[arg(long, default_value_t = 0)]
        last_id: i32,

        /// Items per page (non-positive means 20)
        #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
        page_size: i32,

        /// 1-based page number (non-positive means 1)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        page: i32,
    },

    /// Change the status of a greeter
    UpdateStatus {
        /// Greeter ID
        id: i32,

        /// New status
        status: i32,
    },

    /// Add to a counter column of a greeter
    Incr {
        /// Greeter ID
        id: i32,

        /// Amount to add (may be negative)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        delta: i32,

        /// Counter column
        #[arg(short, long, default_value = "view_num")]
        column: String,
    },

    /// Delete a greeter
    Delete {
        /// Greeter ID
        id: i32,
    },

    /// Count greeters with a status
    Count {
        /// Status to count
        status: i32,
    },

    /// Run a scheduled job by name, or list jobs when no name is given
    Cron {
        /// Job name
        job: Option<String>,
    },
}
