// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use evq_core::MutationStatus;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Parse a stored (non-synced) mutation status.
fn stored_status(s: &str) -> Result<MutationStatus, String> {
    match s.parse::<MutationStatus>() {
        Ok(MutationStatus::Synced) => Err("synced mutations are not stored".to_string()),
        Ok(status) => Ok(status),
        Err(e) => Err(e.to_string()),
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "evq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline queue and sync engine for sales evaluations")]
#[command(
    long_about = "Offline queue and sync engine for sales evaluations.\n\n\
    Writes made while the network is down are stored durably and replayed against \
    the API once connectivity returns."
)]
pub struct Cli {
    /// State directory (queue, connectivity state, config, log)
    #[arg(long, global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    /// Config file (default: <state-dir>/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a write, delivering now if online and queueing otherwise
    #[command(subcommand)]
    Submit(SubmitCommand),

    /// List queued mutations
    #[command(after_help = "\
Examples:
  evq list                     All queued mutations
  evq list --status failed     Only rejected mutations
  evq list -o json             Machine-readable output")]
    List {
        /// Only show mutations with this status (pending, syncing, failed)
        #[arg(long, value_parser = stored_status)]
        status: Option<MutationStatus>,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show queue counts and connectivity state
    Status,

    /// Run one drain cycle
    Drain {
        /// Report the network as unreachable (nothing is attempted)
        #[arg(long)]
        offline: bool,
    },

    /// Move a failed mutation back to pending
    Retry {
        /// Mutation id
        id: String,
    },

    /// Remove a queued mutation without delivering it
    Discard {
        /// Mutation id
        id: String,
    },

    /// Run the sync engine, reading host signals from stdin
    #[command(after_help = "\
Signals (one per line):
  online        Network reachable
  offline       Network unreachable
  signed-out    Session revoked or expired
  signed-in     Session restored
  replay        Run a drain cycle now")]
    Watch,
}

#[derive(Subcommand)]
pub enum SubmitCommand {
    /// Submit a salesperson evaluation
    #[command(after_help = "\
Examples:
  evq submit evaluation --salesperson sp-42 --score closing=4 --score prospecting=3
  evq submit evaluation --salesperson sp-42 --period 2026-Q3 --score closing=5 --offline")]
    Evaluation {
        /// Salesperson being evaluated
        #[arg(long, value_parser = non_empty_string)]
        salesperson: String,

        /// Team of the salesperson
        #[arg(long)]
        team: Option<String>,

        /// Evaluation period (e.g. 2026-Q3)
        #[arg(long)]
        period: Option<String>,

        /// Criterion score as criterion=N, N from 1 to 5 (repeatable)
        #[arg(long = "score", required = true, value_name = "criterion=N")]
        scores: Vec<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,

        /// Treat the network as unreachable and queue directly
        #[arg(long)]
        offline: bool,
    },

    /// Submit a generic record update (team, user)
    Update {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        #[arg(long)]
        method: String,

        /// API path, e.g. /api/teams/7
        #[arg(long, value_parser = non_empty_string)]
        endpoint: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Treat the network as unreachable and queue directly
        #[arg(long)]
        offline: bool,
    },
}

#[cfg(test)]
#[path = "../cli_tests.rs"]
mod tests;
