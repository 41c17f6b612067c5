// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! evqrs - offline mutation queue and sync engine for sales evaluations.
//!
//! This crate provides the functionality behind the `evq` CLI: delivering
//! evaluation submissions and record updates to the API, queueing them while
//! the network is unreachable, and replaying them once it returns.
//!
//! # Main Components
//!
//! - [`sync::SyncContext`] - Process-wide context; owns the queue and runs drain cycles
//! - [`sync::RemoteApi`] - Delivery seam, with [`sync::HttpRemote`] for production
//! - [`sync::run_event_loop`] - Reacts to host signals (reachability, session, replay)
//! - [`Config`] - `config.toml` settings
//! - [`Error`] - Error types for all operations
//!
//! # Example
//!
//! ```rust,ignore
//! use evqrs::commands::Workspace;
//!
//! let workspace = Workspace::open(None, None)?;
//! let ctx = workspace.context()?;
//! ctx.observe_connectivity(true);
//! ctx.drain().await?;
//! ```

mod cli;
pub mod commands;
pub mod env;
pub mod logging;
pub mod session;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat, SubmitCommand};
pub use config::Config;
pub use error::{Error, Result};

use commands::{drain, queue, submit, watch, Workspace};

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let workspace = Workspace::open(cli.state_dir.as_deref(), cli.config.as_deref())?;
    logging::setup_logging(&workspace.paths.log());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(dispatch(&workspace, cli.command))
}

async fn dispatch(workspace: &Workspace, command: Command) -> Result<()> {
    match command {
        Command::Submit(SubmitCommand::Evaluation {
            salesperson,
            team,
            period,
            scores,
            notes,
            offline,
        }) => {
            let payload = submit::evaluation_payload(salesperson, team, period, &scores, notes)?;
            submit::run(workspace, payload, offline).await
        }
        Command::Submit(SubmitCommand::Update {
            method,
            endpoint,
            body,
            offline,
        }) => {
            let payload = submit::update_payload(&method, &endpoint, body.as_deref())?;
            submit::run(workspace, payload, offline).await
        }
        Command::List { status, output } => queue::list(workspace, status, output),
        Command::Status => queue::status(workspace),
        Command::Drain { offline } => drain::run(workspace, offline).await,
        Command::Retry { id } => queue::retry(workspace, &id),
        Command::Discard { id } => queue::discard(workspace, &id),
        Command::Watch => watch::run(workspace).await,
    }
}
