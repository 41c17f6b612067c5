// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue inspection and dead-letter management.

use chrono::{DateTime, Utc};
use serde::Serialize;

use evq_core::{MutationId, MutationStatus, QueuedMutation};

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::QueueStatus;

use super::Workspace;

/// JSON representation of a queued mutation. The credential is never shown.
#[derive(Debug, Serialize)]
pub(crate) struct ListEntry {
    id: MutationId,
    kind: &'static str,
    target: String,
    status: MutationStatus,
    enqueued_at: DateTime<Utc>,
}

impl From<&QueuedMutation> for ListEntry {
    fn from(m: &QueuedMutation) -> Self {
        ListEntry {
            id: m.id,
            kind: m.kind().as_str(),
            target: m.target(),
            status: m.status,
            enqueued_at: m.enqueued_at,
        }
    }
}

/// One line of text output.
pub(crate) fn format_line(m: &QueuedMutation) -> String {
    format!(
        "{}  {:<8} {:<10} {}  ({})",
        m.id,
        m.status.as_str(),
        m.kind().as_str(),
        m.target(),
        m.enqueued_at.format("%Y-%m-%d %H:%M")
    )
}

pub(crate) fn format_status(status: &QueueStatus) -> String {
    let connectivity = if status.connectivity.online {
        "online"
    } else {
        "offline"
    };
    let mut lines = vec![
        format!("pending:  {}", status.pending),
        format!("syncing:  {}", status.syncing),
        format!("failed:   {}", status.failed),
        format!(
            "storage:  {} of {} slots used",
            status.pending + status.syncing + status.failed,
            status.capacity
        ),
        format!(
            "network:  {} since {}",
            connectivity,
            status.connectivity.last_transition_at.to_rfc3339()
        ),
    ];
    if status.frozen {
        lines.push("session:  invalid, sign in again to resume sync".to_string());
    }
    if status.draining {
        lines.push("drain:    running".to_string());
    }
    lines.join("\n")
}

pub fn list(
    workspace: &Workspace,
    status: Option<MutationStatus>,
    format: OutputFormat,
) -> Result<()> {
    let ctx = workspace.context()?;
    let items = ctx.list(status);

    match format {
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No queued mutations");
            }
            for item in &items {
                println!("{}", format_line(item));
            }
        }
        OutputFormat::Json => {
            let entries: Vec<ListEntry> = items.iter().map(ListEntry::from).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

pub fn status(workspace: &Workspace) -> Result<()> {
    let ctx = workspace.context()?;
    println!("{}", format_status(&ctx.status()));
    Ok(())
}

pub fn retry(workspace: &Workspace, id: &str) -> Result<()> {
    let id = MutationId::parse(id)?;
    workspace.context()?.retry_failed(id)?;
    println!("Re-queued {}", id);
    Ok(())
}

pub fn discard(workspace: &Workspace, id: &str) -> Result<()> {
    let id = MutationId::parse(id)?;
    let removed = workspace.context()?.discard(id)?;
    println!("Discarded {} {} ({})", removed.kind(), removed.id, removed.target());
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
