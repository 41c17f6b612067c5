// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;
use crate::sync::{DrainOutcome, DrainReport};

use super::Workspace;

/// Human-readable summary of a drain cycle.
pub(crate) fn format_outcome(outcome: &DrainOutcome) -> String {
    let report = match outcome {
        DrainOutcome::Coalesced => return "A drain cycle is already running".to_string(),
        DrainOutcome::Completed(report) => report,
    };
    let attempted = DrainReport {
        frozen: false,
        replay_scheduled: false,
        ..report.clone()
    };
    if report.frozen && attempted == DrainReport::default() {
        return "Session is invalid; queued mutations are held until you sign in again"
            .to_string();
    }
    if report == &DrainReport::default() {
        return "Nothing to sync".to_string();
    }

    let mut parts = vec![format!("{} delivered", report.delivered.len())];
    if !report.retried.is_empty() {
        parts.push(format!("{} will be retried", report.retried.len()));
    }
    if !report.failed.is_empty() {
        parts.push(format!("{} failed", report.failed.len()));
    }
    if !report.lost.is_empty() {
        parts.push(format!("{} lost", report.lost.len()));
    }
    let mut text = parts.join(", ");
    if report.aborted_offline {
        text.push_str(" (stopped: offline)");
    }
    if report.frozen {
        text.push_str(" (stopped: sign in again to send the rest)");
    }
    text
}

/// Runs one drain cycle. The invocation reports reachability unless `offline`.
pub async fn run(workspace: &Workspace, offline: bool) -> Result<()> {
    let ctx = workspace.context()?;
    ctx.observe_connectivity(!offline);

    let outcome = ctx.drain().await?;
    println!("{}", format_outcome(&outcome));
    Ok(())
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
