// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running host adapter.
//!
//! Reads host signals from stdin, one per line, and feeds them to the event
//! loop until stdin closes or Ctrl-C.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::sync::{run_event_loop, HostSignal, TimerReplay};

use super::Workspace;

const SIGNAL_BUFFER: usize = 32;

/// Maps one input line to a host signal.
pub(crate) fn parse_signal(line: &str) -> Option<HostSignal> {
    match line.trim().to_lowercase().as_str() {
        "online" => Some(HostSignal::Reachability(true)),
        "offline" => Some(HostSignal::Reachability(false)),
        "signed-out" => Some(HostSignal::SessionInvalidated),
        "signed-in" => Some(HostSignal::SessionRestored),
        "replay" => Some(HostSignal::ReplayRequested),
        _ => None,
    }
}

pub async fn run(workspace: &Workspace) -> Result<()> {
    let (signals, rx) = mpsc::channel(SIGNAL_BUFFER);
    let replay = TimerReplay::new(workspace.config.replay.delay(), signals.clone());
    let ctx = Arc::new(workspace.context()?.with_replay(Arc::new(replay)));

    let cancel = CancellationToken::new();
    let event_loop = tokio::spawn(run_event_loop(Arc::clone(&ctx), rx, cancel.clone()));
    tracing::info!("watching for host signals");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_signal(&line) {
                    Some(signal) => {
                        if signals.send(signal).await.is_err() {
                            break;
                        }
                    }
                    None => eprintln!("unknown signal '{}' (expected online, offline, signed-out, signed-in, replay)", line.trim()),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    cancel.cancel();
    if let Err(e) = event_loop.await {
        tracing::error!(error = %e, "event loop task failed");
    }
    tracing::info!("watch stopped");
    Ok(())
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
