// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host signal loop.
//!
//! Turns host events into coordinator calls. Drain cycles run as spawned
//! tasks so a slow delivery never holds up reachability or session signals;
//! overlapping triggers are coalesced by the coordinator.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use evq_core::Transition;

use super::coordinator::{DrainOutcome, SyncContext};
use super::remote::RemoteApi;
use crate::error::Result;

/// Events the host platform delivers to the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// Raw reachability report; repeated values are fine.
    Reachability(bool),
    /// The session credential was revoked or expired.
    SessionInvalidated,
    /// The user signed in again.
    SessionRestored,
    /// A deferred replay came due.
    ReplayRequested,
}

/// Runs until `cancel` fires or every signal sender is dropped.
///
/// In-flight drain cycles are awaited before returning.
pub async fn run_event_loop<R: RemoteApi + 'static>(
    ctx: Arc<SyncContext<R>>,
    mut signals: mpsc::Receiver<HostSignal>,
    cancel: CancellationToken,
) {
    let mut drains = JoinSet::new();

    if ctx.is_online() {
        spawn_drain(&mut drains, &ctx, "startup");
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("event loop cancelled");
                break;
            }

            signal = signals.recv() => {
                let Some(signal) = signal else {
                    tracing::debug!("signal channel closed");
                    break;
                };
                handle_signal(&mut drains, &ctx, signal);
            }

            Some(joined) = drains.join_next(), if !drains.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "drain task failed");
                }
            }
        }
    }

    while let Some(joined) = drains.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "drain task failed");
        }
    }
}

fn handle_signal<R: RemoteApi + 'static>(
    drains: &mut JoinSet<()>,
    ctx: &Arc<SyncContext<R>>,
    signal: HostSignal,
) {
    tracing::debug!(?signal, "host signal");
    match signal {
        HostSignal::Reachability(online) => {
            if ctx.observe_connectivity(online) == Some(Transition::CameOnline) {
                spawn_drain(drains, ctx, "connectivity restored");
            }
        }
        HostSignal::SessionInvalidated => ctx.on_session_invalidated(),
        HostSignal::SessionRestored => match ctx.on_session_restored() {
            Ok(_) if ctx.is_online() => spawn_drain(drains, ctx, "session restored"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "could not restore session"),
        },
        HostSignal::ReplayRequested => {
            if ctx.is_online() {
                spawn_drain(drains, ctx, "deferred replay");
            } else {
                tracing::debug!("replay requested while offline, waiting for connectivity");
            }
        }
    }
}

fn spawn_drain<R: RemoteApi + 'static>(
    drains: &mut JoinSet<()>,
    ctx: &Arc<SyncContext<R>>,
    trigger: &'static str,
) {
    let ctx = Arc::clone(ctx);
    drains.spawn(async move {
        log_drain(trigger, ctx.drain().await);
    });
}

fn log_drain(trigger: &str, outcome: Result<DrainOutcome>) {
    match outcome {
        Ok(DrainOutcome::Coalesced) => {
            tracing::debug!(trigger, "drain coalesced");
        }
        Ok(DrainOutcome::Completed(report)) => {
            tracing::debug!(trigger, delivered = report.delivered.len(), "drain completed");
        }
        Err(e) => tracing::error!(trigger, error = %e, "drain failed"),
    }
}
