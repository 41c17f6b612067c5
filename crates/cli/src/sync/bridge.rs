// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host-facing bridges: deferred replay and user notifications.
//!
//! Both are one-way from the coordinator's point of view. Neither can block
//! or fail a drain cycle, so their methods return nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use evq_core::{MutationId, MutationKind};

use super::event_loop::HostSignal;
use super::remote::DeliveryError;

/// What the coordinator tells the host when asking for a later replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    /// Items still pending after the cycle.
    pub pending: usize,
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
}

/// Asks the host to run the drain routine again at a time of its choosing.
///
/// Best-effort: the host may never fire.
pub trait DeferredReplay: Send + Sync {
    fn schedule(&self, request: ReplayRequest);
}

/// Replay bridge for hosts without background execution.
pub struct NoReplay;

impl DeferredReplay for NoReplay {
    fn schedule(&self, request: ReplayRequest) {
        tracing::debug!(pending = request.pending, "no background execution, replay left to the next run");
    }
}

/// Replay bridge backed by a tokio timer.
///
/// After `delay` it posts [`HostSignal::ReplayRequested`] to the event loop.
/// At most one timer is armed at a time; requests while armed are dropped.
pub struct TimerReplay {
    delay: Duration,
    signals: mpsc::Sender<HostSignal>,
    armed: Arc<AtomicBool>,
}

impl TimerReplay {
    pub fn new(delay: Duration, signals: mpsc::Sender<HostSignal>) -> Self {
        TimerReplay {
            delay,
            signals,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true while a replay timer is pending.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

impl DeferredReplay for TimerReplay {
    fn schedule(&self, request: ReplayRequest) {
        if self.armed.swap(true, Ordering::AcqRel) {
            tracing::debug!("replay already scheduled");
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime, cannot schedule replay");
            self.armed.store(false, Ordering::Release);
            return;
        };

        tracing::debug!(
            pending = request.pending,
            delay_secs = self.delay.as_secs(),
            "scheduling deferred replay"
        );
        let delay = self.delay;
        let signals = self.signals.clone();
        let armed = Arc::clone(&self.armed);
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            armed.store(false, Ordering::Release);
            // The loop may have shut down; nothing to do then.
            let _ = signals.send(HostSignal::ReplayRequested).await;
        });
    }
}

/// A terminal outcome the user has to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The server rejected a queued mutation; it is now `failed`.
    Rejected {
        id: MutationId,
        kind: MutationKind,
        error: DeliveryError,
    },
    /// A queued mutation was unrecoverable and has been purged.
    Lost { id: MutationId, kind: MutationKind },
    /// Counts of terminal outcomes in one drain cycle.
    Summary {
        delivered: usize,
        failed: usize,
        lost: usize,
    },
}

impl Notice {
    /// User-facing text.
    pub fn message(&self) -> String {
        match self {
            Notice::Rejected {
                kind,
                error: DeliveryError::CredentialRejected { .. },
                ..
            } => format!("An offline {} could not be sent: please sign in again.", kind),
            Notice::Rejected {
                kind,
                error: DeliveryError::PayloadRejected { reason, .. },
                ..
            } => format!("An offline {} was rejected by the server: {}", kind, reason),
            Notice::Rejected { kind, error, .. } => {
                format!("An offline {} could not be sent: {}", kind, error)
            }
            Notice::Lost { .. } => "One offline item could not be recovered.".to_string(),
            Notice::Summary {
                delivered,
                failed,
                lost,
            } => {
                let mut parts = vec![format!("{} delivered", delivered)];
                if *failed > 0 {
                    parts.push(format!("{} failed", failed));
                }
                if *lost > 0 {
                    parts.push(format!("{} lost", lost));
                }
                format!("Offline sync finished: {}.", parts.join(", "))
            }
        }
    }
}

/// Renders terminal outcomes to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Notifier that only logs.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::info!(notice = %notice.message(), "user notice");
    }
}

/// Notifier that prints to stderr, for terminal use.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::info!(notice = %notice.message(), "user notice");
        eprintln!("{}", notice.message());
    }
}
