// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drain coordinator for the offline queue.
//!
//! [`SyncContext`] is the process-wide context object: it owns the store, the
//! connectivity monitor, the credential guard, the remote and both host
//! bridges. Build exactly one per process and share it behind an `Arc`.
//!
//! A drain cycle goes `Idle -> Draining -> Idle`. The `draining` flag is taken
//! by compare-and-swap for the whole cycle; a trigger that finds it taken
//! returns [`DrainOutcome::Coalesced`] without doing anything. The store's
//! drain lock extends the same rule to other processes sharing the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use evq_core::{
    ConnectivityMonitor, ConnectivityState, CredentialGuard, MutationId, MutationPayload,
    MutationStatus, MutationStore, QueuedMutation, Transition,
};

use super::bridge::{DeferredReplay, LogNotifier, NoReplay, Notice, Notifier, ReplayRequest};
use super::remote::{DeliveryError, HttpRemote, RemoteApi};
use crate::error::{Error, Result};

/// Result of asking for a drain cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Another cycle (here or in another process) was already running; this
    /// trigger was dropped.
    Coalesced,
    /// A cycle ran to completion (or aborted early, see the report).
    Completed(DrainReport),
}

/// What one drain cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: Vec<MutationId>,
    /// Reverted to pending after a retryable failure.
    pub retried: Vec<MutationId>,
    /// Moved to `failed` after a non-retryable failure.
    pub failed: Vec<(MutationId, DeliveryError)>,
    /// Purged because their stored state was unusable.
    pub lost: Vec<MutationId>,
    /// Connectivity dropped (or was never there); remaining items untouched.
    pub aborted_offline: bool,
    /// The session became invalid; items not yet attempted were left pending.
    pub frozen: bool,
    pub replay_scheduled: bool,
}

impl DrainReport {
    fn has_terminal_outcomes(&self) -> bool {
        !self.delivered.is_empty() || !self.failed.is_empty() || !self.lost.is_empty()
    }
}

/// Result of a user submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Delivered straight away; nothing was queued.
    Delivered(MutationId),
    /// Stored for later delivery.
    Queued(MutationId),
}

/// Snapshot for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    pub pending: usize,
    pub syncing: usize,
    pub failed: usize,
    pub capacity: usize,
    pub connectivity: ConnectivityState,
    pub frozen: bool,
    pub draining: bool,
}

/// Holds the single-flight flag for the duration of a drain cycle.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Process-wide synchronization context.
pub struct SyncContext<R: RemoteApi = HttpRemote> {
    store: Mutex<MutationStore>,
    connectivity: Arc<ConnectivityMonitor>,
    guard: CredentialGuard,
    remote: R,
    replay: Arc<dyn DeferredReplay>,
    notifier: Arc<dyn Notifier>,
    draining: AtomicBool,
    frozen: AtomicBool,
}

impl<R: RemoteApi> SyncContext<R> {
    /// Create a context with log-only notifications and no deferred replay.
    pub fn new(
        store: MutationStore,
        connectivity: Arc<ConnectivityMonitor>,
        guard: CredentialGuard,
        remote: R,
    ) -> Self {
        SyncContext {
            store: Mutex::new(store),
            connectivity,
            guard,
            remote,
            replay: Arc::new(NoReplay),
            notifier: Arc::new(LogNotifier),
            draining: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn with_replay(mut self, replay: Arc<dyn DeferredReplay>) -> Self {
        self.replay = replay;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    fn lock_store(&self) -> MutexGuard<'_, MutationStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store lock, reloaded so writes from other processes are visible.
    fn fresh_store(&self) -> MutexGuard<'_, MutationStore> {
        let mut store = self.lock_store();
        if let Err(e) = store.refresh() {
            tracing::warn!(error = %e, "could not reload offline queue, showing last known state");
        }
        store
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Feeds the host reachability signal through the monitor.
    pub fn observe_connectivity(&self, online: bool) -> Option<Transition> {
        self.connectivity.observe(online)
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Items in enqueue order, optionally filtered by status.
    pub fn list(&self, status: Option<MutationStatus>) -> Vec<QueuedMutation> {
        self.fresh_store().list(status)
    }

    pub fn status(&self) -> QueueStatus {
        let store = self.fresh_store();
        QueueStatus {
            pending: store.count(MutationStatus::Pending),
            syncing: store.count(MutationStatus::Syncing),
            failed: store.count(MutationStatus::Failed),
            capacity: store.capacity(),
            connectivity: self.connectivity.state(),
            frozen: self.is_frozen(),
            draining: self.is_draining(),
        }
    }

    /// Queues a mutation without trying the network.
    ///
    /// The live credential is captured as the snapshot.
    pub fn enqueue(&self, payload: MutationPayload) -> Result<MutationId> {
        let credential = self.guard.current_credential().ok_or(Error::NotSignedIn)?;
        if !self.guard.is_well_formed(&credential) {
            return Err(Error::MalformedCredential);
        }
        let id = self
            .lock_store()
            .enqueue(QueuedMutation::new(payload, credential))?;
        tracing::info!(%id, "queued mutation for later delivery");
        Ok(id)
    }

    /// Delivers a user write now if possible, otherwise queues it.
    ///
    /// A non-retryable rejection is returned to the caller and nothing is
    /// queued; the user is present to see it.
    pub async fn submit(&self, payload: MutationPayload) -> Result<SubmitOutcome> {
        let credential = self.guard.current_credential().ok_or(Error::NotSignedIn)?;
        if !self.guard.is_well_formed(&credential) {
            return Err(Error::MalformedCredential);
        }
        let mutation = QueuedMutation::new(payload, credential.clone());

        if self.is_online() && !self.is_frozen() {
            match self.remote.deliver(&mutation, &credential).await {
                Ok(()) => {
                    tracing::info!(id = %mutation.id, "delivered directly");
                    return Ok(SubmitOutcome::Delivered(mutation.id));
                }
                Err(e) if e.is_retryable() => {
                    tracing::debug!(id = %mutation.id, error = %e, "direct delivery failed, queueing");
                }
                Err(e) => return Err(Error::Delivery(e)),
            }
        }

        let (id, request) = {
            let mut store = self.lock_store();
            let id = store.enqueue(mutation)?;
            (id, replay_request(&store.list(Some(MutationStatus::Pending))))
        };
        tracing::info!(%id, "queued mutation for later delivery");

        if self.is_online() && !self.is_frozen() {
            self.replay.schedule(request);
        }
        Ok(SubmitOutcome::Queued(id))
    }

    /// Moves a failed item back to pending. User-initiated only.
    pub fn retry_failed(&self, id: MutationId) -> Result<()> {
        let mut store = self.lock_store();
        store.refresh()?;
        let status = store
            .get(id)
            .map(|m| m.status)
            .ok_or(evq_core::Error::MutationNotFound(id))?;
        if status != MutationStatus::Failed {
            return Err(Error::NotRetryable { id, status });
        }
        store.update_status(id, MutationStatus::Pending)?;
        tracing::info!(%id, "failed mutation re-queued by user");
        Ok(())
    }

    /// Removes an item the user gave up on.
    pub fn discard(&self, id: MutationId) -> Result<QueuedMutation> {
        let mut store = self.lock_store();
        store.refresh()?;
        let status = store
            .get(id)
            .map(|m| m.status)
            .ok_or(evq_core::Error::MutationNotFound(id))?;
        if status == MutationStatus::Syncing {
            return Err(Error::MutationBusy(id));
        }
        let removed = store.remove(id)?;
        tracing::info!(%id, "mutation discarded by user");
        Ok(removed)
    }

    /// The credential subsystem reported the session invalid.
    ///
    /// Drain cycles leave everything pending until the session is restored.
    pub fn on_session_invalidated(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            tracing::info!("session invalidated, queue frozen");
        }
    }

    /// The user signed in again. Refreshes pending snapshots and unfreezes.
    ///
    /// Returns the number of snapshots refreshed.
    pub fn on_session_restored(&self) -> Result<usize> {
        let credential = self.guard.current_credential().ok_or(Error::NotSignedIn)?;
        if !self.guard.is_well_formed(&credential) {
            return Err(Error::MalformedCredential);
        }

        let refreshed = {
            let mut store = self.lock_store();
            store.refresh()?;
            let stale: Vec<MutationId> = store
                .list(Some(MutationStatus::Pending))
                .into_iter()
                .filter(|m| m.credential_snapshot != credential)
                .map(|m| m.id)
                .collect();
            for id in &stale {
                store.update_credential_snapshot(*id, credential.clone())?;
            }
            stale.len()
        };

        self.frozen.store(false, Ordering::Release);
        tracing::info!(refreshed, "session restored, queue unfrozen");
        Ok(refreshed)
    }

    /// Runs one drain cycle, unless one is already running.
    pub async fn drain(&self) -> Result<DrainOutcome> {
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            tracing::debug!("drain already running, trigger coalesced");
            return Ok(DrainOutcome::Coalesced);
        };

        let Some(_drain_lock) = self.lock_store().try_lock_drain()? else {
            tracing::debug!("another process is draining the queue, trigger coalesced");
            return Ok(DrainOutcome::Coalesced);
        };

        let mut report = DrainReport::default();
        self.recover_interrupted()?;

        if self.is_frozen() {
            tracing::info!("session invalid, drain skipped");
            report.frozen = true;
            return Ok(DrainOutcome::Completed(report));
        }

        let pending = self.lock_store().list(Some(MutationStatus::Pending));
        tracing::debug!(items = pending.len(), "drain cycle started");

        for item in pending {
            if self.is_frozen() {
                tracing::info!("session invalidated, drain cycle stopped");
                report.frozen = true;
                break;
            }
            if !self.is_online() {
                tracing::info!("offline, drain cycle aborted");
                report.aborted_offline = true;
                break;
            }

            let marked = self.lock_store().update_status(item.id, MutationStatus::Syncing);
            match marked {
                Ok(()) => {}
                Err(evq_core::Error::MutationNotFound(_)) => {
                    tracing::debug!(id = %item.id, "item removed before delivery, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            if !self.guard.is_well_formed(&item.credential_snapshot) {
                tracing::warn!(id = %item.id, "queued mutation has a malformed credential, purging");
                self.lock_store().remove(item.id)?;
                self.notifier.notify(&Notice::Lost {
                    id: item.id,
                    kind: item.kind(),
                });
                report.lost.push(item.id);
                continue;
            }

            let credential = self.guard.credential_for(&item);
            let result = self.remote.deliver(&item, &credential).await;

            match result {
                Ok(()) => {
                    tracing::debug!(id = %item.id, "delivered");
                    self.settle(item.id, MutationStatus::Synced)?;
                    report.delivered.push(item.id);
                }
                Err(e) if e.is_retryable() => {
                    tracing::debug!(id = %item.id, error = %e, "delivery failed, will retry");
                    self.settle(item.id, MutationStatus::Pending)?;
                    report.retried.push(item.id);
                }
                Err(e @ DeliveryError::CredentialRejected { .. }) if self.is_frozen() => {
                    // The session died while this request was in flight.
                    tracing::info!(id = %item.id, error = %e, "credential rejected after session invalidated, kept pending");
                    self.settle(item.id, MutationStatus::Pending)?;
                    report.retried.push(item.id);
                }
                Err(e) => {
                    tracing::warn!(id = %item.id, error = %e, "delivery rejected, moved to failed");
                    self.settle(item.id, MutationStatus::Failed)?;
                    self.notifier.notify(&Notice::Rejected {
                        id: item.id,
                        kind: item.kind(),
                        error: e.clone(),
                    });
                    report.failed.push((item.id, e));
                }
            }
        }

        let remaining = self.lock_store().list(Some(MutationStatus::Pending));
        if !remaining.is_empty() && !report.frozen {
            self.replay.schedule(replay_request(&remaining));
            report.replay_scheduled = true;
        }

        if report.has_terminal_outcomes() {
            self.notifier.notify(&Notice::Summary {
                delivered: report.delivered.len(),
                failed: report.failed.len(),
                lost: report.lost.len(),
            });
        }

        tracing::info!(
            delivered = report.delivered.len(),
            retried = report.retried.len(),
            failed = report.failed.len(),
            lost = report.lost.len(),
            remaining = remaining.len(),
            "drain cycle finished"
        );
        Ok(DrainOutcome::Completed(report))
    }

    /// Items left `syncing` belong to a cycle that never finished (crash).
    /// Only called while holding the drain flag and the drain lock.
    fn recover_interrupted(&self) -> Result<()> {
        let mut store = self.lock_store();
        store.refresh()?;
        for item in store.list(Some(MutationStatus::Syncing)) {
            tracing::info!(id = %item.id, "recovering mutation from interrupted drain");
            store.update_status(item.id, MutationStatus::Pending)?;
        }
        Ok(())
    }

    /// Records the outcome of a delivery attempt.
    fn settle(&self, id: MutationId, status: MutationStatus) -> Result<()> {
        match self.lock_store().update_status(id, status) {
            Ok(()) | Err(evq_core::Error::MutationNotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn replay_request(pending: &[QueuedMutation]) -> ReplayRequest {
    ReplayRequest {
        pending: pending.len(),
        oldest_enqueued_at: pending.first().map(|m| m.enqueued_at),
    }
}
