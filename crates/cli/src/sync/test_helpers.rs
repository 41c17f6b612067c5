// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tokio::sync::Semaphore;

use evq_core::{
    ConnectivityMonitor, Credential, CredentialGuard, EvaluationPayload, HttpMethod, MutationId,
    MutationPayload, MutationStore, QueuedMutation, SessionCredential,
};

use super::bridge::{DeferredReplay, Notice, Notifier, ReplayRequest};
use super::coordinator::SyncContext;
use super::remote::{DeliveryResult, RemoteApi};

pub const TOKEN_A: &str = "aaa.bbb.ccc";
pub const TOKEN_B: &str = "ddd.eee.fff";
pub const MALFORMED: &str = "not-a-token";

/// Create an evaluation payload for the given salesperson.
pub fn evaluation(salesperson: &str) -> MutationPayload {
    let mut scores = BTreeMap::new();
    scores.insert("closing".to_string(), 4);
    scores.insert("prospecting".to_string(), 3);
    MutationPayload::EvaluationSubmission(EvaluationPayload {
        salesperson_id: salesperson.to_string(),
        team_id: Some("team-1".to_string()),
        period: Some("2026-Q3".to_string()),
        scores,
        notes: None,
    })
}

/// Create a generic update payload against `endpoint`.
pub fn update(endpoint: &str) -> MutationPayload {
    MutationPayload::GenericUpdate {
        method: HttpMethod::Patch,
        endpoint: endpoint.to_string(),
        body: serde_json::json!({"name": "West"}),
    }
}

/// Create a pending mutation with the given snapshot token.
pub fn queued(payload: MutationPayload, token: &str) -> QueuedMutation {
    QueuedMutation::new(payload, Credential::new(token))
}

/// One recorded delivery call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub id: MutationId,
    pub credential: Credential,
}

/// Mock remote for testing without a server.
///
/// Responds `Ok(())` unless a response was scripted for the id or set for
/// all. Clones share all state, so a test can keep a handle after moving one
/// into a context.
#[derive(Clone, Default)]
pub struct MockRemote {
    scripted: Arc<Mutex<HashMap<MutationId, VecDeque<DeliveryResult>>>>,
    fallback: Arc<Mutex<Option<DeliveryResult>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    gate: Option<Arc<Semaphore>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    offline_after: Arc<Mutex<Option<(usize, Arc<ConnectivityMonitor>)>>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery blocks until [`MockRemote::release`] hands out a permit.
    pub fn gated() -> Self {
        MockRemote {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    /// Queue a response for the next delivery of `id`.
    pub fn respond(&self, id: MutationId, result: DeliveryResult) {
        self.scripted
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push_back(result);
    }

    /// Respond with `result` to every delivery that has nothing scripted.
    pub fn respond_all(&self, result: DeliveryResult) {
        *self.fallback.lock().unwrap() = Some(result);
    }

    /// Report offline on `monitor` once `deliveries` calls have completed.
    pub fn go_offline_after(&self, deliveries: usize, monitor: Arc<ConnectivityMonitor>) {
        *self.offline_after.lock().unwrap() = Some((deliveries, monitor));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn attempted_ids(&self) -> Vec<MutationId> {
        self.calls().into_iter().map(|c| c.id).collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl RemoteApi for MockRemote {
    fn deliver<'a>(
        &'a self,
        mutation: &'a QueuedMutation,
        credential: &'a Credential,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult> + Send + 'a>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }

            let completed = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(Call {
                    id: mutation.id,
                    credential: credential.clone(),
                });
                calls.len()
            };

            let result = self
                .scripted
                .lock()
                .unwrap()
                .get_mut(&mutation.id)
                .and_then(|q| q.pop_front())
                .or_else(|| self.fallback.lock().unwrap().clone())
                .unwrap_or(Ok(()));

            if let Some((after, monitor)) = self.offline_after.lock().unwrap().as_ref() {
                if completed >= *after {
                    monitor.observe(false);
                }
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

/// Notifier that records every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

/// Replay bridge that records requests instead of scheduling anything.
#[derive(Default)]
pub struct RecordingReplay {
    requests: Mutex<Vec<ReplayRequest>>,
}

impl RecordingReplay {
    pub fn requests(&self) -> Vec<ReplayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DeferredReplay for RecordingReplay {
    fn schedule(&self, request: ReplayRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

/// A context wired to mocks, with handles to every collaborator.
pub struct Harness {
    pub dir: TempDir,
    pub ctx: Arc<SyncContext<MockRemote>>,
    pub remote: MockRemote,
    pub session: Arc<SessionCredential>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub notifier: Arc<RecordingNotifier>,
    pub replay: Arc<RecordingReplay>,
}

impl Harness {
    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("queue.jsonl")
    }

    /// Reads the queue back from disk.
    pub fn reopen(&self) -> MutationStore {
        MutationStore::open(&self.store_path()).unwrap()
    }
}

/// Signed in with [`TOKEN_A`], online, empty queue.
pub fn harness() -> Harness {
    build(MockRemote::new(), true, Vec::new())
}

/// Builds a harness whose store already holds `seed` on disk.
pub fn build(remote: MockRemote, online: bool, seed: Vec<QueuedMutation>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.jsonl");

    let mut store = MutationStore::open(&path).unwrap();
    for item in seed {
        store.enqueue(item).unwrap();
    }

    let connectivity = Arc::new(ConnectivityMonitor::in_memory());
    connectivity.observe(online);

    let session = Arc::new(SessionCredential::new(Some(Credential::new(TOKEN_A))));
    let guard = CredentialGuard::new(Arc::clone(&session) as _);
    let notifier = Arc::new(RecordingNotifier::default());
    let replay = Arc::new(RecordingReplay::default());

    let ctx = SyncContext::new(store, Arc::clone(&connectivity), guard, remote.clone())
        .with_notifier(Arc::clone(&notifier) as _)
        .with_replay(Arc::clone(&replay) as _);

    Harness {
        dir,
        ctx: Arc::new(ctx),
        remote,
        session,
        connectivity,
        notifier,
        replay,
    }
}
