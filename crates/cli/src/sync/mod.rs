// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline sync engine for queued mutations.
//!
//! Replays writes made while offline against the remote API once
//! connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Host signals│────►│ Coordinator │────►│  RemoteApi  │
//! │ (event loop)│     │(SyncContext)│◄────│   (trait)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                   │
//!        │                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ TimerReplay │     │    Store    │  (queue.jsonl)
//! │  Notifier   │     │(MutationStore)
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable queue, persisted before any delivery attempt
//! - Single-flight drain cycles with coalesced triggers
//! - Retryable vs. terminal failure classification
//! - Live credential preferred over stale snapshots
//! - Deferred replay and user notices through host bridges
//! - Injectable remote trait for testing

mod bridge;
mod coordinator;
mod event_loop;
mod remote;

pub use bridge::{
    ConsoleNotifier, DeferredReplay, LogNotifier, NoReplay, Notice, Notifier, ReplayRequest,
    TimerReplay,
};
pub use coordinator::{DrainOutcome, DrainReport, QueueStatus, SubmitOutcome, SyncContext};
pub use event_loop::{run_event_loop, HostSignal};
pub use remote::{
    classify_response, rejection_reason, DeliveryError, DeliveryResult, HttpRemote, RemoteApi,
    IDEMPOTENCY_HEADER,
};

#[cfg(test)]
mod test_helpers;
