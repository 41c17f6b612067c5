// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! evq-core: offline mutation queue primitives
//!
//! This crate provides the data model, durable storage, connectivity tracking
//! and credential checks used by the evq synchronization engine. Everything
//! here is synchronous; the async drain loop lives in the `evq` crate.

pub mod connectivity;
pub mod credential;
pub mod error;
pub mod jsonl;
pub mod mutation;
pub mod store;

pub use connectivity::{ConnectivityMonitor, ConnectivityState, Transition};
pub use credential::{Credential, CredentialGuard, CredentialSource, SessionCredential};
pub use error::{Error, Result};
pub use mutation::{
    EvaluationPayload, HttpMethod, MutationId, MutationKind, MutationPayload, MutationStatus,
    QueuedMutation,
};
pub use store::{DrainLock, MutationStore};
