// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer credentials and the guard that picks one for each delivery.
//!
//! The session subsystem is a black box behind [`CredentialSource`]. The guard
//! never refreshes sessions itself; it only decides which credential a replay
//! should carry and whether a stored snapshot is structurally usable.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::mutation::QueuedMutation;

/// An opaque bearer token.
///
/// `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    /// Returns the raw token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

/// Number of dot-separated segments in a well-formed token.
const TOKEN_SEGMENTS: usize = 3;

/// Structural check only: three non-empty base64url segments.
pub fn is_well_formed(credential: &Credential) -> bool {
    let segments: Vec<&str> = credential.expose().split('.').collect();
    segments.len() == TOKEN_SEGMENTS
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='))
        })
}

/// Supplies the live session credential.
pub trait CredentialSource: Send + Sync {
    /// Returns the credential of the active session, if any.
    fn current_credential(&self) -> Option<Credential>;
}

/// In-memory credential source, updated by whoever owns the session.
#[derive(Default)]
pub struct SessionCredential {
    current: RwLock<Option<Credential>>,
}

impl SessionCredential {
    pub fn new(credential: Option<Credential>) -> Self {
        SessionCredential {
            current: RwLock::new(credential),
        }
    }

    pub fn set(&self, credential: Credential) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl CredentialSource for SessionCredential {
    fn current_credential(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Decides which credential a delivery attempt uses.
#[derive(Clone)]
pub struct CredentialGuard {
    source: Arc<dyn CredentialSource>,
}

impl CredentialGuard {
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        CredentialGuard { source }
    }

    pub fn is_well_formed(&self, credential: &Credential) -> bool {
        is_well_formed(credential)
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.source.current_credential()
    }

    /// The credential to replay `item` with.
    ///
    /// The live credential wins whenever it is well formed; the snapshot is
    /// stale by construction and only used when no usable session exists.
    pub fn credential_for(&self, item: &QueuedMutation) -> Credential {
        match self.current_credential() {
            Some(live) if is_well_formed(&live) => live,
            _ => item.credential_snapshot.clone(),
        }
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
