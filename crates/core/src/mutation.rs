// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutations: user writes deferred for later delivery.
//!
//! A [`QueuedMutation`] records exactly what the user intended to send and the
//! credential that was live when they sent it. Only `status` and
//! `credential_snapshot` ever change after enqueue; the payload is fixed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credential::Credential;
use crate::error::{Error, Result};

/// Opaque, permanently unique identifier of a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(Uuid);

impl MutationId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        MutationId(Uuid::new_v4())
    }

    /// Parses an identifier from its hyphenated string form.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(MutationId)
            .map_err(|_| Error::InvalidMutationId(s.to_string()))
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for MutationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MutationId::parse(s)
    }
}

/// Delivery status of a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    /// Waiting for the next drain cycle.
    Pending,
    /// Currently being delivered. At most one item per store.
    Syncing,
    /// Delivered. Terminal; the store removes the item instead of keeping it.
    Synced,
    /// Rejected by the server or credential check. Terminal dead letter,
    /// visible to the user, never retried automatically.
    Failed,
}

impl MutationStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Pending => "pending",
            MutationStatus::Syncing => "syncing",
            MutationStatus::Synced => "synced",
            MutationStatus::Failed => "failed",
        }
    }

    /// Returns true for states that receive no further automatic processing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MutationStatus::Synced | MutationStatus::Failed)
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MutationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MutationStatus::Pending),
            "syncing" => Ok(MutationStatus::Syncing),
            "synced" => Ok(MutationStatus::Synced),
            "failed" => Ok(MutationStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// HTTP method of a generic record update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// A salesperson evaluation as submitted by an evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationPayload {
    pub salesperson_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Score per criterion.
    pub scores: BTreeMap<String, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The data the user intended to send, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationPayload {
    /// Posted to the evaluation endpoint.
    EvaluationSubmission(EvaluationPayload),
    /// Arbitrary record edit (team, user).
    GenericUpdate {
        method: HttpMethod,
        endpoint: String,
        #[serde(default)]
        body: serde_json::Value,
    },
}

impl MutationPayload {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationPayload::EvaluationSubmission(_) => MutationKind::EvaluationSubmission,
            MutationPayload::GenericUpdate { .. } => MutationKind::GenericUpdate,
        }
    }
}

/// Fieldless discriminant of [`MutationPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    EvaluationSubmission,
    GenericUpdate,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::EvaluationSubmission => "evaluation",
            MutationKind::GenericUpdate => "update",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-initiated write deferred for later delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMutation {
    pub id: MutationId,
    pub payload: MutationPayload,
    /// Credential live at enqueue time. A fallback hint only; replay prefers
    /// the session's current credential.
    pub credential_snapshot: Credential,
    pub enqueued_at: DateTime<Utc>,
    pub status: MutationStatus,
}

impl QueuedMutation {
    /// Creates a pending mutation with a fresh id, stamped now.
    pub fn new(payload: MutationPayload, credential_snapshot: Credential) -> Self {
        QueuedMutation {
            id: MutationId::generate(),
            payload,
            credential_snapshot,
            enqueued_at: Utc::now(),
            status: MutationStatus::Pending,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.payload.kind()
    }

    /// Short human-readable description of the target, for listings.
    pub fn target(&self) -> String {
        match &self.payload {
            MutationPayload::EvaluationSubmission(eval) => {
                format!("salesperson {}", eval.salesperson_id)
            }
            MutationPayload::GenericUpdate {
                method, endpoint, ..
            } => format!("{} {}", method, endpoint),
        }
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
