// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use evq_core::{MutationId, MutationStatus};

use crate::sync::DeliveryError;

/// All possible errors that can occur in the evqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] evq_core::Error),

    #[error("not signed in\n  hint: set EVQ_TOKEN or [session] token_file in config.toml")]
    NotSignedIn,

    #[error("the session credential is malformed\n  hint: sign in again to obtain a fresh token")]
    MalformedCredential,

    #[error("{0}")]
    Delivery(#[from] DeliveryError),

    #[error("mutation {id} is {status}\n  hint: only failed mutations can be retried")]
    NotRetryable { id: MutationId, status: MutationStatus },

    #[error("mutation {0} is being delivered right now\n  hint: try again once the drain cycle finishes")]
    MutationBusy(MutationId),

    #[error("invalid score '{0}'\n  hint: use criterion=N with N between 1 and 5")]
    InvalidScore(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid endpoint '{0}'\n  hint: endpoints are API paths starting with '/'")]
    InvalidEndpoint(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("could not determine a state directory\n  hint: pass --state-dir or set EVQ_STATE_DIR")]
    NoStateDir,

    #[error("http client error: {0}")]
    Http(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for evqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
