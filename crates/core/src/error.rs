// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for evq-core operations.

use thiserror::Error;

use crate::mutation::MutationId;

/// All possible errors that can occur in evq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("offline storage is full ({capacity} items queued)\n  hint: reconnect so queued items can be delivered, or discard failed items")]
    StorageFull { capacity: usize },

    #[error("queued mutation not found: {0}")]
    MutationNotFound(MutationId),

    #[error("queued mutation already exists: {0}")]
    DuplicateMutation(MutationId),

    #[error("invalid mutation id: '{0}'")]
    InvalidMutationId(String),

    #[error("invalid http method: '{0}'\n  hint: valid methods are: GET, POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),

    #[error("invalid mutation status: '{0}'\n  hint: valid statuses are: pending, syncing, synced, failed")]
    InvalidStatus(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Maps an I/O failure to `StorageFull` when the device has no room left.
    pub(crate) fn from_write(err: std::io::Error, capacity: usize) -> Self {
        if err.kind() == std::io::ErrorKind::StorageFull {
            Error::StorageFull { capacity }
        } else {
            Error::Io(err)
        }
    }
}

/// A specialized Result type for evq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
