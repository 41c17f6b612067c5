// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store for queued mutations.
//!
//! The whole set is kept in memory and mirrored to a JSONL file, one mutation
//! per line in enqueue order. Every mutating call rewrites the file (atomic
//! replace) before the in-memory set changes, so a crash right after any call
//! leaves the file matching the last call that returned `Ok`.
//!
//! Several processes may share one queue file (a long-running `watch` next to
//! one-shot commands). Mutating calls take an exclusive lock on `<file>.lock`,
//! reload the file, apply the change and write it back, so no process ever
//! writes from a stale copy. Delivery is serialized separately through
//! `<file>.drain.lock`, see [`MutationStore::try_lock_drain`].
//!
//! A file that cannot be parsed loads as an empty queue. The unreadable bytes
//! are moved to `<file>.corrupt-<unix-ts>` for later inspection.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;

use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::jsonl;
use crate::mutation::{MutationId, MutationStatus, QueuedMutation};

/// Default number of items the store accepts before reporting `StorageFull`.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Durable, ordered set of queued mutations.
#[derive(Debug)]
pub struct MutationStore {
    path: PathBuf,
    items: Vec<QueuedMutation>,
    capacity: usize,
}

/// Exclusive right to deliver items from one queue file.
///
/// Held across processes; released when dropped.
#[derive(Debug)]
pub struct DrainLock {
    _file: File,
}

impl MutationStore {
    /// Opens the store at `path`, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let items = {
            let _lock = acquire_lock(&sibling(path, ".lock"))?;
            load_or_quarantine(path)?
        };
        tracing::debug!(path = %path.display(), items = items.len(), "opened mutation store");

        Ok(MutationStore {
            path: path.to_path_buf(),
            items,
            capacity: DEFAULT_CAPACITY,
        })
    }

    /// Sets the maximum number of items the store holds.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reloads the set from disk, picking up writes made by other processes.
    ///
    /// Read accessors answer from memory as of the last refresh or mutation.
    pub fn refresh(&mut self) -> Result<()> {
        let _lock = acquire_lock(&sibling(&self.path, ".lock"))?;
        self.items = load_or_quarantine(&self.path)?;
        Ok(())
    }

    /// Takes the drain lock without blocking.
    ///
    /// Returns `None` while another holder (in this or another process) is
    /// delivering from the same file.
    pub fn try_lock_drain(&self) -> Result<Option<DrainLock>> {
        let file = open_lock_file(&sibling(&self.path, ".drain.lock"))?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(DrainLock { _file: file })),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends a mutation and persists it before returning its id.
    pub fn enqueue(&mut self, mutation: QueuedMutation) -> Result<MutationId> {
        let capacity = self.capacity;
        self.update(|items| {
            if items.len() >= capacity {
                return Err(Error::StorageFull { capacity });
            }
            if items.iter().any(|m| m.id == mutation.id) {
                return Err(Error::DuplicateMutation(mutation.id));
            }
            let id = mutation.id;
            items.push(mutation);
            Ok(id)
        })
    }

    /// Returns items in enqueue order, optionally filtered by status.
    pub fn list(&self, status: Option<MutationStatus>) -> Vec<QueuedMutation> {
        self.items
            .iter()
            .filter(|m| status.is_none_or(|s| m.status == s))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: MutationId) -> Option<&QueuedMutation> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn count(&self, status: MutationStatus) -> usize {
        self.items.iter().filter(|m| m.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes a mutation permanently, returning it.
    pub fn remove(&mut self, id: MutationId) -> Result<QueuedMutation> {
        self.update(|items| {
            let index = position(items, id)?;
            Ok(items.remove(index))
        })
    }

    /// Sets the status of a mutation. `Synced` removes it.
    pub fn update_status(&mut self, id: MutationId, status: MutationStatus) -> Result<()> {
        if status == MutationStatus::Synced {
            return self.remove(id).map(|_| ());
        }

        self.update(|items| {
            let index = position(items, id)?;
            items[index].status = status;
            Ok(())
        })
    }

    /// Replaces the credential snapshot of a mutation. The payload is untouched.
    pub fn update_credential_snapshot(
        &mut self,
        id: MutationId,
        credential: Credential,
    ) -> Result<()> {
        self.update(|items| {
            let index = position(items, id)?;
            items[index].credential_snapshot = credential;
            Ok(())
        })
    }

    /// Applies `change` to the on-disk set under the file lock.
    ///
    /// The in-memory set is refreshed even when `change` fails, and only
    /// replaced by the changed set once it is persisted.
    fn update<T>(
        &mut self,
        change: impl FnOnce(&mut Vec<QueuedMutation>) -> Result<T>,
    ) -> Result<T> {
        let _lock = acquire_lock(&sibling(&self.path, ".lock"))?;
        self.items = load_or_quarantine(&self.path)?;

        let mut next = self.items.clone();
        let out = change(&mut next)?;
        jsonl::write_all(&self.path, &next).map_err(|e| Error::from_write(e, self.capacity))?;
        self.items = next;
        Ok(out)
    }
}

fn position(items: &[QueuedMutation], id: MutationId) -> Result<usize> {
    items
        .iter()
        .position(|m| m.id == id)
        .ok_or(Error::MutationNotFound(id))
}

/// `<file><suffix>` next to the queue file.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    Ok(file)
}

/// Blocks until the exclusive lock on `lock_path` is held.
fn acquire_lock(lock_path: &Path) -> Result<File> {
    let file = open_lock_file(lock_path)?;
    file.lock_exclusive()?;
    Ok(file)
}

/// Loads the queue, treating unparseable content as empty.
fn load_or_quarantine(path: &Path) -> Result<Vec<QueuedMutation>> {
    match jsonl::read_all(path) {
        Ok(items) => Ok(items),
        Err(Error::Json(e)) => {
            let quarantine = quarantine_path(path);
            tracing::warn!(
                path = %path.display(),
                quarantine = %quarantine.display(),
                error = %e,
                "offline queue is unreadable, starting with an empty queue"
            );
            if let Err(e) = fs::rename(path, &quarantine) {
                tracing::warn!(error = %e, "failed to quarantine unreadable queue");
            }
            Ok(Vec::new())
        }
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!(path = %path.display(), error = %e, "offline queue is not valid UTF-8, starting empty");
            if let Err(e) = fs::rename(path, quarantine_path(path)) {
                tracing::warn!(error = %e, "failed to quarantine unreadable queue");
            }
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    sibling(path, &format!(".corrupt-{}", Utc::now().timestamp()))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
