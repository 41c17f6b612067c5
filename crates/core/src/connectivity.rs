// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking driven by the host's reachability signal.
//!
//! The monitor never probes the network. It records the latest push signal
//! and reports edges, so callers can react to `offline -> online` exactly once
//! per transition.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jsonl;

/// Process-wide reachability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    pub online: bool,
    pub last_transition_at: DateTime<Utc>,
}

impl ConnectivityState {
    /// Offline, as of now. The first reachable signal is then an edge.
    pub fn initial() -> Self {
        ConnectivityState {
            online: false,
            last_transition_at: Utc::now(),
        }
    }
}

/// Edge reported when the reachability signal changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

/// Tracks [`ConnectivityState`] from the host signal.
pub struct ConnectivityMonitor {
    /// Mirrors `state.online` for lock-free reads.
    online: AtomicBool,
    state: Mutex<ConnectivityState>,
    /// Where the state is persisted, if anywhere.
    path: Option<PathBuf>,
}

impl ConnectivityMonitor {
    /// Monitor that keeps state in memory only.
    pub fn in_memory() -> Self {
        Self::with_state(ConnectivityState::initial(), None)
    }

    /// Loads persisted state from `path`; unreadable content loads as initial.
    pub fn open(path: &Path) -> Self {
        let state = match jsonl::read_record::<ConnectivityState>(path) {
            Ok(Some(state)) => state,
            Ok(None) => ConnectivityState::initial(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "connectivity state unreadable, assuming offline");
                ConnectivityState::initial()
            }
        };
        Self::with_state(state, Some(path.to_path_buf()))
    }

    fn with_state(state: ConnectivityState, path: Option<PathBuf>) -> Self {
        ConnectivityMonitor {
            online: AtomicBool::new(state.online),
            state: Mutex::new(state),
            path,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ConnectivityState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a reachability signal, stamped now.
    pub fn observe(&self, online: bool) -> Option<Transition> {
        self.observe_at(online, Utc::now())
    }

    /// Records a reachability signal; returns the edge if the state changed.
    pub fn observe_at(&self, online: bool, at: DateTime<Utc>) -> Option<Transition> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.online == online {
            return None;
        }

        state.online = online;
        state.last_transition_at = at;
        self.online.store(online, Ordering::Release);

        if let Some(path) = &self.path {
            if let Err(e) = jsonl::write_record(path, &*state) {
                tracing::warn!(path = %path.display(), error = %e, "failed to persist connectivity state");
            }
        }

        let transition = if online {
            Transition::CameOnline
        } else {
            Transition::WentOffline
        };
        tracing::info!(?transition, "connectivity changed");
        Some(transition)
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
