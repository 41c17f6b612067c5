// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod drain;
pub mod queue;
pub mod submit;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use evq_core::{ConnectivityMonitor, CredentialGuard, MutationStore};

use crate::config::{resolve_state_dir, Config, StatePaths};
use crate::error::Result;
use crate::session::TokenSource;
use crate::sync::{ConsoleNotifier, HttpRemote, SyncContext};

/// Resolved state directory plus loaded configuration.
pub struct Workspace {
    pub paths: StatePaths,
    pub config: Config,
}

impl Workspace {
    /// Resolves the state directory and loads the config file.
    pub fn open(state_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let paths = StatePaths::new(resolve_state_dir(state_dir)?);
        let config_path: PathBuf = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| paths.config());
        let config = Config::load(&config_path)?;
        Ok(Workspace { paths, config })
    }

    /// Builds the sync context over the state files.
    ///
    /// Notices go to the terminal; replay is left to the caller.
    pub fn context(&self) -> Result<SyncContext> {
        let store = MutationStore::open(&self.paths.queue())?
            .with_capacity(self.config.queue.max_items);
        let connectivity = Arc::new(ConnectivityMonitor::open(&self.paths.connectivity()));
        let guard = CredentialGuard::new(Arc::new(TokenSource::new(
            self.config.session.token_file.clone(),
        )));
        let remote = HttpRemote::new(&self.config.remote)?;

        Ok(SyncContext::new(store, connectivity, guard, remote)
            .with_notifier(Arc::new(ConsoleNotifier)))
    }
}
