// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live session credential for the command-line host.
//!
//! The token is re-read on every call so a sign-in that rewrites the token
//! file (or a new `EVQ_TOKEN`) is picked up by a running `evq watch`.

use std::fs;
use std::path::PathBuf;

use evq_core::{Credential, CredentialSource};

use crate::env;

/// Reads the bearer token from `[session] token_file`, else `EVQ_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct TokenSource {
    token_file: Option<PathBuf>,
}

impl TokenSource {
    pub fn new(token_file: Option<PathBuf>) -> Self {
        TokenSource { token_file }
    }

    fn read_token(&self) -> Option<String> {
        match &self.token_file {
            Some(path) => match fs::read_to_string(path) {
                Ok(content) => Some(content.trim().to_string()).filter(|t| !t.is_empty()),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "token file unreadable");
                    None
                }
            },
            None => env::token(),
        }
    }
}

impl CredentialSource for TokenSource {
    fn current_credential(&self) -> Option<Credential> {
        self.read_token().map(Credential::new)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
