// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_signed_in = { Error::NotSignedIn, "EVQ_TOKEN" },
    malformed = { Error::MalformedCredential, "sign in again" },
    bad_score = { Error::InvalidScore("closing=9".into()), "between 1 and 5" },
    no_state_dir = { Error::NoStateDir, "--state-dir" },
    config = { Error::Config("bad url".into()), "bad url" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn core_errors_pass_through() {
    let err: Error = evq_core::Error::StorageFull { capacity: 5 }.into();
    assert!(err.to_string().contains("storage is full"));
}

#[test]
fn payload_rejection_shows_server_reason() {
    let err: Error = DeliveryError::PayloadRejected {
        status: 422,
        reason: "score out of range".into(),
    }
    .into();
    assert!(err.to_string().contains("score out of range"));
}

#[test]
fn not_retryable_names_status() {
    let id = MutationId::generate();
    let err = Error::NotRetryable {
        id,
        status: MutationStatus::Pending,
    };
    let msg = err.to_string();
    assert!(msg.contains(&id.to_string()));
    assert!(msg.contains("pending"));
}
