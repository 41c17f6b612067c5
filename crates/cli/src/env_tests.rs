// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::EVQ_STATE_DIR, "EVQ_STATE_DIR");
    assert_eq!(vars::EVQ_TOKEN, "EVQ_TOKEN");
    assert_eq!(vars::XDG_STATE_HOME, "XDG_STATE_HOME");
}

#[test]
fn test_token_trimmed_and_blank_ignored() {
    std::env::set_var("EVQ_TOKEN", "  a.b.c \n");
    assert_eq!(token().as_deref(), Some("a.b.c"));

    std::env::set_var("EVQ_TOKEN", "   ");
    assert!(token().is_none());

    std::env::remove_var("EVQ_TOKEN");
    assert!(token().is_none());
}
