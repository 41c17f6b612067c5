// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use tempfile::tempdir;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn starts_offline() {
    let monitor = ConnectivityMonitor::in_memory();
    assert!(!monitor.is_online());
    assert!(!monitor.state().online);
}

#[test]
fn reports_edges_only() {
    let monitor = ConnectivityMonitor::in_memory();

    assert_eq!(monitor.observe_at(true, at(1)), Some(Transition::CameOnline));
    assert_eq!(monitor.observe_at(true, at(2)), None);
    assert_eq!(monitor.observe_at(false, at(3)), Some(Transition::WentOffline));
    assert_eq!(monitor.observe_at(false, at(4)), None);
    assert_eq!(monitor.observe_at(true, at(5)), Some(Transition::CameOnline));
}

#[test]
fn repeated_signal_keeps_transition_time() {
    let monitor = ConnectivityMonitor::in_memory();
    monitor.observe_at(true, at(10));
    monitor.observe_at(true, at(20));

    assert_eq!(monitor.state().last_transition_at, at(10));
    assert!(monitor.is_online());
}

#[test]
fn state_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("connectivity.json");

    {
        let monitor = ConnectivityMonitor::open(&path);
        monitor.observe_at(true, at(30));
    }

    let reopened = ConnectivityMonitor::open(&path);
    assert!(reopened.is_online());
    assert_eq!(reopened.state().last_transition_at, at(30));
}

#[test]
fn unreadable_state_loads_offline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("connectivity.json");
    std::fs::write(&path, "{\"online\": tr").unwrap();

    let monitor = ConnectivityMonitor::open(&path);
    assert!(!monitor.is_online());
}
