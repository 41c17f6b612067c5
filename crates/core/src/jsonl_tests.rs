// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestRecord {
    id: u32,
    name: String,
}

fn record(id: u32, name: &str) -> TestRecord {
    TestRecord {
        id,
        name: name.into(),
    }
}

#[test]
fn read_all_returns_empty_for_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.jsonl");

    let records: Vec<TestRecord> = read_all(&path).unwrap();
    assert!(records.is_empty());
}

#[test]
fn write_all_then_read_all_preserves_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.jsonl");

    write_all(&path, &[record(2, "b"), record(1, "a"), record(3, "c")]).unwrap();

    let records: Vec<TestRecord> = read_all(&path).unwrap();
    let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
}

#[test]
fn write_all_replaces_existing_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.jsonl");

    write_all(&path, &[record(1, "a"), record(2, "b")]).unwrap();
    write_all(&path, &[record(3, "c")]).unwrap();

    let records: Vec<TestRecord> = read_all(&path).unwrap();
    assert_eq!(records, vec![record(3, "c")]);
}

#[test]
fn write_all_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.jsonl");

    write_all(&path, &[record(1, "a")]).unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["test.jsonl".to_string()]);
}

#[test]
fn read_all_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.jsonl");
    std::fs::write(&path, "{\"id\":1,\"name\":\"a\"}\n\n   \n{\"id\":2,\"name\":\"b\"}\n").unwrap();

    let records: Vec<TestRecord> = read_all(&path).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn read_all_rejects_truncated_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("test.jsonl");
    std::fs::write(&path, "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"na").unwrap();

    let result: Result<Vec<TestRecord>> = read_all(&path);
    assert!(matches!(result, Err(crate::Error::Json(_))));
}

#[test]
fn write_all_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("test.jsonl");

    write_all(&path, &[record(1, "a")]).unwrap();
    assert!(path.exists());
}

#[test]
fn record_roundtrip_and_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let missing: Option<TestRecord> = read_record(&path).unwrap();
    assert!(missing.is_none());

    write_record(&path, &record(7, "state")).unwrap();
    let loaded: Option<TestRecord> = read_record(&path).unwrap();
    assert_eq!(loaded, Some(record(7, "state")));
}
