// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn submit_without_session_fails() {
    let temp = unreachable_temp();

    evq(&temp)
        .env_remove("EVQ_TOKEN")
        .args(["submit", "evaluation", "--offline", "--salesperson", "sp-1"])
        .args(["--score", "closing=4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));

    assert!(!temp.path().join("queue.jsonl").exists());
}

#[test]
fn submit_with_malformed_session_fails() {
    let temp = unreachable_temp();

    evq(&temp)
        .env("EVQ_TOKEN", "garbage")
        .args(["submit", "evaluation", "--offline", "--salesperson", "sp-1"])
        .args(["--score", "closing=4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn submit_rejects_out_of_range_score() {
    let temp = unreachable_temp();

    evq(&temp)
        .args(["submit", "evaluation", "--salesperson", "sp-1"])
        .args(["--score", "closing=9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 5"));
}

#[test]
fn online_submit_to_unreachable_server_is_queued() {
    let temp = unreachable_temp();

    evq(&temp)
        .args(["submit", "evaluation", "--salesperson", "sp-1"])
        .args(["--score", "closing=4"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queued "));

    evq(&temp)
        .arg("status")
        .assert()
        .stdout(predicate::str::contains("pending:  1"))
        .stdout(predicate::str::contains("network:  online"));
}

#[test]
fn offline_drain_attempts_nothing() {
    let temp = unreachable_temp();
    queue_evaluation(&temp, "sp-1");

    evq(&temp)
        .args(["drain", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 delivered (stopped: offline)"));
}

#[test]
fn drain_against_unreachable_server_keeps_items() {
    let temp = unreachable_temp();
    queue_evaluation(&temp, "sp-1");

    evq(&temp)
        .arg("drain")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 will be retried"));

    evq(&temp)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn drain_of_empty_queue() {
    let temp = unreachable_temp();

    evq(&temp)
        .arg("drain")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to sync"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[remote]\nbase_url = \"ftp://example.com\"\n",
    )
    .unwrap();

    evq(&temp)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid base_url"));
}

#[test]
fn watch_exits_when_stdin_closes() {
    let temp = unreachable_temp();

    evq(&temp)
        .arg("watch")
        .write_stdin("offline\nbogus\n")
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown signal 'bogus'"));
}

#[test]
fn log_file_is_written_to_state_dir() {
    let temp = unreachable_temp();
    queue_evaluation(&temp, "sp-1");

    assert!(temp.path().join("evq.log").exists());
}
