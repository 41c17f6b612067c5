// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub const TOKEN: &str = "aaa.bbb.ccc";

/// `evq` with its state in `temp`, signed in, pointed at a closed port.
pub fn evq(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("evq");
    cmd.arg("--state-dir")
        .arg(temp.path())
        .env("EVQ_TOKEN", TOKEN)
        .env_remove("EVQ_STATE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Temp state dir whose config points at an address nothing listens on.
pub fn unreachable_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[remote]\nbase_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n",
    )
    .unwrap();
    temp
}

/// Queue an evaluation offline and return its id.
pub fn queue_evaluation(temp: &TempDir, salesperson: &str) -> String {
    let output = evq(temp)
        .args(["submit", "evaluation", "--offline", "--salesperson", salesperson])
        .args(["--score", "closing=4"])
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .nth(1)
        .unwrap()
        .to_string()
}
