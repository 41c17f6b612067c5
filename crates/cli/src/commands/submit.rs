// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use evq_core::{EvaluationPayload, HttpMethod, MutationPayload};

use crate::error::{Error, Result};
use crate::sync::SubmitOutcome;

use super::Workspace;

const MIN_SCORE: u8 = 1;
const MAX_SCORE: u8 = 5;

/// Parses `criterion=N` with N in 1..=5.
pub fn parse_score(s: &str) -> Result<(String, u8)> {
    let invalid = || Error::InvalidScore(s.to_string());
    let (criterion, value) = s.split_once('=').ok_or_else(invalid)?;
    let criterion = criterion.trim();
    if criterion.is_empty() {
        return Err(invalid());
    }
    let value: u8 = value.trim().parse().map_err(|_| invalid())?;
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(invalid());
    }
    Ok((criterion.to_string(), value))
}

/// Builds an evaluation payload. A repeated criterion keeps the last score.
pub fn evaluation_payload(
    salesperson: String,
    team: Option<String>,
    period: Option<String>,
    scores: &[String],
    notes: Option<String>,
) -> Result<MutationPayload> {
    let scores = scores
        .iter()
        .map(|s| parse_score(s))
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(MutationPayload::EvaluationSubmission(EvaluationPayload {
        salesperson_id: salesperson.trim().to_string(),
        team_id: team,
        period,
        scores,
        notes,
    }))
}

/// Builds a generic update payload. The body must be JSON if given.
pub fn update_payload(method: &str, endpoint: &str, body: Option<&str>) -> Result<MutationPayload> {
    let method: HttpMethod = method.parse()?;
    let endpoint = endpoint.trim();
    if !endpoint.starts_with('/') {
        return Err(Error::InvalidEndpoint(endpoint.to_string()));
    }
    let body = match body {
        Some(text) => {
            serde_json::from_str(text).map_err(|e| Error::InvalidBody(e.to_string()))?
        }
        None => serde_json::Value::Null,
    };

    Ok(MutationPayload::GenericUpdate {
        method,
        endpoint: endpoint.to_string(),
        body,
    })
}

/// Runs a submission. The invocation reports reachability unless `offline`.
pub async fn run(workspace: &Workspace, payload: MutationPayload, offline: bool) -> Result<()> {
    let ctx = workspace.context()?;
    ctx.observe_connectivity(!offline);

    match ctx.submit(payload).await? {
        SubmitOutcome::Delivered(id) => println!("Delivered {}", id),
        SubmitOutcome::Queued(id) => {
            println!("Queued {} (will be sent when back online)", id)
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
