// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API abstraction for delivering queued mutations.
//!
//! Provides a trait-based seam that enables:
//! - Real HTTP delivery for production
//! - Mock remotes for unit testing
//!
//! Responses are classified into success, retryable failures (transport
//! errors, 5xx) and non-retryable rejections (401/403, other 4xx).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use evq_core::{Credential, HttpMethod, MutationPayload, QueuedMutation};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};

/// Header carrying the mutation id so the server can drop replays it already applied.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Why a delivery attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The request never got a response (connect failure, timeout, reset).
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The server failed in a way that may go away on its own.
    #[error("server error (HTTP {status})")]
    ServerTransient { status: u16 },

    /// The server refused the credential.
    #[error("credential rejected (HTTP {status})\n  hint: please sign in again")]
    CredentialRejected { status: u16 },

    /// The server refused the payload itself.
    #[error("rejected by server (HTTP {status}): {reason}")]
    PayloadRejected { status: u16, reason: String },
}

impl DeliveryError {
    /// Retryable failures stay queued and are never shown to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeliveryError::NetworkUnavailable(_) | DeliveryError::ServerTransient { .. }
        )
    }
}

/// Result type for delivery attempts.
pub type DeliveryResult = std::result::Result<(), DeliveryError>;

/// Classifies an HTTP response status and body.
pub fn classify_response(status: u16, body: &str) -> DeliveryResult {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(DeliveryError::CredentialRejected { status }),
        400..=499 => Err(DeliveryError::PayloadRejected {
            status,
            reason: rejection_reason(status, body),
        }),
        _ => Err(DeliveryError::ServerTransient { status }),
    }
}

/// Longest server-provided reason kept for display.
const MAX_REASON_LEN: usize = 200;

/// Extracts a human-readable reason from an error response body.
///
/// Looks for an `error`, `message` or `detail` string in a JSON object, then
/// falls back to the raw body text, then to the HTTP reason phrase.
pub fn rejection_reason(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(serde_json::Value::String(reason)) = map.get(key) {
                if !reason.trim().is_empty() {
                    return truncate(reason.trim());
                }
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() {
        return truncate(text);
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request rejected")
        .to_string()
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_REASON_LEN {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(MAX_REASON_LEN).collect();
        out.push('…');
        out
    }
}

/// Remote API that queued mutations are replayed against.
pub trait RemoteApi: Send + Sync {
    /// Delivers one mutation using `credential` as the bearer token.
    fn deliver<'a>(
        &'a self,
        mutation: &'a QueuedMutation,
        credential: &'a Credential,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult> + Send + 'a>>;
}

/// HTTP implementation using reqwest.
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    evaluation_endpoint: String,
}

impl HttpRemote {
    /// Create a remote from configuration.
    ///
    /// The transport timeout is the only timeout applied to a delivery; when
    /// it fires the attempt counts as a network failure.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::from)?;

        Ok(HttpRemote {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            evaluation_endpoint: config.evaluation_endpoint.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn request(&self, mutation: &QueuedMutation) -> reqwest::RequestBuilder {
        match &mutation.payload {
            MutationPayload::EvaluationSubmission(evaluation) => self
                .client
                .post(self.url(&self.evaluation_endpoint))
                .json(evaluation),
            MutationPayload::GenericUpdate {
                method,
                endpoint,
                body,
            } => {
                let builder = self.client.request(to_reqwest(*method), self.url(endpoint));
                if body.is_null() {
                    builder
                } else {
                    builder.json(body)
                }
            }
        }
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

impl RemoteApi for HttpRemote {
    fn deliver<'a>(
        &'a self,
        mutation: &'a QueuedMutation,
        credential: &'a Credential,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .request(mutation)
                .bearer_auth(credential.expose())
                .header(IDEMPOTENCY_HEADER, mutation.id.to_string())
                .send()
                .await
                .map_err(|e| DeliveryError::NetworkUnavailable(e.to_string()))?;

            let status = response.status().as_u16();
            if response.status().is_success() {
                return Ok(());
            }

            // A body that cannot be read only costs us the reason text.
            let body = response.text().await.unwrap_or_default();
            classify_response(status, &body)
        })
    }
}
