//! 服务器校验模块
//!
//! `GET <host>/api/info` 与超时计时器竞争，先完成者决定结果。

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::{CoreError, CoreResult, ValidationFailure};
use crate::traits::{HostProbe, ProbeOutcome};

const INFO_PATH: &str = "/api/info";

/// Probe `url` and classify the result.
///
/// The probe and the timer race; whichever completes first decides, and
/// the loser is dropped, so exactly one outcome is produced. A zero
/// timeout disables the timer.
pub async fn validate_host(
    probe: &dyn HostProbe,
    url: &str,
    timeout: Duration,
) -> Result<(), ValidationFailure> {
    debug!("[Validate] Probing {url} (timeout {timeout:?})");

    let outcome = if timeout.is_zero() {
        probe.probe(url).await
    } else {
        match tokio::time::timeout(timeout, probe.probe(url)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!("[Validate] {url} timed out");
                return Err(ValidationFailure::Timeout);
            }
        }
    };

    let result = classify(&outcome);
    debug!("[Validate] {url} -> {result:?}");
    result
}

/// Map a raw probe outcome to success or a failure kind.
pub fn classify(outcome: &ProbeOutcome) -> Result<(), ValidationFailure> {
    match outcome {
        ProbeOutcome::Success => Ok(()),
        ProbeOutcome::Status {
            code: 401,
            www_authenticate: Some(challenge),
        } if challenge.to_ascii_lowercase().starts_with("basic ") => {
            Err(ValidationFailure::BasicAuth)
        }
        ProbeOutcome::Status { .. } | ProbeOutcome::Failed(_) => Err(ValidationFailure::Invalid),
    }
}

/// `HostProbe` backed by reqwest
pub struct ReqwestHostProbe {
    client: Client,
}

impl ReqwestHostProbe {
    /// Build the probe's HTTP client.
    ///
    /// The client has no timeout of its own; `validate_host` bounds it.
    pub fn new() -> CoreResult<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| {
                CoreError::NetworkError(format!("HTTP client initialization failed: {e}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HostProbe for ReqwestHostProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let endpoint = format!("{url}{INFO_PATH}");
        let response = match self
            .client
            .get(&endpoint)
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            // A 2xx that is not JSON is not a chat server.
            return match response.json::<serde_json::Value>().await {
                Ok(_) => ProbeOutcome::Success,
                Err(e) => ProbeOutcome::Failed(format!("invalid info payload: {e}")),
            };
        }

        let www_authenticate = response
            .headers()
            .get(reqwest::header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        ProbeOutcome::Status {
            code: status.as_u16(),
            www_authenticate,
        }
    }
}
