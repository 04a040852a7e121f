//! Add-host form validation
//!
//! The landing surface accepts loose input (`team`, `chat.example.com`,
//! `localhost:3000`, full urls) and probes candidates until one answers or
//! the input is clearly wrong.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use super::migration_service::strip_trailing_slash;
use super::ServerRegistry;
use crate::config::ShellConfig;
use crate::error::{CoreResult, ValidationFailure};
use crate::types::AddHostOutcome;

/// Input that should not be expanded to a subdomain: has a scheme, has a
/// dot, or is `localhost[:port]` with optional credentials.
static QUALIFIED_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(^https?://)|(\.)|(^([^:]+:[^@]+@)?localhost(:\d+)?$)")
        .expect("valid qualified host regex")
});

const INFO_SUFFIX: &str = "/api/info";

/// Result of validating the form's current input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidation {
    /// Nothing typed; submitting uses the default instance
    Empty,
    /// `url` answered the probe (possibly after expansion)
    Valid { url: String },
    Invalid {
        url: String,
        failure: ValidationFailure,
    },
    /// The input changed while this validation was in flight
    Stale,
}

/// Result of submitting the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Added(String),
    Existing(String),
    Rejected(FormValidation),
}

pub struct AddHostForm {
    registry: Arc<ServerRegistry>,
    config: Arc<ShellConfig>,
    generation: AtomicU64,
}

impl AddHostForm {
    pub fn new(registry: Arc<ServerRegistry>, config: Arc<ShellConfig>) -> Self {
        Self {
            registry,
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Mark any in-flight validation as stale (input edited).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Validate `input`, expanding bare names on failure.
    pub async fn validate(&self, input: &str) -> FormValidation {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let timeout = Duration::from_millis(self.config.form_validation_timeout_ms);

        let mut host = strip_trailing_slash(input.trim()).to_string();
        if host.is_empty() {
            return FormValidation::Empty;
        }

        loop {
            let result = self.registry.validate_host(&host, Some(timeout)).await;
            if self.generation.load(Ordering::SeqCst) != ticket {
                log::debug!("[Form] Discarding stale validation of {host}");
                return FormValidation::Stale;
            }

            let failure = match result {
                Ok(()) => return FormValidation::Valid { url: host },
                Err(failure) => failure,
            };

            if has_http_scheme(&host) || failure == ValidationFailure::BasicAuth {
                return FormValidation::Invalid { url: host, failure };
            }

            host = if QUALIFIED_HOST_RE.is_match(&host) {
                format!("https://{host}")
            } else {
                format!("https://{host}.{}", self.config.subdomain_suffix)
            };
            log::debug!("[Form] Retrying as {host}");
        }
    }

    /// Validate, then add and activate the host.
    ///
    /// Empty input submits the configured default instance.
    pub async fn submit(&self, input: &str) -> CoreResult<FormSubmission> {
        let url = match self.validate(input).await {
            FormValidation::Empty => self.config.default_instance.clone(),
            FormValidation::Valid { url } => url,
            rejected => return Ok(FormSubmission::Rejected(rejected)),
        };

        match self.registry.add_host(&url).await? {
            AddHostOutcome::Added(url) => {
                self.registry.set_active(&url).await;
                Ok(FormSubmission::Added(url))
            }
            AddHostOutcome::Existing(url) => Ok(FormSubmission::Existing(url)),
        }
    }

    /// Re-run validation for the url whose certificate was just trusted.
    pub async fn revalidate_after_certificate(&self, url: &str) -> FormValidation {
        let host = url.strip_suffix(INFO_SUFFIX).unwrap_or(url);
        self.validate(host).await
    }
}

fn has_http_scheme(host: &str) -> bool {
    (host.starts_with("http://") && host.len() > "http://".len())
        || (host.starts_with("https://") && host.len() > "https://".len())
}
