//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Why a host failed the `/api/info` probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationFailure {
    /// HTTP 401 with a `WWW-Authenticate: Basic` challenge
    BasicAuth,
    /// Any other failure (network error, non-2xx status, bad url)
    Invalid,
    /// No response within the configured interval
    Timeout,
}

impl ValidationFailure {
    /// Wire name used by the add-host form (`basic-auth`, `invalid`, `timeout`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasicAuth => "basic-auth",
            Self::Invalid => "invalid",
            Self::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Host not registered
    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// Url could not be parsed or normalized
    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    /// Input validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Host probe failed (surfaced inline in the add-host form)
    #[error("Host validation failed: {0}")]
    HostValidation(ValidationFailure),

    /// Persisted data could not be decoded
    #[error("Corrupted persisted data under {key}: {message}")]
    ConfigCorruption { key: String, message: String },

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// User declined a certificate
    #[error("Certificate for {0} was not trusted")]
    CertificateTrustDenied(String),

    /// A required adapter was not provided to the builder
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::HostNotFound(_)
            | Self::InvalidUrl(_)
            | Self::ValidationError(_)
            | Self::HostValidation(_)
            | Self::ConfigCorruption { .. }
            | Self::CertificateTrustDenied(_) => true,
            Self::StorageError(_)
            | Self::SerializationError(_)
            | Self::NetworkError(_)
            | Self::MissingCollaborator(_) => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_wire_names() {
        assert_eq!(ValidationFailure::BasicAuth.to_string(), "basic-auth");
        assert_eq!(ValidationFailure::Invalid.as_str(), "invalid");
        let json = serde_json::to_string(&ValidationFailure::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
    }

    #[test]
    fn error_serializes_with_code_tag() {
        let err = CoreError::HostValidation(ValidationFailure::BasicAuth);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "HostValidation");
        assert_eq!(json["details"], "basic-auth");
    }

    #[test]
    fn expected_classification() {
        assert!(CoreError::HostNotFound("x".into()).is_expected());
        assert!(!CoreError::StorageError("disk".into()).is_expected());
    }
}
