//! 证书信任类型

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Certificate presented by a host during a failed TLS handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub issuer_name: String,
    /// DER or PEM bytes as delivered by the embedding runtime
    pub data: Vec<u8>,
}

impl Certificate {
    #[must_use]
    pub fn new(issuer_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            issuer_name: issuer_name.into(),
            data: data.into(),
        }
    }

    /// SHA-256 over `issuer_name + "\n" + data`, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.issuer_name.as_bytes());
        hasher.update(b"\n");
        hasher.update(&self.data);
        Fingerprint(hex::encode(hasher.finalize()))
    }
}

/// Stable identity of a certificate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host's trusted fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustRecord {
    pub fingerprint: Fingerprint,
    pub trusted_at: DateTime<Utc>,
}

/// host (without scheme or path) -> trusted fingerprint
pub type TrustTable = BTreeMap<String, TrustRecord>;

/// Where the failing request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentOrigin {
    /// Regular hosted content
    #[default]
    Remote,
    /// A bundled local page (the add-host screen or error page)
    LocalPage,
}

/// TLS failure raised by a content surface
#[derive(Debug, Clone)]
pub struct CertificateError {
    pub url: String,
    pub certificate: Certificate,
    /// Runtime error code, e.g. `net::ERR_CERT_AUTHORITY_INVALID`
    pub error: String,
    pub origin: ContentOrigin,
}

/// What the trust dialog is asked to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPromptRequest {
    pub url: String,
    pub host: String,
    pub issuer_name: String,
    pub error: String,
    /// Set when the host already has a different trusted fingerprint
    pub different_certificate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustDecision {
    Trusted,
    Denied,
}

impl TrustDecision {
    #[must_use]
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::Trusted)
    }
}

/// Answer to a certificate error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustOutcome {
    pub decision: TrustDecision,
    /// Host url to validate again after a local page accepted the certificate
    pub retry_url: Option<String>,
}

impl TrustOutcome {
    #[must_use]
    pub fn denied() -> Self {
        Self {
            decision: TrustDecision::Denied,
            retry_url: None,
        }
    }
}
