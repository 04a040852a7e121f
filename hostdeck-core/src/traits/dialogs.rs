//! User prompts

use async_trait::async_trait;

use crate::types::TrustPromptRequest;

/// Blocking prompts shown by the shell
#[async_trait]
pub trait Dialogs: Send + Sync {
    /// Ask whether to trust a certificate. `true` means trust.
    async fn confirm_certificate(&self, request: &TrustPromptRequest) -> bool;

    /// Ask whether a deep-linked host should be added
    async fn confirm_add_host(&self, url: &str) -> bool;

    /// Tell the user a deep-linked host failed validation
    async fn report_invalid_host(&self, url: &str);
}
