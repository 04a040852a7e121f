//! 服务器探测 Trait

use async_trait::async_trait;

/// Raw result of `GET <host>/api/info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx response
    Success,
    /// Non-2xx response
    Status {
        code: u16,
        www_authenticate: Option<String>,
    },
    /// Request never produced a response
    Failed(String),
}

/// Performs the host metadata request; timing is handled by the caller.
#[async_trait]
pub trait HostProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}
