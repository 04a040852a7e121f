//! 证书信任存储
//!
//! 按主机保存用户信任过的证书指纹；同一证书的并发错误只弹一次对话框，
//! 所有等待者得到同一个决定。

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chrono::Utc;
use tokio::sync::{oneshot, Mutex};

use crate::traits::{Dialogs, PersistentStore};
use crate::types::{
    CertificateError, ContentOrigin, Fingerprint, TrustDecision, TrustOutcome,
    TrustPromptRequest, TrustRecord, TrustTable,
};

pub const TRUSTED_CERTIFICATES_KEY: &str = "hostdeck.trustedCertificates";

/// 证书信任存储
pub struct CertificateStore {
    store: Arc<dyn PersistentStore>,
    dialogs: Arc<dyn Dialogs>,
    trusted: Mutex<TrustTable>,
    /// fingerprint -> callers waiting on the open prompt
    pending: Arc<StdMutex<PendingMap>>,
}

type PendingMap = HashMap<Fingerprint, Vec<oneshot::Sender<TrustDecision>>>;

/// 当前弹窗的所有权。
///
/// 正常结束时由 `resolve` 唤醒所有等待者；若弹窗方的 future 被提前丢弃，
/// `Drop` 会移除该条目并以 `Denied` 回复等待者，后续错误可以重新弹窗。
struct PendingPrompt {
    pending: Arc<StdMutex<PendingMap>>,
    fingerprint: Fingerprint,
    resolved: bool,
}

impl PendingPrompt {
    fn resolve(mut self, decision: TrustDecision) {
        self.resolved = true;
        self.notify(decision);
    }

    fn notify(&self, decision: TrustDecision) {
        let waiters = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.fingerprint)
            .unwrap_or_default();
        for waiter in waiters {
            // A dropped waiter has nobody left to answer.
            let _ = waiter.send(decision);
        }
    }
}

impl Drop for PendingPrompt {
    fn drop(&mut self) {
        if !self.resolved {
            log::warn!("Certificate prompt abandoned, denying queued callers");
            self.notify(TrustDecision::Denied);
        }
    }
}

impl CertificateStore {
    pub fn new(store: Arc<dyn PersistentStore>, dialogs: Arc<dyn Dialogs>) -> Self {
        Self {
            store,
            dialogs,
            trusted: Mutex::new(TrustTable::new()),
            pending: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// 加载已信任的证书（损坏的数据按空表处理）
    pub async fn load(&self) {
        let table = match self.store.get(TRUSTED_CERTIFICATES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("证书信任表已损坏，重置为空: {e}");
                TrustTable::new()
            }),
            Ok(None) => TrustTable::new(),
            Err(e) => {
                log::error!("Failed to read {TRUSTED_CERTIFICATES_KEY}: {e}");
                TrustTable::new()
            }
        };
        log::debug!("Loaded {} trusted certificate(s)", table.len());
        *self.trusted.lock().await = table;
    }

    /// Decide whether to accept a certificate that failed verification.
    ///
    /// Trusted pairs are accepted without a prompt. A prompt already open
    /// for the same fingerprint is joined instead of opening another one.
    pub async fn handle_certificate_error(&self, error: &CertificateError) -> TrustOutcome {
        let Some(host) = host_of(&error.url) else {
            log::warn!("Certificate error for unparsable url {}, denying", error.url);
            return TrustOutcome::denied();
        };
        let fingerprint = error.certificate.fingerprint();

        let previous = self
            .trusted
            .lock()
            .await
            .get(&host)
            .map(|record| record.fingerprint.clone());
        if previous.as_ref() == Some(&fingerprint) {
            return TrustOutcome {
                decision: TrustDecision::Trusted,
                retry_url: None,
            };
        }

        let joined = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(waiters) = pending.get_mut(&fingerprint) {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Some(rx)
            } else {
                pending.insert(fingerprint.clone(), Vec::new());
                None
            }
        };
        if let Some(rx) = joined {
            log::debug!("Joining open certificate prompt for {host}");
            let decision = rx.await.unwrap_or(TrustDecision::Denied);
            return TrustOutcome {
                decision,
                retry_url: None,
            };
        }
        let prompt = PendingPrompt {
            pending: self.pending.clone(),
            fingerprint: fingerprint.clone(),
            resolved: false,
        };

        let request = TrustPromptRequest {
            url: error.url.clone(),
            host: host.clone(),
            issuer_name: error.certificate.issuer_name.clone(),
            error: error.error.clone(),
            different_certificate: previous.is_some(),
        };
        let decision = if self.dialogs.confirm_certificate(&request).await {
            TrustDecision::Trusted
        } else {
            TrustDecision::Denied
        };

        if decision.is_trusted() {
            self.trust(&host, fingerprint).await;
        } else {
            log::info!("Certificate for {host} was not trusted");
        }
        prompt.resolve(decision);

        let retry_url = (decision.is_trusted() && error.origin == ContentOrigin::LocalPage)
            .then(|| error.url.clone());
        TrustOutcome {
            decision,
            retry_url,
        }
    }

    /// Forget every trust decision.
    pub async fn clear(&self) {
        self.trusted.lock().await.clear();
        self.persist().await;
        log::info!("Cleared all trusted certificates");
    }

    pub async fn is_trusted(&self, url: &str, fingerprint: &Fingerprint) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        self.trusted
            .lock()
            .await
            .get(&host)
            .is_some_and(|record| &record.fingerprint == fingerprint)
    }

    /// Whether any certificate is trusted for `url`'s host.
    pub async fn is_existing(&self, url: &str) -> bool {
        match host_of(url) {
            Some(host) => self.trusted.lock().await.contains_key(&host),
            None => false,
        }
    }

    pub async fn trusted_hosts(&self) -> Vec<String> {
        self.trusted.lock().await.keys().cloned().collect()
    }

    async fn trust(&self, host: &str, fingerprint: Fingerprint) {
        self.trusted.lock().await.insert(
            host.to_string(),
            TrustRecord {
                fingerprint,
                trusted_at: Utc::now(),
            },
        );
        self.persist().await;
        log::info!("Trusted certificate for {host}");
    }

    async fn persist(&self) {
        let json = {
            let trusted = self.trusted.lock().await;
            serde_json::to_string(&*trusted)
        };
        match json {
            Ok(json) => {
                if let Err(e) = self.store.set(TRUSTED_CERTIFICATES_KEY, &json).await {
                    log::error!("Failed to persist {TRUSTED_CERTIFICATES_KEY}: {e}");
                }
            }
            Err(e) => log::error!("Failed to serialize trusted certificates: {e}"),
        }
    }
}

/// Host part of a url, without scheme, port or path.
fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
