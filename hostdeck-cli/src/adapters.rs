//! Headless adapters
//!
//! There is no window here: surfaces and menus only log what a desktop
//! frontend would render, and dialogs read answers from the terminal.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use hostdeck_core::traits::{
    ContentSurface, ContentSurfaceFactory, Dialogs, ScreenSharePicker, SurfaceSpec, WindowMenu,
};
use hostdeck_core::types::TrustPromptRequest;
use serde_json::Value;

// ===== Surfaces =====

struct HeadlessSurface {
    host_url: String,
}

impl ContentSurface for HeadlessSurface {
    fn load_url(&self, url: &str) {
        tracing::debug!("[{}] load {url}", self.host_url);
    }

    fn reload(&self) {
        tracing::debug!("[{}] reload", self.host_url);
    }

    fn set_active(&self, active: bool) {
        tracing::debug!("[{}] active={active}", self.host_url);
    }

    fn focus(&self) {}

    fn go_back(&self) {
        tracing::debug!("[{}] back", self.host_url);
    }

    fn go_forward(&self) {
        tracing::debug!("[{}] forward", self.host_url);
    }

    fn send(&self, channel: &str, payload: &Value) {
        tracing::debug!("[{}] -> {channel} {payload}", self.host_url);
    }

    fn apply_sidebar_layout(&self, _sidebar_visible: bool) {}

    fn destroy(&self) {
        tracing::debug!("[{}] destroyed", self.host_url);
    }
}

pub struct HeadlessSurfaceFactory;

impl ContentSurfaceFactory for HeadlessSurfaceFactory {
    fn create(&self, spec: &SurfaceSpec) -> Box<dyn ContentSurface> {
        tracing::debug!(
            "Creating surface for {} at {} (isolated={})",
            spec.host_url,
            spec.initial_url,
            spec.isolated
        );
        Box::new(HeadlessSurface {
            host_url: spec.host_url.clone(),
        })
    }

    fn set_landing_visible(&self, visible: bool) {
        tracing::debug!("Landing visible={visible}");
    }
}

// ===== Dialogs =====

/// Asks y/N questions on stderr/stdin; `assume_yes` answers every
/// question with yes.
pub struct TerminalDialogs {
    assume_yes: bool,
}

impl TerminalDialogs {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    async fn ask(&self, question: String) -> bool {
        if self.assume_yes {
            return true;
        }
        let answer = tokio::task::spawn_blocking(move || {
            eprint!("{question} [y/N] ");
            let _ = std::io::stderr().flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => matches!(line.trim(), "y" | "Y" | "yes"),
            Ok(Err(e)) => {
                tracing::warn!("Failed to read answer: {e}");
                false
            }
            Err(e) => {
                tracing::warn!("Prompt task failed: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn confirm_certificate(&self, request: &TrustPromptRequest) -> bool {
        let mut question = format!(
            "Certificate error for {} ({}), issued by {}.",
            request.host, request.error, request.issuer_name
        );
        if request.different_certificate {
            question.push_str(" This differs from the certificate trusted before!");
        }
        question.push_str(" Trust it?");
        self.ask(question).await
    }

    async fn confirm_add_host(&self, url: &str) -> bool {
        self.ask(format!("Add server {url}?")).await
    }

    async fn report_invalid_host(&self, url: &str) {
        eprintln!("{url} is not a valid server");
    }
}

// ===== Menu / screen share =====

pub struct LoggingWindowMenu;

impl WindowMenu for LoggingWindowMenu {
    fn add_server_item(&self, url: &str, title: &str, position: usize) {
        tracing::debug!("Menu item {position}: {title} ({url})");
    }

    fn remove_server_item(&self, url: &str) {
        tracing::debug!("Menu item removed: {url}");
    }
}

pub struct LoggingScreenShare;

impl ScreenSharePicker for LoggingScreenShare {
    fn request_sources(&self, host_url: &str) {
        tracing::info!("{host_url} requested a screen source; not available headless");
    }
}
