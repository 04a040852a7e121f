//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};

use crate::config::ShellConfig;
use crate::error::{CoreError, CoreResult};
use crate::services::{ServerRegistry, ServiceContext, Shell};
use crate::traits::{
    ContentSurface, ContentSurfaceFactory, Dialogs, HostProbe, PersistentStore, ProbeOutcome,
    ScreenSharePicker, SurfaceSpec, WindowMenu,
};
use crate::types::{RegistryEvent, TrustPromptRequest};

// ===== MockStore =====

pub struct MockStore {
    values: RwLock<HashMap<String, String>>,
    /// 如果 Some，写操作返回此错误（用于测试持久化失败路径）
    write_error: RwLock<Option<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            write_error: RwLock::new(None),
        }
    }

    pub async fn seed(&self, key: &str, value: &str) {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    pub async fn set_write_error(&self, err: Option<String>) {
        *self.write_error.write().await = err;
    }
}

#[async_trait]
impl PersistentStore for MockStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        if let Some(ref msg) = *self.write_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        self.seed(key, value).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        if let Some(ref msg) = *self.write_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        self.values.write().await.remove(key);
        Ok(())
    }
}

// ===== MockSurfaceFactory =====

/// One call made on a mock surface, tagged with its host url
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Load(String, String),
    Reload(String),
    SetActive(String, bool),
    Focus(String),
    Back(String),
    Forward(String),
    Send(String, String, Value),
    Layout(String, bool),
    Destroy(String),
}

struct MockSurface {
    url: String,
    log: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl MockSurface {
    fn record(&self, call: SurfaceCall) {
        self.log.lock().unwrap().push(call);
    }
}

impl ContentSurface for MockSurface {
    fn load_url(&self, url: &str) {
        self.record(SurfaceCall::Load(self.url.clone(), url.to_string()));
    }

    fn reload(&self) {
        self.record(SurfaceCall::Reload(self.url.clone()));
    }

    fn set_active(&self, active: bool) {
        self.record(SurfaceCall::SetActive(self.url.clone(), active));
    }

    fn focus(&self) {
        self.record(SurfaceCall::Focus(self.url.clone()));
    }

    fn go_back(&self) {
        self.record(SurfaceCall::Back(self.url.clone()));
    }

    fn go_forward(&self) {
        self.record(SurfaceCall::Forward(self.url.clone()));
    }

    fn send(&self, channel: &str, payload: &Value) {
        self.record(SurfaceCall::Send(
            self.url.clone(),
            channel.to_string(),
            payload.clone(),
        ));
    }

    fn apply_sidebar_layout(&self, sidebar_visible: bool) {
        self.record(SurfaceCall::Layout(self.url.clone(), sidebar_visible));
    }

    fn destroy(&self) {
        self.record(SurfaceCall::Destroy(self.url.clone()));
    }
}

pub struct MockSurfaceFactory {
    log: Arc<Mutex<Vec<SurfaceCall>>>,
    created: Mutex<Vec<SurfaceSpec>>,
    landing: Mutex<Option<bool>>,
}

impl MockSurfaceFactory {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            created: Mutex::new(Vec::new()),
            landing: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn created(&self) -> Vec<SurfaceSpec> {
        self.created.lock().unwrap().clone()
    }

    /// Last landing visibility requested, if any
    pub fn landing_visible(&self) -> Option<bool> {
        *self.landing.lock().unwrap()
    }
}

impl ContentSurfaceFactory for MockSurfaceFactory {
    fn create(&self, spec: &SurfaceSpec) -> Box<dyn ContentSurface> {
        self.created.lock().unwrap().push(spec.clone());
        Box::new(MockSurface {
            url: spec.host_url.clone(),
            log: self.log.clone(),
        })
    }

    fn set_landing_visible(&self, visible: bool) {
        *self.landing.lock().unwrap() = Some(visible);
    }
}

// ===== MockDialogs =====

pub struct MockDialogs {
    certificate_answer: RwLock<bool>,
    confirm_add: RwLock<bool>,
    /// 模拟用户思考时间，让并发请求有机会排队
    prompt_delay: RwLock<Duration>,
    certificate_prompts: RwLock<Vec<TrustPromptRequest>>,
    add_prompts: RwLock<usize>,
    invalid_reports: RwLock<Vec<String>>,
}

impl MockDialogs {
    pub fn new() -> Self {
        Self {
            certificate_answer: RwLock::new(false),
            confirm_add: RwLock::new(false),
            prompt_delay: RwLock::new(Duration::ZERO),
            certificate_prompts: RwLock::new(Vec::new()),
            add_prompts: RwLock::new(0),
            invalid_reports: RwLock::new(Vec::new()),
        }
    }

    pub async fn set_certificate_answer(&self, trust: bool) {
        *self.certificate_answer.write().await = trust;
    }

    pub async fn set_confirm_add(&self, confirm: bool) {
        *self.confirm_add.write().await = confirm;
    }

    pub async fn set_prompt_delay(&self, delay: Duration) {
        *self.prompt_delay.write().await = delay;
    }

    pub async fn certificate_prompts(&self) -> Vec<TrustPromptRequest> {
        self.certificate_prompts.read().await.clone()
    }

    pub async fn add_prompts(&self) -> usize {
        *self.add_prompts.read().await
    }

    pub async fn invalid_reports(&self) -> Vec<String> {
        self.invalid_reports.read().await.clone()
    }
}

#[async_trait]
impl Dialogs for MockDialogs {
    async fn confirm_certificate(&self, request: &TrustPromptRequest) -> bool {
        self.certificate_prompts.write().await.push(request.clone());
        let delay = *self.prompt_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        *self.certificate_answer.read().await
    }

    async fn confirm_add_host(&self, _url: &str) -> bool {
        *self.add_prompts.write().await += 1;
        *self.confirm_add.read().await
    }

    async fn report_invalid_host(&self, url: &str) {
        self.invalid_reports.write().await.push(url.to_string());
    }
}

// ===== MockWindowMenu =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCall {
    Add(String, String, usize),
    Remove(String),
}

pub struct MockWindowMenu {
    calls: Mutex<Vec<MenuCall>>,
}

impl MockWindowMenu {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MenuCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl WindowMenu for MockWindowMenu {
    fn add_server_item(&self, url: &str, title: &str, position: usize) {
        self.calls.lock().unwrap().push(MenuCall::Add(
            url.to_string(),
            title.to_string(),
            position,
        ));
    }

    fn remove_server_item(&self, url: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(MenuCall::Remove(url.to_string()));
    }
}

// ===== MockProbe =====

#[derive(Clone)]
enum ProbeBehavior {
    Respond(Duration, ProbeOutcome),
    Hang,
}

/// Unknown urls fail as unreachable.
pub struct MockProbe {
    behaviors: RwLock<HashMap<String, ProbeBehavior>>,
    calls: RwLock<Vec<String>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            behaviors: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    pub async fn respond(&self, url: &str, outcome: ProbeOutcome) {
        self.respond_after(url, Duration::ZERO, outcome).await;
    }

    pub async fn respond_after(&self, url: &str, delay: Duration, outcome: ProbeOutcome) {
        self.behaviors
            .write()
            .await
            .insert(url.to_string(), ProbeBehavior::Respond(delay, outcome));
    }

    pub async fn hang(&self, url: &str) {
        self.behaviors
            .write()
            .await
            .insert(url.to_string(), ProbeBehavior::Hang);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl HostProbe for MockProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.calls.write().await.push(url.to_string());
        let behavior = self.behaviors.read().await.get(url).cloned();
        match behavior {
            Some(ProbeBehavior::Respond(delay, outcome)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            Some(ProbeBehavior::Hang) => std::future::pending().await,
            None => ProbeOutcome::Failed("unreachable".to_string()),
        }
    }
}

// ===== MockScreenShare =====

pub struct MockScreenShare {
    requests: Mutex<Vec<String>>,
}

impl MockScreenShare {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ScreenSharePicker for MockScreenShare {
    fn request_sources(&self, host_url: &str) {
        self.requests.lock().unwrap().push(host_url.to_string());
    }
}

// ===== 工厂方法 =====

/// 创建使用 MockStore / MockProbe 的注册表
pub fn create_test_registry() -> (
    ServerRegistry,
    mpsc::UnboundedReceiver<RegistryEvent>,
    Arc<MockStore>,
) {
    create_test_registry_with_probe(Arc::new(MockProbe::new()))
}

pub fn create_test_registry_with_probe(
    probe: Arc<MockProbe>,
) -> (
    ServerRegistry,
    mpsc::UnboundedReceiver<RegistryEvent>,
    Arc<MockStore>,
) {
    let store = Arc::new(MockStore::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let registry = ServerRegistry::new(
        store.clone(),
        probe,
        Arc::new(ShellConfig::default()),
        tx,
    );
    (registry, rx, store)
}

pub fn create_registry_with_store(
    store: Arc<MockStore>,
) -> (ServerRegistry, mpsc::UnboundedReceiver<RegistryEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let registry = ServerRegistry::new(
        store,
        Arc::new(MockProbe::new()),
        Arc::new(ShellConfig::default()),
        tx,
    );
    (registry, rx)
}

pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<RegistryEvent>) -> Vec<RegistryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Shell wired to mocks, with handles to inspect them
pub struct TestShell {
    pub shell: Shell,
    pub store: Arc<MockStore>,
    pub surfaces: Arc<MockSurfaceFactory>,
    pub dialogs: Arc<MockDialogs>,
    pub menu: Arc<MockWindowMenu>,
    pub probe: Arc<MockProbe>,
    pub screen_share: Arc<MockScreenShare>,
}

pub fn create_test_shell() -> TestShell {
    let store = Arc::new(MockStore::new());
    let surfaces = Arc::new(MockSurfaceFactory::new());
    let dialogs = Arc::new(MockDialogs::new());
    let menu = Arc::new(MockWindowMenu::new());
    let probe = Arc::new(MockProbe::new());
    let screen_share = Arc::new(MockScreenShare::new());

    let ctx = ServiceContext::new(
        store.clone(),
        surfaces.clone(),
        dialogs.clone(),
        menu.clone(),
        screen_share.clone(),
        probe.clone(),
        ShellConfig::default(),
    );

    TestShell {
        shell: Shell::new(&ctx),
        store,
        surfaces,
        dialogs,
        menu,
        probe,
        screen_share,
    }
}
