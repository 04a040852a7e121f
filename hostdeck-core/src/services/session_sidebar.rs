//! Session sidebar: ordered host list, badges and visibility

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ShellConfig;
use crate::error::{CoreError, CoreResult};
use crate::traits::{PersistentStore, WindowMenu};
use crate::types::{Badge, GlobalBadge, HostsMap, RegistryEvent, SidebarColors, SidebarEntry};

pub const SORT_ORDER_KEY: &str = "hostdeck.sortOrder";
pub const SIDEBAR_CLOSED_KEY: &str = "hostdeck.sidebarClosed";

/// Session sidebar
///
/// Entries are rendered in `sort_order`. The order only grows when hosts
/// are added and is replaced wholesale by a drag-reorder; removing a host
/// leaves it untouched so the remaining hotkeys stay stable.
pub struct SessionSidebar {
    store: Arc<dyn PersistentStore>,
    menu: Arc<dyn WindowMenu>,
    config: Arc<ShellConfig>,
    sort_order: Vec<String>,
    /// Rendered entries, ascending by position
    entries: Vec<SidebarEntry>,
    active: Option<String>,
    hidden: bool,
    colors: SidebarColors,
}

impl SessionSidebar {
    pub fn new(
        store: Arc<dyn PersistentStore>,
        menu: Arc<dyn WindowMenu>,
        config: Arc<ShellConfig>,
    ) -> Self {
        Self {
            store,
            menu,
            config,
            sort_order: Vec::new(),
            entries: Vec::new(),
            active: None,
            hidden: false,
            colors: SidebarColors::default(),
        }
    }

    // ===== Loading =====

    /// Read persisted order and visibility, then render `hosts`.
    ///
    /// Hosts missing from the order are appended after ordered ones.
    pub async fn load(&mut self, hosts: &HostsMap) {
        self.sort_order = match self.store.get(SORT_ORDER_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Sort order is corrupted, resetting: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to read {SORT_ORDER_KEY}: {e}");
                Vec::new()
            }
        };
        self.persist_sort_order().await;

        self.hidden = match self.store.get(SIDEBAR_CLOSED_KEY).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                log::error!("Failed to read {SIDEBAR_CLOSED_KEY}: {e}");
                false
            }
        };

        let rank: HashMap<&str, usize> = self
            .sort_order
            .iter()
            .enumerate()
            .map(|(i, url)| (url.as_str(), i))
            .collect();
        let mut ordered: Vec<_> = hosts.values().collect();
        ordered.sort_by_key(|host| rank.get(host.url.as_str()).copied().unwrap_or(usize::MAX));

        for host in ordered {
            self.add(&host.url, &host.title).await;
        }
    }

    // ===== Registry events =====

    pub async fn handle_event(&mut self, event: &RegistryEvent) {
        match event {
            RegistryEvent::HostAdded(record) => {
                self.add(&record.url, &record.title).await;
            }
            RegistryEvent::HostRemoved(url) => {
                self.remove(url);
            }
            RegistryEvent::ActiveSet(url) => self.set_active(url),
            RegistryEvent::ActiveCleared => self.deactivate_all(),
            RegistryEvent::TitleSet { url, title } => self.set_label(url, title),
            RegistryEvent::Loaded => {}
        }
    }

    // ===== Entries =====

    /// Render an entry for `url`; no-op if already rendered.
    ///
    /// Its position is its index in the sort order, or the order is
    /// extended (and persisted) with it.
    pub async fn add(&mut self, url: &str, title: &str) -> bool {
        if self.entry(url).is_some() {
            return false;
        }

        let position = match self.sort_order.iter().position(|u| u == url) {
            Some(index) => index + 1,
            None => {
                self.sort_order.push(url.to_string());
                self.persist_sort_order().await;
                self.sort_order.len()
            }
        };

        let mut entry = SidebarEntry::new(url, title, position, &self.config.hotkey_prefix);
        entry.active = self.active.as_deref() == Some(url);

        let index = self.entries.partition_point(|e| e.position < position);
        self.entries.insert(index, entry);
        self.menu.add_server_item(url, title, position);
        true
    }

    /// Drop the entry and its menu item. The sort order is kept.
    pub fn remove(&mut self, url: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.url == url) else {
            return false;
        };
        self.entries.remove(index);
        self.menu.remove_server_item(url);
        if self.active.as_deref() == Some(url) {
            self.active = None;
        }
        true
    }

    pub fn set_active(&mut self, url: &str) {
        if self.active.as_deref() == Some(url) {
            return;
        }
        self.deactivate_all();
        if let Some(entry) = self.entry_mut(url) {
            entry.active = true;
        }
        self.active = Some(url.to_string());
    }

    pub fn deactivate_all(&mut self) {
        for entry in &mut self.entries {
            entry.active = false;
        }
        self.active = None;
    }

    pub fn set_label(&mut self, url: &str, label: &str) {
        if let Some(entry) = self.entry_mut(url) {
            entry.set_label(label);
        }
    }

    /// Update an entry's unread badge. Returns false for unknown hosts.
    pub fn set_badge(&mut self, url: &str, badge: Badge) -> bool {
        match self.entry_mut(url) {
            Some(entry) => {
                entry.badge = badge;
                true
            }
            None => {
                log::debug!("[Sidebar] Badge for unknown host {url} ignored");
                false
            }
        }
    }

    /// Sum of numeric badges, or the attention marker, or empty.
    pub fn global_badge(&self) -> GlobalBadge {
        GlobalBadge::aggregate(self.entries.iter().map(|e| &e.badge))
    }

    // ===== Reordering =====

    /// Complete a drag-and-drop.
    ///
    /// `visible_order` is the rendered list after the drop; it replaces the
    /// sort order wholesale and every entry is re-added so positions,
    /// hotkeys and menu items reindex together. Returns the dragged url,
    /// which the caller activates through the registry.
    pub async fn reorder(&mut self, dragged: &str, visible_order: &[String]) -> CoreResult<String> {
        let mut current: Vec<&str> = self.entries.iter().map(|e| e.url.as_str()).collect();
        let mut proposed: Vec<&str> = visible_order.iter().map(String::as_str).collect();
        current.sort_unstable();
        proposed.sort_unstable();
        if current != proposed {
            return Err(CoreError::ValidationError(
                "new order must list every sidebar entry exactly once".to_string(),
            ));
        }
        if !visible_order.iter().any(|u| u == dragged) {
            return Err(CoreError::HostNotFound(dragged.to_string()));
        }

        let previous: HashMap<String, SidebarEntry> = self
            .entries
            .drain(..)
            .map(|entry| (entry.url.clone(), entry))
            .collect();
        for url in previous.keys() {
            self.menu.remove_server_item(url);
        }

        self.sort_order = visible_order.to_vec();
        self.persist_sort_order().await;

        for url in visible_order {
            if let Some(old) = previous.get(url) {
                self.add(url, &old.label).await;
                if let Some(entry) = self.entry_mut(url) {
                    entry.badge = old.badge;
                }
            }
        }

        log::debug!("[Sidebar] Reordered: {visible_order:?}");
        Ok(dragged.to_string())
    }

    /// Move `dragged` to `to_index` in the rendered list and reorder.
    pub async fn move_entry(&mut self, dragged: &str, to_index: usize) -> CoreResult<String> {
        let mut order: Vec<String> = self.entries.iter().map(|e| e.url.clone()).collect();
        let from = order
            .iter()
            .position(|u| u == dragged)
            .ok_or_else(|| CoreError::HostNotFound(dragged.to_string()))?;
        let url = order.remove(from);
        order.insert(to_index.min(order.len()), url);
        self.reorder(dragged, &order).await
    }

    // ===== Visibility & theme =====

    pub async fn hide(&mut self) {
        self.hidden = true;
        self.persist(SIDEBAR_CLOSED_KEY, "true").await;
    }

    pub async fn show(&mut self) {
        self.hidden = false;
        self.persist(SIDEBAR_CLOSED_KEY, "false").await;
    }

    /// Flip visibility; returns whether the sidebar is now visible.
    pub async fn toggle(&mut self) -> bool {
        if self.hidden {
            self.show().await;
        } else {
            self.hide().await;
        }
        !self.hidden
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_colors(&mut self, colors: SidebarColors) {
        self.colors = colors;
    }

    pub fn colors(&self) -> &SidebarColors {
        &self.colors
    }

    // ===== Queries =====

    pub fn entries(&self) -> &[SidebarEntry] {
        &self.entries
    }

    pub fn sort_order(&self) -> &[String] {
        &self.sort_order
    }

    pub fn entry(&self, url: &str) -> Option<&SidebarEntry> {
        self.entries.iter().find(|e| e.url == url)
    }

    fn entry_mut(&mut self, url: &str) -> Option<&mut SidebarEntry> {
        self.entries.iter_mut().find(|e| e.url == url)
    }

    async fn persist_sort_order(&self) {
        match serde_json::to_string(&self.sort_order) {
            Ok(json) => self.persist(SORT_ORDER_KEY, &json).await,
            Err(e) => log::error!("Failed to serialize sort order: {e}"),
        }
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            log::error!("Failed to persist {key}: {e}");
        }
    }
}
