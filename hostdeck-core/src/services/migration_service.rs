//! 主机列表格式迁移服务
//!
//! 负责把旧的持久化形态（url 数组、单个裸字符串）以及一次性的
//! `servers.json` 清单（title -> url）转换为规范的 `HostsMap`。

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{HostRecord, HostsMap};

/// Every shape the hosts key has been written in
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHosts {
    Map(HostsMap),
    List(Vec<String>),
    Single(String),
    Null(()),
}

/// 迁移结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationResult {
    /// 已是规范格式（或无数据），无需回写
    NotNeeded,
    /// 旧格式已转换，需要立即回写
    Normalized { count: usize },
    /// 数据无法识别，按空列表处理并回写
    Reset,
}

impl MigrationResult {
    #[must_use]
    pub fn needs_persist(self) -> bool {
        !matches!(self, Self::NotNeeded)
    }
}

/// 迁移服务（无状态）
pub struct MigrationService;

impl MigrationService {
    /// Decode whatever is stored under the hosts key.
    ///
    /// Never fails: unrecognizable data becomes an empty map with
    /// `MigrationResult::Reset`.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> (HostsMap, MigrationResult) {
        let Some(raw) = raw else {
            return (HostsMap::new(), MigrationResult::NotNeeded);
        };

        match serde_json::from_str::<StoredHosts>(raw) {
            Ok(StoredHosts::Map(hosts)) => {
                let (hosts, repaired) = Self::repair_keys(hosts);
                if repaired > 0 {
                    log::info!("已修复 {repaired} 条主机记录的 url 字段");
                    let count = hosts.len();
                    (hosts, MigrationResult::Normalized { count })
                } else {
                    (hosts, MigrationResult::NotNeeded)
                }
            }
            Ok(StoredHosts::List(urls)) => {
                log::info!("检测到旧的数组格式主机列表，开始迁移...");
                let hosts = Self::from_urls(urls);
                let count = hosts.len();
                (hosts, MigrationResult::Normalized { count })
            }
            Ok(StoredHosts::Single(url)) => Self::from_single(&url),
            Ok(StoredHosts::Null(())) => (HostsMap::new(), MigrationResult::Reset),
            // Pre-JSON builds wrote a bare url without quotes.
            Err(_) if is_http_url(raw.trim()) => Self::from_single(raw.trim()),
            Err(e) => {
                log::warn!("主机列表已损坏，重置为空: {e}");
                (HostsMap::new(), MigrationResult::Reset)
            }
        }
    }

    /// Convert a `servers.json` manifest (title -> url).
    #[must_use]
    pub fn import_manifest(manifest: &BTreeMap<String, String>) -> HostsMap {
        manifest
            .iter()
            .map(|(title, url)| {
                let url = strip_trailing_slash(url).to_string();
                let mut record = HostRecord::new(url.clone());
                record.title.clone_from(title);
                (url, record)
            })
            .collect()
    }

    fn from_urls(urls: Vec<String>) -> HostsMap {
        urls.into_iter()
            .map(|url| strip_trailing_slash(&url).to_string())
            .filter(|url| !url.is_empty())
            .map(|url| (url.clone(), HostRecord::new(url)))
            .collect()
    }

    fn from_single(url: &str) -> (HostsMap, MigrationResult) {
        if is_http_url(url) {
            log::info!("检测到旧的单字符串格式主机，开始迁移...");
            let hosts = Self::from_urls(vec![url.to_string()]);
            let count = hosts.len();
            (hosts, MigrationResult::Normalized { count })
        } else {
            log::warn!("无法识别的主机字符串，重置为空");
            (HostsMap::new(), MigrationResult::Reset)
        }
    }

    /// Records written without a `url` field take it from their key.
    fn repair_keys(hosts: HostsMap) -> (HostsMap, usize) {
        let mut repaired = 0;
        let hosts = hosts
            .into_iter()
            .map(|(key, mut record)| {
                if record.url != key {
                    record.url.clone_from(&key);
                    repaired += 1;
                }
                if record.title.is_empty() {
                    record.title.clone_from(&key);
                }
                (key, record)
            })
            .collect();
        (hosts, repaired)
    }
}

pub(crate) fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
