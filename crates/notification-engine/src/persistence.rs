//! 快照持久化
//!
//! 将最近的通知与设置序列化为 JSON 写入键值存储，启动时读回。
//! 面板可见状态是临时 UI 状态，从不持久化。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use storefront_shared::error::SharedError;
use tracing::{debug, info};

use crate::error::{NotificationError, Result};
use crate::settings::Settings;
use crate::types::Notification;

/// 当前快照格式版本
pub const SNAPSHOT_VERSION: u32 = 1;

/// 字节键值存储端口
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// 内存存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// 文件存储，每个 key 对应目录下的一个 JSON 文件
///
/// 先写临时文件再 rename，保证读到的快照总是完整的。
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SharedError::Io(e).into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(SharedError::Io)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(SharedError::Io)?;
        std::fs::rename(&tmp, &path).map_err(|e| SharedError::Storage {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// 持久化快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default = "default_version")]
    pub version: u32,
    /// 按位置截取的最近通知，不区分已读未读
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub settings: Settings,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// 快照读写适配器
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    key: String,
    limit: usize,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, limit: usize) -> Self {
        Self {
            store,
            key: key.into(),
            limit,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 写入快照，通知列表只保留前 `limit` 条（最新的在前）
    pub fn save<'a>(
        &self,
        notifications: impl IntoIterator<Item = &'a Notification>,
        settings: &Settings,
    ) -> Result<usize> {
        let state = PersistedState {
            version: SNAPSHOT_VERSION,
            notifications: notifications.into_iter().take(self.limit).cloned().collect(),
            settings: settings.clone(),
        };
        let bytes = serde_json::to_vec(&state)?;
        self.store.set(&self.key, &bytes)?;

        debug!(
            key = %self.key,
            notifications = state.notifications.len(),
            bytes = bytes.len(),
            "快照已写入"
        );
        Ok(state.notifications.len())
    }

    /// 读取快照，不存在时返回 None
    pub fn load(&self) -> Result<Option<PersistedState>> {
        let Some(bytes) = self.store.get(&self.key)? else {
            info!(key = %self.key, "未找到快照，使用默认状态");
            return Ok(None);
        };

        let mut state: PersistedState = serde_json::from_slice(&bytes)?;
        if state.version > SNAPSHOT_VERSION {
            return Err(NotificationError::Persistence(format!(
                "不支持的快照版本 {}（当前 {}）",
                state.version, SNAPSHOT_VERSION
            )));
        }
        state.notifications.truncate(self.limit);
        Ok(Some(state))
    }
}
