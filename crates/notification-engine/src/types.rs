//! 通知类型定义
//!
//! 定义通知相关的数据结构和枚举类型。序列化格式与前端快照保持一致：
//! 字段使用 camelCase，通知种类序列化为 `type`。

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通知种类，决定前端展示的图标与配色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
    Order,
    Promotion,
}

/// 通知分类
///
/// 分类决定设置中的开关是否屏蔽该通知，也用于前端按类筛选。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    Order,
    Promotion,
    Account,
    Security,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::System,
        Category::Order,
        Category::Promotion,
        Category::Account,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Order => "order",
            Self::Promotion => "promotion",
            Self::Account => "account",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通知优先级
///
/// high 会触发提示音，并让桌面通知保持到用户手动关闭
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// 操作按钮样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    #[default]
    Primary,
    Secondary,
    Danger,
}

/// 操作按钮被点击后执行的命令
///
/// 以数据而非闭包表达，保证通知可以被持久化后恢复。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionCommand {
    /// 请求宿主跳转到应用内路径
    Navigate { path: String },
    /// 复制优惠码到剪贴板，成功后弹出一条短暂的成功提示
    CopyCode { code: String },
}

/// 通知上的操作按钮
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    pub command: ActionCommand,
    #[serde(default)]
    pub variant: ActionVariant,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, command: ActionCommand) -> Self {
        Self {
            label: label.into(),
            command,
            variant: ActionVariant::Primary,
        }
    }

    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }
}

/// 一条面向用户的通知
///
/// 由引擎在入库时创建，除 `read` 外创建后不再改变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 通知唯一标识（UUID v7），创建时生成，永不复用
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub category: Category,
    pub priority: Priority,
    /// 创建时间，序列化为 ISO-8601
    pub timestamp: DateTime<Utc>,
    /// 只会从 false 变为 true
    pub read: bool,
    #[serde(default)]
    pub auto_hide: bool,
    /// 自动隐藏时长（毫秒），缺省时使用引擎配置的默认值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Notification {
    /// 自动隐藏时长，未设置 duration 时取 `default`
    pub fn auto_hide_after(&self, default: Duration) -> Option<Duration> {
        self.auto_hide
            .then(|| self.duration.map(Duration::from_millis).unwrap_or(default))
    }

    /// 读取字符串类型的元数据
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// 新通知的载荷
///
/// 不含 id、timestamp、read，这三个字段由引擎在入库时填充。
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub category: Category,
    pub priority: Priority,
    pub auto_hide: bool,
    pub duration: Option<u64>,
    pub actions: Vec<NotificationAction>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewNotification {
    /// 创建新载荷，默认分类 system、优先级 medium、不自动隐藏
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            category: Category::System,
            priority: Priority::Medium,
            auto_hide: false,
            duration: None,
            actions: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// 开启自动隐藏，`duration_ms` 为 None 时使用默认时长
    pub fn with_auto_hide(mut self, duration_ms: Option<u64>) -> Self {
        self.auto_hide = true;
        self.duration = duration_ms;
        self
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// 添加元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 填充 id 与创建时间，生成可入库的通知
    pub(crate) fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::now_v7().to_string(),
            kind: self.kind,
            title: self.title,
            message: self.message,
            category: self.category,
            priority: self.priority,
            timestamp: Utc::now(),
            read: false,
            auto_hide: self.auto_hide,
            duration: self.duration,
            actions: self.actions,
            metadata: self.metadata,
        }
    }
}
