//! 投递渠道与宿主端口
//!
//! 定义引擎依赖的外部能力抽象，并提供各自的默认实现。
//!
//! ## 端口
//!
//! - **NotificationSink**: 平台级通知（权限申请与展示）
//! - **AudioPlayer**: 提示音播放
//! - **ActionHost**: 宿主应用（窗口聚焦、路由跳转、剪贴板）
//!
//! ## 实现
//!
//! - `DesktopSink`: 基于 notify-rust 的系统桌面通知
//! - `NoopSink` / `SilentAudio`: 非交互环境下的空实现
//! - `TerminalBell`: 向终端输出响铃符
//! - `LoggingHost`: 只记录日志的宿主实现

mod audio;
mod desktop;
mod host;
mod noop;

pub use audio::TerminalBell;
pub use desktop::DesktopSink;
pub use host::LoggingHost;
pub use noop::{NoopSink, SilentAudio};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::factories;
use crate::types::{Category, Notification};

/// 平台通知权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// 尚未询问
    #[default]
    Default,
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// 一次平台通知点击
///
/// 跳转目标在展示时从通知本身算出，应用内条目随后被移除也不影响跳转。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub notification_id: String,
    /// 订单类通知携带 orderId 时为 `/orders/{orderId}`
    pub order_path: Option<String>,
}

impl ClickEvent {
    pub fn for_notification(notification: &Notification) -> Self {
        let order_path = (notification.category == Category::Order)
            .then(|| notification.metadata_str("orderId").map(factories::order_path))
            .flatten();
        Self {
            notification_id: notification.id.clone(),
            order_path,
        }
    }
}

/// 平台通知被点击时的回传通道
///
/// 渠道实现在用户点击平台通知后调用 [`ClickNotifier::clicked`]，
/// 由引擎完成已读标记、窗口聚焦与订单跳转。
#[derive(Debug, Clone)]
pub struct ClickNotifier {
    event: ClickEvent,
    tx: mpsc::UnboundedSender<ClickEvent>,
}

impl ClickNotifier {
    pub fn new(event: ClickEvent, tx: mpsc::UnboundedSender<ClickEvent>) -> Self {
        Self { event, tx }
    }

    pub fn notification_id(&self) -> &str {
        &self.event.notification_id
    }

    /// 上报一次点击；引擎已停止监听时静默丢弃
    pub fn clicked(&self) {
        let _ = self.tx.send(self.event.clone());
    }
}

/// 一次平台通知展示请求
#[derive(Debug, Clone)]
pub struct DisplayRequest {
    pub notification_id: String,
    pub title: String,
    pub body: String,
    /// 为 true 时通知应保持显示直到用户手动关闭
    pub require_interaction: bool,
    pub clicks: ClickNotifier,
}

/// 平台通知端口
///
/// 平台能力必须通过 `is_supported` 探测，不能假定存在。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 当前平台是否具备通知能力
    fn is_supported(&self) -> bool;

    /// 当前权限状态，不触发询问
    fn permission(&self) -> Permission;

    /// 申请权限，可能等待用户或平台对话框的响应
    async fn request_permission(&self) -> Permission;

    /// 展示一条平台通知
    async fn show(&self, request: DisplayRequest) -> Result<()>;
}

/// 提示音端口，失败由调用方吞掉
#[cfg_attr(test, mockall::automock)]
pub trait AudioPlayer: Send + Sync {
    fn play_cue(&self) -> Result<()>;
}

/// 宿主应用端口
#[cfg_attr(test, mockall::automock)]
pub trait ActionHost: Send + Sync {
    /// 将宿主应用切到前台
    fn focus_window(&self);

    /// 请求宿主跳转到应用内路径
    fn navigate(&self, path: &str);

    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}
