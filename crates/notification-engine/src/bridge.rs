//! 平台通知桥接
//!
//! 对 [`NotificationSink`] 的薄封装：先探测能力与权限，再把通知映射为展示请求。
//! 点击事件经由内部 channel 回传给引擎处理。

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::channels::{ClickEvent, ClickNotifier, DisplayRequest, NotificationSink};
use crate::error::Result;
use crate::types::{Notification, Priority};

pub struct BrowserNotificationBridge {
    sink: Arc<dyn NotificationSink>,
    clicks_tx: mpsc::UnboundedSender<ClickEvent>,
}

impl BrowserNotificationBridge {
    /// 创建桥接，同时返回点击事件的接收端
    pub fn new(sink: Arc<dyn NotificationSink>) -> (Self, mpsc::UnboundedReceiver<ClickEvent>) {
        let (clicks_tx, clicks_rx) = mpsc::unbounded_channel();
        (Self { sink, clicks_tx }, clicks_rx)
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    pub fn is_supported(&self) -> bool {
        self.sink.is_supported()
    }

    /// 申请平台通知权限
    ///
    /// 平台不具备通知能力时直接返回 false，不发起询问。
    pub async fn request_permission(&self) -> bool {
        if !self.sink.is_supported() {
            return false;
        }
        self.sink.request_permission().await.is_granted()
    }

    /// 展示平台通知
    ///
    /// 能力缺失或未获授权时为 no-op，返回 `Ok(false)`。
    pub async fn show_browser_notification(&self, notification: &Notification) -> Result<bool> {
        if !self.sink.is_supported() || !self.sink.permission().is_granted() {
            debug!(
                notification_id = %notification.id,
                sink = self.sink.name(),
                "平台通知不可用或未授权，跳过"
            );
            return Ok(false);
        }

        let request = DisplayRequest {
            notification_id: notification.id.clone(),
            title: notification.title.clone(),
            body: notification.message.clone(),
            require_interaction: notification.priority == Priority::High,
            clicks: ClickNotifier::new(
                ClickEvent::for_notification(notification),
                self.clicks_tx.clone(),
            ),
        };
        self.sink.show(request).await?;
        Ok(true)
    }
}
