//! 系统桌面通知
//!
//! 基于 notify-rust 调用操作系统的通知服务（Linux 上为 D-Bus 通知守护进程）。
//! notify-rust 的调用是阻塞的，统一放到 blocking 线程池执行。

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use storefront_shared::error::SharedError;
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::{DisplayRequest, NotificationSink, Permission};
use crate::error::{NotificationError, Result};

/// 桌面平台没有浏览器式的授权弹窗，能力存在即视为可授权
pub struct DesktopSink {
    app_name: String,
    supported: bool,
    permission: Mutex<Permission>,
}

impl DesktopSink {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            supported: detect_capability(),
            permission: Mutex::new(Permission::Default),
        }
    }

    /// 预设权限状态，例如由用户在宿主中关闭了系统通知
    pub fn with_permission(self, permission: Permission) -> Self {
        *self.permission.lock() = permission;
        self
    }
}

/// 探测当前会话能否展示系统通知
fn detect_capability() -> bool {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }

    std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some()
        || std::env::var_os("XDG_RUNTIME_DIR")
            .is_some_and(|dir| Path::new(&dir).join("bus").exists())
}

#[async_trait]
impl NotificationSink for DesktopSink {
    fn name(&self) -> &str {
        "desktop"
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> Permission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock();
        if !self.supported {
            *permission = Permission::Denied;
        } else if *permission == Permission::Default {
            *permission = Permission::Granted;
            info!(app_name = %self.app_name, "桌面通知权限已授予");
        }
        *permission
    }

    async fn show(&self, request: DisplayRequest) -> Result<()> {
        if !self.supported {
            return Err(SharedError::CapabilityUnavailable {
                capability: "desktop-notification".to_string(),
            }
            .into());
        }

        let DisplayRequest {
            notification_id,
            title,
            body,
            require_interaction,
            clicks,
        } = request;

        let mut notification = notify_rust::Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&title)
            .body(&body)
            .action("default", "Open");
        if require_interaction {
            notification.timeout(notify_rust::Timeout::Never);
        } else {
            notification.timeout(notify_rust::Timeout::Default);
        }

        let (result_tx, result_rx) = oneshot::channel();

        // 展示成功后同一线程继续等待点击回调，直到通知被关闭；
        // 常驻通知会一直占用这个 blocking 线程，宿主退出时不等待它
        tokio::task::spawn_blocking(move || match notification.show() {
            Ok(handle) => {
                let _ = result_tx.send(Ok(()));

                #[cfg(all(unix, not(target_os = "macos")))]
                handle.wait_for_action(|action| {
                    if action == "default" {
                        clicks.clicked();
                    }
                });

                #[cfg(not(all(unix, not(target_os = "macos"))))]
                {
                    let _ = (handle, clicks);
                }
            }
            Err(e) => {
                let _ = result_tx.send(Err(e.to_string()));
            }
        });

        let outcome = result_rx.await.map_err(|_| NotificationError::SinkFailed {
            sink: "desktop".to_string(),
            reason: "展示线程提前退出".to_string(),
        })?;

        outcome.map_err(|reason| NotificationError::SinkFailed {
            sink: "desktop".to_string(),
            reason,
        })?;

        debug!(
            notification_id = %notification_id,
            require_interaction,
            "桌面通知已展示"
        );
        Ok(())
    }
}
