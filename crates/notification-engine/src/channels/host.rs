//! 日志宿主
//!
//! 独立进程运行时没有真实的 UI 宿主，窗口聚焦与路由跳转只记录日志。

use tracing::info;

use super::ActionHost;
use crate::error::{NotificationError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl ActionHost for LoggingHost {
    fn focus_window(&self) {
        info!("请求将宿主窗口切到前台");
    }

    fn navigate(&self, path: &str) {
        info!(path = %path, "请求宿主跳转");
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        // 无剪贴板可用，按失败处理，调用方不会弹出"已复制"提示
        Err(NotificationError::ClipboardFailed(format!(
            "宿主不提供剪贴板，无法复制 {} 个字符",
            text.chars().count()
        )))
    }
}
