//! 空实现
//!
//! 用于无界面、无声卡的运行环境（CI、服务器端预渲染）。

use async_trait::async_trait;

use super::{AudioPlayer, DisplayRequest, NotificationSink, Permission};
use crate::error::Result;

/// 不具备平台通知能力的 sink
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    fn name(&self) -> &str {
        "noop"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn permission(&self) -> Permission {
        Permission::Denied
    }

    async fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    async fn show(&self, _request: DisplayRequest) -> Result<()> {
        Ok(())
    }
}

/// 静音实现
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioPlayer for SilentAudio {
    fn play_cue(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_sink_reports_no_capability() {
        let sink = NoopSink;
        assert!(!sink.is_supported());
        assert_eq!(sink.permission(), Permission::Denied);
        assert_eq!(sink.request_permission().await, Permission::Denied);
        assert!(SilentAudio.play_cue().is_ok());
    }
}
