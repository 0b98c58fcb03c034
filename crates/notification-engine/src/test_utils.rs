//! 测试工具模块
//!
//! 提供记录调用的端口实现，便于在单元测试与集成测试中断言引擎的副作用。

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::channels::{ActionHost, AudioPlayer, DisplayRequest, NotificationSink, Permission};
use crate::error::{NotificationError, Result};

// ==================== 平台通知 ====================

/// 记录所有展示请求的 sink
///
/// 权限为 Default 时申请即授予，为 Denied 时保持拒绝。
pub struct RecordingSink {
    permission: Mutex<Permission>,
    shown: Mutex<Vec<DisplayRequest>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Mutex::new(permission),
            shown: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// 已授权但每次展示都失败
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Permission::Granted)
        }
    }

    pub fn shown(&self) -> Vec<DisplayRequest> {
        self.shown.lock().clone()
    }

    /// 模拟用户点击某条已展示的平台通知，返回是否找到
    pub fn click(&self, notification_id: &str) -> bool {
        let shown = self.shown.lock();
        match shown.iter().find(|r| r.notification_id == notification_id) {
            Some(request) => {
                request.clicks.clicked();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> Permission {
        let mut permission = self.permission.lock();
        if *permission == Permission::Default {
            *permission = Permission::Granted;
        }
        *permission
    }

    async fn show(&self, request: DisplayRequest) -> Result<()> {
        if self.fail {
            return Err(NotificationError::SinkFailed {
                sink: "recording".to_string(),
                reason: "模拟失败".to_string(),
            });
        }
        self.shown.lock().push(request);
        Ok(())
    }
}

// ==================== 提示音 ====================

/// 记录播放次数的提示音实现
#[derive(Default)]
pub struct CountingAudio {
    plays: AtomicUsize,
    fail: bool,
}

impl CountingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次播放都失败，但仍然计数
    pub fn failing() -> Self {
        Self {
            plays: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioPlayer for CountingAudio {
    fn play_cue(&self) -> Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotificationError::AudioFailed("需要用户手势".to_string()));
        }
        Ok(())
    }
}

// ==================== 宿主 ====================

/// 记录宿主调用的实现
#[derive(Default)]
pub struct RecordingHost {
    focus_count: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    clipboard: Mutex<Vec<String>>,
    clipboard_fails: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_clipboard() -> Self {
        Self {
            clipboard_fails: true,
            ..Self::default()
        }
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn clipboard(&self) -> Vec<String> {
        self.clipboard.lock().clone()
    }
}

impl ActionHost for RecordingHost {
    fn focus_window(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().push(path.to_string());
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        if self.clipboard_fails {
            return Err(NotificationError::ClipboardFailed("剪贴板不可用".to_string()));
        }
        self.clipboard.lock().push(text.to_string());
        Ok(())
    }
}
