//! 通知引擎错误类型
//!
//! 引擎的状态修改方法从不返回错误；这里的错误只出现在旁路副作用
//! （平台通知、提示音、剪贴板）与持久化中，由调用方决定记录还是上抛。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("平台通知发送失败: 渠道={sink}, 原因={reason}")]
    SinkFailed { sink: String, reason: String },

    #[error("提示音播放失败: {0}")]
    AudioFailed(String),

    #[error("剪贴板写入失败: {0}")]
    ClipboardFailed(String),

    #[error("快照持久化失败: {0}")]
    Persistence(String),

    #[error("快照解析失败: {0}")]
    SnapshotDecode(#[from] serde_json::Error),

    #[error(transparent)]
    Shared(#[from] storefront_shared::error::SharedError),
}

pub type Result<T> = std::result::Result<T, NotificationError>;

impl NotificationError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::SinkFailed { .. } => "SINK_FAILED",
            Self::AudioFailed(_) => "AUDIO_FAILED",
            Self::ClipboardFailed(_) => "CLIPBOARD_FAILED",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::SnapshotDecode(_) => "SNAPSHOT_DECODE_ERROR",
            Self::Shared(e) => e.code(),
        }
    }

    /// 只有底层存储的瞬时故障值得重试
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Shared(e) => e.is_retryable(),
            _ => false,
        }
    }
}
