//! 统一错误处理模块
//!
//! 定义各 crate 共享的基础设施错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 共享基础设施错误类型
#[derive(Debug, Error)]
pub enum SharedError {
    // ==================== 配置错误 ====================
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    // ==================== 存储错误 ====================
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("存储操作失败: key={key}, 原因={message}")]
    Storage { key: String, message: String },

    // ==================== 平台能力错误 ====================
    #[error("平台能力不可用: {capability}")]
    CapabilityUnavailable { capability: String },
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::CapabilityUnavailable { .. } => "CAPABILITY_UNAVAILABLE",
        }
    }

    /// 是否为可重试错误
    ///
    /// 只有底层 IO 与存储后端的瞬时故障值得重试，配置和数据格式错误重试无意义
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Storage { .. })
    }
}
