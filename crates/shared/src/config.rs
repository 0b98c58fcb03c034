//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::observability::ObservabilityConfig;

/// 通知引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// 后台清理保留的最大通知条数
    pub retention_limit: usize,
    /// 后台清理的执行间隔（秒）
    pub sweep_interval_secs: u64,
    /// 持久化快照中保留的最近通知条数
    pub persist_limit: usize,
    /// 未指定 duration 的自动隐藏通知的默认时长（毫秒）
    pub default_auto_hide_ms: u64,
    /// 文件存储目录
    pub storage_dir: PathBuf,
    /// 快照在键值存储中的 key
    pub storage_key: String,
    /// 是否挂载桌面通知适配器，关闭时使用 no-op 实现
    pub desktop_enabled: bool,
    /// 是否启用终端提示音
    pub sound_enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            retention_limit: 100,
            sweep_interval_secs: 60,
            persist_limit: 50,
            default_auto_hide_ms: 5000,
            storage_dir: PathBuf::from("data"),
            storage_key: "notification-storage".to_string(),
            desktop_enabled: true,
            sound_enabled: true,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
    pub notifications: NotificationsConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（STOREFRONT_ 前缀，嵌套字段用双下划线，
    ///    如 STOREFRONT_NOTIFICATIONS__RETENTION_LIMIT -> notifications.retention_limit）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("STOREFRONT_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置，便于测试时绕开进程级环境变量
    pub fn load_from(
        service_name: &str,
        env: &str,
        config_dir: &Path,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("STOREFRONT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}
