//! 可观测性与配置模块集成测试
//!
//! 测试指标记录、日志初始化与配置加载的核心行为。

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use storefront_shared::observability::metrics::{
        describe_notification_metrics, record_delivery_failure, record_notification_created,
        record_notification_suppressed, record_notifications_evicted,
        record_notifications_removed, set_unread_gauge,
    };

    #[test]
    fn test_record_notification_lifecycle() {
        describe_notification_metrics();
        for category in ["system", "order", "promotion", "account", "security"] {
            record_notification_created(category);
        }
        record_notification_suppressed("disabled");
        record_notification_suppressed("category_disabled");
        record_notifications_removed("manual", 1);
        record_notifications_removed("auto_hide", 1);
        record_notifications_removed("category", 4);
        record_notifications_evicted(5);
    }

    #[test]
    fn test_record_delivery_failures() {
        record_delivery_failure("desktop");
        record_delivery_failure("sound");
        record_delivery_failure("clipboard");
        set_unread_gauge(0);
        set_unread_gauge(42);
    }
}

// ============================================================================
// 日志初始化测试
// ============================================================================

mod tracing_tests {
    use storefront_shared::observability::{tracing, ObservabilityConfig, ObservabilityGuard};

    #[test]
    fn test_init_twice_fails() {
        let config = ObservabilityConfig::default().with_service_name("shared-test");
        // 同一进程内全局 subscriber 只能设置一次
        let first = tracing::init(&config);
        let second = tracing::init(&config);
        assert!(first.is_ok());
        assert!(second.is_err());

        let _guard = ObservabilityGuard::empty();
    }
}

// ============================================================================
// 配置加载测试
// ============================================================================

mod config_tests {
    use storefront_shared::config::AppConfig;

    #[test]
    fn test_environment_file_layering() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
[observability]
log_level = "debug"

[notifications]
sweep_interval_secs = 30
"#,
        )
        .expect("写入 default.toml 失败");
        std::fs::write(
            dir.path().join("production.toml"),
            r#"
[observability]
json_logs = true

[notifications]
sweep_interval_secs = 120
desktop_enabled = false
"#,
        )
        .expect("写入 production.toml 失败");

        let config = AppConfig::load_from("notification-engine", "production", dir.path())
            .expect("配置应能加载");

        assert_eq!(config.environment, "production");
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logs);
        assert_eq!(config.notifications.sweep_interval_secs, 120);
        assert!(!config.notifications.desktop_enabled);
        assert!(config.notifications.sound_enabled);
    }
}
