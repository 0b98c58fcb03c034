//! 通知引擎宿主进程
//!
//! 加载配置与快照，挂载桌面通知后常驻运行，收到 Ctrl-C 时保存快照并退出。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use notification_engine::channels::{
    AudioPlayer, DesktopSink, NoopSink, NotificationSink, SilentAudio, TerminalBell,
};
use notification_engine::persistence::FileKeyValueStore;
use notification_engine::{EngineConfig, NotificationCenter};
use storefront_shared::config::AppConfig;
use storefront_shared::observability;
use tokio::runtime::Runtime;
use tracing::{info, warn};

const SERVICE_NAME: &str = "notification-engine";

/// 退出时等待后台任务结束的最长时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("创建 tokio 运行时失败")?;

    let result = runtime.block_on(run());
    shutdown_runtime(runtime, SHUTDOWN_GRACE);
    result
}

/// 关闭运行时，不无限等待 blocking 线程
///
/// 需要用户手动关闭的桌面通知会一直占住一个 blocking 线程等待点击。
fn shutdown_runtime(runtime: Runtime, grace: Duration) {
    runtime.shutdown_timeout(grace);
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;
    let _guard = observability::init(
        &config
            .observability
            .clone()
            .with_service_name(&config.service_name),
    )
    .await?;

    info!(
        service = %config.service_name,
        environment = %config.environment,
        "Starting notification-engine..."
    );

    let notifications = &config.notifications;
    let sink: Arc<dyn NotificationSink> = if notifications.desktop_enabled {
        Arc::new(DesktopSink::new(SERVICE_NAME))
    } else {
        Arc::new(NoopSink)
    };
    let audio: Arc<dyn AudioPlayer> = if notifications.sound_enabled {
        Arc::new(TerminalBell)
    } else {
        Arc::new(SilentAudio)
    };

    let center = NotificationCenter::builder(EngineConfig::from(notifications))
        .with_sink(sink)
        .with_audio(audio)
        .with_storage(Arc::new(FileKeyValueStore::new(&notifications.storage_dir)))
        .build();

    // 快照损坏时以默认状态启动，下次保存会覆盖
    if let Err(e) = center.load() {
        warn!(code = e.code(), error = %e, "读取通知快照失败，使用默认状态");
    }

    if !center.request_permission().await {
        info!("桌面通知不可用或未获授权，仅保留应用内通知");
    }

    center.start();

    let mut summary_rx = center.subscribe();
    let summary_task = tokio::spawn(async move {
        while summary_rx.changed().await.is_ok() {
            let summary = *summary_rx.borrow_and_update();
            info!(
                total = summary.total,
                unread = summary.unread,
                is_open = summary.is_open,
                "通知状态变化"
            );
        }
    });

    tokio::signal::ctrl_c().await.context("监听退出信号失败")?;
    info!("收到退出信号，正在保存快照...");

    let saved = match center.save() {
        Err(e) if e.is_retryable() => {
            warn!(code = e.code(), error = %e, "保存通知快照失败，重试一次");
            center.save()
        }
        other => other,
    };
    match saved {
        Ok(saved) => info!(saved, "通知快照已保存"),
        Err(e) => warn!(code = e.code(), error = %e, "保存通知快照失败"),
    }
    center.stop().await;
    summary_task.abort();

    info!("notification-engine 已退出");
    Ok(())
}
