//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
///
/// drop 时中止指标 HTTP 服务器
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl Drop for MetricsHandle {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_notification_metrics();
    metrics::counter!("service_starts_total", "service" => config.service_name.clone())
        .increment(1);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle { server_handle })
}

/// 描述通知引擎的指标
///
/// 这些描述会出现在 /metrics 端点的 HELP 注释中
pub fn describe_notification_metrics() {
    metrics::describe_counter!(
        "notifications_created_total",
        "Total number of notifications inserted into the store"
    );
    metrics::describe_counter!(
        "notifications_suppressed_total",
        "Total number of notifications dropped by settings"
    );
    metrics::describe_counter!(
        "notifications_removed_total",
        "Total number of notifications removed, labelled by reason"
    );
    metrics::describe_counter!(
        "notifications_evicted_total",
        "Total number of notifications evicted by the retention sweep"
    );
    metrics::describe_counter!(
        "notification_delivery_failures_total",
        "Total number of failed side-effect deliveries, labelled by channel"
    );
    metrics::describe_gauge!("notifications_unread", "Current number of unread notifications");
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录一条通知入库
#[inline]
pub fn record_notification_created(category: &str) {
    metrics::counter!("notifications_created_total", "category" => category.to_string())
        .increment(1);
}

/// 记录一条通知被设置静默丢弃
#[inline]
pub fn record_notification_suppressed(reason: &'static str) {
    metrics::counter!("notifications_suppressed_total", "reason" => reason).increment(1);
}

/// 记录通知移除
#[inline]
pub fn record_notifications_removed(reason: &'static str, count: usize) {
    metrics::counter!("notifications_removed_total", "reason" => reason).increment(count as u64);
}

/// 记录保留清理淘汰的条数
#[inline]
pub fn record_notifications_evicted(count: usize) {
    metrics::counter!("notifications_evicted_total").increment(count as u64);
}

/// 记录旁路投递失败
#[inline]
pub fn record_delivery_failure(channel: &'static str) {
    metrics::counter!("notification_delivery_failures_total", "channel" => channel).increment(1);
}

/// 更新未读数量
#[inline]
pub fn set_unread_gauge(unread: usize) {
    metrics::gauge!("notifications_unread").set(unread as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        // 未安装 recorder 时记录指标不应 panic
        describe_notification_metrics();
        record_notification_created("order");
        record_notification_suppressed("category_disabled");
        record_notifications_removed("manual", 2);
        record_notifications_evicted(5);
        record_delivery_failure("desktop");
        set_unread_gauge(3);
    }
}
