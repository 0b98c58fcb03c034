//! 定时调度
//!
//! 两套互相独立的计时机制：
//! - 自动隐藏：每条 auto-hide 通知一个 tokio 任务，到期后执行回调
//! - 保留清理：固定间隔的后台循环，首次执行在启动一个间隔之后
//!
//! 调度器只负责"何时"执行，回调内部必须自行重新检查状态；被手动移除的通知
//! 不会取消其计时任务，迟到的回调应当是安全的 no-op。

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct Scheduler {
    /// 未完成的自动隐藏任务，key 为通知 id
    timers: Arc<DashMap<String, JoinHandle<()>>>,
    sweep: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            timers: Arc::new(DashMap::new()),
            sweep: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// 登记一次自动隐藏，`after` 之后执行 `on_expire`
    ///
    /// 当前线程不在 tokio 运行时中时放弃调度并返回 false。
    pub fn schedule_auto_hide<F>(&self, id: &str, after: Duration, on_expire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!(notification_id = %id, "没有可用的 tokio 运行时，跳过自动隐藏计时");
            return false;
        };

        // 已到期的任务句柄顺手清掉，避免在长时间运行中累积
        self.timers.retain(|_, handle| !handle.is_finished());

        let handle = runtime.spawn(async move {
            tokio::time::sleep(after).await;
            on_expire();
        });

        if let Some(previous) = self.timers.insert(id.to_string(), handle) {
            previous.abort();
        }

        debug!(
            notification_id = %id,
            after_ms = after.as_millis() as u64,
            "已登记自动隐藏"
        );
        true
    }

    /// 尚未触发的自动隐藏数量
    pub fn pending_timers(&self) -> usize {
        self.timers
            .iter()
            .filter(|entry| !entry.value().is_finished())
            .count()
    }

    pub fn has_timer(&self, id: &str) -> bool {
        self.timers
            .get(id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 启动周期清理，`tick` 返回 false 时循环退出
    ///
    /// 已有清理循环在运行时不重复启动，间隔为零时拒绝启动，均返回 false。
    pub fn start_sweep<F>(&self, period: Duration, tick: F) -> bool
    where
        F: Fn() -> bool + Send + 'static,
    {
        if period.is_zero() {
            warn!("保留清理间隔为 0，拒绝启动");
            return false;
        }

        let mut sweep = self.sweep.lock();
        if sweep.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("没有可用的 tokio 运行时，无法启动保留清理");
            return false;
        };

        self.shutdown_tx.send_replace(false);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        *sweep = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = period.as_secs(), "保留清理已启动");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if !tick() {
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("保留清理已停止");
        }));
        true
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweep
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 通知清理循环退出并中止所有未触发的自动隐藏
    ///
    /// 返回清理循环的句柄，调用方可以等待其退出。
    pub fn shutdown(&self) -> Option<JoinHandle<()>> {
        let _ = self.shutdown_tx.send(true);

        let cancelled = self.timers.len();
        self.timers.retain(|_, handle| {
            handle.abort();
            false
        });
        if cancelled > 0 {
            debug!(cancelled, "已取消未触发的自动隐藏");
        }

        self.sweep.lock().take()
    }
}
