//! 通知中心
//!
//! 引擎对外的服务对象，编排存储、设置、调度、投递与持久化。
//!
//! ## 设计说明
//!
//! - **同步修改**：所有状态修改方法在一把锁内一次完成，锁释放后才触发副作用
//! - **旁路投递**：平台通知、提示音、剪贴板失败只记录日志，不影响状态修改
//! - **显式生命周期**：`start()` / `stop()` 管理后台任务，`save()` / `load()` 由宿主在
//!   启动与退出时调用
//! - **静默丢弃**：被设置屏蔽的通知同样返回新 id，调用方无法从返回值区分

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use storefront_shared::config::NotificationsConfig;
use storefront_shared::observability::metrics;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::bridge::BrowserNotificationBridge;
use crate::channels::{
    ActionHost, AudioPlayer, ClickEvent, LoggingHost, NoopSink, NotificationSink, SilentAudio,
};
use crate::error::Result;
use crate::factories;
use crate::persistence::{KeyValueStore, PersistenceAdapter};
use crate::scheduler::Scheduler;
use crate::settings::{Settings, SettingsManager, SettingsPatch};
use crate::store::{Admission, Eviction, NotificationStore};
use crate::types::{ActionCommand, Category, NewNotification, Notification, Priority};

/// 引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 保留清理后剩余的最大条数
    pub retention_limit: usize,
    pub sweep_interval: Duration,
    /// 快照中保留的最近通知条数
    pub persist_limit: usize,
    pub default_auto_hide: Duration,
    pub storage_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&NotificationsConfig::default())
    }
}

impl From<&NotificationsConfig> for EngineConfig {
    fn from(config: &NotificationsConfig) -> Self {
        Self {
            retention_limit: config.retention_limit,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            persist_limit: config.persist_limit,
            default_auto_hide: Duration::from_millis(config.default_auto_hide_ms),
            storage_key: config.storage_key.clone(),
        }
    }
}

/// 供 UI 订阅的状态摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub total: usize,
    pub unread: usize,
    pub is_open: bool,
}

struct EngineState {
    store: NotificationStore,
    settings: SettingsManager,
}

impl EngineState {
    fn summary(&self) -> StoreSummary {
        StoreSummary {
            total: self.store.len(),
            unread: self.store.unread_count(),
            is_open: self.store.is_open(),
        }
    }
}

struct Inner {
    state: Mutex<EngineState>,
    bridge: BrowserNotificationBridge,
    /// 点击事件接收端，监听任务运行期间由任务持有
    clicks_rx: Mutex<Option<mpsc::UnboundedReceiver<ClickEvent>>>,
    click_listener: Mutex<Option<JoinHandle<mpsc::UnboundedReceiver<ClickEvent>>>>,
    audio: Arc<dyn AudioPlayer>,
    host: Arc<dyn ActionHost>,
    persistence: Option<PersistenceAdapter>,
    scheduler: Scheduler,
    config: EngineConfig,
    summary_tx: watch::Sender<StoreSummary>,
    shutdown_tx: watch::Sender<bool>,
}

/// 通知中心构建器
pub struct NotificationCenterBuilder {
    config: EngineConfig,
    settings: Settings,
    sink: Arc<dyn NotificationSink>,
    audio: Arc<dyn AudioPlayer>,
    host: Arc<dyn ActionHost>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl NotificationCenterBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            settings: Settings::default(),
            sink: Arc::new(NoopSink),
            audio: Arc::new(SilentAudio),
            host: Arc::new(LoggingHost),
            storage: None,
        }
    }

    /// 初始设置，`load()` 读到快照时会被覆盖
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_audio(mut self, audio: Arc<dyn AudioPlayer>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn ActionHost>) -> Self {
        self.host = host;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> NotificationCenter {
        let (bridge, clicks_rx) = BrowserNotificationBridge::new(self.sink);
        let persistence = self.storage.map(|storage| {
            PersistenceAdapter::new(
                storage,
                self.config.storage_key.clone(),
                self.config.persist_limit,
            )
        });
        let (summary_tx, _) = watch::channel(StoreSummary::default());
        let (shutdown_tx, _) = watch::channel(false);

        NotificationCenter {
            inner: Arc::new(Inner {
                state: Mutex::new(EngineState {
                    store: NotificationStore::new(),
                    settings: SettingsManager::new(self.settings),
                }),
                bridge,
                clicks_rx: Mutex::new(Some(clicks_rx)),
                click_listener: Mutex::new(None),
                audio: self.audio,
                host: self.host,
                persistence,
                scheduler: Scheduler::new(),
                config: self.config,
                summary_tx,
                shutdown_tx,
            }),
        }
    }
}

/// 通知中心
///
/// 句柄可以廉价 clone，所有 clone 共享同一份状态。
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn builder(config: EngineConfig) -> NotificationCenterBuilder {
        NotificationCenterBuilder::new(config)
    }

    /// 使用默认配置与空实现端口创建
    pub fn with_defaults() -> Self {
        Self::builder(EngineConfig::default()).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    // ==================== 状态修改 ====================

    /// 新增一条通知
    ///
    /// 无论是否被设置屏蔽，都会返回新生成的 id。
    pub fn add_notification(&self, data: NewNotification) -> String {
        let notification = data.into_notification();
        let id = notification.id.clone();

        let (admission, desktop, sound, summary) = {
            let mut state = self.inner.state.lock();
            let settings = state.settings.settings().clone();
            let admission = state.store.add(&settings, notification.clone());
            (admission, settings.desktop, settings.sound, state.summary())
        };

        match admission {
            Admission::Inserted => {
                debug!(
                    notification_id = %id,
                    category = %notification.category,
                    priority = ?notification.priority,
                    "通知已入库"
                );
                metrics::record_notification_created(notification.category.as_str());
                self.publish(summary);

                if let Some(after) = notification.auto_hide_after(self.inner.config.default_auto_hide)
                {
                    self.schedule_auto_hide(&id, after);
                }
                self.fan_out(notification, desktop, sound);
            }
            Admission::SuppressedDisabled => {
                debug!(notification_id = %id, "通知总开关已关闭，静默丢弃");
                metrics::record_notification_suppressed("disabled");
            }
            Admission::SuppressedCategory => {
                debug!(
                    notification_id = %id,
                    category = %notification.category,
                    "通知分类已关闭，静默丢弃"
                );
                metrics::record_notification_suppressed("category_disabled");
            }
        }

        id
    }

    /// 移除通知，不存在时为 no-op
    pub fn remove_notification(&self, id: &str) -> bool {
        self.remove_with_reason(id, "manual")
    }

    /// 标记已读，只有状态真正发生变化时返回 true
    pub fn mark_as_read(&self, id: &str) -> bool {
        let (changed, summary) = {
            let mut state = self.inner.state.lock();
            (state.store.mark_as_read(id), state.summary())
        };
        if changed {
            self.publish(summary);
        }
        changed
    }

    pub fn mark_all_as_read(&self) {
        let summary = {
            let mut state = self.inner.state.lock();
            state.store.mark_all_as_read();
            state.summary()
        };
        self.publish(summary);
    }

    pub fn clear_notifications(&self) {
        let (removed, summary) = {
            let mut state = self.inner.state.lock();
            (state.store.clear(), state.summary())
        };
        metrics::record_notifications_removed("clear", removed);
        self.publish(summary);
    }

    /// 清空某一分类，返回移除条数
    pub fn clear_by_category(&self, category: Category) -> usize {
        let (removed, summary) = {
            let mut state = self.inner.state.lock();
            (state.store.clear_by_category(category), state.summary())
        };
        if removed > 0 {
            metrics::record_notifications_removed("category", removed);
            self.publish(summary);
        }
        removed
    }

    /// 切换面板可见状态，返回切换后的状态
    pub fn toggle_panel(&self) -> bool {
        let (is_open, summary) = {
            let mut state = self.inner.state.lock();
            (state.store.toggle_panel(), state.summary())
        };
        self.publish(summary);
        is_open
    }

    pub fn close_panel(&self) {
        let summary = {
            let mut state = self.inner.state.lock();
            state.store.close_panel();
            state.summary()
        };
        self.publish(summary);
    }

    // ==================== 设置 ====================

    pub fn settings(&self) -> Settings {
        self.inner.state.lock().settings.settings().clone()
    }

    pub fn update_settings(&self, patch: SettingsPatch) {
        let mut state = self.inner.state.lock();
        state.settings.update(patch);
        debug!(settings = ?state.settings.settings(), "通知设置已更新");
    }

    pub fn reset_settings(&self) {
        self.inner.state.lock().settings.reset();
    }

    pub fn is_category_enabled(&self, category: Category) -> bool {
        self.inner.state.lock().settings.is_category_enabled(category)
    }

    /// 总开关与分类开关同时打开时才会入库
    pub fn allows(&self, category: Category) -> bool {
        self.inner.state.lock().settings.allows(category)
    }

    // ==================== 查询 ====================

    /// 当前通知列表快照（新的在前）
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.state.lock().store.iter().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.inner.state.lock().store.get(id).cloned()
    }

    pub fn unread_count(&self) -> usize {
        self.inner.state.lock().store.unread_count()
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.lock().store.is_open()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().store.is_empty()
    }

    pub fn by_category(&self, category: Category) -> Vec<Notification> {
        self.inner
            .state
            .lock()
            .store
            .iter()
            .filter(|n| n.category == category)
            .cloned()
            .collect()
    }

    pub fn unread_by_category(&self, category: Category) -> usize {
        self.inner
            .state
            .lock()
            .store
            .iter()
            .filter(|n| n.category == category && !n.read)
            .count()
    }

    pub fn summary(&self) -> StoreSummary {
        self.inner.state.lock().summary()
    }

    /// 订阅状态摘要，每次状态变化后推送
    pub fn subscribe(&self) -> watch::Receiver<StoreSummary> {
        self.inner.summary_tx.subscribe()
    }

    // ==================== 保留清理 ====================

    /// 执行一次保留清理
    ///
    /// 只在清理时生效，两次清理之间列表可以暂时超过上限。
    pub fn sweep(&self) -> Eviction {
        let (eviction, summary) = {
            let mut state = self.inner.state.lock();
            let eviction = state.store.evict_beyond(self.inner.config.retention_limit);
            (eviction, state.summary())
        };

        if eviction.evicted > 0 {
            info!(
                evicted = eviction.evicted,
                unread_evicted = eviction.unread_evicted,
                retained = summary.total,
                "保留清理淘汰旧通知"
            );
            metrics::record_notifications_evicted(eviction.evicted);
            self.publish(summary);
        }
        eviction
    }

    // ==================== 平台通知 ====================

    /// 申请平台通知权限，唯一会挂起等待外部响应的操作
    pub async fn request_permission(&self) -> bool {
        let granted = self.inner.bridge.request_permission().await;
        info!(sink = self.inner.bridge.sink_name(), granted, "平台通知权限申请完成");
        granted
    }

    /// 处理平台通知的点击
    ///
    /// 标记已读、聚焦宿主窗口；跳转目标取自展示时的通知，应用内条目
    /// 已被移除时仍然跳转。
    pub fn handle_platform_click(&self, click: &ClickEvent) {
        self.mark_as_read(&click.notification_id);
        self.inner.host.focus_window();

        if let Some(path) = &click.order_path {
            self.inner.host.navigate(path);
        }
    }

    // ==================== 操作按钮 ====================

    /// 执行通知上第 `index` 个操作按钮，找不到时返回 false
    pub fn invoke_action(&self, id: &str, index: usize) -> bool {
        let action = {
            let state = self.inner.state.lock();
            state
                .store
                .get(id)
                .and_then(|n| n.actions.get(index).cloned())
        };
        let Some(action) = action else {
            return false;
        };

        debug!(notification_id = %id, label = %action.label, "执行通知操作");
        match action.command {
            ActionCommand::Navigate { path } => self.inner.host.navigate(&path),
            ActionCommand::CopyCode { code } => match self.inner.host.copy_to_clipboard(&code) {
                Ok(()) => {
                    self.add_notification(factories::code_copied(&code));
                }
                Err(e) => {
                    warn!(notification_id = %id, error = %e, "复制优惠码失败");
                    metrics::record_delivery_failure("clipboard");
                }
            },
        }
        true
    }

    // ==================== 持久化 ====================

    /// 写入快照，返回写入的通知条数；未配置存储时返回 0
    #[instrument(skip(self))]
    pub fn save(&self) -> Result<usize> {
        let Some(persistence) = &self.inner.persistence else {
            return Ok(0);
        };

        let (notifications, settings) = {
            let state = self.inner.state.lock();
            let notifications: Vec<Notification> = state
                .store
                .iter()
                .take(self.inner.config.persist_limit)
                .cloned()
                .collect();
            (notifications, state.settings.settings().clone())
        };

        let saved = persistence.save(&notifications, &settings)?;
        info!(key = persistence.key(), saved, "通知快照已保存");
        Ok(saved)
    }

    /// 读取快照并替换当前状态，读到快照时返回 true
    ///
    /// 面板状态不在快照中，恢复后保持关闭。
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<bool> {
        let Some(persistence) = &self.inner.persistence else {
            return Ok(false);
        };
        let Some(persisted) = persistence.load()? else {
            return Ok(false);
        };

        let restored = persisted.notifications.len();
        let summary = {
            let mut state = self.inner.state.lock();
            state.settings.replace(persisted.settings);
            state.store.restore(persisted.notifications);
            state.store.close_panel();
            state.summary()
        };

        info!(
            key = persistence.key(),
            restored,
            unread = summary.unread,
            "通知快照已恢复"
        );
        self.publish(summary);
        Ok(true)
    }

    // ==================== 生命周期 ====================

    /// 启动后台任务：保留清理、点击监听，并为恢复的 auto-hide 通知补登计时
    ///
    /// 必须在 tokio 运行时内调用。重复调用只补登缺失的部分。
    #[instrument(skip(self))]
    pub fn start(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .scheduler
            .start_sweep(self.inner.config.sweep_interval, move || {
                match NotificationCenter::upgrade(&weak) {
                    Some(center) => {
                        center.sweep();
                        true
                    }
                    None => false,
                }
            });

        self.start_click_listener();
        self.rearm_auto_hide();

        info!(
            retention_limit = self.inner.config.retention_limit,
            sweep_interval_secs = self.inner.config.sweep_interval.as_secs(),
            sweeping = self.is_running(),
            "通知中心已启动"
        );
    }

    /// 停止后台任务并取消所有未触发的自动隐藏
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let _ = self.inner.shutdown_tx.send(true);

        let sweep = self.inner.scheduler.shutdown();
        let listener = self.inner.click_listener.lock().take();

        let sweep_done = async move {
            if let Some(sweep) = sweep {
                let _ = sweep.await;
            }
        };
        let listener_done = async move {
            match listener {
                Some(listener) => listener.await.ok(),
                None => None,
            }
        };
        let ((), clicks_rx) = futures::future::join(sweep_done, listener_done).await;

        // 监听任务退出时归还接收端，便于再次 start
        if let Some(rx) = clicks_rx {
            *self.inner.clicks_rx.lock() = Some(rx);
        }

        info!("通知中心已停止");
    }

    pub fn is_running(&self) -> bool {
        self.inner.scheduler.is_sweeping()
    }

    // ==================== 内部实现 ====================

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn remove_with_reason(&self, id: &str, reason: &'static str) -> bool {
        let (removed, summary) = {
            let mut state = self.inner.state.lock();
            (state.store.remove(id), state.summary())
        };
        match removed {
            Some(notification) => {
                debug!(
                    notification_id = %id,
                    was_unread = !notification.read,
                    reason,
                    "通知已移除"
                );
                metrics::record_notifications_removed(reason, 1);
                self.publish(summary);
                true
            }
            None => false,
        }
    }

    fn publish(&self, summary: StoreSummary) {
        metrics::set_unread_gauge(summary.unread);
        self.inner.summary_tx.send_replace(summary);
    }

    fn schedule_auto_hide(&self, id: &str, after: Duration) {
        let weak = Arc::downgrade(&self.inner);
        let target = id.to_string();
        self.inner.scheduler.schedule_auto_hide(id, after, move || {
            // 到期时通知可能已被手动移除，remove 对不存在的 id 是 no-op
            if let Some(center) = NotificationCenter::upgrade(&weak) {
                center.remove_with_reason(&target, "auto_hide");
            }
        });
    }

    /// 为尚无计时任务的 auto-hide 通知补登剩余时长
    fn rearm_auto_hide(&self) {
        let default = self.inner.config.default_auto_hide;
        let now = Utc::now();
        let pending: Vec<(String, Duration)> = {
            let state = self.inner.state.lock();
            state
                .store
                .iter()
                .filter(|n| !self.inner.scheduler.has_timer(&n.id))
                .filter_map(|n| {
                    let after = n.auto_hide_after(default)?;
                    let elapsed = (now - n.timestamp).to_std().unwrap_or_default();
                    Some((n.id.clone(), after.saturating_sub(elapsed)))
                })
                .collect()
        };

        for (id, remaining) in pending {
            self.schedule_auto_hide(&id, remaining);
        }
    }

    fn start_click_listener(&self) {
        let mut listener = self.inner.click_listener.lock();
        if listener.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("没有可用的 tokio 运行时，无法监听平台通知点击");
            return;
        };
        let Some(mut clicks_rx) = self.inner.clicks_rx.lock().take() else {
            return;
        };

        self.inner.shutdown_tx.send_replace(false);
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let weak = Arc::downgrade(&self.inner);

        *listener = Some(runtime.spawn(async move {
            loop {
                tokio::select! {
                    clicked = clicks_rx.recv() => {
                        let Some(click) = clicked else { break };
                        let Some(center) = NotificationCenter::upgrade(&weak) else { break };
                        debug!(notification_id = %click.notification_id, "平台通知被点击");
                        center.handle_platform_click(&click);
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            clicks_rx
        }));
    }

    /// 触发旁路投递：平台通知与高优先级提示音
    fn fan_out(&self, notification: Notification, desktop: bool, sound: bool) {
        if sound && notification.priority == Priority::High {
            if let Err(e) = self.inner.audio.play_cue() {
                debug!(notification_id = %notification.id, error = %e, "提示音播放失败，已忽略");
                metrics::record_delivery_failure("sound");
            }
        }

        if !desktop {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            debug!(notification_id = %notification.id, "没有可用的 tokio 运行时，跳过平台通知");
            return;
        };

        let inner = self.inner.clone();
        runtime.spawn(async move {
            if let Err(e) = inner.bridge.show_browser_notification(&notification).await {
                warn!(
                    notification_id = %notification.id,
                    sink = inner.bridge.sink_name(),
                    error = %e,
                    "平台通知发送失败"
                );
                metrics::record_delivery_failure("desktop");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{MockActionHost, MockAudioPlayer, Permission};
    use crate::test_utils::{CountingAudio, RecordingHost, RecordingSink};
    use crate::types::NotificationKind;

    fn info(title: &str) -> NewNotification {
        NewNotification::new(NotificationKind::Info, title, "内容")
    }

    #[test]
    fn test_suppressed_notification_still_returns_id() {
        let center = NotificationCenter::with_defaults();
        center.update_settings(SettingsPatch::default().category(Category::Promotion, false));

        let id = center.add_notification(info("促销").with_category(Category::Promotion));
        assert!(!id.is_empty());
        assert!(center.is_empty());
        assert_eq!(center.unread_count(), 0);

        center.update_settings(SettingsPatch::default().enabled(false));
        let id = center.add_notification(info("系统"));
        assert!(!id.is_empty());
        assert!(center.is_empty());
    }

    #[test]
    fn test_high_priority_plays_sound_once() {
        let mut audio = MockAudioPlayer::new();
        audio.expect_play_cue().times(1).returning(|| Ok(()));
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_audio(Arc::new(audio))
            .build();

        center.add_notification(info("高").with_priority(Priority::High));
        center.add_notification(info("中").with_priority(Priority::Medium));
        center.add_notification(info("低").with_priority(Priority::Low));
        assert_eq!(center.len(), 3);
    }

    #[test]
    fn test_sound_setting_disables_cue() {
        let mut audio = MockAudioPlayer::new();
        audio.expect_play_cue().never();
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_audio(Arc::new(audio))
            .build();
        center.update_settings(SettingsPatch::default().sound(false));

        center.add_notification(info("高").with_priority(Priority::High));
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_audio_failure_does_not_abort_insert() {
        let audio = Arc::new(CountingAudio::failing());
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_audio(audio.clone())
            .build();

        let id = center.add_notification(info("高").with_priority(Priority::High));
        assert_eq!(audio.plays(), 1);
        assert!(center.get(&id).is_some());
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_platform_click_navigates_to_order() {
        let mut host = MockActionHost::new();
        host.expect_focus_window().times(1).return_const(());
        host.expect_navigate()
            .withf(|path| path == "/orders/o-42")
            .times(1)
            .return_const(());
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_host(Arc::new(host))
            .build();

        let id = center.add_notification(
            NewNotification::new(NotificationKind::Order, "订单", "已发货")
                .with_category(Category::Order)
                .with_metadata("orderId", "o-42"),
        );
        let click = ClickEvent::for_notification(&center.get(&id).expect("通知应已入库"));
        center.handle_platform_click(&click);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn test_platform_click_without_order_only_focuses() {
        let host = Arc::new(RecordingHost::new());
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_host(host.clone())
            .build();

        let id = center.add_notification(info("系统").with_metadata("orderId", "o-1"));
        let click = ClickEvent::for_notification(&center.get(&id).expect("通知应已入库"));
        center.handle_platform_click(&click);

        assert_eq!(host.focus_count(), 1);
        assert!(host.navigations().is_empty());
        assert!(center.get(&id).is_some_and(|n| n.read));
    }

    #[test]
    fn test_summary_subscription() {
        let center = NotificationCenter::with_defaults();
        let rx = center.subscribe();

        let id = center.add_notification(info("a"));
        center.add_notification(info("b"));
        assert_eq!(
            *rx.borrow(),
            StoreSummary {
                total: 2,
                unread: 2,
                is_open: false
            }
        );

        center.mark_as_read(&id);
        center.toggle_panel();
        assert_eq!(
            *rx.borrow(),
            StoreSummary {
                total: 2,
                unread: 1,
                is_open: true
            }
        );
    }

    #[test]
    fn test_queries_by_category() {
        let center = NotificationCenter::with_defaults();
        let first = center.add_notification(info("a").with_category(Category::Security));
        center.add_notification(info("b").with_category(Category::Security));
        center.add_notification(info("c").with_category(Category::Account));
        center.mark_as_read(&first);

        assert_eq!(center.by_category(Category::Security).len(), 2);
        assert_eq!(center.unread_by_category(Category::Security), 1);
        assert_eq!(center.unread_by_category(Category::Account), 1);
        assert_eq!(center.unread_by_category(Category::Order), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppressed_notification_has_no_side_effects() {
        let mut audio = MockAudioPlayer::new();
        audio.expect_play_cue().never();
        let sink = Arc::new(RecordingSink::new(Permission::Granted));
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_audio(Arc::new(audio))
            .with_sink(sink.clone())
            .build();
        center.update_settings(SettingsPatch::default().category(Category::Security, false));

        let id = center.add_notification(
            info("安全")
                .with_category(Category::Security)
                .with_priority(Priority::High)
                .with_auto_hide(Some(1000)),
        );
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(!id.is_empty());
        assert!(center.is_empty());
        assert!(sink.shown().is_empty());
        assert!(!center.inner.scheduler.has_timer(&id));
        assert_eq!(center.inner.scheduler.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_sweep_interval_does_not_start_sweep() {
        let config = EngineConfig {
            sweep_interval: Duration::ZERO,
            ..EngineConfig::default()
        };
        let center = NotificationCenter::builder(config).build();

        center.start();
        assert!(!center.is_running());

        // 其余功能不受影响
        let id = center.add_notification(info("临时").with_auto_hide(Some(100)));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(center.get(&id).is_none());
        center.stop().await;
    }

    #[test]
    fn test_invoke_missing_action() {
        let center = NotificationCenter::with_defaults();
        let id = center.add_notification(info("无操作"));
        assert!(!center.invoke_action(&id, 0));
        assert!(!center.invoke_action("missing", 0));
    }

    #[tokio::test]
    async fn test_desktop_failure_is_swallowed() {
        let sink = Arc::new(RecordingSink::failing());
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_sink(sink)
            .build();

        let id = center.add_notification(info("桌面"));
        tokio::task::yield_now().await;
        assert!(center.get(&id).is_some());
        assert_eq!(center.unread_count(), 1);
    }

    #[tokio::test]
    async fn test_desktop_setting_gates_sink() {
        let sink = Arc::new(RecordingSink::new(Permission::Granted));
        let center = NotificationCenter::builder(EngineConfig::default())
            .with_sink(sink.clone())
            .build();
        center.update_settings(SettingsPatch::default().desktop(false));

        center.add_notification(info("桌面"));
        tokio::task::yield_now().await;
        assert!(sink.shown().is_empty());
    }
}
