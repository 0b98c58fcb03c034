//! 通知存储
//!
//! 引擎唯一的可变状态：按插入顺序（新的在前）排列的通知列表、派生的未读计数
//! 以及面板可见状态。所有修改方法都在一次调用内完成，并维持
//! `unread_count == 未读条目数` 这一核心不变量。
//!
//! 本模块只负责纯状态变更，不做设置校验以外的任何副作用；投递、计时与持久化
//! 由 [`crate::center::NotificationCenter`] 编排。

use std::collections::VecDeque;

use crate::settings::Settings;
use crate::types::{Category, Notification};

/// 入库结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    /// 总开关关闭
    SuppressedDisabled,
    /// 分类开关关闭
    SuppressedCategory,
}

impl Admission {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// 保留清理的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eviction {
    pub evicted: usize,
    pub unread_evicted: usize,
}

#[derive(Debug, Default)]
pub struct NotificationStore {
    notifications: VecDeque<Notification>,
    unread_count: usize,
    is_open: bool,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据设置决定是否入库，入库时放在最前面并递增未读计数
    pub fn add(&mut self, settings: &Settings, notification: Notification) -> Admission {
        if !settings.enabled {
            return Admission::SuppressedDisabled;
        }
        if !settings.categories.get(notification.category) {
            return Admission::SuppressedCategory;
        }

        if !notification.read {
            self.unread_count += 1;
        }
        self.notifications.push_front(notification);
        Admission::Inserted
    }

    /// 移除指定通知，不存在时返回 None
    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        let index = self.position(id)?;
        let removed = self.notifications.remove(index)?;
        if !removed.read {
            self.unread_count -= 1;
        }
        Some(removed)
    }

    /// 标记已读，只有从未读变为已读时返回 true
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                self.unread_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// 全部标记已读，计数直接归零而不是逐条递减
    pub fn mark_all_as_read(&mut self) {
        for notification in self.notifications.iter_mut() {
            notification.read = true;
        }
        self.unread_count = 0;
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.notifications.len();
        self.notifications.clear();
        self.unread_count = 0;
        removed
    }

    /// 移除某分类下的全部通知，返回移除条数
    pub fn clear_by_category(&mut self, category: Category) -> usize {
        // 先统计再删除，避免基于删除后的状态计算
        let unread_removed = self
            .notifications
            .iter()
            .filter(|n| n.category == category && !n.read)
            .count();

        let before = self.notifications.len();
        self.notifications.retain(|n| n.category != category);
        self.unread_count -= unread_removed;
        before - self.notifications.len()
    }

    /// 截断到最新的 `limit` 条，并扣减被淘汰部分中的未读数量
    pub fn evict_beyond(&mut self, limit: usize) -> Eviction {
        if self.notifications.len() <= limit {
            return Eviction::default();
        }

        let unread_evicted = self
            .notifications
            .iter()
            .skip(limit)
            .filter(|n| !n.read)
            .count();
        let evicted = self.notifications.len() - limit;

        self.notifications.truncate(limit);
        self.unread_count -= unread_evicted;
        Eviction {
            evicted,
            unread_evicted,
        }
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    pub fn close_panel(&mut self) {
        self.is_open = false;
    }

    /// 用快照中的通知替换当前列表，未读计数按列表重新计算
    pub fn restore(&mut self, notifications: Vec<Notification>) {
        self.unread_count = notifications.iter().filter(|n| !n.read).count();
        self.notifications = notifications.into();
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.notifications.iter().position(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsManager;
    use crate::types::{NewNotification, NotificationKind};
    use proptest::prelude::*;

    fn make(category: Category) -> Notification {
        NewNotification::new(NotificationKind::Info, "标题", "内容")
            .with_category(category)
            .into_notification()
    }

    fn actual_unread(store: &NotificationStore) -> usize {
        store.iter().filter(|n| !n.read).count()
    }

    #[test]
    fn test_add_prepends_and_counts() {
        let mut store = NotificationStore::new();
        let settings = Settings::default();

        let first = make(Category::System);
        let second = make(Category::Order);
        let second_id = second.id.clone();

        assert!(store.add(&settings, first).is_inserted());
        assert!(store.add(&settings, second).is_inserted());

        assert_eq!(store.len(), 2);
        assert_eq!(store.unread_count(), 2);
        // 新的在前
        assert_eq!(store.iter().next().map(|n| n.id.as_str()), Some(second_id.as_str()));
    }

    #[test]
    fn test_add_suppressed_by_settings() {
        let mut store = NotificationStore::new();
        let mut manager = SettingsManager::default();
        manager.update(crate::settings::SettingsPatch::default().category(Category::Promotion, false));

        let admission = store.add(manager.settings(), make(Category::Promotion));
        assert_eq!(admission, Admission::SuppressedCategory);
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);

        manager.update(crate::settings::SettingsPatch::default().enabled(false));
        let admission = store.add(manager.settings(), make(Category::System));
        assert_eq!(admission, Admission::SuppressedDisabled);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = NotificationStore::new();
        let notification = make(Category::System);
        let id = notification.id.clone();
        store.add(&Settings::default(), notification);

        assert!(store.remove(&id).is_some());
        assert_eq!(store.unread_count(), 0);
        assert!(store.remove(&id).is_none());
        assert_eq!(store.unread_count(), 0);
        assert!(store.remove("missing").is_none());
    }

    #[test]
    fn test_remove_read_entry_keeps_count() {
        let mut store = NotificationStore::new();
        let settings = Settings::default();
        let read = make(Category::System);
        let read_id = read.id.clone();
        store.add(&settings, read);
        store.add(&settings, make(Category::System));
        store.mark_as_read(&read_id);
        assert_eq!(store.unread_count(), 1);

        store.remove(&read_id);
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_mark_as_read_twice_decrements_once() {
        let mut store = NotificationStore::new();
        let settings = Settings::default();
        let notification = make(Category::System);
        let id = notification.id.clone();
        store.add(&settings, notification);
        store.add(&settings, make(Category::System));

        assert!(store.mark_as_read(&id));
        assert!(!store.mark_as_read(&id));
        assert_eq!(store.unread_count(), 1);
        assert!(!store.mark_as_read("missing"));
    }

    #[test]
    fn test_mark_all_and_clear() {
        let mut store = NotificationStore::new();
        let settings = Settings::default();
        for _ in 0..3 {
            store.add(&settings, make(Category::Order));
        }

        store.mark_all_as_read();
        assert_eq!(store.unread_count(), 0);
        assert!(store.iter().all(|n| n.read));

        assert_eq!(store.clear(), 3);
        assert!(store.is_empty());
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_clear_by_category_counts_unread_before_removal() {
        let mut store = NotificationStore::new();
        let settings = Settings::default();
        let read_order = make(Category::Order);
        let read_id = read_order.id.clone();
        store.add(&settings, read_order);
        store.add(&settings, make(Category::Order));
        store.add(&settings, make(Category::Order));
        store.add(&settings, make(Category::System));
        store.mark_as_read(&read_id);
        assert_eq!(store.unread_count(), 3);

        assert_eq!(store.clear_by_category(Category::Order), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.unread_count(), 1);

        // 不存在的分类是 no-op
        assert_eq!(store.clear_by_category(Category::Security), 0);
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_evict_beyond_limit() {
        let mut store = NotificationStore::new();
        let settings = Settings::default();
        let mut ids = Vec::new();
        for _ in 0..105 {
            let notification = make(Category::System);
            ids.push(notification.id.clone());
            store.add(&settings, notification);
        }
        // 最早插入的两条已读，位于被淘汰的尾部
        store.mark_as_read(&ids[0]);
        store.mark_as_read(&ids[1]);
        assert_eq!(store.unread_count(), 103);

        let eviction = store.evict_beyond(100);
        assert_eq!(eviction.evicted, 5);
        assert_eq!(eviction.unread_evicted, 3);
        assert_eq!(store.len(), 100);
        assert_eq!(store.unread_count(), 100);
        // 最新的一条仍在最前面
        assert_eq!(store.iter().next().map(|n| n.id.as_str()), ids.last().map(String::as_str));

        assert_eq!(store.evict_beyond(100), Eviction::default());
    }

    #[test]
    fn test_panel_state() {
        let mut store = NotificationStore::new();
        assert!(!store.is_open());
        assert!(store.toggle_panel());
        assert!(!store.toggle_panel());
        store.toggle_panel();
        store.close_panel();
        assert!(!store.is_open());
    }

    #[test]
    fn test_restore_recomputes_unread() {
        let mut store = NotificationStore::new();
        let mut read = make(Category::System);
        read.read = true;
        store.restore(vec![make(Category::Order), read, make(Category::System)]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.unread_count(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(usize),
        MarkAsRead(usize),
        MarkAll,
        Clear,
        ClearCategory(u8),
        Evict(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..5).prop_map(Op::Add),
            2 => (0usize..32).prop_map(Op::Remove),
            2 => (0usize..32).prop_map(Op::MarkAsRead),
            1 => Just(Op::MarkAll),
            1 => Just(Op::Clear),
            1 => (0u8..5).prop_map(Op::ClearCategory),
            1 => (0usize..16).prop_map(Op::Evict),
        ]
    }

    proptest! {
        #[test]
        fn prop_unread_count_matches_entries(ops in prop::collection::vec(op_strategy(), 1..120)) {
            let mut store = NotificationStore::new();
            let settings = Settings::default();
            let mut ids: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::Add(c) => {
                        let notification = make(Category::ALL[c as usize]);
                        ids.push(notification.id.clone());
                        store.add(&settings, notification);
                    }
                    Op::Remove(i) => {
                        if let Some(id) = ids.get(i) {
                            store.remove(id);
                        }
                    }
                    Op::MarkAsRead(i) => {
                        if let Some(id) = ids.get(i) {
                            store.mark_as_read(id);
                        }
                    }
                    Op::MarkAll => store.mark_all_as_read(),
                    Op::Clear => {
                        store.clear();
                    }
                    Op::ClearCategory(c) => {
                        store.clear_by_category(Category::ALL[c as usize]);
                    }
                    Op::Evict(limit) => {
                        store.evict_beyond(limit);
                    }
                }
                prop_assert_eq!(store.unread_count(), actual_unread(&store));
            }
        }
    }
}
