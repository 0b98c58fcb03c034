//! 通知设置
//!
//! 总开关、各投递渠道开关与各分类开关。设置随快照持久化，永不过期。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// 各分类的开关，与总开关相互独立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    pub system: bool,
    pub order: bool,
    pub promotion: bool,
    pub account: bool,
    pub security: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            system: true,
            order: true,
            promotion: true,
            account: true,
            security: true,
        }
    }
}

impl CategoryToggles {
    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::System => self.system,
            Category::Order => self.order,
            Category::Promotion => self.promotion,
            Category::Account => self.account,
            Category::Security => self.security,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        let slot = match category {
            Category::System => &mut self.system,
            Category::Order => &mut self.order,
            Category::Promotion => &mut self.promotion,
            Category::Account => &mut self.account,
            Category::Security => &mut self.security,
        };
        *slot = enabled;
    }
}

/// 通知设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 总开关，关闭时任何通知都不会入库
    pub enabled: bool,
    pub sound: bool,
    pub desktop: bool,
    pub email: bool,
    pub categories: CategoryToggles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            desktop: true,
            email: false,
            categories: CategoryToggles::default(),
        }
    }
}

/// 设置的局部更新
///
/// 未填写的字段保持原值，`categories` 按 key 逐项合并。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub enabled: Option<bool>,
    pub sound: Option<bool>,
    pub desktop: Option<bool>,
    pub email: Option<bool>,
    pub categories: BTreeMap<Category, bool>,
}

impl SettingsPatch {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn sound(mut self, sound: bool) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn desktop(mut self, desktop: bool) -> Self {
        self.desktop = Some(desktop);
        self
    }

    pub fn email(mut self, email: bool) -> Self {
        self.email = Some(email);
        self
    }

    pub fn category(mut self, category: Category, enabled: bool) -> Self {
        self.categories.insert(category, enabled);
        self
    }
}

/// 设置管理器
#[derive(Debug, Clone, Default)]
pub struct SettingsManager {
    settings: Settings,
}

impl SettingsManager {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 浅合并局部更新，分类开关逐项合并而非整体替换
    pub fn update(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            enabled,
            sound,
            desktop,
            email,
            categories,
        } = patch;

        if let Some(enabled) = enabled {
            self.settings.enabled = enabled;
        }
        if let Some(sound) = sound {
            self.settings.sound = sound;
        }
        if let Some(desktop) = desktop {
            self.settings.desktop = desktop;
        }
        if let Some(email) = email {
            self.settings.email = email;
        }
        for (category, enabled) in categories {
            self.settings.categories.set(category, enabled);
        }
    }

    /// 恢复默认设置
    pub fn reset(&mut self) {
        self.settings = Settings::default();
    }

    pub fn replace(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn is_category_enabled(&self, category: Category) -> bool {
        self.settings.categories.get(category)
    }

    /// 总开关与分类开关同时打开时才允许入库
    pub fn allows(&self, category: Category) -> bool {
        self.settings.enabled && self.is_category_enabled(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let manager = SettingsManager::default();
        let settings = manager.settings();
        assert!(settings.enabled);
        assert!(settings.sound);
        assert!(settings.desktop);
        assert!(!settings.email);
        for category in Category::ALL {
            assert!(manager.is_category_enabled(category));
        }
    }

    #[test]
    fn test_partial_category_update_keeps_others() {
        let mut manager = SettingsManager::default();
        manager.update(SettingsPatch::default().category(Category::Promotion, false));
        manager.update(SettingsPatch::default().category(Category::Order, false));

        assert!(!manager.is_category_enabled(Category::Order));
        assert!(!manager.is_category_enabled(Category::Promotion));
        assert!(manager.is_category_enabled(Category::System));
        assert!(manager.is_category_enabled(Category::Account));
        assert!(manager.is_category_enabled(Category::Security));
        // 顶层字段未被触碰
        assert!(manager.settings().enabled);
        assert!(manager.settings().sound);
    }

    #[test]
    fn test_shallow_merge_of_channels() {
        let mut manager = SettingsManager::default();
        manager.update(SettingsPatch::default().sound(false).email(true));

        let settings = manager.settings();
        assert!(!settings.sound);
        assert!(settings.email);
        assert!(settings.desktop);
        assert!(settings.enabled);
    }

    #[test]
    fn test_allows_respects_master_switch() {
        let mut manager = SettingsManager::default();
        assert!(manager.allows(Category::Order));

        manager.update(SettingsPatch::default().enabled(false));
        // 分类开关保持打开，但总开关关闭时一律不允许
        assert!(manager.is_category_enabled(Category::Order));
        assert!(!manager.allows(Category::Order));

        manager.reset();
        assert!(manager.allows(Category::Order));
    }

    #[test]
    fn test_patch_from_json() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"categories":{"order":false}}"#).expect("解析失败");
        let mut manager = SettingsManager::default();
        manager.update(patch);

        assert!(!manager.is_category_enabled(Category::Order));
        assert!(manager.is_category_enabled(Category::System));
        assert!(manager.is_category_enabled(Category::Promotion));
    }
}
