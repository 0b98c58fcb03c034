//! 店铺前端通知引擎
//!
//! 维护用户可见的通知列表与未读计数，按设置过滤新通知，
//! 并把通知旁路投递到系统桌面通知与提示音。
//!
//! 入口是 [`NotificationCenter`]：业务代码通过领域事件工厂
//! （`notify_order_update` 等）或 `add_notification` 产生通知，
//! UI 通过查询方法与 `subscribe()` 读取状态。

pub mod bridge;
pub mod center;
pub mod channels;
pub mod error;
pub mod factories;
pub mod persistence;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod test_utils;
pub mod types;

pub use center::{EngineConfig, NotificationCenter, NotificationCenterBuilder, StoreSummary};
pub use error::{NotificationError, Result};
pub use settings::{CategoryToggles, Settings, SettingsPatch};
pub use types::{
    ActionCommand, ActionVariant, Category, NewNotification, Notification, NotificationAction,
    NotificationKind, Priority,
};
