//! 领域事件工厂
//!
//! 把订单、支付、库存、促销等业务状态映射为 (种类, 优先级, 分类, 操作) 组合，
//! 再交给通知中心入库。状态字符串不区分大小写。

use crate::center::NotificationCenter;
use crate::types::{
    ActionCommand, ActionVariant, Category, NewNotification, NotificationAction,
    NotificationKind, Priority,
};

/// 促销通知的自动隐藏时长（毫秒）
pub const PROMOTION_AUTO_HIDE_MS: u64 = 10_000;
/// 库存告警的自动隐藏时长（毫秒）
pub const STOCK_ALERT_AUTO_HIDE_MS: u64 = 8_000;
/// 支付完成通知的自动隐藏时长（毫秒）
pub const PAYMENT_COMPLETED_AUTO_HIDE_MS: u64 = 4_000;
/// 复制成功提示的自动隐藏时长（毫秒）
pub const CODE_COPIED_AUTO_HIDE_MS: u64 = 3_000;

pub(crate) fn order_path(order_id: &str) -> String {
    format!("/orders/{order_id}")
}

fn payment_path(order_id: &str) -> String {
    format!("/orders/{order_id}/payment")
}

fn order_style(status: &str) -> (NotificationKind, Priority) {
    match status.to_ascii_lowercase().as_str() {
        "confirmed" | "delivered" => (NotificationKind::Success, Priority::High),
        "processing" | "shipped" => (NotificationKind::Info, Priority::Medium),
        "cancelled" => (NotificationKind::Warning, Priority::High),
        "refunded" => (NotificationKind::Info, Priority::Medium),
        _ => (NotificationKind::Info, Priority::Medium),
    }
}

/// 构造订单状态通知载荷
pub fn order_update(order_id: &str, status: &str, message: &str) -> NewNotification {
    let (kind, priority) = order_style(status);
    NewNotification::new(kind, "Order Update", message)
        .with_category(Category::Order)
        .with_priority(priority)
        .with_action(NotificationAction::new(
            "View Order",
            ActionCommand::Navigate {
                path: order_path(order_id),
            },
        ))
        .with_metadata("orderId", order_id)
        .with_metadata("status", status)
}

/// 构造支付状态通知载荷
pub fn payment_update(order_id: &str, status: &str) -> NewNotification {
    let base = |kind, title: &str, message: String, priority| {
        NewNotification::new(kind, title, message)
            .with_category(Category::Order)
            .with_priority(priority)
            .with_metadata("orderId", order_id)
            .with_metadata("status", status)
    };

    match status.to_ascii_lowercase().as_str() {
        "processing" => base(
            NotificationKind::Info,
            "Payment Processing",
            format!("Payment for order #{order_id} is being processed."),
            Priority::Medium,
        ),
        "completed" => base(
            NotificationKind::Success,
            "Payment Successful",
            format!("Payment for order #{order_id} was completed."),
            Priority::Medium,
        )
        .with_auto_hide(Some(PAYMENT_COMPLETED_AUTO_HIDE_MS)),
        "failed" => base(
            NotificationKind::Error,
            "Payment Failed",
            format!("Payment for order #{order_id} failed. Please try again."),
            Priority::High,
        )
        .with_action(NotificationAction::new(
            "Retry Payment",
            ActionCommand::Navigate {
                path: payment_path(order_id),
            },
        )),
        "refunded" => base(
            NotificationKind::Info,
            "Payment Refunded",
            format!("Payment for order #{order_id} was refunded."),
            Priority::Medium,
        ),
        "cancelled" => base(
            NotificationKind::Warning,
            "Payment Cancelled",
            format!("Payment for order #{order_id} was cancelled."),
            Priority::Medium,
        ),
        _ => base(
            NotificationKind::Info,
            "Payment Update",
            format!("Payment status for order #{order_id}: {status}"),
            Priority::Medium,
        ),
    }
}

/// 构造库存告警载荷
pub fn stock_alert(product_name: &str, current_stock: u32) -> NewNotification {
    let message = if current_stock == 0 {
        format!("{product_name} is out of stock.")
    } else {
        format!("Only {current_stock} left in stock for {product_name}.")
    };

    NewNotification::new(NotificationKind::Warning, "Low Stock Alert", message)
        .with_category(Category::System)
        .with_priority(Priority::Medium)
        .with_auto_hide(Some(STOCK_ALERT_AUTO_HIDE_MS))
        .with_metadata("productName", product_name)
        .with_metadata("currentStock", current_stock)
}

/// 构造促销通知载荷，带优惠码时附加 "Copy Code" 操作
pub fn promotion(title: &str, message: &str, code: Option<&str>) -> NewNotification {
    let mut payload = NewNotification::new(NotificationKind::Promotion, title, message)
        .with_category(Category::Promotion)
        .with_priority(Priority::Low)
        .with_auto_hide(Some(PROMOTION_AUTO_HIDE_MS));

    if let Some(code) = code {
        payload = payload
            .with_action(
                NotificationAction::new(
                    "Copy Code",
                    ActionCommand::CopyCode {
                        code: code.to_string(),
                    },
                )
                .with_variant(ActionVariant::Secondary),
            )
            .with_metadata("code", code);
    }
    payload
}

/// 优惠码复制成功后的短暂提示
pub(crate) fn code_copied(code: &str) -> NewNotification {
    NewNotification::new(
        NotificationKind::Success,
        "Copied",
        format!("Promo code {code} copied to clipboard."),
    )
    .with_category(Category::System)
    .with_priority(Priority::Low)
    .with_auto_hide(Some(CODE_COPIED_AUTO_HIDE_MS))
}

impl NotificationCenter {
    pub fn notify_order_update(&self, order_id: &str, status: &str, message: &str) -> String {
        self.add_notification(order_update(order_id, status, message))
    }

    pub fn notify_payment_update(&self, order_id: &str, status: &str) -> String {
        self.add_notification(payment_update(order_id, status))
    }

    pub fn notify_stock_alert(&self, product_name: &str, current_stock: u32) -> String {
        self.add_notification(stock_alert(product_name, current_stock))
    }

    pub fn notify_promotion(&self, title: &str, message: &str, code: Option<&str>) -> String {
        self.add_notification(promotion(title, message, code))
    }
}
