//! 通知实体定义

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{NotificationId, Timestamp, UserId};

/// 通知标题的最大长度
pub const MAX_TITLE_LENGTH: usize = 200;

/// 通知实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// 通知ID
    pub id: NotificationId,
    /// 接收用户
    pub user_id: UserId,
    /// 通知类型
    #[serde(rename = "type")]
    pub notification_type: String,
    /// 通知标题
    pub title: String,
    /// 通知内容
    pub description: String,
    /// 是否已读
    pub read: bool,
    /// 创建时间
    pub created_at: Timestamp,
}

/// 通知类型常量
pub mod notification_types {
    pub const BOOKING_REQUESTED: &str = "booking_requested";
    pub const BOOKING_CONFIRMED: &str = "booking_confirmed";
    pub const BOOKING_CANCELLED: &str = "booking_cancelled";
    pub const PAYMENT_RECEIVED: &str = "payment_received";
    pub const NEW_MESSAGE: &str = "new_message";
    pub const REVIEW_RECEIVED: &str = "review_received";
    pub const SYSTEM_NOTICE: &str = "system_notice";
}

impl Notification {
    /// 创建新通知
    pub fn new(
        id: NotificationId,
        user_id: UserId,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let notification_type = notification_type.into();
        let title = title.into();

        if user_id.is_unset() {
            return Err(DomainError::validation_error("user_id", "用户ID不能为空"));
        }
        if notification_type.trim().is_empty() {
            return Err(DomainError::validation_error("type", "通知类型不能为空"));
        }
        if title.trim().is_empty() {
            return Err(DomainError::validation_error("title", "通知标题不能为空"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation_error(
                "title",
                format!("通知标题不能超过{}个字符", MAX_TITLE_LENGTH),
            ));
        }

        Ok(Self {
            id,
            user_id,
            notification_type,
            title,
            description: description.into(),
            read: false,
            created_at: now,
        })
    }

    /// 标记为已读
    pub fn mark_as_read(&mut self) {
        self.read = true;
    }
}
