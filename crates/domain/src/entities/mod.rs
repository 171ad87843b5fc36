//! 领域实体定义
//!
//! 包含实时层需要推送的核心实体：会话、消息、通知。

pub mod chat;
pub mod message;
pub mod notification;

// 重新导出核心实体
pub use chat::Chat;
pub use message::{Attachment, ChatMessage, MAX_MESSAGE_LENGTH};
pub use notification::{notification_types, Notification, MAX_TITLE_LENGTH};
