//! 领域事件
//!
//! 由会话服务、通知服务在写入成功后立即创建，只被投递器消费一次，
//! 不排队、不重试。

use crate::entities::{Chat, ChatMessage, Notification};
use crate::events::OutboundEvent;
use crate::value_objects::{ChatId, NotificationId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// 新消息，只推给接收方
    MessageDelivered {
        message: ChatMessage,
        receiver: UserId,
    },
    /// 新会话，只推给被动方（发起方已经从创建接口拿到结果）
    ChatCreated { chat: Chat, receiver: UserId },
    /// 会话已删除，双方都要收到
    ChatDeleted {
        chat_id: ChatId,
        receiver: UserId,
        sender: UserId,
    },
    /// 新通知
    NotificationCreated {
        notification: Notification,
        receiver: UserId,
    },
    /// 通知已删除
    NotificationDeleted {
        notification_id: NotificationId,
        receiver: UserId,
    },
}

impl DomainEvent {
    /// 需要推送的目标用户，按推送顺序排列
    pub fn recipients(&self) -> Vec<&UserId> {
        match self {
            DomainEvent::MessageDelivered { receiver, .. }
            | DomainEvent::ChatCreated { receiver, .. }
            | DomainEvent::NotificationCreated { receiver, .. }
            | DomainEvent::NotificationDeleted { receiver, .. } => vec![receiver],
            DomainEvent::ChatDeleted {
                receiver, sender, ..
            } => vec![receiver, sender],
        }
    }

    /// 转换为推送给客户端的事件
    pub fn to_outbound(&self) -> OutboundEvent {
        match self {
            DomainEvent::MessageDelivered { message, .. } => {
                OutboundEvent::ReceiveMsg(message.clone())
            }
            DomainEvent::ChatCreated { chat, .. } => OutboundEvent::NewChat(chat.clone()),
            DomainEvent::ChatDeleted { chat_id, .. } => OutboundEvent::DeleteChat(*chat_id),
            DomainEvent::NotificationCreated { notification, .. } => {
                OutboundEvent::NewNotification(notification.clone())
            }
            DomainEvent::NotificationDeleted {
                notification_id, ..
            } => OutboundEvent::DeleteNotification(*notification_id),
        }
    }
}
