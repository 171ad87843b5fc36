//! 事件投递
//!
//! 把领域事件翻译成客户端事件，按用户ID查注册表后推送到对应连接。
//! 收件人离线或推送失败都不是错误，只记日志，调用方（写请求）不受影响。

use std::sync::Arc;

use async_trait::async_trait;
use domain::{
    Chat, ChatId, ChatMessage, DomainEvent, Notification, NotificationId, OutboundEvent, UserId,
};

use crate::registry::{ConnectionRegistry, PushError};

/// 单个收件人的投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    RecipientOffline,
    PushFailed(PushError),
}

/// 一次投递的汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub event: &'static str,
    pub deliveries: Vec<(UserId, DeliveryOutcome)>,
}

impl DeliveryReport {
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            deliveries: Vec::new(),
        }
    }

    pub fn outcome_for(&self, user_id: &UserId) -> Option<DeliveryOutcome> {
        self.deliveries
            .iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, outcome)| *outcome)
    }

    pub fn delivered_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|(_, outcome)| *outcome == DeliveryOutcome::Delivered)
            .count()
    }
}

/// 服务层依赖的投递接口，每种事件一个操作
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// `receive-msg`，只推给消息接收方
    async fn deliver_message(&self, message: ChatMessage) -> DeliveryReport;
    /// `new-chat`，只推给会话的接收方
    async fn deliver_new_chat(&self, chat: Chat, receiver: UserId) -> DeliveryReport;
    /// `delete-chat`，双方各推一次
    async fn deliver_chat_deleted(
        &self,
        chat_id: ChatId,
        receiver: UserId,
        sender: UserId,
    ) -> DeliveryReport;
    async fn deliver_new_notification(&self, notification: Notification) -> DeliveryReport;
    async fn deliver_notification_deleted(
        &self,
        notification_id: NotificationId,
        receiver: UserId,
    ) -> DeliveryReport;
}

/// 基于内存注册表的投递器
#[derive(Clone)]
pub struct DeliveryDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl DeliveryDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 按事件的收件人逐个推送，同一用户只推一次
    pub async fn dispatch(&self, event: DomainEvent) -> DeliveryReport {
        let outbound = event.to_outbound();
        let mut report = DeliveryReport::new(outbound.name());

        for user_id in event.recipients() {
            if report.outcome_for(user_id).is_some() {
                continue;
            }
            let outcome = self.push_to(user_id, outbound.clone()).await;
            report.deliveries.push((user_id.clone(), outcome));
        }

        report
    }

    async fn push_to(&self, user_id: &UserId, event: OutboundEvent) -> DeliveryOutcome {
        let Some(handle) = self.registry.get(user_id).await else {
            tracing::debug!(user_id = %user_id, event = event.name(), "收件人不在线，跳过推送");
            return DeliveryOutcome::RecipientOffline;
        };

        let event_name = event.name();
        match handle.push(event) {
            Ok(()) => {
                tracing::debug!(
                    user_id = %user_id,
                    connection_id = %handle.id(),
                    event = event_name,
                    "事件已推送"
                );
                DeliveryOutcome::Delivered
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %user_id,
                    connection_id = %handle.id(),
                    event = event_name,
                    error = %err,
                    "推送失败"
                );
                DeliveryOutcome::PushFailed(err)
            }
        }
    }
}

#[async_trait]
impl EventDispatcher for DeliveryDispatcher {
    async fn deliver_message(&self, message: ChatMessage) -> DeliveryReport {
        let receiver = message.receiver_id.clone();
        self.dispatch(DomainEvent::MessageDelivered { message, receiver })
            .await
    }

    async fn deliver_new_chat(&self, chat: Chat, receiver: UserId) -> DeliveryReport {
        self.dispatch(DomainEvent::ChatCreated { chat, receiver })
            .await
    }

    async fn deliver_chat_deleted(
        &self,
        chat_id: ChatId,
        receiver: UserId,
        sender: UserId,
    ) -> DeliveryReport {
        self.dispatch(DomainEvent::ChatDeleted {
            chat_id,
            receiver,
            sender,
        })
        .await
    }

    async fn deliver_new_notification(&self, notification: Notification) -> DeliveryReport {
        let receiver = notification.user_id.clone();
        self.dispatch(DomainEvent::NotificationCreated {
            notification,
            receiver,
        })
        .await
    }

    async fn deliver_notification_deleted(
        &self,
        notification_id: NotificationId,
        receiver: UserId,
    ) -> DeliveryReport {
        self.dispatch(DomainEvent::NotificationDeleted {
            notification_id,
            receiver,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionHandle;
    use chrono::Utc;
    use domain::{MessageId, NotificationId};

    fn setup() -> (Arc<ConnectionRegistry>, DeliveryDispatcher) {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = DeliveryDispatcher::new(registry.clone());
        (registry, dispatcher)
    }

    fn message(sender: &str, receiver: &str) -> ChatMessage {
        ChatMessage::new(
            MessageId::generate(),
            ChatId::generate(),
            UserId::new(sender),
            UserId::new(receiver),
            "hi",
            Vec::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_message_reaches_online_receiver_only() {
        let (registry, dispatcher) = setup();
        let (alice, mut alice_rx) = ConnectionHandle::channel(8);
        let (bob, mut bob_rx) = ConnectionHandle::channel(8);
        registry.set(UserId::new("alice"), alice).await;
        registry.set(UserId::new("bob"), bob).await;

        let msg = message("alice", "bob");
        let report = dispatcher.deliver_message(msg.clone()).await;

        assert_eq!(report.event, "receive-msg");
        assert_eq!(
            report.outcome_for(&UserId::new("bob")),
            Some(DeliveryOutcome::Delivered)
        );
        assert_eq!(bob_rx.try_recv().unwrap(), OutboundEvent::ReceiveMsg(msg));
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_offline_receiver_is_not_an_error() {
        let (_registry, dispatcher) = setup();

        let report = dispatcher.deliver_message(message("alice", "bob")).await;

        assert_eq!(
            report.outcome_for(&UserId::new("bob")),
            Some(DeliveryOutcome::RecipientOffline)
        );
        assert_eq!(report.delivered_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_deleted_reaches_both_parties() {
        let (registry, dispatcher) = setup();
        let (h1, mut rx1) = ConnectionHandle::channel(8);
        let (h2, mut rx2) = ConnectionHandle::channel(8);
        registry.set(UserId::new("u1"), h1).await;
        registry.set(UserId::new("u2"), h2).await;

        let chat_id = ChatId::generate();
        let report = dispatcher
            .deliver_chat_deleted(chat_id, UserId::new("u2"), UserId::new("u1"))
            .await;

        assert_eq!(report.delivered_count(), 2);
        assert_eq!(rx1.try_recv().unwrap(), OutboundEvent::DeleteChat(chat_id));
        assert_eq!(rx2.try_recv().unwrap(), OutboundEvent::DeleteChat(chat_id));
    }

    #[tokio::test]
    async fn test_chat_deleted_with_one_party_offline() {
        let (registry, dispatcher) = setup();
        let (h1, mut rx1) = ConnectionHandle::channel(8);
        registry.set(UserId::new("u1"), h1).await;

        let chat_id = ChatId::generate();
        let report = dispatcher
            .deliver_chat_deleted(chat_id, UserId::new("u2"), UserId::new("u1"))
            .await;

        assert_eq!(
            report.outcome_for(&UserId::new("u2")),
            Some(DeliveryOutcome::RecipientOffline)
        );
        assert_eq!(rx1.try_recv().unwrap(), OutboundEvent::DeleteChat(chat_id));
    }

    #[tokio::test]
    async fn test_chat_deleted_with_neither_party_online() {
        let (_registry, dispatcher) = setup();

        let report = dispatcher
            .deliver_chat_deleted(ChatId::generate(), UserId::new("u2"), UserId::new("u1"))
            .await;

        assert_eq!(
            report.deliveries,
            vec![
                (UserId::new("u2"), DeliveryOutcome::RecipientOffline),
                (UserId::new("u1"), DeliveryOutcome::RecipientOffline),
            ]
        );
        assert_eq!(report.delivered_count(), 0);
    }

    #[tokio::test]
    async fn test_new_chat_reaches_receiver_only() {
        let (registry, dispatcher) = setup();
        let (client, mut client_rx) = ConnectionHandle::channel(8);
        let (photographer, mut photographer_rx) = ConnectionHandle::channel(8);
        registry.set(UserId::new("client-1"), client).await;
        registry.set(UserId::new("photographer-1"), photographer).await;

        let chat = Chat::new(
            ChatId::generate(),
            UserId::new("client-1"),
            UserId::new("photographer-1"),
            Utc::now(),
        )
        .unwrap();
        let report = dispatcher
            .deliver_new_chat(chat.clone(), UserId::new("photographer-1"))
            .await;

        assert_eq!(report.event, "new-chat");
        assert_eq!(report.delivered_count(), 1);
        assert_eq!(photographer_rx.try_recv().unwrap(), OutboundEvent::NewChat(chat));
        assert!(client_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_connection_reports_push_failed() {
        let (registry, dispatcher) = setup();
        let (handle, rx) = ConnectionHandle::channel(8);
        registry.set(UserId::new("u1"), handle).await;
        drop(rx);

        let report = dispatcher
            .deliver_notification_deleted(NotificationId::generate(), UserId::new("u1"))
            .await;

        assert_eq!(
            report.outcome_for(&UserId::new("u1")),
            Some(DeliveryOutcome::PushFailed(PushError::Closed))
        );
        // 推送失败不会清理注册表
        assert!(registry.is_online(&UserId::new("u1")).await);
    }

    #[tokio::test]
    async fn test_new_notification_goes_to_owner() {
        let (registry, dispatcher) = setup();
        let (handle, mut rx) = ConnectionHandle::channel(8);
        registry.set(UserId::new("u1"), handle).await;

        let notification = Notification::new(
            NotificationId::generate(),
            UserId::new("u1"),
            domain::notification_types::BOOKING_REQUESTED,
            "新的预约",
            "有人预约了你的拍摄",
            Utc::now(),
        )
        .unwrap();

        let report = dispatcher.deliver_new_notification(notification.clone()).await;

        assert_eq!(report.event, "new-notification");
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::NewNotification(notification)
        );
    }
}
