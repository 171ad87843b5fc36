use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{
    Chat, ChatId, ChatMessage, ChatRepository, MessageId, MessageRepository, Notification,
    NotificationId, NotificationRepository, RepositoryError, Timestamp, UserId,
};
use tokio::sync::RwLock;

/// 内存会话仓储实现
#[derive(Default)]
pub struct InMemoryChatRepository {
    chats: RwLock<HashMap<ChatId, Chat>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError> {
        let mut chats = self.chats.write().await;
        if chats.contains_key(&chat.id) {
            return Err(RepositoryError::Conflict);
        }
        // 同一对用户只能有一个会话
        let [a, b] = &chat.participants;
        if chats.values().any(|existing| existing.connects(a, b)) {
            return Err(RepositoryError::Conflict);
        }
        chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn find_by_id(&self, id: ChatId) -> Result<Option<Chat>, RepositoryError> {
        let chats = self.chats.read().await;
        Ok(chats.get(&id).cloned())
    }

    async fn find_between(&self, a: &UserId, b: &UserId) -> Result<Option<Chat>, RepositoryError> {
        let chats = self.chats.read().await;
        Ok(chats.values().find(|chat| chat.connects(a, b)).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Chat>, RepositoryError> {
        let chats = self.chats.read().await;
        let mut result: Vec<Chat> = chats
            .values()
            .filter(|chat| chat.has_participant(user_id))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }

    async fn append_message(
        &self,
        id: ChatId,
        message_id: MessageId,
        preview: String,
        at: Timestamp,
    ) -> Result<Chat, RepositoryError> {
        let mut chats = self.chats.write().await;
        let chat = chats.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        chat.record_message(message_id, &preview, at);
        Ok(chat.clone())
    }

    async fn delete(&self, id: ChatId) -> Result<(), RepositoryError> {
        let mut chats = self.chats.write().await;
        chats.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// 内存消息仓储实现
///
/// 按会话分组保存，组内保持写入顺序。
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<HashMap<ChatId, Vec<ChatMessage>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError> {
        let mut messages = self.messages.write().await;
        let chat_messages = messages.entry(message.chat_id).or_default();
        if chat_messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::Conflict);
        }
        chat_messages.push(message.clone());
        Ok(message)
    }

    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.read().await;
        Ok(messages.get(&chat_id).cloned().unwrap_or_default())
    }

    async fn delete_by_chat(&self, chat_id: ChatId) -> Result<u64, RepositoryError> {
        let mut messages = self.messages.write().await;
        let removed = messages.remove(&chat_id).map(|m| m.len()).unwrap_or(0);
        Ok(removed as u64)
    }
}

/// 内存通知仓储实现
#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: Notification) -> Result<Notification, RepositoryError> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&notification.id) {
            return Err(RepositoryError::Conflict);
        }
        notifications.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, RepositoryError> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }

    async fn update(&self, notification: Notification) -> Result<Notification, RepositoryError> {
        let mut notifications = self.notifications.write().await;
        let slot = notifications
            .get_mut(&notification.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = notification.clone();
        Ok(notification)
    }

    async fn delete(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let mut notifications = self.notifications.write().await;
        notifications
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = self.notifications.read().await;
        let mut result: Vec<Notification> = notifications
            .values()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub chat_repository: Arc<InMemoryChatRepository>,
    pub message_repository: Arc<InMemoryMessageRepository>,
    pub notification_repository: Arc<InMemoryNotificationRepository>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        tracing::debug!("使用内存存储");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::notification_types;

    fn chat(a: &str, b: &str) -> Chat {
        Chat::new(ChatId::generate(), a.into(), b.into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_chat_lookup_is_direction_agnostic() {
        let repo = InMemoryChatRepository::new();
        let created = repo.create(chat("u1", "u2")).await.unwrap();

        let found = repo
            .find_between(&UserId::new("u2"), &UserId::new("u1"))
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(created.id));

        // 同一对用户不能有第二个会话
        let duplicate = repo.create(chat("u2", "u1")).await;
        assert_eq!(duplicate, Err(RepositoryError::Conflict));
    }

    #[tokio::test]
    async fn test_chat_list_orders_by_recent_activity() {
        let repo = InMemoryChatRepository::new();
        let first = repo.create(chat("u1", "u2")).await.unwrap();
        let second = repo.create(chat("u1", "u3")).await.unwrap();
        repo.create(chat("u4", "u5")).await.unwrap();

        let later = Utc::now() + Duration::seconds(30);
        repo.append_message(first.id, MessageId::generate(), "hi".into(), later)
            .await
            .unwrap();

        let listed = repo.list_for_user(&UserId::new("u1")).await.unwrap();
        let ids: Vec<ChatId> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(listed[0].last_message.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_delete_missing_chat_is_not_found() {
        let repo = InMemoryChatRepository::new();
        assert_eq!(
            repo.delete(ChatId::generate()).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_messages_keep_insertion_order_and_delete_by_chat() {
        let repo = InMemoryMessageRepository::new();
        let chat_id = ChatId::generate();

        for text in ["one", "two", "three"] {
            let message = ChatMessage::new(
                MessageId::generate(),
                chat_id,
                "u1".into(),
                "u2".into(),
                text,
                Vec::new(),
                Utc::now(),
            )
            .unwrap();
            repo.create(message).await.unwrap();
        }

        let texts: Vec<String> = repo
            .list_by_chat(chat_id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message)
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);

        assert_eq!(repo.delete_by_chat(chat_id).await.unwrap(), 3);
        assert!(repo.list_by_chat(chat_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_update_and_delete() {
        let repo = InMemoryNotificationRepository::new();
        let mut notification = Notification::new(
            NotificationId::generate(),
            "u1".into(),
            notification_types::SYSTEM_NOTICE,
            "维护通知",
            "今晚系统维护",
            Utc::now(),
        )
        .unwrap();
        repo.create(notification.clone()).await.unwrap();

        notification.mark_as_read();
        repo.update(notification.clone()).await.unwrap();
        let stored = repo.find_by_id(notification.id).await.unwrap().unwrap();
        assert!(stored.read);

        assert_eq!(repo.list_for_user(&UserId::new("u1")).await.unwrap().len(), 1);
        repo.delete(notification.id).await.unwrap();
        assert_eq!(
            repo.delete(notification.id).await,
            Err(RepositoryError::NotFound)
        );
    }
}
