use std::sync::Arc;

use domain::{
    Attachment, Chat, ChatId, ChatMessage, ChatRepository, DomainError, MessageId,
    MessageRepository, UserId,
};

use crate::{clock::Clock, delivery::EventDispatcher, error::ApplicationError};

#[derive(Debug, Clone)]
pub struct CreateChatRequest {
    pub initiator_id: UserId,
    pub recipient_id: UserId,
}

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub message: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct DeleteChatRequest {
    pub chat_id: ChatId,
    pub operator_id: UserId, // 执行删除的一方
}

pub struct ChatServiceDependencies {
    pub chat_repository: Arc<dyn ChatRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub dispatcher: Arc<dyn EventDispatcher>,
    pub clock: Arc<dyn Clock>,
}

/// 会话服务
///
/// 每个写操作都是先落库、后投递；落库失败时不会产生任何推送。
pub struct ChatService {
    deps: ChatServiceDependencies,
}

impl ChatService {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        Self { deps }
    }

    async fn load_chat(&self, chat_id: ChatId) -> Result<Chat, ApplicationError> {
        self.deps
            .chat_repository
            .find_by_id(chat_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("chat", chat_id))
    }

    /// 创建（或取回）两个用户之间的会话
    ///
    /// 已有会话直接返回，不再推送 `new-chat`。
    pub async fn create_chat(&self, request: CreateChatRequest) -> Result<Chat, ApplicationError> {
        let CreateChatRequest {
            initiator_id,
            recipient_id,
        } = request;

        let now = self.deps.clock.now();
        let chat = Chat::new(ChatId::generate(), initiator_id, recipient_id, now)?;
        let [initiator_id, recipient_id] = &chat.participants;

        if let Some(existing) = self
            .deps
            .chat_repository
            .find_between(initiator_id, recipient_id)
            .await?
        {
            tracing::debug!(chat_id = %existing.id, "会话已存在");
            return Ok(existing);
        }

        let receiver = recipient_id.clone();
        let chat = self.deps.chat_repository.create(chat).await?;
        tracing::info!(chat_id = %chat.id, receiver = %receiver, "会话已创建");

        self.deps
            .dispatcher
            .deliver_new_chat(chat.clone(), receiver)
            .await;

        Ok(chat)
    }

    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<ChatMessage, ApplicationError> {
        let chat = self.load_chat(request.chat_id).await?;

        let receiver = chat
            .counterpart_of(&request.sender_id)
            .cloned()
            .ok_or_else(|| DomainError::permission_denied("send message to chat"))?;

        let now = self.deps.clock.now();
        let message = ChatMessage::new(
            MessageId::generate(),
            chat.id,
            request.sender_id,
            receiver,
            request.message,
            request.attachments,
            now,
        )?;

        let message = self.deps.message_repository.create(message).await?;
        tracing::debug!(chat_id = %chat.id, message_id = %message.id, "消息已保存");

        // 消息本身已落库，会话摘要更新失败不回滚也不阻止推送
        if let Err(err) = self
            .deps
            .chat_repository
            .append_message(
                chat.id,
                message.id,
                message.preview().to_owned(),
                message.created_at,
            )
            .await
        {
            tracing::warn!(
                chat_id = %chat.id,
                message_id = %message.id,
                error = %err,
                "更新会话摘要失败"
            );
        }

        self.deps
            .dispatcher
            .deliver_message(message.clone())
            .await;

        Ok(message)
    }

    /// 删除会话及其全部消息，双方都会收到 `delete-chat`
    pub async fn delete_chat(&self, request: DeleteChatRequest) -> Result<(), ApplicationError> {
        let chat = self.load_chat(request.chat_id).await?;

        let receiver = chat
            .counterpart_of(&request.operator_id)
            .cloned()
            .ok_or_else(|| DomainError::permission_denied("delete chat"))?;

        let removed = self.deps.message_repository.delete_by_chat(chat.id).await?;
        self.deps.chat_repository.delete(chat.id).await?;
        tracing::info!(chat_id = %chat.id, removed_messages = removed, "会话已删除");

        self.deps
            .dispatcher
            .deliver_chat_deleted(chat.id, receiver, request.operator_id)
            .await;

        Ok(())
    }

    /// 用户参与的会话，最近活动在前
    pub async fn list_chats(&self, user_id: &UserId) -> Result<Vec<Chat>, ApplicationError> {
        Ok(self.deps.chat_repository.list_for_user(user_id).await?)
    }

    /// 会话内的消息，按时间先后排列；只有参与者可以查看
    pub async fn list_messages(
        &self,
        chat_id: ChatId,
        user_id: &UserId,
    ) -> Result<Vec<ChatMessage>, ApplicationError> {
        let chat = self.load_chat(chat_id).await?;
        if !chat.has_participant(user_id) {
            return Err(DomainError::permission_denied("read chat messages").into());
        }

        let mut messages = self.deps.message_repository.list_by_chat(chat_id).await?;
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}
