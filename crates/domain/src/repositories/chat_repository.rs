//! 会话Repository接口定义

use async_trait::async_trait;

use crate::entities::Chat;
use crate::errors::RepositoryError;
use crate::value_objects::{ChatId, MessageId, Timestamp, UserId};

/// 会话Repository接口
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// 创建新会话
    async fn create(&self, chat: Chat) -> Result<Chat, RepositoryError>;

    /// 根据ID查找会话
    async fn find_by_id(&self, id: ChatId) -> Result<Option<Chat>, RepositoryError>;

    /// 查找两个用户之间已有的会话
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Chat>, RepositoryError>;

    /// 获取用户参与的全部会话，最近活动的排在前面
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Chat>, RepositoryError>;

    /// 把新消息挂到会话上
    async fn append_message(
        &self,
        id: ChatId,
        message_id: MessageId,
        preview: String,
        at: Timestamp,
    ) -> Result<Chat, RepositoryError>;

    /// 删除会话
    async fn delete(&self, id: ChatId) -> Result<(), RepositoryError>;
}
