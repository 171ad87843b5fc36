//! 消息Repository接口定义

use async_trait::async_trait;

use crate::entities::ChatMessage;
use crate::errors::RepositoryError;
use crate::value_objects::ChatId;

/// 消息Repository接口
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 保存消息，返回持久化后的记录
    async fn create(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError>;

    /// 获取会话的全部消息，按发送时间升序
    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// 删除会话的全部消息，返回删除条数
    async fn delete_by_chat(&self, chat_id: ChatId) -> Result<u64, RepositoryError>;
}
