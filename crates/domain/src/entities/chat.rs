//! 会话实体定义
//!
//! 一个会话只在两个参与者（摄影师与客户、或用户与管理员）之间建立。

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ChatId, MessageId, Timestamp, UserId};

/// 会话实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// 会话ID
    pub id: ChatId,
    /// 两个参与者，顺序为 [发起方, 接收方]
    pub participants: [UserId; 2],
    /// 会话内消息ID，按发送顺序排列
    pub messages: Vec<MessageId>,
    /// 最后一条消息的文本预览
    pub last_message: Option<String>,
    /// 创建时间
    pub created_at: Timestamp,
    /// 最后活动时间
    pub updated_at: Timestamp,
}

impl Chat {
    /// 创建新会话
    pub fn new(
        id: ChatId,
        initiator: UserId,
        recipient: UserId,
        now: Timestamp,
    ) -> DomainResult<Self> {
        if initiator.is_unset() {
            return Err(DomainError::validation_error("initiator_id", "用户ID不能为空"));
        }
        if recipient.is_unset() {
            return Err(DomainError::validation_error("recipient_id", "用户ID不能为空"));
        }
        if initiator == recipient {
            return Err(DomainError::business_rule_violation(
                "不能与自己创建会话",
            ));
        }

        Ok(Self {
            id,
            participants: [initiator, recipient],
            messages: Vec::new(),
            last_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// 检查用户是否是会话参与者
    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// 获取会话中的另一方
    pub fn counterpart_of(&self, user_id: &UserId) -> Option<&UserId> {
        match &self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    /// 两个会话是否连接同一对用户（不区分方向）
    pub fn connects(&self, a: &UserId, b: &UserId) -> bool {
        self.has_participant(a) && self.has_participant(b)
    }

    /// 记录新消息
    pub fn record_message(&mut self, message_id: MessageId, preview: &str, at: Timestamp) {
        self.messages.push(message_id);
        self.last_message = Some(preview.to_owned());
        self.updated_at = at;
    }
}
