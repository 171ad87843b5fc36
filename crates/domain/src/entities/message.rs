//! 消息实体定义
//!
//! 包含消息的核心信息和附件。

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ChatId, MessageId, Timestamp, UserId};

/// 单条消息的最大长度
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// 消息附件信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// 文件URL
    pub url: String,
    /// 文件名
    pub file_name: Option<String>,
    /// MIME类型
    pub mime_type: Option<String>,
}

impl Attachment {
    /// 创建新的消息附件
    pub fn new(url: impl Into<String>) -> DomainResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(DomainError::validation_error("url", "文件URL不能为空"));
        }

        Ok(Self {
            url,
            file_name: None,
            mime_type: None,
        })
    }
}

/// 会话消息实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// 消息ID
    pub id: MessageId,
    /// 所属会话
    pub chat_id: ChatId,
    /// 发送者
    pub sender_id: UserId,
    /// 接收者
    pub receiver_id: UserId,
    /// 消息文本
    pub message: String,
    /// 附件列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// 发送时间
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// 创建新消息
    ///
    /// 文本为空时必须至少带一个附件。
    pub fn new(
        id: MessageId,
        chat_id: ChatId,
        sender_id: UserId,
        receiver_id: UserId,
        message: impl Into<String>,
        attachments: Vec<Attachment>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let message = message.into();

        if message.trim().is_empty() && attachments.is_empty() {
            return Err(DomainError::validation_error(
                "message",
                "消息内容和附件不能同时为空",
            ));
        }

        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::validation_error(
                "message",
                format!("消息长度不能超过{}个字符", MAX_MESSAGE_LENGTH),
            ));
        }

        Ok(Self {
            id,
            chat_id,
            sender_id,
            receiver_id,
            message,
            attachments,
            created_at: now,
        })
    }

    /// 会话列表里展示的文本预览
    pub fn preview(&self) -> &str {
        if self.message.trim().is_empty() {
            "[attachment]"
        } else {
            &self.message
        }
    }
}
