//! WebSocket 事件协议
//!
//! 每一帧都是 `{"event": "<name>", "data": <payload>}` 形式的文本消息。

use serde::{Deserialize, Serialize};

use crate::entities::{Chat, ChatMessage, Notification};
use crate::value_objects::{ChatId, NotificationId, UserId};

/// 事件名称常量
pub mod event_names {
    pub const CONNECT_USER: &str = "connect-user";
    pub const DISCONNECT_USER: &str = "disconnect-user";
    pub const RECEIVE_MSG: &str = "receive-msg";
    pub const NEW_CHAT: &str = "new-chat";
    pub const DELETE_CHAT: &str = "delete-chat";
    pub const NEW_NOTIFICATION: &str = "new-notification";
    pub const DELETE_NOTIFICATION: &str = "delete-notification";
}

/// 客户端发往服务器的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    /// 声明当前连接属于某个用户
    #[serde(rename = "connect-user")]
    ConnectUser(UserId),
    /// 注销某个用户的在线状态
    #[serde(rename = "disconnect-user")]
    DisconnectUser(UserId),
}

impl InboundEvent {
    /// 解析客户端文本帧
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// 服务器推送给客户端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    #[serde(rename = "receive-msg")]
    ReceiveMsg(ChatMessage),
    #[serde(rename = "new-chat")]
    NewChat(Chat),
    #[serde(rename = "delete-chat")]
    DeleteChat(ChatId),
    #[serde(rename = "new-notification")]
    NewNotification(Notification),
    #[serde(rename = "delete-notification")]
    DeleteNotification(NotificationId),
}

impl OutboundEvent {
    /// 事件名称，用于日志
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::ReceiveMsg(_) => event_names::RECEIVE_MSG,
            OutboundEvent::NewChat(_) => event_names::NEW_CHAT,
            OutboundEvent::DeleteChat(_) => event_names::DELETE_CHAT,
            OutboundEvent::NewNotification(_) => event_names::NEW_NOTIFICATION,
            OutboundEvent::DeleteNotification(_) => event_names::DELETE_NOTIFICATION,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
