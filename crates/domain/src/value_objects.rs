use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

/// 未登录客户端上报的占位用户ID，永远不能进入在线注册表。
pub const UNSET_USER_ID: &str = "undefined";

/// 用户唯一标识。
///
/// 用户ID来自外部账号体系，在实时层只是一个不透明的字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// 不做校验地包装原始ID（来自传输层的值可能是占位符）。
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 解析经过验证的用户ID，拒绝空值和占位符。
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let id = Self(value.into());
        if id.is_unset() {
            return Err(DomainError::validation_error(
                "user_id",
                "must be a defined user identifier",
            ));
        }
        Ok(id)
    }

    /// 是否为空或 `"undefined"` 占位符
    pub fn is_unset(&self) -> bool {
        let trimmed = self.0.trim();
        trimmed.is_empty() || trimmed == UNSET_USER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 会话唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub Uuid);

impl ChatId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ChatId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ChatId> for Uuid {
    fn from(value: ChatId) -> Self {
        value.0
    }
}

/// 消息唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// 通知唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NotificationId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<NotificationId> for Uuid {
    fn from(value: NotificationId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_user_ids() {
        assert!(UserId::new("undefined").is_unset());
        assert!(UserId::new("").is_unset());
        assert!(UserId::new("  ").is_unset());
        assert!(!UserId::new("u1").is_unset());
    }

    #[test]
    fn test_parse_rejects_sentinel() {
        assert!(UserId::parse("undefined").is_err());
        assert!(UserId::parse("").is_err());
        assert_eq!(UserId::parse("u1").unwrap().as_str(), "u1");
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let user = serde_json::to_string(&UserId::new("u1")).unwrap();
        assert_eq!(user, "\"u1\"");

        let uuid = Uuid::new_v4();
        let chat = serde_json::to_string(&ChatId::new(uuid)).unwrap();
        assert_eq!(chat, format!("\"{}\"", uuid));
    }
}
