//! 在线协议处理器
//!
//! 处理客户端的 `connect-user` / `disconnect-user` 事件并维护注册表：
//!
//! - `"undefined"`（或空）用户ID：忽略
//! - 同一条连接重复声明：幂等，不写注册表
//! - 其他情况（离线，或在线但连接不同）：覆盖为新连接
//! - 断开：无条件删除该用户ID的映射
//!
//! 两种转换都不会回执给客户端。

use std::sync::Arc;

use domain::{InboundEvent, UserId};

use crate::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, SetOutcome};

/// 一次协议事件导致的状态变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// 非法用户ID，被忽略
    Ignored,
    /// 同一条连接重复声明
    Unchanged,
    /// Offline -> Online
    Online,
    /// Online(旧连接) -> Online(新连接)
    Replaced { previous: ConnectionId },
    /// Online -> Offline
    Offline,
    /// 本来就离线
    AlreadyOffline,
}

#[derive(Clone)]
pub struct PresenceProtocolHandler {
    registry: Arc<ConnectionRegistry>,
}

impl PresenceProtocolHandler {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// 分发一个入站事件
    pub async fn handle_event(
        &self,
        event: InboundEvent,
        handle: &ConnectionHandle,
    ) -> PresenceTransition {
        match event {
            InboundEvent::ConnectUser(user_id) => self.connect(user_id, handle).await,
            InboundEvent::DisconnectUser(user_id) => self.disconnect(&user_id).await,
        }
    }

    pub async fn connect(&self, user_id: UserId, handle: &ConnectionHandle) -> PresenceTransition {
        if user_id.is_unset() {
            tracing::warn!(
                connection_id = %handle.id(),
                "忽略未认证用户的上线请求"
            );
            return PresenceTransition::Ignored;
        }

        let transition = match self.registry.set_unless_current(user_id.clone(), handle).await {
            SetOutcome::Inserted => PresenceTransition::Online,
            SetOutcome::Replaced { previous } => PresenceTransition::Replaced { previous },
            SetOutcome::Unchanged => PresenceTransition::Unchanged,
        };

        match transition {
            PresenceTransition::Online => {
                tracing::info!(user_id = %user_id, connection_id = %handle.id(), "用户上线");
            }
            PresenceTransition::Replaced { previous } => {
                tracing::info!(
                    user_id = %user_id,
                    connection_id = %handle.id(),
                    previous_connection_id = %previous,
                    "用户连接已替换"
                );
            }
            _ => {
                tracing::debug!(user_id = %user_id, connection_id = %handle.id(), "重复上线声明");
            }
        }

        transition
    }

    pub async fn disconnect(&self, user_id: &UserId) -> PresenceTransition {
        match self.registry.remove(user_id).await {
            Some(previous) => {
                tracing::info!(user_id = %user_id, connection_id = %previous.id(), "用户下线");
                PresenceTransition::Offline
            }
            None => PresenceTransition::AlreadyOffline,
        }
    }

    /// 传输层关闭时的清理
    ///
    /// 只删除仍然指向该连接的映射，用户已经在别的连接上重新上线则保留。
    pub async fn connection_closed<'a>(
        &self,
        user_ids: impl IntoIterator<Item = &'a UserId>,
        connection_id: ConnectionId,
    ) -> usize {
        let mut removed = 0;
        for user_id in user_ids {
            if self.registry.remove_if_current(user_id, connection_id).await {
                removed += 1;
                tracing::info!(user_id = %user_id, connection_id = %connection_id, "连接关闭，用户下线");
            }
        }
        removed
    }
}
