//! 连接注册表
//!
//! 进程内的 `用户ID -> 连接句柄` 映射。注册表只持有句柄的克隆（发送端），
//! 连接本身归传输层所有；注册表不会自己探测连接是否存活。

use std::collections::HashMap;
use std::fmt;

use domain::{OutboundEvent, UserId};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// 单条 WebSocket 连接的唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 推送失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("connection closed")]
    Closed,
    #[error("outbound queue full")]
    QueueFull,
}

/// 连接句柄
///
/// 指向某个客户端连接的出站队列。两个句柄相等当且仅当它们指向同一条连接。
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<OutboundEvent>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::Sender<OutboundEvent>) -> Self {
        Self {
            id: ConnectionId::generate(),
            sender,
        }
    }

    /// 创建句柄以及对应的出站队列接收端（由连接的写任务消费）
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// 非阻塞地把事件放进出站队列
    pub fn push(&self, event: OutboundEvent) -> Result<(), PushError> {
        self.sender.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Closed(_) => PushError::Closed,
            mpsc::error::TrySendError::Full(_) => PushError::QueueFull,
        })
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

/// `set_unless_current` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// 之前没有记录
    Inserted,
    /// 覆盖了另一条连接
    Replaced { previous: ConnectionId },
    /// 已经是同一条连接，未写入
    Unchanged,
}

/// 内存中的连接注册表
///
/// 每个用户ID最多对应一个句柄；所有修改都是整键替换或删除，
/// 并发写同一个键时以最后一次写入为准。
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或替换映射，返回被替换的旧句柄
    pub async fn set(&self, user_id: UserId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut connections = self.connections.write().await;
        connections.insert(user_id, handle)
    }

    /// 在同一把写锁内比较并写入：已是同一连接时不做任何写入
    pub async fn set_unless_current(&self, user_id: UserId, handle: &ConnectionHandle) -> SetOutcome {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(current) if current == handle => SetOutcome::Unchanged,
            Some(current) => {
                let previous = current.id();
                connections.insert(user_id, handle.clone());
                SetOutcome::Replaced { previous }
            }
            None => {
                connections.insert(user_id, handle.clone());
                SetOutcome::Inserted
            }
        }
    }

    /// 查找用户当前的连接；离线返回 `None`
    pub async fn get(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        let connections = self.connections.read().await;
        connections.get(user_id).cloned()
    }

    /// 删除映射；不存在时什么都不做
    pub async fn remove(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        let mut connections = self.connections.write().await;
        connections.remove(user_id)
    }

    /// 仅当映射仍指向给定连接时才删除
    pub async fn remove_if_current(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(user_id) {
            Some(current) if current.id() == connection_id => {
                connections.remove(user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.connections.read().await.contains_key(user_id)
    }

    /// 当前在线的用户ID，按字典序排列
    pub async fn online_users(&self) -> Vec<UserId> {
        let connections = self.connections.read().await;
        let mut users: Vec<UserId> = connections.keys().cloned().collect();
        users.sort();
        users
    }

    /// 当前在线用户数
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
