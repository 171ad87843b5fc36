//! Repository接口定义
//!
//! 持久化是实时层之外的协作方；这里只定义实时层需要调用的最小接口，
//! 由基础设施层实现。

pub mod chat_repository;
pub mod message_repository;
pub mod notification_repository;

pub use chat_repository::ChatRepository;
pub use message_repository::MessageRepository;
pub use notification_repository::NotificationRepository;

#[cfg(any(test, feature = "testing"))]
pub use chat_repository::MockChatRepository;
#[cfg(any(test, feature = "testing"))]
pub use message_repository::MockMessageRepository;
#[cfg(any(test, feature = "testing"))]
pub use notification_repository::MockNotificationRepository;
