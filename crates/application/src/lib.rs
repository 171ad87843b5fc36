//! 应用层实现。
//!
//! 实时层的三件套（连接注册表、在线协议处理器、事件投递器）都在这里，
//! 以及在写入成功后触发投递的会话服务和通知服务。

pub mod clock;
pub mod delivery;
pub mod error;
pub mod presence;
pub mod registry;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use delivery::{DeliveryDispatcher, DeliveryOutcome, DeliveryReport, EventDispatcher};
pub use error::ApplicationError;
pub use presence::{PresenceProtocolHandler, PresenceTransition};
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, PushError, SetOutcome};
pub use services::{
    ChatService, ChatServiceDependencies, CreateChatRequest, CreateNotificationRequest,
    DeleteChatRequest, NotificationService, NotificationServiceDependencies, SendMessageRequest,
};

#[cfg(any(test, feature = "testing"))]
pub use delivery::MockEventDispatcher;
