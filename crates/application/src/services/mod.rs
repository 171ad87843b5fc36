mod chat_service;
mod notification_service;

pub use chat_service::{
    ChatService, ChatServiceDependencies, CreateChatRequest, DeleteChatRequest,
    SendMessageRequest,
};
pub use notification_service::{
    CreateNotificationRequest, NotificationService, NotificationServiceDependencies,
};
