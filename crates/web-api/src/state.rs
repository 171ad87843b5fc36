use std::sync::Arc;

use application::{
    ChatService, ChatServiceDependencies, Clock, ConnectionRegistry, DeliveryDispatcher,
    EventDispatcher, NotificationService, NotificationServiceDependencies,
    PresenceProtocolHandler, SystemClock,
};
use config::WebSocketConfig;
use infrastructure::MemoryStorage;

#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub notification_service: Arc<NotificationService>,
    pub presence: PresenceProtocolHandler,
    pub registry: Arc<ConnectionRegistry>,
    /// 每条连接出站队列的容量
    pub outbound_buffer: usize,
}

impl AppState {
    pub fn new(
        chat_service: Arc<ChatService>,
        notification_service: Arc<NotificationService>,
        registry: Arc<ConnectionRegistry>,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            chat_service,
            notification_service,
            presence: PresenceProtocolHandler::new(registry.clone()),
            registry,
            outbound_buffer,
        }
    }

    /// 用内存存储装配全部依赖
    ///
    /// 注册表只有一份，由在线协议处理器和投递器共享。
    pub fn with_memory_storage(storage: MemoryStorage, websocket: &WebSocketConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher: Arc<dyn EventDispatcher> =
            Arc::new(DeliveryDispatcher::new(registry.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let chat_service = ChatService::new(ChatServiceDependencies {
            chat_repository: storage.chat_repository.clone(),
            message_repository: storage.message_repository.clone(),
            dispatcher: dispatcher.clone(),
            clock: clock.clone(),
        });

        let notification_service = NotificationService::new(NotificationServiceDependencies {
            notification_repository: storage.notification_repository.clone(),
            dispatcher,
            clock,
        });

        Self::new(
            Arc::new(chat_service),
            Arc::new(notification_service),
            registry,
            websocket.outbound_buffer,
        )
    }
}
