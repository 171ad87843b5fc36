//! 基础设施层实现。
//!
//! 提供领域层 Repository 接口的内存实现，供单进程部署和集成测试使用。

pub mod repository;

pub use repository::{
    InMemoryChatRepository, InMemoryMessageRepository, InMemoryNotificationRepository,
    MemoryStorage,
};
