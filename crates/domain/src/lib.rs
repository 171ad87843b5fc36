//! 实时通讯层的核心领域模型
//!
//! 包含用户/会话/消息/通知的标识与实体、WebSocket 事件协议，
//! 以及持久化协作方需要实现的 Repository 接口。

pub mod entities;
pub mod errors;
pub mod events;
pub mod repositories;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use repositories::*;
pub use value_objects::*;
