//! 实时事件定义
//!
//! - `InboundEvent` / `OutboundEvent`：WebSocket 上的 JSON 帧
//! - `DomainEvent`：领域服务在持久化成功后产生、交给投递器的事件

pub mod domain_event;
pub mod realtime_event;

pub use domain_event::DomainEvent;
pub use realtime_event::{event_names, InboundEvent, OutboundEvent};
