//! Web API 层。
//!
//! 提供 Axum 路由：统一的 WebSocket 网关，以及会话/通知的 HTTP 接口。

mod error;
mod routes;
mod state;
mod ws_connection;

pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
pub use ws_connection::WebSocketConnection;
