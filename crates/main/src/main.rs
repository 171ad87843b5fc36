//! 主应用程序入口
//!
//! 加载配置、初始化日志，启动实时网关（WebSocket + HTTP）。

use config::{AppConfig, LoggingConfig};
use infrastructure::MemoryStorage;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

fn init_tracing(logging: &LoggingConfig) {
    // RUST_LOG 优先，未设置时使用配置里的过滤规则
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "无法监听退出信号");
    }
    tracing::info!("收到退出信号，停止服务");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let state = AppState::with_memory_storage(MemoryStorage::new(), &config.websocket);
    let app = router(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        outbound_buffer = config.websocket.outbound_buffer,
        "实时网关启动在 http://{}",
        addr
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
