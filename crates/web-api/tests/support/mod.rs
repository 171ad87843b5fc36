#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use config::AppConfig;
use futures_util::{SinkExt, StreamExt};
use infrastructure::MemoryStorage;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::oneshot, time::timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use web_api::{router, AppState};

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub http: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// 在随机端口上启动使用内存存储的完整路由
    pub async fn spawn() -> Self {
        let config = AppConfig::default();
        let state = AppState::with_memory_storage(MemoryStorage::new(), &config.websocket);
        let router = router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            http: reqwest::Client::new(),
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn open_socket(&self) -> WsClient {
        let (ws, _) = connect_async(format!("ws://{}/api/v1/ws", self.addr))
            .await
            .expect("ws connect");
        ws
    }

    pub async fn is_online(&self, user_id: &str) -> bool {
        let body: Value = self
            .http
            .get(self.url(&format!("/api/v1/presence/{}", user_id)))
            .send()
            .await
            .expect("presence request")
            .json()
            .await
            .expect("presence json");
        body["online"].as_bool().expect("online flag")
    }

    pub async fn online_count(&self) -> u64 {
        let body: Value = self
            .http
            .get(self.url("/api/v1/presence"))
            .send()
            .await
            .expect("presence count request")
            .json()
            .await
            .expect("presence count json");
        body["online_users"].as_u64().expect("online_users")
    }

    /// 注册是异步处理的，轮询直到在线状态符合预期
    pub async fn wait_for_presence(&self, user_id: &str, online: bool) {
        for _ in 0..50 {
            if self.is_online(user_id).await == online {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("user {} never became online={}", user_id, online);
    }

    /// 打开连接并以指定用户身份上线
    pub async fn connect_user(&self, user_id: &str) -> WsClient {
        let mut ws = self.open_socket().await;
        announce(&mut ws, "connect-user", user_id).await;
        self.wait_for_presence(user_id, true).await;
        ws
    }

    pub async fn create_chat(&self, initiator: &str, recipient: &str) -> Value {
        let response = self
            .http
            .post(self.url("/api/v1/chats"))
            .json(&json!({ "initiator_id": initiator, "recipient_id": recipient }))
            .send()
            .await
            .expect("create chat");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("chat json")
    }

    pub async fn delete_chat(&self, chat_id: &str, operator: &str) {
        let response = self
            .http
            .delete(self.url(&format!("/api/v1/chats/{}?user_id={}", chat_id, operator)))
            .send()
            .await
            .expect("delete chat");
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn announce(ws: &mut WsClient, event: &str, user_id: &str) {
    let frame = json!({ "event": event, "data": user_id }).to_string();
    ws.send(Message::Text(frame.into())).await.expect("send frame");
}

/// 读取下一个事件帧
pub async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let message = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("event json");
        }
    }
}

/// 在一小段时间内没有收到任何事件
pub async fn assert_no_event(ws: &mut WsClient) {
    match timeout(Duration::from_millis(200), ws.next()).await {
        Err(_) => {}
        Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected event: {}", text.as_str()),
        Ok(_) => {}
    }
}
