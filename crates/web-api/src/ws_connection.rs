use std::collections::HashSet;

use application::{ConnectionHandle, PresenceTransition};
use axum::extract::ws::{Message as WsMessage, WebSocket};
use domain::{InboundEvent, OutboundEvent, UserId};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;

use crate::state::AppState;

/// 单条 WebSocket 连接
///
/// 连接建立时并不知道属于哪个用户，客户端通过 `connect-user` 事件声明身份；
/// 同一条连接可以先后声明多个用户ID，关闭时只清理仍然指向本连接的那些。
pub struct WebSocketConnection {
    state: AppState,
    handle: ConnectionHandle,
    outbound: Option<mpsc::Receiver<OutboundEvent>>,
    /// 本连接声明过的用户ID
    announced: HashSet<UserId>,
}

impl WebSocketConnection {
    pub fn new(state: AppState) -> Self {
        let (handle, outbound) = ConnectionHandle::channel(state.outbound_buffer);
        tracing::info!(connection_id = %handle.id(), "WebSocket 连接已建立");

        Self {
            state,
            handle,
            outbound: Some(outbound),
            announced: HashSet::new(),
        }
    }

    /// 运行连接主循环，直到任一方向结束
    pub async fn run(mut self, socket: WebSocket) {
        let Some(outbound) = self.outbound.take() else {
            return;
        };
        let (sender, mut incoming) = socket.split();

        // 读任务只把 pong 交给写任务，所有对 sender 的写操作都在写任务里
        let (cmd_tx, cmd_rx) = mpsc::channel::<WsCommand>(32);

        let connection_id = self.handle.id();
        let mut send_task = tokio::spawn(Self::write_loop(sender, outbound, cmd_rx));

        tokio::select! {
            _ = &mut send_task => {
                tracing::debug!(connection_id = %connection_id, "WebSocket发送任务完成");
            }
            _ = self.read_loop(&mut incoming, &cmd_tx) => {
                tracing::debug!(connection_id = %connection_id, "WebSocket接收任务完成");
            }
        }

        send_task.abort();

        let removed = self
            .state
            .presence
            .connection_closed(self.announced.iter(), connection_id)
            .await;

        tracing::info!(
            connection_id = %connection_id,
            removed_users = removed,
            "WebSocket连接已断开"
        );
    }

    async fn read_loop(
        &mut self,
        incoming: &mut SplitStream<WebSocket>,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) {
        while let Some(Ok(message)) = incoming.next().await {
            match message {
                WsMessage::Text(text) => self.handle_text(text.as_str()).await,
                WsMessage::Ping(data) => {
                    if cmd_tx.send(WsCommand::SendPong(data.to_vec())).await.is_err() {
                        tracing::warn!("Failed to send pong command");
                        break;
                    }
                }
                WsMessage::Pong(_) => {}
                WsMessage::Binary(_) => {
                    tracing::debug!(connection_id = %self.handle.id(), "忽略二进制帧");
                }
                WsMessage::Close(_) => {
                    tracing::debug!(connection_id = %self.handle.id(), "WebSocket收到关闭消息");
                    break;
                }
            }
        }
    }

    async fn handle_text(&mut self, text: &str) {
        let event = match InboundEvent::from_json(text) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(
                    connection_id = %self.handle.id(),
                    error = %err,
                    "忽略无法解析的客户端事件"
                );
                return;
            }
        };

        let announced = match &event {
            InboundEvent::ConnectUser(user_id) => Some(user_id.clone()),
            InboundEvent::DisconnectUser(_) => None,
        };

        let transition = self.state.presence.handle_event(event, &self.handle).await;

        if let Some(user_id) = announced {
            if !matches!(transition, PresenceTransition::Ignored) {
                self.announced.insert(user_id);
            }
        }
    }

    async fn write_loop(
        mut sender: SplitSink<WebSocket, WsMessage>,
        mut outbound: mpsc::Receiver<OutboundEvent>,
        mut cmd_rx: mpsc::Receiver<WsCommand>,
    ) {
        loop {
            tokio::select! {
                Some(cmd) = cmd_rx.recv() => {
                    match cmd {
                        WsCommand::SendPong(data) => {
                            if sender.send(WsMessage::Pong(data.into())).await.is_err() {
                                tracing::warn!("Failed to send pong message");
                                break;
                            }
                        }
                    }
                }
                event = outbound.recv() => {
                    let Some(event) = event else { break };
                    let payload = match event.to_json() {
                        Ok(json) => json,
                        Err(err) => {
                            tracing::warn!(error = %err, event = event.name(), "failed to serialize websocket payload");
                            continue;
                        }
                    };
                    if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                        tracing::warn!(event = event.name(), "Failed to send websocket event");
                        break;
                    }
                }
            }
        }
    }
}

/// WebSocket 写操作命令
#[derive(Debug)]
enum WsCommand {
    SendPong(Vec<u8>),
}
