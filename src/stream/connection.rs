//! 连接管理：一条 WebSocket 连接绑定一个任务
//!
//! 负责建立/拆除连接、维护连通标志、把每个文本帧交给会话。
//! 任务切换时先同步等待旧读循环退出再建新连接；旧任务滞留的缓冲随会话一并丢弃，
//! 不会流入新任务的转写。请求关闭之后到达的帧一律忽略。

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::session::{TaskSession, TaskView};
use crate::error::ClientError;

/// 当前活跃连接
struct ActiveConnection {
    task_id: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// 连接管理器：同一时刻至多一条连接；消费方通过 watch 通道订阅 TaskView
pub struct ConnectionManager {
    ws_base: String,
    view_tx: watch::Sender<TaskView>,
    view_rx: watch::Receiver<TaskView>,
    active: Option<ActiveConnection>,
}

impl ConnectionManager {
    pub fn new(ws_base: &str) -> Self {
        let (view_tx, view_rx) = watch::channel(TaskView::detached());
        Self {
            ws_base: ws_base.trim_end_matches('/').to_string(),
            view_tx,
            view_rx,
            active: None,
        }
    }

    /// 订阅视图更新
    pub fn subscribe(&self) -> watch::Receiver<TaskView> {
        self.view_rx.clone()
    }

    /// 当前绑定的任务 ID
    pub fn task_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.task_id.as_str())
    }

    /// 当前是否连通
    pub fn connected(&self) -> bool {
        self.view_rx.borrow().connected
    }

    /// 为指定任务建立连接；已有连接（无论任务异同）先行拆除。
    /// 建连失败只表现为视图保持未连通，返回错误供调用方决定是否重试。
    pub async fn open(&mut self, task_id: &str) -> Result<(), ClientError> {
        self.close().await;

        let session = TaskSession::new(task_id);
        // 先把旧任务的视图换成新任务的空视图，再去建连
        let _ = self.view_tx.send(session.project(false));

        let url = format!("{}/ws/task/{}", self.ws_base, task_id);
        let conn_id = format!("conn_{}", uuid::Uuid::new_v4());
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;

        tracing::info!(%conn_id, task_id, "WebSocket connected");

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(read_loop(
            ws_stream,
            session,
            self.view_tx.clone(),
            cancel.clone(),
            conn_id,
        ));

        self.active = Some(ActiveConnection {
            task_id: task_id.to_string(),
            cancel,
            handle,
        });
        Ok(())
    }

    /// 拆除当前连接：同步等待读循环退出，保证旧任务不再产生任何投递
    pub async fn close(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            let _ = active.handle.await;
            tracing::info!(task_id = %active.task_id, "Connection closed");
        }
    }
}

async fn read_loop(
    mut ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut session: TaskSession,
    view_tx: watch::Sender<TaskView>,
    cancel: CancellationToken,
    conn_id: String,
) {
    let _ = view_tx.send(session.project(true));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                // 主动关闭：此后到达的帧不再处理
                break;
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        match session.ingest(&text) {
                            Ok(()) => {
                                let _ = view_tx.send(session.project(true));
                            }
                            Err(e) => {
                                tracing::warn!(%conn_id, "Dropping malformed frame: {}", e);
                            }
                        }
                    }
                    // 传输层 keepalive 与二进制帧无语义
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                    Some(Ok(WsMessage::Close(_))) | None => {
                        tracing::info!(%conn_id, "WebSocket closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(%conn_id, "WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    // 连接失败/关闭只体现为连通标志翻转，转写保留最后状态
    let _ = view_tx.send(session.project(false));
}
