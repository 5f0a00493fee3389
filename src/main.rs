//! Reel - 视频生成任务流监控器
//!
//! 入口：初始化日志、读取任务 ID，建立 WebSocket 连接并把转写实时打印到终端；
//! 同时按配置间隔轮询 REST 状态（与事件流相互独立，和网页端行为一致）。
//! 连接断开即退出（核心不做自动重连，由外部监督者决定是否重跑）。

use anyhow::Context;
use reel::api::TaskApiClient;
use reel::config::load_config;
use reel::stream::ConnectionManager;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let task_id = std::env::args()
        .nth(1)
        .context("Usage: reel <task_id>")?;

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        reel::config::AppConfig::default()
    });

    // REST 轮询：状态变化时打印一行，到终态后停
    let api = TaskApiClient::new(
        &cfg.backend.api_url,
        cfg.backend.api_key.clone(),
        cfg.stream.request_timeout_secs,
    );
    let poller = {
        let api = api.clone();
        let task_id = task_id.clone();
        let interval = cfg.stream.poll_interval_secs;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(std::time::Duration::from_secs(interval));
            let mut last_status = String::new();
            loop {
                timer.tick().await;
                match api.get_status(&task_id).await {
                    Ok(status) => {
                        if status.status != last_status {
                            last_status = status.status.clone();
                            println!(
                                ">>> 任务状态：{} ({}%){}",
                                status.status,
                                status.progress,
                                status
                                    .message
                                    .as_deref()
                                    .map(|m| format!(" - {}", m))
                                    .unwrap_or_default()
                            );
                        }
                        if status.is_terminal() {
                            if let Some(path) = status.output_path {
                                println!(">>> 产物：{}", path);
                            }
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Status poll failed: {}", e),
                }
            }
        })
    };

    let mut manager = ConnectionManager::new(&cfg.backend.ws_url);
    let mut view_rx = manager.subscribe();
    manager
        .open(&task_id)
        .await
        .context("Failed to open task stream")?;

    // token 累积中的条目会原地增长，只在闭合后打印
    let mut printed_id = 0u64;
    let mut gate_shown = false;
    loop {
        if view_rx.changed().await.is_err() {
            break;
        }
        let view = view_rx.borrow_and_update().clone();

        for entry in view.entries.iter() {
            if entry.id > printed_id && entry.complete {
                println!(
                    "[{}] {:<11} {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.kind.to_string(),
                    entry.content
                );
                printed_id = entry.id;
            }
        }

        if view.gate.awaiting && !gate_shown {
            gate_shown = true;
            println!(
                ">>> 等待人工输入：{}",
                view.gate.question.as_deref().unwrap_or("-")
            );
        } else if !view.gate.awaiting {
            gate_shown = false;
        }

        if !view.connected {
            if let Some(status) = &view.status {
                println!(">>> 连接已断开（最后状态：{}）", status);
            } else {
                println!(">>> 连接已断开");
            }
            break;
        }
    }

    manager.close().await;
    poller.abort();
    Ok(())
}
