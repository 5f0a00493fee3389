//! 客户端错误类型
//!
//! 协议解析、WebSocket 传输、REST 调用与配置加载的统一错误。
//! 核心约定：任何一类都不会导致进程级失败，坏帧丢弃、连接失败只体现为连通标志翻转。

use thiserror::Error;

/// 客户端运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum ClientError {
    /// 帧无法按信封/事件结构解析（记日志后丢弃，连接保持）
    #[error("Frame parse error: {0}")]
    FrameParse(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("Unexpected API response: {0}")]
    ApiResponse(String),

    #[error("Config error: {0}")]
    Config(String),
}
