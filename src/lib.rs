//! Reel - AI 商品视频生成任务的流式客户端
//!
//! 后端把长耗时生成任务的活动（日志、进度、状态迁移、逐 token 思考、
//! 工具调用与人工介入）经由一条按任务绑定的 WebSocket 推送给客户端；
//! 传输层可能乱序送达，本 crate 负责恢复真实发射顺序后再解释语义。
//!
//! 模块划分：
//! - **api**: 任务 REST 客户端（创建任务、轮询状态、提交人工反馈）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **error**: 客户端错误类型
//! - **protocol**: 线上协议（信封与事件的 serde 定义）
//! - **stream**: 事件流核心（连接管理、重排序、解码、转写、介入门）

pub mod api;
pub mod config;
pub mod error;
pub mod protocol;
pub mod stream;

pub use error::ClientError;
pub use protocol::{Envelope, StreamEvent};
pub use stream::{ConnectionManager, TaskView};
