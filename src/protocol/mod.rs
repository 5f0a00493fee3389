//! 线上协议定义
//!
//! 与后端的 WebSocket 消息格式：外层信封（可选序号）+ 内层事件（`type` 判别联合）

pub mod envelope;
pub mod event;

pub use envelope::Envelope;
pub use event::StreamEvent;
