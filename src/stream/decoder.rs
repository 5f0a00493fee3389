//! 事件解码：把带判别 tag 的事件折叠进转写与介入门
//!
//! 对封闭联合的全函数：每个 tag 映射为一次转写/门变更；未识别 tag 静默忽略
//! （向前兼容）。progress 与不带 data 的 status 不进转写，作为状态信号
//! 返回给外部任务状态层。

use serde_json::Value;

use super::gate::InteractionGate;
use super::transcript::{EntryKind, EntryMeta, Transcript};
use crate::protocol::StreamEvent;

/// 请求人工介入但未附问题文本时的默认提示
const DEFAULT_GATE_PROMPT: &str = "流水线正在等待人工输入";

/// 状态信号：不进转写，转发给外部任务状态层
#[derive(Debug, Clone, PartialEq)]
pub enum StatusSignal {
    /// progress 事件：进度百分比与可选阶段名
    Progress { value: f64, status: Option<String> },
    /// status 事件的状态标签（带 data 时另行合成转写条目）
    Status {
        status: String,
        message: Option<String>,
    },
}

/// 解码器：持有转写、介入门与 token 累积缓冲
#[derive(Debug, Default)]
pub struct Decoder {
    transcript: Transcript,
    gate: InteractionGate,
    token_buf: String,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn gate(&self) -> &InteractionGate {
        &self.gate
    }

    /// 应用一个事件；返回需转发给任务状态层的信号（如有）
    pub fn apply(&mut self, event: StreamEvent) -> Option<StatusSignal> {
        match event {
            StreamEvent::Token { content } => {
                self.apply_token(&content);
                None
            }
            StreamEvent::End => {
                self.finish_token();
                None
            }
            StreamEvent::Thought { message } => {
                self.transcript.push(EntryKind::Thought, message, EntryMeta::None);
                None
            }
            StreamEvent::Log { level, message } => {
                self.apply_log(&level, message);
                None
            }
            StreamEvent::ToolCall { tool, tool_input, log } => {
                self.apply_tool_call(tool, tool_input, log);
                None
            }
            StreamEvent::ToolResult { output } => {
                self.transcript.push(EntryKind::ToolResult, output, EntryMeta::None);
                None
            }
            StreamEvent::Status { status, message, data } => self.apply_status(status, message, data),
            StreamEvent::Progress { value, status } => Some(StatusSignal::Progress { value, status }),
            StreamEvent::HumanInputRequest { question, context } => {
                let text = question
                    .or(context)
                    .unwrap_or_else(|| DEFAULT_GATE_PROMPT.to_string());
                self.gate.engage(text.clone());
                // 中断要在转写里可见
                self.transcript.push(EntryKind::Thought, text, EntryMeta::None);
                None
            }
            StreamEvent::HumanInputReceived { feedback } => {
                if let Some(feedback) = feedback {
                    tracing::debug!("Human feedback received: {}", feedback);
                }
                self.gate.release();
                self.transcript.resolve_last_proposal();
                None
            }
            // 心跳在排序层已被丢弃；未识别 tag 静默忽略
            StreamEvent::Ping { .. } | StreamEvent::Unknown => None,
        }
    }

    /// token 片段：追加进累积缓冲；末尾有未闭合思考则原地覆盖其内容，否则新开一条
    fn apply_token(&mut self, content: &str) {
        self.token_buf.push_str(content);
        match self.transcript.last_mut() {
            Some(entry) if entry.kind == EntryKind::Thought && !entry.complete => {
                entry.content = self.token_buf.clone();
            }
            _ => {
                let text = self.token_buf.clone();
                self.transcript.push_incomplete(EntryKind::Thought, text, EntryMeta::None);
            }
        }
    }

    /// end：闭合末尾的未完成思考；没有未闭合思考时只清空缓冲
    fn finish_token(&mut self) {
        if let Some(entry) = self.transcript.last_mut() {
            if entry.kind == EntryKind::Thought && !entry.complete {
                entry.complete = true;
            }
        }
        self.token_buf.clear();
    }

    fn apply_log(&mut self, level: &str, message: String) {
        match level {
            "error" => tracing::warn!("Pipeline log [error]: {}", message),
            _ => tracing::debug!("Pipeline log [{}]: {}", level, message),
        }
        self.transcript.push(EntryKind::Thought, message, EntryMeta::None);
    }

    /// 工具调用：log 非空时先落一条完整思考，再落 tool_call 条目本身
    fn apply_tool_call(&mut self, tool: String, input: Option<Value>, log: Option<String>) {
        let log = log.filter(|l| !l.is_empty());
        if let Some(text) = &log {
            self.transcript.push(EntryKind::Thought, text.clone(), EntryMeta::None);
        }
        let content = log.unwrap_or_else(|| format!("正在调用 {} ...", tool));
        self.transcript.push(EntryKind::ToolCall, content, EntryMeta::Tool { tool, input });
    }

    /// status：带非空 data 时合成一条 tool_result 类条目；状态标签一律作为信号转发
    fn apply_status(
        &mut self,
        status: String,
        message: Option<String>,
        data: Option<Value>,
    ) -> Option<StatusSignal> {
        if let Some(data) = data.filter(|d| !is_empty_payload(d)) {
            let content = match data {
                Value::String(s) => s,
                other => other.to_string(),
            };
            let meta = EntryMeta::Status {
                label: status.clone(),
                is_final: status == "completed",
                resolved: status.ends_with("_proposed").then_some(false),
            };
            self.transcript.push(EntryKind::ToolResult, content, meta);
        }
        Some(StatusSignal::Status { status, message })
    }
}

/// 空负载：null、空字符串、空对象或空数组都视为「无产物」
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}
