//! 任务会话：一条连接专属的协议状态
//!
//! 连接建立时新建，断开即丢弃；游标、缓冲与累积状态绝不跨任务共享。
//! 对外只暴露 TaskView 投影：有序转写快照、连通标志、介入门与最近的进度/状态。

use serde::Serialize;

use super::decoder::{Decoder, StatusSignal};
use super::gate::InteractionGate;
use super::sequencer::Sequencer;
use super::transcript::Entry;
use crate::error::ClientError;
use crate::protocol::Envelope;

/// 消费方看到的「投影」快照，轻量且可序列化
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub task_id: Option<String>,
    pub connected: bool,
    pub entries: Vec<Entry>,
    pub gate: InteractionGate,
    /// 最近一次 progress 信号的百分比
    pub progress: Option<f64>,
    /// 最近一次后端报告的状态标签
    pub status: Option<String>,
}

impl TaskView {
    /// 尚未绑定任务时的初始视图
    pub fn detached() -> Self {
        Self {
            task_id: None,
            connected: false,
            entries: Vec::new(),
            gate: InteractionGate::default(),
            progress: None,
            status: None,
        }
    }
}

/// 会话：一个任务 + 一套排序/解码状态 + 最近的状态信号
#[derive(Debug)]
pub struct TaskSession {
    task_id: String,
    sequencer: Sequencer,
    decoder: Decoder,
    progress: Option<f64>,
    status: Option<String>,
}

impl TaskSession {
    pub fn new(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            sequencer: Sequencer::new(),
            decoder: Decoder::new(),
            progress: None,
            status: None,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// 摄入一条文本帧：解析失败返回错误（调用方记日志后丢弃，转写不受影响）
    pub fn ingest(&mut self, text: &str) -> Result<(), ClientError> {
        let envelope = Envelope::parse(text)?;
        self.ingest_envelope(envelope);
        Ok(())
    }

    /// 摄入一帧已解析的信封
    pub fn ingest_envelope(&mut self, envelope: Envelope) {
        for signal in self.sequencer.deliver(envelope, &mut self.decoder) {
            match signal {
                StatusSignal::Progress { value, status } => {
                    self.progress = Some(value);
                    if let Some(status) = status {
                        self.status = Some(status);
                    }
                }
                StatusSignal::Status { status, message } => {
                    if let Some(message) = message {
                        tracing::debug!(task_id = %self.task_id, "Status: {} ({})", status, message);
                    }
                    self.status = Some(status);
                }
            }
        }
    }

    /// 缓冲里是否有等待补洞的事件（补不上即为停滞，可观测而非报错）
    pub fn has_gap(&self) -> bool {
        self.sequencer.has_gap()
    }

    /// 以给定连通状态投影一份只读快照
    pub fn project(&self, connected: bool) -> TaskView {
        TaskView {
            task_id: Some(self.task_id.clone()),
            connected,
            entries: self.decoder.transcript().entries().to_vec(),
            gate: self.decoder.gate().clone(),
            progress: self.progress,
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StreamEvent;

    #[test]
    fn test_ingest_updates_progress_and_status() {
        let mut s = TaskSession::new("task-1");
        s.ingest(r#"{"seq":1,"data":{"type":"progress","value":30,"status":"segmentation"}}"#)
            .unwrap();
        s.ingest(r#"{"seq":2,"data":{"type":"status","status":"processing"}}"#)
            .unwrap();

        let view = s.project(true);
        assert_eq!(view.progress, Some(30.0));
        assert_eq!(view.status.as_deref(), Some("processing"));
        assert!(view.entries.is_empty());
        assert_eq!(view.task_id.as_deref(), Some("task-1"));
    }

    #[test]
    fn test_malformed_frame_leaves_transcript_untouched() {
        let mut s = TaskSession::new("task-1");
        s.ingest(r#"{"seq":1,"data":{"type":"thought","message":"ok"}}"#).unwrap();
        assert!(s.ingest("garbage").is_err());
        assert!(s.ingest(r#"{"seq":2,"data":"oops"}"#).is_err());

        let view = s.project(true);
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].content, "ok");
    }

    #[test]
    fn test_signals_from_buffered_drain() {
        let mut s = TaskSession::new("task-1");
        // 乱序到达：progress 70 先到但序号靠后
        s.ingest_envelope(Envelope::sequenced(
            2,
            StreamEvent::Progress { value: 70.0, status: None },
        ));
        assert_eq!(s.project(true).progress, None);
        assert!(s.has_gap());

        s.ingest_envelope(Envelope::sequenced(
            1,
            StreamEvent::Progress { value: 10.0, status: None },
        ));
        // 排干后最后生效的是 70
        assert_eq!(s.project(true).progress, Some(70.0));
        assert!(!s.has_gap());
    }
}
