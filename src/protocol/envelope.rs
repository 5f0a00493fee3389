//! 信封：WebSocket 帧的外层对象
//!
//! 排序模式为 `{"seq": n, "data": {...事件...}}`，seq 每条连接从 1 起严格递增。
//! 兼容模式（旧版）事件直接位于顶层；心跳 ping 不带 seq，同样从顶层透传。

use serde::Deserialize;

use super::event::StreamEvent;
use crate::error::ClientError;

/// 一帧解析的结果：可选序号 + 事件负载
#[derive(Debug, Clone)]
pub struct Envelope {
    pub seq: Option<u64>,
    pub event: StreamEvent,
}

#[derive(Deserialize)]
struct SequencedFrame {
    seq: u64,
    data: StreamEvent,
}

impl Envelope {
    /// 解析一条文本帧：带 "seq" 键的按排序模式解析，否则整帧按事件解析
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ClientError::FrameParse(e.to_string()))?;

        if value.get("seq").is_some() {
            let frame: SequencedFrame = serde_json::from_value(value)
                .map_err(|e| ClientError::FrameParse(e.to_string()))?;
            Ok(Self {
                seq: Some(frame.seq),
                event: frame.data,
            })
        } else {
            let event: StreamEvent = serde_json::from_value(value)
                .map_err(|e| ClientError::FrameParse(e.to_string()))?;
            Ok(Self { seq: None, event })
        }
    }

    pub fn sequenced(seq: u64, event: StreamEvent) -> Self {
        Self {
            seq: Some(seq),
            event,
        }
    }

    pub fn bare(event: StreamEvent) -> Self {
        Self { seq: None, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequenced_frame() {
        let env = Envelope::parse(r#"{"seq":7,"data":{"type":"thought","message":"done"}}"#).unwrap();
        assert_eq!(env.seq, Some(7));
        assert!(matches!(env.event, StreamEvent::Thought { .. }));
    }

    #[test]
    fn test_parse_legacy_bare_event() {
        let env = Envelope::parse(r#"{"type":"log","level":"info","message":"step 1"}"#).unwrap();
        assert_eq!(env.seq, None);
        match env.event {
            StreamEvent::Log { level, message } => {
                assert_eq!(level, "info");
                assert_eq!(message, "step 1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_top_level_ping() {
        let env = Envelope::parse(r#"{"type":"ping","timestamp":12345.6}"#).unwrap();
        assert_eq!(env.seq, None);
        assert!(matches!(env.event, StreamEvent::Ping { .. }));
    }

    #[test]
    fn test_parse_malformed_frame() {
        assert!(Envelope::parse("not json").is_err());
        // seq 存在但 data 不是事件结构
        assert!(Envelope::parse(r#"{"seq":1,"data":"oops"}"#).is_err());
        // 顶层对象既无 seq 也无 type
        assert!(Envelope::parse(r#"{"hello":"world"}"#).is_err());
    }
}
