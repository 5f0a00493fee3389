//! 流事件：后端推送的消息负载
//!
//! 与后端 `type` 判别字段一一对应的封闭联合。未识别的 tag 落入 Unknown，
//! 由解码层静默忽略（向前兼容）。

use serde::{Deserialize, Serialize};

/// 管线活动事件（`type` 字段判别）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// 普通日志行
    Log { level: String, message: String },

    /// 进度百分比（可附带阶段名）
    Progress {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
    },

    /// 任务状态迁移（data 可携带阶段产物，message 为人类可读说明）
    Status {
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },

    /// 流式思考片段（仍未闭合的思考单元的一个 UTF-8 切片）
    Token { content: String },

    /// 完整思考（后端已拼好，不参与 token 累积）
    Thought { message: String },

    /// 工具调用（log 为模型给出的行动说明）
    ToolCall {
        tool: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_input: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        log: Option<String>,
    },

    /// 工具执行结果（原样文本，可能是序列化的结构数据，本层不解析）
    ToolResult { output: String },

    /// 请求人工介入
    HumanInputRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    /// 人工反馈已收到
    HumanInputReceived {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feedback: Option<String>,
    },

    /// 心跳（无语义，进入解码器之前丢弃）
    Ping { timestamp: f64 },

    /// 终结当前的 token 累积
    End,

    /// 未识别的事件类型
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_token() {
        let ev: StreamEvent = serde_json::from_str(r#"{"type":"token","content":"안녕"}"#).unwrap();
        match ev {
            StreamEvent::Token { content } => assert_eq!(content, "안녕"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_end_tolerates_extra_fields() {
        // 后端的 end 事件带一个空 content 字段
        let ev: StreamEvent = serde_json::from_str(r#"{"type":"end","content":""}"#).unwrap();
        assert!(matches!(ev, StreamEvent::End));
    }

    #[test]
    fn test_decode_tool_call() {
        let ev: StreamEvent = serde_json::from_str(
            r#"{"type":"tool_call","tool":"segmentation_tool","tool_input":"{\"layer\":1}","log":"Separating product"}"#,
        )
        .unwrap();
        match ev {
            StreamEvent::ToolCall { tool, tool_input, log } => {
                assert_eq!(tool, "segmentation_tool");
                assert!(tool_input.is_some());
                assert_eq!(log.as_deref(), Some("Separating product"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_status_with_data() {
        let ev: StreamEvent = serde_json::from_str(
            r#"{"type":"status","status":"vision_completed","data":{"objects":3}}"#,
        )
        .unwrap();
        match ev {
            StreamEvent::Status { status, message, data } => {
                assert_eq!(status, "vision_completed");
                assert!(message.is_none());
                assert_eq!(data.unwrap()["objects"], 3);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_falls_through() {
        let ev: StreamEvent =
            serde_json::from_str(r#"{"type":"telemetry_v9","payload":42}"#).unwrap();
        assert!(matches!(ev, StreamEvent::Unknown));
    }
}
