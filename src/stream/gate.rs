//! 人工介入门：挂起/恢复状态
//!
//! 只是一个语义标志，不阻塞事件循环：门开启期间转写照常追加，
//! 由上层决定是否暂停推进动作。

use serde::Serialize;

/// 门状态：是否在等待人工输入，以及待回答的问题
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionGate {
    pub awaiting: bool,
    pub question: Option<String>,
}

impl InteractionGate {
    /// 收到 human_input_request：同一时刻至多一个未决请求，二次请求覆盖问题（last-request-wins）
    pub fn engage(&mut self, question: String) {
        self.awaiting = true;
        self.question = Some(question);
    }

    /// 收到 human_input_received：无未决请求时为无操作
    pub fn release(&mut self) {
        self.awaiting = false;
        self.question = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_round_trip() {
        let mut gate = InteractionGate::default();
        assert!(!gate.awaiting);

        gate.engage("继续吗？".to_string());
        assert!(gate.awaiting);
        assert_eq!(gate.question.as_deref(), Some("继续吗？"));

        gate.release();
        assert!(!gate.awaiting);
        assert!(gate.question.is_none());
    }

    #[test]
    fn test_second_request_wins() {
        let mut gate = InteractionGate::default();
        gate.engage("第一问".to_string());
        gate.engage("第二问".to_string());
        assert!(gate.awaiting);
        assert_eq!(gate.question.as_deref(), Some("第二问"));
    }

    #[test]
    fn test_stray_release_is_noop() {
        let mut gate = InteractionGate::default();
        gate.release();
        assert_eq!(gate, InteractionGate::default());
    }
}
