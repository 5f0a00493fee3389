//! 转写：管线活动的有序只追加重建
//!
//! 条目 id 本地单调递增，与线上 seq 无关；时间戳取本地时钟的捕获时刻。
//! 条目一经写入即不可变，仅有两个例外：token 累积中的思考条目原地增长直到闭合，
//! 以及提案类条目的 resolved 标记翻转。

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 条目类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Thought,
    ToolCall,
    ToolResult,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Thought => write!(f, "thought"),
            EntryKind::ToolCall => write!(f, "tool_call"),
            EntryKind::ToolResult => write!(f, "tool_result"),
        }
    }
}

/// 条目附加信息
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMeta {
    None,
    /// 工具调用：工具名与入参
    Tool {
        tool: String,
        input: Option<serde_json::Value>,
    },
    /// 由携带 data 的 status 事件合成：后端状态标签与终态标记；
    /// resolved 仅对提案类条目有意义（Some(false) = 待人工定夺）
    Status {
        label: String,
        is_final: bool,
        resolved: Option<bool>,
    },
}

/// 转写条目
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: u64,
    pub kind: EntryKind,
    pub content: String,
    /// 仅 token 累积中的思考为 false
    pub complete: bool,
    pub timestamp: DateTime<Utc>,
    pub meta: EntryMeta,
}

/// 只追加的转写
#[derive(Debug)]
pub struct Transcript {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// 追加一条已完成条目，返回其 id
    pub fn push(&mut self, kind: EntryKind, content: String, meta: EntryMeta) -> u64 {
        self.push_entry(kind, content, true, meta)
    }

    /// 追加一条未完成条目（token 累积中的思考）
    pub fn push_incomplete(&mut self, kind: EntryKind, content: String, meta: EntryMeta) -> u64 {
        self.push_entry(kind, content, false, meta)
    }

    fn push_entry(&mut self, kind: EntryKind, content: String, complete: bool, meta: EntryMeta) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            content,
            complete,
            timestamp: Utc::now(),
            meta,
        });
        id
    }

    pub fn last_mut(&mut self) -> Option<&mut Entry> {
        self.entries.last_mut()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 从尾部找最近一条未决提案并标记已决；找不到则无操作（幂等）
    pub fn resolve_last_proposal(&mut self) -> bool {
        for entry in self.entries.iter_mut().rev() {
            if let EntryMeta::Status { resolved, .. } = &mut entry.meta {
                if *resolved == Some(false) {
                    *resolved = Some(true);
                    return true;
                }
            }
        }
        false
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut t = Transcript::new();
        let a = t.push(EntryKind::Thought, "a".into(), EntryMeta::None);
        let b = t.push(EntryKind::ToolResult, "b".into(), EntryMeta::None);
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert!(t.entries()[0].complete);
    }

    #[test]
    fn test_resolve_last_proposal() {
        let mut t = Transcript::new();
        t.push(
            EntryKind::ToolResult,
            "plan v1".into(),
            EntryMeta::Status {
                label: "planning_proposed".into(),
                is_final: false,
                resolved: Some(false),
            },
        );
        t.push(EntryKind::Thought, "noise".into(), EntryMeta::None);
        t.push(
            EntryKind::ToolResult,
            "plan v2".into(),
            EntryMeta::Status {
                label: "planning_proposed".into(),
                is_final: false,
                resolved: Some(false),
            },
        );

        assert!(t.resolve_last_proposal());
        // 最近的一条（plan v2）先被解决
        match &t.entries()[2].meta {
            EntryMeta::Status { resolved, .. } => assert_eq!(*resolved, Some(true)),
            other => panic!("unexpected meta: {:?}", other),
        }
        match &t.entries()[0].meta {
            EntryMeta::Status { resolved, .. } => assert_eq!(*resolved, Some(false)),
            other => panic!("unexpected meta: {:?}", other),
        }

        assert!(t.resolve_last_proposal());
        // 再无未决提案时幂等
        assert!(!t.resolve_last_proposal());
    }
}
