//! 重排序缓冲：把乱序到达的带号信封恢复为严格有序投递
//!
//! 游标从 1 开始；持有缓冲按整数序号建明确的有序映射，连续命中即成批排干。
//! 排干后解码器观察到的序号恰好是 1, 2, 3, …（既无跳号也无乱序对）。
//! 不带 seq 的旧版信封不参与排序，直通解码器。

use std::collections::BTreeMap;

use super::decoder::{Decoder, StatusSignal};
use crate::protocol::{Envelope, StreamEvent};

/// 每条连接一个实例；任务切换时 reset，缓冲绝不跨任务泄漏
#[derive(Debug)]
pub struct Sequencer {
    /// 期待的下一个序号（游标）
    next_seq: u64,
    /// 超前到达、等待补洞的事件
    pending: BTreeMap<u64, StreamEvent>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            pending: BTreeMap::new(),
        }
    }

    /// 投递一帧信封；按序可投递的事件依次喂给解码器，返回其间产生的状态信号
    pub fn deliver(&mut self, envelope: Envelope, decoder: &mut Decoder) -> Vec<StatusSignal> {
        let mut signals = Vec::new();

        // 心跳不参与排序、不占序号、也不进解码器
        if matches!(envelope.event, StreamEvent::Ping { .. }) {
            return signals;
        }

        match envelope.seq {
            None => {
                // 兼容模式：不排序，直接解码
                if let Some(sig) = decoder.apply(envelope.event) {
                    signals.push(sig);
                }
            }
            Some(seq) => {
                // 重复序号覆盖缓冲里的同号条目；低于游标的序号照样写入
                // （后端重连后会重发已确认事件），但永远不会再被排干
                self.pending.insert(seq, envelope.event);
                while let Some(event) = self.pending.remove(&self.next_seq) {
                    self.next_seq += 1;
                    if let Some(sig) = decoder.apply(event) {
                        signals.push(sig);
                    }
                }
            }
        }

        signals
    }

    /// 当前游标（期待的下一个序号）
    pub fn expected_seq(&self) -> u64 {
        self.next_seq
    }

    /// 等待补洞的缓冲条数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 是否存在尚未补上的洞（缓冲里有超前于游标的事件）
    pub fn has_gap(&self) -> bool {
        self.pending
            .keys()
            .next_back()
            .map_or(false, |&max| max >= self.next_seq)
    }

    /// 任务切换：游标归 1、清空缓冲
    pub fn reset(&mut self) {
        self.next_seq = 1;
        self.pending.clear();
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
