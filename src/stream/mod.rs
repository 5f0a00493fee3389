//! 事件流核心
//!
//! 数据流向：connection → sequencer → decoder → transcript / gate → TaskView。
//! 每条连接持有一套独立的游标、缓冲与累积状态，任务切换时整体废弃重建。

pub mod connection;
pub mod decoder;
pub mod gate;
pub mod sequencer;
pub mod session;
pub mod transcript;

pub use connection::ConnectionManager;
pub use decoder::{Decoder, StatusSignal};
pub use gate::InteractionGate;
pub use sequencer::Sequencer;
pub use session::{TaskSession, TaskView};
pub use transcript::{Entry, EntryKind, EntryMeta, Transcript};
