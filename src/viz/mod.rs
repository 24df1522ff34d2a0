//! 可视化事件记录与状态快照
//!
//! - **事件流**：数据包生命周期中的关键动作（生成、学习、改写、送达、移除）按时间记录为 JSON
//! - **快照**：某一时刻的完整拓扑与在途数据包，供外部渲染层读取

mod snapshot;
mod types;

pub use snapshot::Snapshot;
pub use types::{VizDeviceInfo, VizEvent, VizEventKind, VizLinkInfo, VizLogger};
