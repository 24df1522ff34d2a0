//! 网段类型

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::id::{DeviceId, SegmentId};

/// 网段配色，按顺序取第一个未被使用的颜色
pub const SEGMENT_COLORS: [&str; 12] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FCEA2B", "#FF9FF3", "#54A0FF", "#5F27CD",
    "#00D2D3", "#FF9F43", "#EE5A24", "#0ABDE3",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    L2,
    L3,
}

/// L2 网段的成员由链路可达性推导（见 `classify::l2_domain`），`devices`
/// 只保存手工加入的成员；L3 网段的成员在地址变化时整体重算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub kind: SegmentKind,
    pub name: String,
    pub network: Option<Ipv4Addr>,
    pub mask: Option<Ipv4Addr>,
    pub devices: Vec<DeviceId>,
    pub color: String,
}

impl Segment {
    pub fn contains(&self, device: DeviceId) -> bool {
        self.devices.contains(&device)
    }
}
