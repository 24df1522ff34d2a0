//! 数据包类型
//!
//! 数据包沿预先算好的设备路径前进，进度用路径上的累计距离表示。
//! 到达后的后续动作（ARP 完成后续发 ICMP、ICMP 回显应答）用 `FollowUp` 显式携带。

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::id::{DeviceId, PacketId};
use crate::addr::MacAddr;
use crate::sim::SimTime;

/// 协议类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "ICMP")]
    Icmp,
    #[serde(rename = "ARP")]
    Arp,
    #[serde(rename = "DATA")]
    Data,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Icmp => "ICMP",
            Protocol::Arp => "ARP",
            Protocol::Data => "DATA",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStatus {
    Sending,
    /// 已经穿过至少一个路由器
    Routing,
    Delivered,
    Failed,
}

/// 失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// 路径只是兜底的两点直连，实际没有链路
    Unreachable,
    /// 路径上的设备在传输途中被删除
    DeviceRemoved,
}

/// 到达目的地之后要派生的后续数据包
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FollowUp {
    None,
    /// ICMP 到达后生成回显应答
    SpawnReply,
    /// ARP 解析完成后，在原始端点之间发出被推迟的 ICMP
    SpawnAfterArp {
        source: DeviceId,
        destination: DeviceId,
    },
}

/// 网络数据包
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub id: PacketId,
    pub source: DeviceId,
    pub destination: DeviceId,
    pub source_ip: Option<Ipv4Addr>,
    pub destination_ip: Option<Ipv4Addr>,
    pub source_mac: MacAddr,
    pub destination_mac: MacAddr,
    pub protocol: Protocol,
    pub status: PacketStatus,
    pub path: Vec<DeviceId>,
    /// 沿路径已走过的距离
    pub travelled: f64,
    /// `travelled / 总长度`，截断到 [0, 1]
    pub progress: f64,
    /// 已经到达过的路径节点数（源节点算 1），逐跳钩子只对新到达的节点触发一次
    pub crossed: usize,
    pub created_at: SimTime,
    pub follow_up: FollowUp,
    pub is_reply: bool,
    pub failure: Option<FailureReason>,
}

impl Packet {
    /// 仍在传输中（未送达也未失败）
    pub fn in_flight(&self) -> bool {
        matches!(self.status, PacketStatus::Sending | PacketStatus::Routing)
    }
}
