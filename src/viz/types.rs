use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::addr::MacAddr;
use crate::net::{
    ConnectionId, DeviceId, DeviceKind, FailureReason, FollowUp, PacketId, PortId, Position,
    Protocol,
};

/// 可视化事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VizEventKind {
    /// 拓扑元信息（建议作为第一条事件）
    Meta {
        devices: Vec<VizDeviceInfo>,
        links: Vec<VizLinkInfo>,
    },
    /// 新数据包进入在途集合
    Spawn {
        source: DeviceId,
        destination: DeviceId,
        path: Vec<DeviceId>,
        follow_up: FollowUp,
    },
    /// 数据包经过路径上的内部节点
    HopReached { node: DeviceId },
    /// 某设备的 ARP 表新增/更新一项
    ArpLearn {
        device: DeviceId,
        ip: Ipv4Addr,
        mac: MacAddr,
    },
    /// 交换机 MAC 表新增/更新一项
    MacLearn {
        device: DeviceId,
        mac: MacAddr,
        port: PortId,
    },
    /// 路由器改写二层地址
    MacRewrite {
        router: DeviceId,
        source_mac: MacAddr,
        destination_mac: MacAddr,
    },
    Delivered { node: DeviceId },
    Failed { reason: FailureReason },
    /// 从在途集合移除
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizDeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizLinkInfo {
    pub id: ConnectionId,
    pub from: DeviceId,
    pub to: DeviceId,
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    pub pkt_id: Option<PacketId>,
    pub protocol: Option<Protocol>,
    #[serde(flatten)]
    pub kind: VizEventKind,
}

/// 事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct VizLogger {
    pub events: Vec<VizEvent>,
}

impl VizLogger {
    pub fn push(&mut self, ev: VizEvent) {
        self.events.push(ev);
    }

    pub fn extend(&mut self, evs: impl IntoIterator<Item = VizEvent>) {
        self.events.extend(evs);
    }
}
