//! 设备类型
//!
//! 客户端、交换机、路由器共用一个记录类型，按 `DeviceKind` 区分行为。

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::id::{DeviceId, PortId};
use crate::addr::MacAddr;

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Client,
    Switch,
    Router,
}

impl DeviceKind {
    /// 创建时按类型固定的端口数
    pub fn port_count(self) -> usize {
        match self {
            DeviceKind::Client => 1,
            DeviceKind::Switch => 4,
            DeviceKind::Router => 2,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceKind::Client => "client",
            DeviceKind::Switch => "switch",
            DeviceKind::Router => "router",
        };
        f.write_str(s)
    }
}

/// 画布上的二维坐标
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortStatus {
    Up,
    Down,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortStatus::Up => "up",
            PortStatus::Down => "down",
        })
    }
}

/// 设备端口。`linked_to` 为对端端口，为空即可用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub status: PortStatus,
    pub linked_to: Option<PortId>,
}

impl Port {
    pub fn is_available(&self) -> bool {
        self.linked_to.is_none()
    }
}

/// 路由表项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub interface: String,
}

/// 网络设备
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub position: Position,
    pub mac: MacAddr,
    pub ip: Option<Ipv4Addr>,
    pub mask: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
    /// IP -> MAC
    pub arp_table: BTreeMap<Ipv4Addr, MacAddr>,
    /// MAC -> 端口，仅交换机
    pub mac_table: Option<BTreeMap<MacAddr, PortId>>,
    /// 仅路由器
    pub routing_table: Option<Vec<RoutingEntry>>,
    /// 由拓扑在 `add_device` 时按类型填充
    pub ports: Vec<Port>,
}

impl Device {
    /// 新设备：空表、无地址、无端口。交换机带空 MAC 表，路由器带空路由表。
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        kind: DeviceKind,
        position: Position,
        mac: MacAddr,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            position,
            mac,
            ip: None,
            mask: None,
            gateway: None,
            arp_table: BTreeMap::new(),
            mac_table: (kind == DeviceKind::Switch).then(BTreeMap::new),
            routing_table: (kind == DeviceKind::Router).then(Vec::new),
            ports: Vec::new(),
        }
    }

    pub fn with_address(mut self, ip: Ipv4Addr, mask: Ipv4Addr) -> Self {
        self.ip = Some(ip);
        self.mask = Some(mask);
        self
    }

    pub fn with_gateway(mut self, gateway: Ipv4Addr) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_routes(mut self, routes: Vec<RoutingEntry>) -> Self {
        self.routing_table = Some(routes);
        self
    }

    pub fn is_router(&self) -> bool {
        self.kind == DeviceKind::Router
    }

    pub fn is_switch(&self) -> bool {
        self.kind == DeviceKind::Switch
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub(crate) fn port_mut(&mut self, id: PortId) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.id == id)
    }

    /// 第一个空闲端口
    pub fn free_port(&self) -> Option<&Port> {
        self.ports.iter().find(|p| p.is_available())
    }

    /// 同时配置了 IP 与掩码时返回二者
    pub fn address(&self) -> Option<(Ipv4Addr, Ipv4Addr)> {
        self.ip.zip(self.mask)
    }
}
