//! 预设拓扑

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{NetError, NetResult};
use crate::net::{Device, DeviceId, DeviceKind, Position, Topology};

pub mod direct_pcs;
pub mod pcs_switch;
pub mod router_network;

pub use direct_pcs::build_direct_pcs;
pub use pcs_switch::build_pcs_switch;
pub use router_network::build_router_network;

/// 所有客户端共用的 /24 掩码
pub(crate) const MASK_24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// 内置预设
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 两台直连的 PC
    DirectPcs,
    /// 两台 PC 经一台交换机相连
    PcsSwitch,
    /// 交换机下两台 PC，经路由器到第三台 PC
    NetworkWithRouter,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::DirectPcs,
        Preset::PcsSwitch,
        Preset::NetworkWithRouter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::DirectPcs => "direct-pcs",
            Preset::PcsSwitch => "pcs-switch",
            Preset::NetworkWithRouter => "network-with-router",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| NetError::UnknownPreset(s.to_string()))
    }
}

/// 在（通常为空的）拓扑上构建预设
pub fn build_preset(topo: &mut Topology, preset: Preset) -> NetResult<()> {
    match preset {
        Preset::DirectPcs => build_direct_pcs(topo),
        Preset::PcsSwitch => build_pcs_switch(topo),
        Preset::NetworkWithRouter => build_router_network(topo),
    }
}

/// 新设备记录：分配 id 与 MAC
pub(crate) fn place(
    topo: &mut Topology,
    name: &str,
    kind: DeviceKind,
    x: f64,
    y: f64,
) -> Device {
    let id = topo.next_device_id();
    let mac = topo.allocate_mac();
    Device::new(id, name, kind, Position::new(x, y), mac)
}

/// 放置一台带 /24 地址的客户端
pub(crate) fn client(
    topo: &mut Topology,
    name: &str,
    x: f64,
    y: f64,
    ip: Ipv4Addr,
    gateway: Option<Ipv4Addr>,
) -> NetResult<DeviceId> {
    let mut pc = place(topo, name, DeviceKind::Client, x, y);
    pc = pc.with_address(ip, MASK_24);
    if let Some(gw) = gateway {
        pc = pc.with_gateway(gw);
    }
    topo.add_device(pc)
}
