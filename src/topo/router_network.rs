//! 带路由器的拓扑
//!
//! ```text
//! PC1 ─┐
//!      ├─ Switch1 ── Router1 ── PC3
//! PC2 ─┘
//! ```
//!
//! PC1/PC2 在 192.168.1.0/24，PC3 在 192.168.2.0/24。
//! Router1 只配置了 192.168.1.1，路由表预置两条直连路由。

use std::net::Ipv4Addr;

use super::{MASK_24, client, place};
use crate::error::NetResult;
use crate::net::{DeviceKind, RoutingEntry, Topology};

pub fn build_router_network(topo: &mut Topology) -> NetResult<()> {
    let gw1 = Ipv4Addr::new(192, 168, 1, 1);
    let pc1 = client(
        topo,
        "PC1",
        100.0,
        200.0,
        Ipv4Addr::new(192, 168, 1, 10),
        Some(gw1),
    )?;
    let pc2 = client(
        topo,
        "PC2",
        300.0,
        200.0,
        Ipv4Addr::new(192, 168, 1, 11),
        Some(gw1),
    )?;

    let sw = place(topo, "Switch1", DeviceKind::Switch, 200.0, 350.0);
    let sw = topo.add_device(sw)?;

    let direct = |network: Ipv4Addr, interface: &str| RoutingEntry {
        network,
        mask: MASK_24,
        gateway: Ipv4Addr::UNSPECIFIED,
        interface: interface.to_string(),
    };
    let router = place(topo, "Router1", DeviceKind::Router, 500.0, 350.0)
        .with_address(gw1, MASK_24)
        .with_routes(vec![
            direct(Ipv4Addr::new(192, 168, 1, 0), "eth0"),
            direct(Ipv4Addr::new(192, 168, 2, 0), "eth1"),
        ]);
    let router = topo.add_device(router)?;

    let pc3 = client(
        topo,
        "PC3",
        700.0,
        200.0,
        Ipv4Addr::new(192, 168, 2, 10),
        Some(Ipv4Addr::new(192, 168, 2, 1)),
    )?;

    topo.connect(pc1, sw)?;
    topo.connect(pc2, sw)?;
    topo.connect(sw, router)?;
    topo.connect(router, pc3)?;
    Ok(())
}
