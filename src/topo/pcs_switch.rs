//! 交换机拓扑：PC1 <-> Switch1 <-> PC2

use std::net::Ipv4Addr;

use super::{client, place};
use crate::error::NetResult;
use crate::net::{DeviceKind, Topology};

pub fn build_pcs_switch(topo: &mut Topology) -> NetResult<()> {
    let pc1 = client(
        topo,
        "PC1",
        150.0,
        200.0,
        Ipv4Addr::new(192, 168, 1, 10),
        None,
    )?;
    let pc2 = client(
        topo,
        "PC2",
        650.0,
        200.0,
        Ipv4Addr::new(192, 168, 1, 11),
        None,
    )?;
    let sw = place(topo, "Switch1", DeviceKind::Switch, 400.0, 300.0);
    let sw = topo.add_device(sw)?;

    // 交换机端口按顺序占用：Port 1 <- PC1，Port 2 <- PC2
    topo.connect(pc1, sw)?;
    topo.connect(pc2, sw)?;
    Ok(())
}
