//! 直连拓扑：PC1 <-> PC2

use std::net::Ipv4Addr;

use super::client;
use crate::error::NetResult;
use crate::net::Topology;

pub fn build_direct_pcs(topo: &mut Topology) -> NetResult<()> {
    let pc1 = client(
        topo,
        "PC1",
        200.0,
        300.0,
        Ipv4Addr::new(192, 168, 1, 10),
        None,
    )?;
    let pc2 = client(
        topo,
        "PC2",
        600.0,
        300.0,
        Ipv4Addr::new(192, 168, 1, 11),
        None,
    )?;
    topo.connect(pc1, pc2)?;
    Ok(())
}
