//! 网段判定
//!
//! L2 邻接判断（两台设备之间是否隔着路由器）与 L3 下一跳计算。

use std::collections::{HashSet, VecDeque};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::graph::LinkGraph;
use super::id::DeviceId;
use super::topology::Topology;
use crate::addr::same_subnet;
use crate::error::{NetError, NetResult};

/// 下一跳：`direct` 表示目的地址就在本子网内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextHop {
    pub target: Ipv4Addr,
    pub direct: bool,
}

fn is_router(topo: &Topology, id: DeviceId) -> bool {
    topo.device(id).is_some_and(|d| d.is_router())
}

/// 两台设备之间的路径上没有路由器即为同一 L2 网段。没有链路路径时返回 false。
pub fn is_same_l2_segment(topo: &Topology, graph: &LinkGraph, a: DeviceId, b: DeviceId) -> bool {
    if a == b {
        return true;
    }
    let path = graph.shortest_path(a, b);
    if !path.is_routable() {
        return false;
    }
    let hops = path.hops();
    let same = hops[1..hops.len() - 1]
        .iter()
        .all(|&id| !is_router(topo, id));
    trace!(%a, %b, same, "L2 邻接判断");
    same
}

/// 计算到 `destination` 的下一跳。
///
/// 同子网直接交付；否则取 BFS 顺序上第一台配置了 IP 的可达路由器作为网关。
pub fn next_hop(
    topo: &Topology,
    graph: &LinkGraph,
    source: DeviceId,
    destination: Ipv4Addr,
) -> NetResult<NextHop> {
    let src = topo.device(source).ok_or(NetError::UnknownDevice(source))?;
    let (ip, mask) = src.address().ok_or(NetError::NoAddress(source))?;

    if same_subnet(ip, destination, mask) {
        return Ok(NextHop {
            target: destination,
            direct: true,
        });
    }

    graph
        .reachable_from(source)
        .into_iter()
        .skip(1)
        .filter_map(|id| topo.device(id))
        .find_map(|d| d.is_router().then_some(d.ip).flatten())
        .map(|target| NextHop {
            target,
            direct: false,
        })
        .ok_or(NetError::NoRoute {
            from: source,
            to: destination,
        })
}

/// `device` 所在的 L2 广播域：不穿过路由器可达的全部设备（边界路由器本身算在内）。
pub fn l2_domain(topo: &Topology, graph: &LinkGraph, device: DeviceId) -> Vec<DeviceId> {
    let mut seen: HashSet<DeviceId> = HashSet::from([device]);
    let mut order = vec![device];
    let mut q = VecDeque::from([device]);

    while let Some(v) = q.pop_front() {
        if v != device && is_router(topo, v) {
            continue;
        }
        for &n in graph.neighbors(v) {
            if seen.insert(n) {
                order.push(n);
                q.push_back(n);
            }
        }
    }
    order
}
