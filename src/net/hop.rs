//! 逐跳钩子
//!
//! 数据包第一次到达路径上的某个内部节点时触发：
//! - 路由器：入接口 ARP 学习；ICMP 的下一跳是非路由器时学习下一跳并改写二层地址
//! - 交换机：按入端口学习源 MAC

use std::net::Ipv4Addr;

use super::device::Device;
use super::id::{DeviceId, PortId};
use super::packet::{Packet, PacketStatus, Protocol};
use super::topology::Topology;
use crate::addr::MacAddr;
use crate::sim::SimTime;
use crate::viz::{VizEvent, VizEventKind};

/// 一次 tick 内收集的副作用，tick 末尾统一落地
#[derive(Debug)]
pub(crate) struct Effects {
    pub(crate) now: SimTime,
    pub(crate) arp: Vec<(DeviceId, Ipv4Addr, MacAddr)>,
    pub(crate) macs: Vec<(DeviceId, MacAddr, PortId)>,
    pub(crate) events: Vec<VizEvent>,
}

impl Effects {
    pub(crate) fn new(now: SimTime) -> Self {
        Self {
            now,
            arp: Vec::new(),
            macs: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn event(&mut self, pkt: &Packet, kind: VizEventKind) {
        self.events.push(VizEvent {
            t_ns: self.now.0,
            pkt_id: Some(pkt.id),
            protocol: Some(pkt.protocol),
            kind,
        });
    }
}

/// 沿 `indices` 找第一个非交换机设备（三层意义上的相邻节点）
fn l3_neighbor<'a>(
    topo: &'a Topology,
    path: &[DeviceId],
    mut indices: impl Iterator<Item = usize>,
) -> Option<&'a Device> {
    indices.find_map(|i| topo.device(path[i]).filter(|d| !d.is_switch()))
}

/// 数据包到达 `path[idx]`（内部节点）
pub(crate) fn on_interior_hop(topo: &Topology, pkt: &mut Packet, idx: usize, fx: &mut Effects) {
    let Some(node) = pkt.path.get(idx).and_then(|&id| topo.device(id)) else {
        return;
    };
    fx.event(pkt, VizEventKind::HopReached { node: node.id });

    if node.is_router() {
        router_hop(topo, pkt, idx, node, fx);
    } else if node.is_switch() {
        switch_hop(topo, pkt, idx, node, fx);
    }
}

fn router_hop(topo: &Topology, pkt: &mut Packet, idx: usize, router: &Device, fx: &mut Effects) {
    if pkt.status == PacketStatus::Sending {
        pkt.status = PacketStatus::Routing;
    }

    if let (Some(src_ip), Some(prev)) = (
        pkt.source_ip,
        l3_neighbor(topo, &pkt.path, (0..idx).rev()),
    ) {
        fx.arp.push((router.id, src_ip, prev.mac));
    }

    if pkt.protocol != Protocol::Icmp {
        return;
    }
    let Some(next) = l3_neighbor(topo, &pkt.path, idx + 1..pkt.path.len()) else {
        return;
    };
    if next.is_router() {
        return;
    }
    if let Some(ip) = next.ip {
        fx.arp.push((router.id, ip, next.mac));
    }

    pkt.source_mac = router.mac;
    pkt.destination_mac = next.mac;
    fx.event(
        pkt,
        VizEventKind::MacRewrite {
            router: router.id,
            source_mac: router.mac,
            destination_mac: next.mac,
        },
    );
}

fn switch_hop(topo: &Topology, pkt: &Packet, idx: usize, switch: &Device, fx: &mut Effects) {
    let Some(&prev) = idx.checked_sub(1).and_then(|i| pkt.path.get(i)) else {
        return;
    };
    if let Some(port) = topo
        .connection_between(prev, switch.id)
        .and_then(|c| c.port_of(switch.id))
    {
        fx.macs.push((switch.id, pkt.source_mac, port));
    }
}
