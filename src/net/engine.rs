//! 数据包生命周期引擎
//!
//! 拥有在途数据包集合，负责：
//! - 发送：计算下一跳、按需先发 ARP（把 ICMP 推迟到 ARP 完成后）
//! - 时钟推进：按时间计算走过的距离，触发逐跳钩子，处理到达与后续派生
//!
//! 一次 tick 内所有数据包都基于 tick 开始时的同一份拓扑求值，
//! ARP/MAC 学习、新包派生、移除在求值结束后一次性落地。

use std::collections::HashSet;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::classify::{is_same_l2_segment, next_hop};
use super::config::SimConfig;
use super::device::Device;
use super::graph::LinkGraph;
use super::hop::{Effects, on_interior_hop};
use super::id::{DeviceId, PacketId};
use super::packet::{FailureReason, FollowUp, Packet, PacketStatus, Protocol};
use super::topology::Topology;
use crate::addr::MacAddr;
use crate::error::{NetError, NetResult};
use crate::sim::SimTime;
use crate::viz::{VizEvent, VizEventKind};

/// 一次发送请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "packet", rename_all = "snake_case")]
pub enum SendOutcome {
    /// 数据包已进入在途集合
    Sent(PacketId),
    /// 先发出了 ARP 请求，原数据包将在解析完成后自动发出
    AwaitingArp(PacketId),
    /// 没有真实链路路径，数据包以 failed 状态进入在途集合
    Undeliverable(PacketId),
}

impl SendOutcome {
    pub fn packet(self) -> PacketId {
        match self {
            SendOutcome::Sent(id)
            | SendOutcome::AwaitingArp(id)
            | SendOutcome::Undeliverable(id) => id,
        }
    }
}

/// 一次 tick 的汇总
#[derive(Debug, Default)]
pub struct TickReport {
    pub delivered: Vec<PacketId>,
    pub failed: Vec<PacketId>,
    pub spawned: Vec<PacketId>,
    pub removed: Vec<PacketId>,
    pub events: Vec<VizEvent>,
}

/// 路径几何：每段长度与总长度
struct PathGeometry {
    /// `offsets[i]` 为从源点到 `path[i]` 的累计距离
    offsets: Vec<f64>,
}

impl PathGeometry {
    fn of(topo: &Topology, path: &[DeviceId]) -> Option<Self> {
        let positions = path
            .iter()
            .map(|&id| topo.device(id).map(|d| d.position))
            .collect::<Option<Vec<_>>>()?;
        let mut offsets = Vec::with_capacity(positions.len());
        let mut acc = 0.0;
        offsets.push(acc);
        for w in positions.windows(2) {
            acc += w[0].distance_to(&w[1]);
            offsets.push(acc);
        }
        Some(Self { offsets })
    }

    fn total(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// 已走过 `travelled` 时到达过的节点数
    fn reached(&self, travelled: f64) -> usize {
        self.offsets.iter().take_while(|&&o| o <= travelled).count()
    }
}

/// 一次 tick 的求值上下文：只读拓扑快照 + 待落地的副作用
struct Pass<'a> {
    topo: &'a Topology,
    graph: LinkGraph,
    cfg: &'a SimConfig,
    speed: f64,
    fx: Effects,
    report: TickReport,
    spawned: Vec<Packet>,
    /// 在途与本次新派生数据包的 id，用于应答去重
    reply_ids: HashSet<PacketId>,
}

#[derive(Debug, Default)]
pub struct PacketEngine {
    packets: Vec<Packet>,
    next_seq: u64,
}

impl PacketEngine {
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn packet(&self, id: PacketId) -> Option<&Packet> {
        self.packets.iter().find(|p| p.id == id)
    }

    pub fn is_idle(&self) -> bool {
        self.packets.is_empty()
    }

    /// 丢弃全部在途数据包
    pub fn clear(&mut self) {
        self.packets.clear();
    }

    fn fresh_id(&mut self) -> PacketId {
        let id = PacketId::Fresh(self.next_seq);
        self.next_seq += 1;
        id
    }

    /// 构建数据包。路径只有兜底直连时直接标记为 failed。
    #[allow(clippy::too_many_arguments)]
    fn build(
        &mut self,
        graph: &LinkGraph,
        src: &Device,
        dst: &Device,
        protocol: Protocol,
        destination_ip: Option<Ipv4Addr>,
        destination_mac: MacAddr,
        follow_up: FollowUp,
        created_at: SimTime,
    ) -> Packet {
        let path = graph.shortest_path(src.id, dst.id);
        let routable = path.is_routable();
        Packet {
            id: self.fresh_id(),
            source: src.id,
            destination: dst.id,
            source_ip: src.ip,
            destination_ip,
            source_mac: src.mac,
            destination_mac,
            protocol,
            status: if routable {
                PacketStatus::Sending
            } else {
                PacketStatus::Failed
            },
            path: path.into_hops(),
            travelled: 0.0,
            progress: 0.0,
            crossed: 1,
            created_at,
            follow_up: if routable { follow_up } else { FollowUp::None },
            is_reply: false,
            failure: (!routable).then_some(FailureReason::Unreachable),
        }
    }

    fn admit(&mut self, pkt: Packet) -> PacketId {
        let id = pkt.id;
        debug!(pkt_id = %id, protocol = %pkt.protocol, path = ?pkt.path, status = ?pkt.status, "数据包进入在途集合");
        self.packets.push(pkt);
        id
    }

    /// 发送请求
    ///
    /// ICMP 先计算下一跳：源设备没有下一跳的 ARP 表项时，先向同一 L2 网段内
    /// 持有该地址的设备发 ARP，ICMP 推迟到 ARP 到达之后。ARP / DATA 直接发出。
    #[tracing::instrument(skip_all, fields(%source, %destination, %protocol))]
    pub fn send(
        &mut self,
        topo: &Topology,
        source: DeviceId,
        destination: DeviceId,
        protocol: Protocol,
        now: SimTime,
    ) -> NetResult<SendOutcome> {
        if source == destination {
            return Err(NetError::SameEndpoint);
        }
        let src = topo.device(source).ok_or(NetError::UnknownDevice(source))?;
        let dst = topo
            .device(destination)
            .ok_or(NetError::UnknownDevice(destination))?;
        let graph = topo.link_graph();

        if protocol != Protocol::Icmp {
            let pkt = self.build(
                &graph,
                src,
                dst,
                protocol,
                dst.ip,
                dst.mac,
                FollowUp::None,
                now,
            );
            return Ok(self.outcome(pkt, SendOutcome::Sent));
        }

        let dst_ip = dst.ip.ok_or(NetError::NoAddress(destination))?;
        let hop = next_hop(topo, &graph, source, dst_ip)?;
        trace!(target = %hop.target, direct = hop.direct, "下一跳");

        match src.arp_table.get(&hop.target) {
            Some(&mac) => {
                let pkt = self.build(
                    &graph,
                    src,
                    dst,
                    Protocol::Icmp,
                    Some(dst_ip),
                    mac,
                    FollowUp::SpawnReply,
                    now,
                );
                Ok(self.outcome(pkt, SendOutcome::Sent))
            }
            None => {
                let target = topo
                    .devices()
                    .iter()
                    .filter(|d| d.id != source && d.ip == Some(hop.target))
                    .find(|d| is_same_l2_segment(topo, &graph, source, d.id))
                    .ok_or(NetError::NoRoute {
                        from: source,
                        to: hop.target,
                    })?;
                info!(arp_target = %target.id, ip = %hop.target, "ARP 表缺少下一跳，先发 ARP 请求");
                let pkt = self.build(
                    &graph,
                    src,
                    target,
                    Protocol::Arp,
                    Some(hop.target),
                    MacAddr::BROADCAST,
                    FollowUp::SpawnAfterArp {
                        source,
                        destination,
                    },
                    now,
                );
                Ok(self.outcome(pkt, SendOutcome::AwaitingArp))
            }
        }
    }

    fn outcome(&mut self, pkt: Packet, ok: fn(PacketId) -> SendOutcome) -> SendOutcome {
        let failed = pkt.status == PacketStatus::Failed;
        let id = self.admit(pkt);
        if failed {
            warn!(pkt_id = %id, "没有链路路径，数据包标记为 failed");
            SendOutcome::Undeliverable(id)
        } else {
            ok(id)
        }
    }

    /// 时钟推进一次
    #[tracing::instrument(skip_all, fields(now = %now, live = self.packets.len()))]
    pub fn tick(
        &mut self,
        topo: &mut Topology,
        cfg: &SimConfig,
        speed: f64,
        now: SimTime,
    ) -> TickReport {
        let current = std::mem::take(&mut self.packets);
        let mut kept = Vec::with_capacity(current.len());

        let mut pass = Pass {
            topo: &*topo,
            graph: topo.link_graph(),
            cfg,
            speed,
            fx: Effects::new(now),
            report: TickReport::default(),
            spawned: Vec::new(),
            reply_ids: current.iter().map(|p| p.id).collect(),
        };
        for pkt in current {
            if let Some(pkt) = self.advance(&mut pass, pkt) {
                kept.push(pkt);
            }
        }
        let Pass {
            mut fx,
            mut report,
            spawned,
            ..
        } = pass;

        for (device, ip, mac) in std::mem::take(&mut fx.arp) {
            if topo.learn_arp(device, ip, mac) {
                fx.events.push(VizEvent {
                    t_ns: now.0,
                    pkt_id: None,
                    protocol: None,
                    kind: VizEventKind::ArpLearn { device, ip, mac },
                });
            }
        }
        for (device, mac, port) in std::mem::take(&mut fx.macs) {
            if topo.learn_mac(device, mac, port) {
                fx.events.push(VizEvent {
                    t_ns: now.0,
                    pkt_id: None,
                    protocol: None,
                    kind: VizEventKind::MacLearn { device, mac, port },
                });
            }
        }

        for pkt in &spawned {
            report.spawned.push(pkt.id);
            fx.event(
                pkt,
                VizEventKind::Spawn {
                    source: pkt.source,
                    destination: pkt.destination,
                    path: pkt.path.clone(),
                    follow_up: pkt.follow_up,
                },
            );
        }
        kept.extend(spawned);
        self.packets = kept;

        report.events = fx.events;
        trace!(
            delivered = report.delivered.len(),
            spawned = report.spawned.len(),
            removed = report.removed.len(),
            "tick 完成"
        );
        report
    }

    /// 推进单个数据包；返回 None 表示从在途集合移除
    fn advance(&mut self, pass: &mut Pass<'_>, mut pkt: Packet) -> Option<Packet> {
        if pkt.status == PacketStatus::Failed {
            pass.fx.event(&pkt, VizEventKind::Removed);
            pass.report.removed.push(pkt.id);
            return None;
        }

        let Some(geo) = PathGeometry::of(pass.topo, &pkt.path) else {
            if pkt.status == PacketStatus::Delivered {
                // 已送达的包只剩展示窗口，直接移除
                pass.fx.event(&pkt, VizEventKind::Removed);
                pass.report.removed.push(pkt.id);
                return None;
            }
            warn!(pkt_id = %pkt.id, "路径上的设备已被删除");
            pkt.status = PacketStatus::Failed;
            pkt.failure = Some(FailureReason::DeviceRemoved);
            pass.fx.event(
                &pkt,
                VizEventKind::Failed {
                    reason: FailureReason::DeviceRemoved,
                },
            );
            pass.report.failed.push(pkt.id);
            return Some(pkt);
        };

        let elapsed = pass.fx.now.saturating_sub(pkt.created_at).as_secs_f64();
        pkt.travelled = elapsed * pass.cfg.base_speed * pass.speed;
        let total = geo.total();
        pkt.progress = if total > 0.0 {
            (pkt.travelled / total).min(1.0)
        } else {
            1.0
        };

        if pkt.in_flight() {
            let reached = geo.reached(pkt.travelled);
            let last = pkt.path.len().saturating_sub(1);
            for idx in pkt.crossed..reached.min(last) {
                on_interior_hop(pass.topo, &mut pkt, idx, &mut pass.fx);
            }
            pkt.crossed = pkt.crossed.max(reached);

            if pkt.travelled >= total {
                self.arrive(pass, &mut pkt);
            }
        }

        if pkt.status == PacketStatus::Delivered && pkt.travelled >= total + pass.cfg.arrival_grace
        {
            pass.fx.event(&pkt, VizEventKind::Removed);
            pass.report.removed.push(pkt.id);
            return None;
        }
        Some(pkt)
    }

    /// 数据包到达终点：更新 ARP、派生后续数据包。每个数据包只会执行一次。
    fn arrive(&mut self, pass: &mut Pass<'_>, pkt: &mut Packet) {
        pkt.status = PacketStatus::Delivered;
        pkt.progress = 1.0;
        info!(pkt_id = %pkt.id, protocol = %pkt.protocol, "✅ 数据包送达");
        pass.fx.event(
            pkt,
            VizEventKind::Delivered {
                node: pkt.destination,
            },
        );
        pass.report.delivered.push(pkt.id);

        let topo = pass.topo;
        match pkt.protocol {
            Protocol::Arp => {
                let Some(target) = topo.device(pkt.destination) else {
                    return;
                };
                if let Some(ip) = pkt.destination_ip {
                    pass.fx.arp.push((pkt.source, ip, target.mac));
                }
                if let FollowUp::SpawnAfterArp {
                    source,
                    destination,
                } = pkt.follow_up
                {
                    let resumed = self.resume_after_arp(pass, source, destination, target.mac);
                    match resumed {
                        Some(icmp) => {
                            debug!(pkt_id = %icmp.id, "ARP 完成，发出被推迟的 ICMP");
                            pass.reply_ids.insert(icmp.id);
                            pass.spawned.push(icmp);
                        }
                        None => warn!(%source, %destination, "ARP 完成但原始端点已不存在"),
                    }
                }
            }
            Protocol::Icmp if pkt.follow_up == FollowUp::SpawnReply && !pkt.is_reply => {
                match make_reply(pkt, pass.fx.now, &mut pass.reply_ids) {
                    Ok(reply) => {
                        debug!(pkt_id = %reply.id, "生成 ICMP 应答");
                        pass.spawned.push(reply);
                    }
                    Err(e) => trace!(error = %e, "跳过重复应答"),
                }
            }
            _ => {}
        }
    }

    /// ARP 解析完成后，在原始端点之间构建 ICMP
    fn resume_after_arp(
        &mut self,
        pass: &Pass<'_>,
        source: DeviceId,
        destination: DeviceId,
        resolved: MacAddr,
    ) -> Option<Packet> {
        let src = pass.topo.device(source)?;
        let dst = pass.topo.device(destination)?;
        Some(self.build(
            &pass.graph,
            src,
            dst,
            Protocol::Icmp,
            dst.ip,
            resolved,
            FollowUp::SpawnReply,
            pass.fx.now.saturating_add(pass.cfg.follow_up_delay),
        ))
    }
}

/// 回显应答：交换 IP 与 MAC，沿原路径反向返回，不再派生后续数据包。
fn make_reply(
    pkt: &Packet,
    now: SimTime,
    reply_ids: &mut HashSet<PacketId>,
) -> NetResult<Packet> {
    let id = pkt.id.reply_id();
    if !reply_ids.insert(id) {
        return Err(NetError::DuplicateReply(id));
    }
    let mut path = pkt.path.clone();
    path.reverse();
    Ok(Packet {
        id,
        source: pkt.destination,
        destination: pkt.source,
        source_ip: pkt.destination_ip,
        destination_ip: pkt.source_ip,
        source_mac: pkt.destination_mac,
        destination_mac: pkt.source_mac,
        protocol: Protocol::Icmp,
        status: PacketStatus::Sending,
        path,
        travelled: 0.0,
        progress: 0.0,
        crossed: 1,
        created_at: now,
        follow_up: FollowUp::None,
        is_reply: true,
        failure: None,
    })
}
