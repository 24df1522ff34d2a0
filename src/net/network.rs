//! 仿真控制器
//!
//! 拓扑存储与数据包引擎的唯一持有者。UI 与终端的所有修改都经过这里，
//! 保证每个操作要么完整生效、要么不生效。

use std::net::Ipv4Addr;

use tracing::{debug, info, warn};

use super::config::SimConfig;
use super::device::Device;
use super::engine::{PacketEngine, SendOutcome, TickReport};
use super::id::{ConnectionId, DeviceId, PacketId, PortId, SegmentId};
use super::packet::{Packet, Protocol};
use super::segment::SegmentKind;
use super::topology::Topology;
use crate::error::{NetError, NetResult};
use crate::sim::SimTime;
use crate::topo::{Preset, build_preset};
use crate::viz::{Snapshot, VizDeviceInfo, VizEvent, VizEventKind, VizLinkInfo, VizLogger};

/// 网络仿真状态
#[derive(Debug)]
pub struct Network {
    topo: Topology,
    engine: PacketEngine,
    cfg: SimConfig,
    speed: f64,
    /// 设置后记录可视化事件
    pub viz: Option<VizLogger>,
}

impl Default for Network {
    fn default() -> Self {
        Self::with_config(SimConfig::default())
    }
}

impl Network {
    pub fn with_config(cfg: SimConfig) -> Self {
        let cfg = cfg.sanitized();
        Self {
            topo: Topology::default(),
            engine: PacketEngine::default(),
            speed: cfg.speed_multiplier,
            cfg,
            viz: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    /// 表单等直接编辑入口
    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topo
    }

    pub fn packets(&self) -> &[Packet] {
        self.engine.packets()
    }

    pub fn packet(&self, id: PacketId) -> Option<&Packet> {
        self.engine.packet(id)
    }

    pub fn has_live_packets(&self) -> bool {
        !self.engine.is_idle()
    }

    pub fn simulation_speed(&self) -> f64 {
        self.speed
    }

    /// 设置速度倍率（必须为正的有限数）
    pub fn set_simulation_speed(&mut self, speed: f64) -> NetResult<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(NetError::InvalidSpeed(speed));
        }
        info!(speed, "⏩ 设置仿真速度");
        self.speed = speed;
        Ok(())
    }

    pub fn add_device(&mut self, device: Device) -> NetResult<DeviceId> {
        self.topo.add_device(device)
    }

    pub fn update_device(&mut self, device: Device) -> NetResult<()> {
        self.topo.update_device(device)
    }

    pub fn delete_device(&mut self, id: DeviceId) -> NetResult<Device> {
        self.topo.delete_device(id)
    }

    pub fn create_segment(
        &mut self,
        kind: SegmentKind,
        name: &str,
        network: Option<Ipv4Addr>,
        mask: Option<Ipv4Addr>,
    ) -> NetResult<SegmentId> {
        self.topo.create_segment(kind, name, network, mask)
    }

    pub fn create_connection(
        &mut self,
        from_device: DeviceId,
        from_port: PortId,
        to_device: DeviceId,
        to_port: PortId,
    ) -> NetResult<ConnectionId> {
        self.topo
            .create_connection(from_device, from_port, to_device, to_port)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> NetResult<()> {
        self.topo.remove_connection(id).map(|_| ())
    }

    /// 发送数据包
    pub fn send_packet(
        &mut self,
        source: DeviceId,
        destination: DeviceId,
        protocol: Protocol,
        now: SimTime,
    ) -> NetResult<SendOutcome> {
        let outcome = self
            .engine
            .send(&self.topo, source, destination, protocol, now)
            .inspect_err(|e| warn!(%source, %destination, %protocol, error = %e, "发送失败"))?;

        if let Some(pkt) = self.engine.packet(outcome.packet()) {
            let ev = VizEvent {
                t_ns: now.0,
                pkt_id: Some(pkt.id),
                protocol: Some(pkt.protocol),
                kind: VizEventKind::Spawn {
                    source: pkt.source,
                    destination: pkt.destination,
                    path: pkt.path.clone(),
                    follow_up: pkt.follow_up,
                },
            };
            self.viz_push(ev);
        }
        Ok(outcome)
    }

    /// 推进所有在途数据包
    pub fn tick(&mut self, now: SimTime) -> TickReport {
        let mut report = self.engine.tick(&mut self.topo, &self.cfg, self.speed, now);
        if let Some(v) = &mut self.viz {
            v.extend(std::mem::take(&mut report.events));
        }
        report
    }

    /// 丢弃全部在途数据包并清除设备/网段选择
    pub fn clear_simulation(&mut self) {
        debug!(dropped = self.engine.packets().len(), "清空仿真");
        self.engine.clear();
        self.topo.clear_device_selection();
    }

    /// 清空全部状态后载入预设拓扑
    #[tracing::instrument(skip(self))]
    pub fn load_preset(&mut self, preset: Preset) -> NetResult<()> {
        let mut topo = Topology::default();
        build_preset(&mut topo, preset)?;

        self.topo = topo;
        self.engine.clear();
        self.speed = self.cfg.speed_multiplier;
        info!(devices = self.topo.devices().len(), "📦 载入预设拓扑");
        Ok(())
    }

    pub fn load_preset_by_name(&mut self, name: &str) -> NetResult<()> {
        self.load_preset(name.parse()?)
    }

    pub fn snapshot(&self, now: SimTime) -> Snapshot {
        Snapshot {
            t_ns: now.0,
            devices: self.topo.devices().to_vec(),
            connections: self.topo.connections().to_vec(),
            segments: self.topo.segments().to_vec(),
            packets: self.engine.packets().to_vec(),
            selection: self.topo.selection(),
            simulation_speed: self.speed,
        }
    }

    fn viz_push(&mut self, ev: VizEvent) {
        if let Some(v) = &mut self.viz {
            v.push(ev);
        }
    }

    /// 记录拓扑元信息事件
    pub fn emit_viz_meta(&mut self, now: SimTime) {
        if self.viz.is_none() {
            return;
        }
        let devices = self
            .topo
            .devices()
            .iter()
            .map(|d| VizDeviceInfo {
                id: d.id,
                name: d.name.clone(),
                kind: d.kind,
                position: d.position,
            })
            .collect();
        let links = self
            .topo
            .connections()
            .iter()
            .map(|c| VizLinkInfo {
                id: c.id,
                from: c.from_device,
                to: c.to_device,
            })
            .collect();
        self.viz_push(VizEvent {
            t_ns: now.0,
            pkt_id: None,
            protocol: None,
            kind: VizEventKind::Meta { devices, links },
        });
    }
}
