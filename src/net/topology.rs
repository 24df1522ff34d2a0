//! 拓扑存储
//!
//! 设备、链路、网段的权威集合。所有修改都先校验、后落地：出错时状态不变。

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::connection::{Connection, LinkStatus, LinkType};
use super::device::{Device, Port, PortStatus, Position};
use super::graph::LinkGraph;
use super::id::{ConnectionId, DeviceId, PortId, SegmentId};
use super::segment::{SEGMENT_COLORS, Segment, SegmentKind};
use crate::addr::{MacAddr, MacAllocator, same_subnet};
use crate::error::{NetError, NetResult};

/// UI 当前选中的实体。三者互斥。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub device: Option<DeviceId>,
    pub segment: Option<SegmentId>,
    pub connection: Option<ConnectionId>,
}

#[derive(Debug, Default)]
pub struct Topology {
    devices: Vec<Device>,
    connections: Vec<Connection>,
    segments: Vec<Segment>,
    next_device: usize,
    next_port: usize,
    next_connection: usize,
    next_segment: usize,
    macs: MacAllocator,
    selection: Selection,
}

impl Topology {
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// 第一个 IP 等于 `ip` 的设备
    pub fn device_by_ip(&self, ip: Ipv4Addr) -> Option<&Device> {
        self.devices.iter().find(|d| d.ip == Some(ip))
    }

    /// 按名称查找（忽略大小写）
    pub fn device_by_name(&self, name: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// 分配一个新的设备 id
    pub fn next_device_id(&mut self) -> DeviceId {
        let id = DeviceId(self.next_device);
        self.next_device += 1;
        id
    }

    /// 分配一个当前未被占用的 MAC
    pub fn allocate_mac(&mut self) -> MacAddr {
        loop {
            let mac = self.macs.next_mac();
            if self.devices.iter().all(|d| d.mac != mac) {
                return mac;
            }
        }
    }

    /// 当前 connected 链路构成的图
    pub fn link_graph(&self) -> LinkGraph {
        LinkGraph::from_connections(&self.connections)
    }

    /// 两台设备之间的第一条链路
    pub fn connection_between(&self, a: DeviceId, b: DeviceId) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.peer_of(a) == Some(b))
    }

    /// 添加设备。端口按类型重新生成，传入记录里的端口会被忽略。
    #[tracing::instrument(skip(self, device), fields(device = %device.id, name = %device.name, kind = %device.kind))]
    pub fn add_device(&mut self, mut device: Device) -> NetResult<DeviceId> {
        if self.device(device.id).is_some() {
            return Err(NetError::DuplicateDevice(device.id));
        }
        if self.devices.iter().any(|d| d.mac == device.mac) {
            return Err(NetError::DuplicateMac(device.mac));
        }

        device.ports = (0..device.kind.port_count())
            .map(|i| {
                let id = PortId(self.next_port);
                self.next_port += 1;
                Port {
                    id,
                    name: format!("Port {}", i + 1),
                    status: PortStatus::Up,
                    linked_to: None,
                }
            })
            .collect();

        let id = device.id;
        self.next_device = self.next_device.max(id.0 + 1);
        self.devices.push(device);
        info!("➕ 添加设备");

        self.recompute_l3_membership();
        Ok(id)
    }

    /// 按 id 替换设备记录。端口占用由链路管理维护，因此保留原有端口。
    #[tracing::instrument(skip(self, device), fields(device = %device.id))]
    pub fn update_device(&mut self, mut device: Device) -> NetResult<()> {
        if self
            .devices
            .iter()
            .any(|d| d.id != device.id && d.mac == device.mac)
        {
            return Err(NetError::DuplicateMac(device.mac));
        }
        let slot = self
            .device_mut(device.id)
            .ok_or(NetError::UnknownDevice(device.id))?;

        let readdressed = slot.ip != device.ip || slot.mask != device.mask;
        device.ports = std::mem::take(&mut slot.ports);
        *slot = device;
        debug!(readdressed, "更新设备");

        if readdressed {
            self.recompute_l3_membership();
        }
        Ok(())
    }

    pub fn update_device_position(&mut self, id: DeviceId, position: Position) -> NetResult<()> {
        let device = self.device_mut(id).ok_or(NetError::UnknownDevice(id))?;
        device.position = position;
        trace!(device = %id, x = position.x, y = position.y, "移动设备");
        Ok(())
    }

    /// 删除设备：同时从所有网段移除，并删掉所有触及它的链路，释放对端端口。
    #[tracing::instrument(skip(self))]
    pub fn delete_device(&mut self, id: DeviceId) -> NetResult<Device> {
        let idx = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or(NetError::UnknownDevice(id))?;
        let device = self.devices.remove(idx);

        for seg in &mut self.segments {
            seg.devices.retain(|&d| d != id);
        }

        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.connections)
            .into_iter()
            .partition(|c| c.touches(id));
        self.connections = kept;
        for c in &dropped {
            if let Some(peer) = c.peer_of(id)
                && let Some(port) = c.port_of(peer)
                && let Some(p) = self.device_mut(peer).and_then(|d| d.port_mut(port))
            {
                p.linked_to = None;
            }
            if self.selection.connection == Some(c.id) {
                self.selection.connection = None;
            }
        }
        if self.selection.device == Some(id) {
            self.selection.device = None;
        }

        info!(removed_connections = dropped.len(), "🗑️  删除设备");
        self.recompute_l3_membership();
        Ok(device)
    }

    /// 新建网段。L3 网段必须同时给出 network 与 mask。
    #[tracing::instrument(skip(self))]
    pub fn create_segment(
        &mut self,
        kind: SegmentKind,
        name: &str,
        network: Option<Ipv4Addr>,
        mask: Option<Ipv4Addr>,
    ) -> NetResult<SegmentId> {
        if kind == SegmentKind::L3 && (network.is_none() || mask.is_none()) {
            return Err(NetError::MissingSegmentNetwork);
        }

        let color = SEGMENT_COLORS
            .iter()
            .find(|c| self.segments.iter().all(|s| s.color != **c))
            .unwrap_or(&SEGMENT_COLORS[0]);

        let id = SegmentId(self.next_segment);
        self.next_segment += 1;
        self.segments.push(Segment {
            id,
            kind,
            name: name.to_string(),
            network,
            mask,
            devices: Vec::new(),
            color: (*color).to_string(),
        });
        info!(segment = %id, "新建网段");

        self.recompute_l3_membership();
        Ok(id)
    }

    pub fn add_device_to_segment(&mut self, device: DeviceId, segment: SegmentId) -> NetResult<()> {
        if self.device(device).is_none() {
            return Err(NetError::UnknownDevice(device));
        }
        let seg = self
            .segments
            .iter_mut()
            .find(|s| s.id == segment)
            .ok_or(NetError::UnknownSegment(segment))?;
        if !seg.devices.contains(&device) {
            seg.devices.push(device);
        }
        Ok(())
    }

    pub fn remove_device_from_segment(
        &mut self,
        device: DeviceId,
        segment: SegmentId,
    ) -> NetResult<()> {
        let seg = self
            .segments
            .iter_mut()
            .find(|s| s.id == segment)
            .ok_or(NetError::UnknownSegment(segment))?;
        seg.devices.retain(|&d| d != device);
        Ok(())
    }

    /// 从头重算每个 L3 网段的成员：设备 IP 落在网段 network/mask 内即为成员。
    pub fn recompute_l3_membership(&mut self) {
        let devices = &self.devices;
        for seg in &mut self.segments {
            let (SegmentKind::L3, Some(network), Some(mask)) = (seg.kind, seg.network, seg.mask)
            else {
                continue;
            };
            seg.devices = devices
                .iter()
                .filter(|d| matches!(d.address(), Some((ip, _)) if same_subnet(ip, network, mask)))
                .map(|d| d.id)
                .collect();
            trace!(segment = %seg.id, members = seg.devices.len(), "重算 L3 成员");
        }
    }

    /// 在两个指定端口之间建链路。任一端口已占用或不属于该设备时拒绝，状态不变。
    #[tracing::instrument(skip(self))]
    pub fn create_connection(
        &mut self,
        from_device: DeviceId,
        from_port: PortId,
        to_device: DeviceId,
        to_port: PortId,
    ) -> NetResult<ConnectionId> {
        if from_device == to_device {
            return Err(NetError::SameEndpoint);
        }
        for (device, port) in [(from_device, from_port), (to_device, to_port)] {
            let d = self.device(device).ok_or(NetError::UnknownDevice(device))?;
            if !d.port(port).is_some_and(Port::is_available) {
                return Err(NetError::PortUnavailable { device, port });
            }
        }

        for (device, port, peer) in [
            (from_device, from_port, to_port),
            (to_device, to_port, from_port),
        ] {
            if let Some(p) = self.device_mut(device).and_then(|d| d.port_mut(port)) {
                p.linked_to = Some(peer);
            }
        }

        let id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        self.connections.push(Connection {
            id,
            from_device,
            from_port,
            to_device,
            to_port,
            link_type: LinkType::Ethernet,
            status: LinkStatus::Connected,
        });
        info!(connection = %id, "🔗 建立链路");
        Ok(id)
    }

    /// 用两端各自第一个空闲端口建链路
    pub fn connect(&mut self, a: DeviceId, b: DeviceId) -> NetResult<ConnectionId> {
        let free = |t: &Self, d: DeviceId| -> NetResult<PortId> {
            let dev = t.device(d).ok_or(NetError::UnknownDevice(d))?;
            dev.free_port().map(|p| p.id).ok_or(NetError::NoFreePort(d))
        };
        let pa = free(self, a)?;
        let pb = free(self, b)?;
        self.create_connection(a, pa, b, pb)
    }

    /// 删除链路并释放两端端口
    #[tracing::instrument(skip(self))]
    pub fn remove_connection(&mut self, id: ConnectionId) -> NetResult<Connection> {
        let idx = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or(NetError::UnknownConnection(id))?;
        let c = self.connections.remove(idx);

        for (device, port) in [(c.from_device, c.from_port), (c.to_device, c.to_port)] {
            if let Some(p) = self.device_mut(device).and_then(|d| d.port_mut(port)) {
                p.linked_to = None;
            }
        }
        if self.selection.connection == Some(id) {
            self.selection.connection = None;
        }
        info!("✂️  删除链路");
        Ok(c)
    }

    /// 写入 ARP 表项，返回表是否发生变化
    pub(crate) fn learn_arp(&mut self, device: DeviceId, ip: Ipv4Addr, mac: MacAddr) -> bool {
        let Some(d) = self.device_mut(device) else {
            return false;
        };
        let changed = d.arp_table.insert(ip, mac) != Some(mac);
        if changed {
            debug!(device = %device, %ip, %mac, "📝 ARP 表学习");
        }
        changed
    }

    /// 写入交换机 MAC 表项，返回表是否发生变化
    pub(crate) fn learn_mac(&mut self, switch: DeviceId, mac: MacAddr, port: PortId) -> bool {
        let Some(table) = self.device_mut(switch).and_then(|d| d.mac_table.as_mut()) else {
            return false;
        };
        let changed = table.insert(mac, port) != Some(port);
        if changed {
            debug!(device = %switch, %mac, %port, "📝 MAC 表学习");
        }
        changed
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select_device(&mut self, id: Option<DeviceId>) {
        self.selection = Selection {
            device: id,
            ..Selection::default()
        };
    }

    pub fn select_segment(&mut self, id: Option<SegmentId>) {
        self.selection = Selection {
            segment: id,
            ..Selection::default()
        };
    }

    pub fn select_connection(&mut self, id: Option<ConnectionId>) {
        self.selection = Selection {
            connection: id,
            ..Selection::default()
        };
    }

    /// 只清除设备与网段选择，保留链路选择
    pub(crate) fn clear_device_selection(&mut self) {
        self.selection.device = None;
        self.selection.segment = None;
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.selection.device.and_then(|id| self.device(id))
    }

    pub fn selected_segment(&self) -> Option<&Segment> {
        self.selection.segment.and_then(|id| self.segment(id))
    }

    pub fn selected_connection(&self) -> Option<&Connection> {
        self.selection.connection.and_then(|id| self.connection(id))
    }
}
