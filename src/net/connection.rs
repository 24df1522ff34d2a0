//! 链路（连接）类型

use serde::{Deserialize, Serialize};

use super::id::{ConnectionId, DeviceId, PortId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Ethernet,
    Serial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

/// 点对点链路：两端各是一个 (设备, 端口)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_device: DeviceId,
    pub from_port: PortId,
    pub to_device: DeviceId,
    pub to_port: PortId,
    pub link_type: LinkType,
    pub status: LinkStatus,
}

impl Connection {
    pub fn is_connected(&self) -> bool {
        self.status == LinkStatus::Connected
    }

    pub fn touches(&self, device: DeviceId) -> bool {
        self.from_device == device || self.to_device == device
    }

    /// 给定一端设备，返回另一端设备
    pub fn peer_of(&self, device: DeviceId) -> Option<DeviceId> {
        if self.from_device == device {
            Some(self.to_device)
        } else if self.to_device == device {
            Some(self.from_device)
        } else {
            None
        }
    }

    /// `device` 在这条链路上使用的端口
    pub fn port_of(&self, device: DeviceId) -> Option<PortId> {
        if self.from_device == device {
            Some(self.from_port)
        } else if self.to_device == device {
            Some(self.to_port)
        } else {
            None
        }
    }
}
