//! 错误类型
//!
//! 网络仿真库的统一错误定义。

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::addr::MacAddr;
use crate::net::{ConnectionId, DeviceId, PacketId, PortId, SegmentId};

/// 库内所有可失败操作的错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetError {
    /// IP / 掩码字符串格式不合法
    #[error("invalid address format: {0:?}")]
    InvalidFormat(String),

    /// 端口已被占用或不存在
    #[error("port {port} on device {device} is unavailable")]
    PortUnavailable { device: DeviceId, port: PortId },

    /// 设备没有空闲端口
    #[error("device {0} has no free port")]
    NoFreePort(DeviceId),

    /// 找不到可达路径或下一跳
    #[error("no route from {from} to {to}")]
    NoRoute { from: DeviceId, to: Ipv4Addr },

    /// 设备缺少 IP 或子网掩码
    #[error("device {0} has no IP address or subnet mask")]
    NoAddress(DeviceId),

    /// 同一个 ICMP 已经生成过应答（内部使用，不对外暴露）
    #[error("reply {0} already exists")]
    DuplicateReply(PacketId),

    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("unknown segment {0}")]
    UnknownSegment(SegmentId),

    #[error("device id {0} already exists")]
    DuplicateDevice(DeviceId),

    #[error("MAC address {0} already in use")]
    DuplicateMac(MacAddr),

    /// 两端选择了同一个设备
    #[error("source and destination must be different devices")]
    SameEndpoint,

    /// L3 网段缺少 network/mask
    #[error("L3 segment requires both network and mask")]
    MissingSegmentNetwork,

    #[error("simulation speed must be a positive finite number, got {0}")]
    InvalidSpeed(f64),

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

/// 库操作结果
pub type NetResult<T> = Result<T, NetError>;
