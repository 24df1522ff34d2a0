//! 网络模拟模块
//!
//! 设备/链路/网段数据模型、拓扑存储、路径解析、网段判定与数据包生命周期引擎。

// 子模块声明
mod classify;
mod config;
mod connection;
mod device;
mod engine;
mod graph;
mod hop;
mod id;
mod net_world;
mod network;
mod packet;
mod segment;
mod send_packet;
mod tick;
mod topology;

// 重新导出公共接口
pub use classify::{NextHop, is_same_l2_segment, l2_domain, next_hop};
pub use config::SimConfig;
pub use connection::{Connection, LinkStatus, LinkType};
pub use device::{Device, DeviceKind, Port, PortStatus, Position, RoutingEntry};
pub use engine::{PacketEngine, SendOutcome, TickReport};
pub use graph::{LinkGraph, PathResolution};
pub use id::{ConnectionId, DeviceId, PacketId, PortId, SegmentId};
pub use net_world::NetWorld;
pub use network::Network;
pub use packet::{FailureReason, FollowUp, Packet, PacketStatus, Protocol};
pub use segment::{SEGMENT_COLORS, Segment, SegmentKind};
pub use send_packet::SendPacket;
pub use tick::Tick;
pub use topology::{Selection, Topology};
