use serde::{Deserialize, Serialize};

use crate::net::{Connection, Device, Packet, Segment, Selection};

/// 某一时刻的完整状态，供渲染层读取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub t_ns: u64,
    pub devices: Vec<Device>,
    pub connections: Vec<Connection>,
    pub segments: Vec<Segment>,
    pub packets: Vec<Packet>,
    pub selection: Selection,
    pub simulation_speed: f64,
}
