//! 发包事件

use super::id::DeviceId;
use super::net_world::NetWorld;
use super::packet::Protocol;
use crate::sim::{Event, Simulator, World};
use tracing::{info, warn};

/// 事件：在事件时刻从 `source` 向 `destination` 发送一个数据包
#[derive(Debug)]
pub struct SendPacket {
    pub source: DeviceId,
    pub destination: DeviceId,
    pub protocol: Protocol,
}

impl Event for SendPacket {
    #[tracing::instrument(skip_all, fields(source = %self.source, destination = %self.destination, protocol = %self.protocol))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let SendPacket {
            source,
            destination,
            protocol,
        } = *self;

        let Some(w) = NetWorld::from_world(world) else {
            warn!("SendPacket 需要 NetWorld");
            return;
        };
        match w.net.send_packet(source, destination, protocol, sim.now()) {
            Ok(outcome) => info!(?outcome, "📨 发包"),
            Err(e) => warn!(error = %e, "发包被拒绝"),
        }
    }
}
