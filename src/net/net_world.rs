//! 网络世界实现
//!
//! 持有 `Network`，并在有在途数据包时保证时钟事件已被调度。

use super::network::Network;
use super::tick::Tick;
use crate::sim::{Simulator, World};
use std::any::Any;
use tracing::trace;

#[derive(Debug, Default)]
pub struct NetWorld {
    pub net: Network,
    clock_armed: bool,
}

impl NetWorld {
    pub fn new(net: Network) -> Self {
        Self {
            net,
            clock_armed: false,
        }
    }

    /// 事件里拿回具体的 `NetWorld`
    pub fn from_world(world: &mut dyn World) -> Option<&mut NetWorld> {
        world.as_any_mut().downcast_mut::<NetWorld>()
    }

    /// 有在途数据包且时钟未调度时，在一个周期后调度 `Tick`。
    /// 外部直接修改 `net`（例如终端命令）之后需要调用一次。
    pub fn arm_clock(&mut self, sim: &mut Simulator) {
        if self.clock_armed || !self.net.has_live_packets() {
            return;
        }
        let at = sim.now().saturating_add(self.net.config().tick_interval);
        trace!(at = %at, "⏱️  调度时钟");
        sim.schedule(at, Tick);
        self.clock_armed = true;
    }

    pub(crate) fn clock_fired(&mut self) {
        self.clock_armed = false;
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn after_event(&mut self, sim: &mut Simulator) {
        self.arm_clock(sim);
    }
}
