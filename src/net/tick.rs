//! 时钟事件

use super::net_world::NetWorld;
use crate::sim::{Event, Simulator, World};
use tracing::{debug, warn};

/// 事件：推进所有在途数据包一次。只要还有在途数据包，`NetWorld` 会在事件后重新调度它。
#[derive(Debug)]
pub struct Tick;

impl Event for Tick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let Some(w) = NetWorld::from_world(world) else {
            warn!("Tick 需要 NetWorld");
            return;
        };
        w.clock_fired();
        let report = w.net.tick(sim.now());
        debug!(
            now = %sim.now(),
            delivered = report.delivered.len(),
            spawned = report.spawned.len(),
            removed = report.removed.len(),
            live = w.net.packets().len(),
            "⏱️  时钟推进"
        );
    }
}
