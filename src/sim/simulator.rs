//! 仿真器
//!
//! 维护当前时间与按 (时间, 序号) 排序的事件队列。

use super::event::Event;
use super::time::SimTime;
use super::world::World;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 队列项。同一时刻的事件按调度顺序（seq）执行。
struct Scheduled {
    key: Reverse<(SimTime, u64)>,
    ev: Box<dyn Event>,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Scheduled {}

/// 事件驱动仿真器
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<Scheduled>,
}

impl Simulator {
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中待执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在 `at` 执行；早于当前时间的事件按当前时间处理。
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = %at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        trace!(now = %self.now, seq, "调度事件");

        self.q.push(Scheduled {
            key: Reverse((at, seq)),
            ev: Box::new(ev),
        });
    }

    /// 运行直到队列为空或下一个事件晚于 `until`；返回后 `now >= until`。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        while let Some(top) = self.q.peek() {
            let Reverse((at, _)) = top.key;
            if at > until {
                break;
            }
            self.step(world);
        }
        self.now = self.now.max(until);
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        let mut event_count = 0u64;
        while self.step(world) {
            event_count += 1;
        }
        info!(total_events = event_count, final_time = %self.now, "✅ 仿真完成");
    }

    /// 执行队首事件，队列为空时返回 false
    fn step(&mut self, world: &mut dyn World) -> bool {
        let Some(item) = self.q.pop() else {
            return false;
        };
        let Reverse((at, seq)) = item.key;
        self.now = at;
        debug!(now = %self.now, seq, remaining_queue = self.q.len(), "执行事件");

        item.ev.execute(self, world);
        world.after_event(self);
        true
    }
}
