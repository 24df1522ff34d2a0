//! 仿真核心模块
//!
//! 离散事件仿真器：仿真时间、事件、世界与事件队列。网络层的周期性时钟
//! （`net::Tick`）就是挂在这个队列上的一个自我重调度事件。

mod event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
