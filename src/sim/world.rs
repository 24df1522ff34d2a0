//! 世界 trait

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由业务层实现，事件通过 `as_any_mut` 向下转型拿到具体类型。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完之后调用
    fn after_event(&mut self, _sim: &mut Simulator) {}
}
