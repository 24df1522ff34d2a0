//! 仿真参数

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sim::SimTime;

/// 仿真时钟与数据包运动参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// 时钟周期
    pub tick_interval: SimTime,
    /// 倍率为 1 时每仿真秒走过的距离（画布坐标单位）
    pub base_speed: f64,
    /// 送达后再走这么远才从在途集合移除，避免渲染层突然消失
    pub arrival_grace: f64,
    /// ARP 完成后续发 ICMP 的创建时间偏移
    pub follow_up_delay: SimTime,
    /// 初始速度倍率
    pub speed_multiplier: f64,
}

impl SimConfig {
    /// 时钟周期下限；为 0 时时钟会在同一时刻反复触发
    pub const MIN_TICK_INTERVAL: SimTime = SimTime(1_000_000);

    /// 把不可用的参数拉回可运行的范围
    pub(crate) fn sanitized(mut self) -> Self {
        if self.tick_interval < Self::MIN_TICK_INTERVAL {
            warn!(tick = %self.tick_interval, "时钟周期过小，改用 1ms");
            self.tick_interval = Self::MIN_TICK_INTERVAL;
        }
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier > 0.0) {
            warn!(speed = self.speed_multiplier, "初始速度倍率无效，改用 1.0");
            self.speed_multiplier = 1.0;
        }
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: SimTime::from_millis(50),
            base_speed: 200.0,
            arrival_grace: 10.0,
            follow_up_delay: SimTime::from_millis(100),
            speed_multiplier: 1.0,
        }
    }
}
