//! 路径解析
//!
//! 在链路构成的无向图上做 BFS，得到两台设备之间的最短跳数路径。
//! 邻居按链路创建顺序访问，第一条找到的路径胜出，不做加权。

use std::collections::{HashMap, VecDeque};

use super::connection::Connection;
use super::id::DeviceId;

/// BFS 的结果。`Fallback` 是找不到路径时的两点直连，不能当作真实路由使用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    Found(Vec<DeviceId>),
    Fallback(Vec<DeviceId>),
}

impl PathResolution {
    pub fn hops(&self) -> &[DeviceId] {
        match self {
            PathResolution::Found(p) | PathResolution::Fallback(p) => p,
        }
    }

    pub fn into_hops(self) -> Vec<DeviceId> {
        match self {
            PathResolution::Found(p) | PathResolution::Fallback(p) => p,
        }
    }

    pub fn is_routable(&self) -> bool {
        matches!(self, PathResolution::Found(_))
    }
}

/// 由 connected 状态的链路构成的邻接表
#[derive(Debug, Default, Clone)]
pub struct LinkGraph {
    adj: HashMap<DeviceId, Vec<DeviceId>>,
}

impl LinkGraph {
    pub fn from_connections<'a>(connections: impl IntoIterator<Item = &'a Connection>) -> Self {
        let mut adj: HashMap<DeviceId, Vec<DeviceId>> = HashMap::new();
        for c in connections.into_iter().filter(|c| c.is_connected()) {
            adj.entry(c.from_device).or_default().push(c.to_device);
            adj.entry(c.to_device).or_default().push(c.from_device);
        }
        Self { adj }
    }

    pub fn neighbors(&self, device: DeviceId) -> &[DeviceId] {
        self.adj.get(&device).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn are_linked(&self, a: DeviceId, b: DeviceId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// 最短路径，包含两端。不可达时返回 `Fallback([src, dst])`。
    pub fn shortest_path(&self, src: DeviceId, dst: DeviceId) -> PathResolution {
        if src == dst {
            return PathResolution::Found(vec![src]);
        }

        let (_, parent) = self.bfs(src, Some(dst));
        if !parent.contains_key(&dst) {
            return PathResolution::Fallback(vec![src, dst]);
        }

        let mut path = vec![dst];
        let mut cur = dst;
        while let Some(&prev) = parent.get(&cur) {
            path.push(prev);
            cur = prev;
        }
        path.reverse();
        PathResolution::Found(path)
    }

    /// 从 `src` 出发可达的全部设备（BFS 访问顺序，含 `src` 自身）
    pub fn reachable_from(&self, src: DeviceId) -> Vec<DeviceId> {
        self.bfs(src, None).0
    }

    /// 返回 (访问顺序, 前驱表)。找到 `target` 时立即停止。
    fn bfs(
        &self,
        src: DeviceId,
        target: Option<DeviceId>,
    ) -> (Vec<DeviceId>, HashMap<DeviceId, DeviceId>) {
        let mut order = vec![src];
        let mut parent: HashMap<DeviceId, DeviceId> = HashMap::new();
        let mut q: VecDeque<DeviceId> = VecDeque::from([src]);

        while let Some(v) = q.pop_front() {
            for &n in self.neighbors(v) {
                if n == src || parent.contains_key(&n) {
                    continue;
                }
                parent.insert(n, v);
                order.push(n);
                if Some(n) == target {
                    return (order, parent);
                }
                q.push_back(n);
            }
        }
        (order, parent)
    }
}
