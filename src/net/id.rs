//! 标识符类型
//!
//! 设备、端口、链路、网段与数据包的唯一标识符。

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! index_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

index_id!(
    /// 设备标识符
    DeviceId,
    "device"
);
index_id!(
    /// 端口标识符（全局唯一，不只是设备内唯一）
    PortId,
    "port"
);
index_id!(
    /// 链路标识符
    ConnectionId,
    "connection"
);
index_id!(
    /// 网段标识符
    SegmentId,
    "segment"
);

/// 数据包标识符。应答包的 id 由原始 ICMP 的序号派生，用于去重。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "seq", rename_all = "snake_case")]
pub enum PacketId {
    Fresh(u64),
    Reply(u64),
}

impl PacketId {
    /// 该数据包对应应答的 id
    pub fn reply_id(self) -> PacketId {
        match self {
            PacketId::Fresh(seq) | PacketId::Reply(seq) => PacketId::Reply(seq),
        }
    }

    pub fn is_reply(self) -> bool {
        matches!(self, PacketId::Reply(_))
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketId::Fresh(seq) => write!(f, "packet_{seq}"),
            PacketId::Reply(seq) => write!(f, "packet_{seq}_reply"),
        }
    }
}
