//! 地址工具
//!
//! IPv4 / MAC 地址的解析、子网判断与网络/广播地址计算。全部为纯函数，不持有状态。

mod ip;
mod mac;

pub use ip::{
    broadcast_address, int_to_ip, ip_to_int, network_address, parse_ip, same_subnet, validate_ip,
};
pub use mac::{MacAddr, MacAllocator};
