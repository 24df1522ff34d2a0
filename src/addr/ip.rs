//! IPv4 点分十进制与 32 位整数之间的转换

use std::net::Ipv4Addr;

use crate::error::{NetError, NetResult};

/// 严格解析点分十进制：必须恰好 4 段，每段为 0..=255 的十进制数。
pub fn parse_ip(s: &str) -> NetResult<Ipv4Addr> {
    let invalid = || NetError::InvalidFormat(s.to_string());

    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for slot in octets.iter_mut() {
        let part = parts.next().ok_or_else(invalid)?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let v: u16 = part.parse().map_err(|_| invalid())?;
        *slot = u8::try_from(v).map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(Ipv4Addr::from(octets))
}

/// 点分十进制 -> u32（网络字节序语义，高位为第一段）
pub fn ip_to_int(s: &str) -> NetResult<u32> {
    parse_ip(s).map(u32::from)
}

/// u32 -> 点分十进制
pub fn int_to_ip(n: u32) -> String {
    Ipv4Addr::from(n).to_string()
}

/// 用户输入校验，拒绝格式错误的地址
pub fn validate_ip(s: &str) -> bool {
    parse_ip(s).is_ok()
}

/// `a & mask == b & mask`
pub fn same_subnet(a: Ipv4Addr, b: Ipv4Addr, mask: Ipv4Addr) -> bool {
    let m = u32::from(mask);
    u32::from(a) & m == u32::from(b) & m
}

pub fn network_address(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) & u32::from(mask))
}

pub fn broadcast_address(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) | !u32::from(mask))
}
