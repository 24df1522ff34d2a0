//! MAC 地址类型与确定性分配器

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// 以太网 MAC 地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xFF; 6]);

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = NetError;

    /// 接受 `AA:BB:CC:DD:EE:FF` 或 `aa-bb-cc-dd-ee-ff`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetError::InvalidFormat(s.to_string());
        let sep = if s.contains('-') { '-' } else { ':' };

        let mut out = [0u8; 6];
        let mut parts = s.split(sep);
        for slot in out.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(MacAddr(out))
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

impl TryFrom<String> for MacAddr {
    type Error = NetError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// 确定性的 MAC 生成器：同一个种子总是产生同一串地址，保证预设拓扑可复现。
#[derive(Debug, Clone)]
pub struct MacAllocator {
    seed: u64,
    counter: u64,
}

impl MacAllocator {
    pub fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    /// 生成下一个本地管理的单播地址（首字节 bit1=1, bit0=0）
    pub fn next_mac(&mut self) -> MacAddr {
        self.counter = self.counter.wrapping_add(1);
        let h = mix64(self.seed ^ self.counter.wrapping_mul(0x9E3779B97F4A7C15));
        let bytes = h.to_be_bytes();
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&bytes[2..8]);
        mac[0] = (mac[0] & 0xFC) | 0x02;
        MacAddr(mac)
    }
}

impl Default for MacAllocator {
    fn default() -> Self {
        Self::new(0)
    }
}

// splitmix64
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
