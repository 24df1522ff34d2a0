mod addr;
mod classify;
mod network;
mod presets;
mod terminal;

use std::net::Ipv4Addr;

use crate::net::{Device, DeviceId, DeviceKind, Position, Topology};

pub(crate) const MASK_24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// 放一台设备，可选 /24 地址
pub(crate) fn put(
    topo: &mut Topology,
    name: &str,
    kind: DeviceKind,
    x: f64,
    ip: Option<[u8; 4]>,
) -> DeviceId {
    let id = topo.next_device_id();
    let mac = topo.allocate_mac();
    let mut dev = Device::new(id, name, kind, Position::new(x, 0.0), mac);
    if let Some(ip) = ip {
        dev = dev.with_address(Ipv4Addr::from(ip), MASK_24);
    }
    topo.add_device(dev).expect("add device")
}
