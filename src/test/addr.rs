use crate::addr::{
    MacAddr, MacAllocator, broadcast_address, int_to_ip, ip_to_int, network_address, parse_ip,
    same_subnet, validate_ip,
};
use crate::error::NetError;
use std::collections::HashSet;
use std::net::Ipv4Addr;

#[test]
fn ip_to_int_and_back() {
    assert_eq!(ip_to_int("192.168.1.10"), Ok(0xC0A8_010A));
    assert_eq!(ip_to_int("0.0.0.0"), Ok(0));
    assert_eq!(ip_to_int("255.255.255.255"), Ok(u32::MAX));
    assert_eq!(int_to_ip(0xC0A8_010A), "192.168.1.10");
    assert_eq!(int_to_ip(ip_to_int("10.0.0.1").unwrap()), "10.0.0.1");
}

#[test]
fn malformed_addresses_are_rejected() {
    for bad in [
        "",
        "1.2.3",
        "1.2.3.4.5",
        "256.1.1.1",
        "1..2.3",
        "a.b.c.d",
        "1.2.3.-4",
        " 1.2.3.4",
        "1.2.3.1000",
        "+1.2.3.4",
    ] {
        assert!(!validate_ip(bad), "{bad:?} should be invalid");
        assert_eq!(
            ip_to_int(bad),
            Err(NetError::InvalidFormat(bad.to_string()))
        );
    }
    assert!(validate_ip("192.168.001.010"));
    assert_eq!(
        parse_ip("192.168.001.010"),
        Ok(Ipv4Addr::new(192, 168, 1, 10))
    );
}

#[test]
fn subnet_membership_and_bounds() {
    let mask = Ipv4Addr::new(255, 255, 255, 0);
    let a = Ipv4Addr::new(192, 168, 1, 10);
    assert!(same_subnet(a, Ipv4Addr::new(192, 168, 1, 200), mask));
    assert!(!same_subnet(a, Ipv4Addr::new(192, 168, 2, 10), mask));
    assert!(same_subnet(
        a,
        Ipv4Addr::new(10, 0, 0, 1),
        Ipv4Addr::UNSPECIFIED
    ));

    assert_eq!(network_address(a, mask), Ipv4Addr::new(192, 168, 1, 0));
    assert_eq!(broadcast_address(a, mask), Ipv4Addr::new(192, 168, 1, 255));

    let m20 = Ipv4Addr::new(255, 255, 240, 0);
    let b = Ipv4Addr::new(172, 16, 37, 9);
    assert_eq!(network_address(b, m20), Ipv4Addr::new(172, 16, 32, 0));
    assert_eq!(broadcast_address(b, m20), Ipv4Addr::new(172, 16, 47, 255));
}

#[test]
fn mac_display_and_parse() {
    let mac = MacAddr([0x02, 0xAB, 0x00, 0x10, 0xFE, 0x7C]);
    assert_eq!(mac.to_string(), "02:AB:00:10:FE:7C");
    assert_eq!("02:ab:00:10:fe:7c".parse::<MacAddr>(), Ok(mac));
    assert_eq!("02-AB-00-10-FE-7C".parse::<MacAddr>(), Ok(mac));
    assert!("02:AB:00:10:FE".parse::<MacAddr>().is_err());
    assert!("02:AB:00:10:FE:7C:00".parse::<MacAddr>().is_err());
    assert!("0G:AB:00:10:FE:7C".parse::<MacAddr>().is_err());
    assert!("+A:BB:CC:DD:EE:FF".parse::<MacAddr>().is_err());
    assert!("02:AB:00:10:FE:-7".parse::<MacAddr>().is_err());
    assert!(MacAddr::BROADCAST.is_broadcast());
    assert_eq!(MacAddr::BROADCAST.to_string(), "FF:FF:FF:FF:FF:FF");
}

#[test]
fn mac_serializes_as_string() {
    let mac = MacAddr([0x02, 0, 0, 0, 0, 1]);
    let json = serde_json::to_string(&mac).unwrap();
    assert_eq!(json, "\"02:00:00:00:00:01\"");
    assert_eq!(serde_json::from_str::<MacAddr>(&json).unwrap(), mac);
}

#[test]
fn mac_allocator_is_deterministic_local_unicast() {
    let mut a = MacAllocator::new(7);
    let mut b = MacAllocator::new(7);
    let xs: Vec<_> = (0..64).map(|_| a.next_mac()).collect();
    let ys: Vec<_> = (0..64).map(|_| b.next_mac()).collect();
    assert_eq!(xs, ys);

    let uniq: HashSet<_> = xs.iter().collect();
    assert_eq!(uniq.len(), xs.len());
    for m in &xs {
        assert_eq!(m.0[0] & 0x01, 0, "unicast bit must be clear: {m}");
        assert_eq!(
            m.0[0] & 0x02, 0x02,
            "locally administered bit must be set: {m}"
        );
    }

    let mut other = MacAllocator::new(8);
    assert_ne!(other.next_mac(), xs[0]);
}
