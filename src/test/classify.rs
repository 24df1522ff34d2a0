use std::net::Ipv4Addr;

use super::put;
use crate::error::NetError;
use crate::net::{DeviceKind, NextHop, Topology, is_same_l2_segment, l2_domain, next_hop};

#[test]
fn switch_chain_is_one_l2_segment_and_router_splits_it() {
    let mut topo = Topology::default();
    let pc1 = put(
        &mut topo,
        "PC1",
        DeviceKind::Client,
        0.0,
        Some([10, 0, 0, 1]),
    );
    let s1 = put(&mut topo, "S1", DeviceKind::Switch, 1.0, None);
    let s2 = put(&mut topo, "S2", DeviceKind::Switch, 2.0, None);
    let pc2 = put(
        &mut topo,
        "PC2",
        DeviceKind::Client,
        3.0,
        Some([10, 0, 0, 2]),
    );
    topo.connect(pc1, s1).unwrap();
    topo.connect(s1, s2).unwrap();
    topo.connect(s2, pc2).unwrap();

    let g = topo.link_graph();
    assert!(is_same_l2_segment(&topo, &g, pc1, pc2));
    assert!(is_same_l2_segment(&topo, &g, pc2, pc1));
    assert!(is_same_l2_segment(&topo, &g, pc1, pc1));

    // 在 S1 与 S2 之间插入路由器
    let link = topo.connection_between(s1, s2).unwrap().id;
    topo.remove_connection(link).unwrap();
    let r = put(&mut topo, "R", DeviceKind::Router, 1.5, None);
    topo.connect(s1, r).unwrap();
    topo.connect(r, s2).unwrap();

    let g = topo.link_graph();
    assert!(!is_same_l2_segment(&topo, &g, pc1, pc2));
    // 路由器自己与两侧都是 L2 相邻
    assert!(is_same_l2_segment(&topo, &g, pc1, r));
    assert!(is_same_l2_segment(&topo, &g, r, pc2));
}

#[test]
fn unlinked_devices_are_not_l2_adjacent() {
    let mut topo = Topology::default();
    let a = put(&mut topo, "A", DeviceKind::Client, 0.0, None);
    let b = put(&mut topo, "B", DeviceKind::Client, 1.0, None);
    assert!(!is_same_l2_segment(&topo, &topo.link_graph(), a, b));
}

#[test]
fn l2_domain_stops_at_routers() {
    let mut topo = Topology::default();
    let pc1 = put(&mut topo, "PC1", DeviceKind::Client, 0.0, None);
    let sw = put(&mut topo, "SW", DeviceKind::Switch, 1.0, None);
    let r = put(&mut topo, "R", DeviceKind::Router, 2.0, None);
    let pc3 = put(&mut topo, "PC3", DeviceKind::Client, 3.0, None);
    topo.connect(pc1, sw).unwrap();
    topo.connect(sw, r).unwrap();
    topo.connect(r, pc3).unwrap();

    let g = topo.link_graph();
    assert_eq!(l2_domain(&topo, &g, pc1), vec![pc1, sw, r]);
    assert_eq!(l2_domain(&topo, &g, pc3), vec![pc3, r]);
    assert_eq!(l2_domain(&topo, &g, r), vec![r, sw, pc3, pc1]);
}

#[test]
fn next_hop_same_subnet_is_direct() {
    let mut topo = Topology::default();
    let a = put(
        &mut topo,
        "A",
        DeviceKind::Client,
        0.0,
        Some([192, 168, 1, 10]),
    );
    let target = Ipv4Addr::new(192, 168, 1, 77);
    let hop = next_hop(&topo, &topo.link_graph(), a, target).unwrap();
    assert_eq!(
        hop,
        NextHop {
            target,
            direct: true
        }
    );
}

#[test]
fn next_hop_off_subnet_uses_first_reachable_router_with_ip() {
    let mut topo = Topology::default();
    let a = put(
        &mut topo,
        "A",
        DeviceKind::Client,
        0.0,
        Some([192, 168, 1, 10]),
    );
    let sw = put(&mut topo, "SW", DeviceKind::Switch, 1.0, None);
    let bare = put(&mut topo, "R0", DeviceKind::Router, 2.0, None);
    let r = put(
        &mut topo,
        "R1",
        DeviceKind::Router,
        3.0,
        Some([192, 168, 1, 1]),
    );
    topo.connect(a, sw).unwrap();
    topo.connect(sw, bare).unwrap();
    topo.connect(sw, r).unwrap();

    let g = topo.link_graph();
    let hop = next_hop(&topo, &g, a, Ipv4Addr::new(10, 9, 9, 9)).unwrap();
    assert_eq!(
        hop,
        NextHop {
            target: Ipv4Addr::new(192, 168, 1, 1),
            direct: false
        }
    );
    assert_eq!(topo.device_by_ip(hop.target).map(|d| d.id), Some(r));
}

#[test]
fn next_hop_errors() {
    let mut topo = Topology::default();
    let a = put(
        &mut topo,
        "A",
        DeviceKind::Client,
        0.0,
        Some([192, 168, 1, 10]),
    );
    let b = put(&mut topo, "B", DeviceKind::Client, 1.0, None);
    topo.connect(a, b).unwrap();
    let g = topo.link_graph();

    let far = Ipv4Addr::new(10, 0, 0, 1);
    assert_eq!(
        next_hop(&topo, &g, a, far),
        Err(NetError::NoRoute { from: a, to: far })
    );
    assert_eq!(next_hop(&topo, &g, b, far), Err(NetError::NoAddress(b)));
}
