use std::net::Ipv4Addr;

use crate::error::NetError;
use crate::net::{DeviceKind, Topology};
use crate::topo::{Preset, build_preset};

fn built(preset: Preset) -> Topology {
    let mut topo = Topology::default();
    build_preset(&mut topo, preset).unwrap();
    topo
}

#[test]
fn preset_names_round_trip() {
    for p in Preset::ALL {
        assert_eq!(p.name().parse::<Preset>(), Ok(p));
        assert_eq!(p.to_string(), p.name());
    }
    assert_eq!(
        "star".parse::<Preset>(),
        Err(NetError::UnknownPreset("star".into()))
    );
}

#[test]
fn direct_pcs_layout() {
    let topo = built(Preset::DirectPcs);
    assert_eq!(topo.devices().len(), 2);
    assert_eq!(topo.connections().len(), 1);
    let pc1 = topo.device_by_name("PC1").unwrap();
    let pc2 = topo.device_by_name("PC2").unwrap();
    assert_eq!(pc1.ip, Some(Ipv4Addr::new(192, 168, 1, 10)));
    assert_eq!(pc2.ip, Some(Ipv4Addr::new(192, 168, 1, 11)));
    assert!(topo.link_graph().are_linked(pc1.id, pc2.id));
}

#[test]
fn pcs_switch_uses_first_switch_ports() {
    let topo = built(Preset::PcsSwitch);
    let sw = topo.device_by_name("Switch1").unwrap();
    assert_eq!(sw.kind, DeviceKind::Switch);
    let used: Vec<_> = sw.ports.iter().map(|p| !p.is_available()).collect();
    assert_eq!(used, [true, true, false, false]);
}

#[test]
fn router_preset_matches_reference_network() {
    let topo = built(Preset::NetworkWithRouter);
    assert_eq!(topo.devices().len(), 5);
    assert_eq!(topo.connections().len(), 4);

    let r = topo.device_by_name("Router1").unwrap();
    assert_eq!(r.ip, Some(Ipv4Addr::new(192, 168, 1, 1)));
    let routes = r.routing_table.as_ref().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].network, Ipv4Addr::new(192, 168, 1, 0));
    assert_eq!(routes[0].interface, "eth0");
    assert_eq!(routes[1].network, Ipv4Addr::new(192, 168, 2, 0));
    assert_eq!(routes[1].gateway, Ipv4Addr::UNSPECIFIED);
    assert!(r.ports.iter().all(|p| !p.is_available()));

    let pc3 = topo.device_by_name("PC3").unwrap();
    assert_eq!(pc3.gateway, Some(Ipv4Addr::new(192, 168, 2, 1)));

    let pc1 = topo.device_by_name("PC1").unwrap();
    let path = topo.link_graph().shortest_path(pc1.id, pc3.id);
    let names: Vec<_> = path
        .hops()
        .iter()
        .map(|&id| topo.device(id).unwrap().name.as_str())
        .collect();
    assert_eq!(names, ["PC1", "Switch1", "Router1", "PC3"]);
}
