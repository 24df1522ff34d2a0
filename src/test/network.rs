use std::net::Ipv4Addr;

use crate::error::NetError;
use crate::net::{NetWorld, Network, Protocol, SegmentKind, SimConfig};
use crate::sim::{SimTime, Simulator};
use crate::topo::Preset;

#[test]
fn default_config_values() {
    let cfg = SimConfig::default();
    assert_eq!(cfg.tick_interval, SimTime::from_millis(50));
    assert_eq!(cfg.base_speed, 200.0);
    assert_eq!(cfg.arrival_grace, 10.0);
    assert_eq!(cfg.follow_up_delay, SimTime::from_millis(100));
    assert_eq!(Network::default().simulation_speed(), 1.0);
}

#[test]
fn zero_tick_interval_is_raised_so_the_clock_advances() {
    let cfg = SimConfig {
        tick_interval: SimTime::ZERO,
        speed_multiplier: f64::NAN,
        ..SimConfig::default()
    };
    let mut world = NetWorld::new(Network::with_config(cfg));
    assert_eq!(
        world.net.config().tick_interval,
        SimConfig::MIN_TICK_INTERVAL
    );
    assert_eq!(world.net.simulation_speed(), 1.0);

    world.net.load_preset(Preset::DirectPcs).unwrap();
    let pc1 = world.net.topology().device_by_name("PC1").unwrap().id;
    let pc2 = world.net.topology().device_by_name("PC2").unwrap().id;
    world
        .net
        .send_packet(pc1, pc2, Protocol::Data, SimTime::ZERO)
        .unwrap();

    let mut sim = Simulator::default();
    world.arm_clock(&mut sim);
    sim.run_until(SimTime::from_secs(10), &mut world);
    assert!(world.net.packets().is_empty());
    assert_eq!(sim.pending(), 0);
}

#[test]
fn simulation_speed_must_be_positive_and_finite() {
    let mut net = Network::default();
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            net.set_simulation_speed(bad),
            Err(NetError::InvalidSpeed(_))
        ));
    }
    assert_eq!(net.simulation_speed(), 1.0);
    net.set_simulation_speed(0.25).unwrap();
    assert_eq!(net.simulation_speed(), 0.25);
}

#[test]
fn load_preset_resets_everything() {
    let mut net = Network::default();
    net.load_preset(Preset::NetworkWithRouter).unwrap();
    net.create_segment(
        SegmentKind::L3,
        "lan",
        Some(Ipv4Addr::new(192, 168, 1, 0)),
        Some(Ipv4Addr::new(255, 255, 255, 0)),
    )
    .unwrap();
    net.set_simulation_speed(3.0).unwrap();
    let pc1 = net.topology().device_by_name("PC1").unwrap().id;
    let pc2 = net.topology().device_by_name("PC2").unwrap().id;
    net.send_packet(pc1, pc2, Protocol::Data, SimTime::ZERO)
        .unwrap();

    net.load_preset_by_name("direct-pcs").unwrap();
    assert_eq!(net.topology().devices().len(), 2);
    assert_eq!(net.topology().connections().len(), 1);
    assert!(net.topology().segments().is_empty());
    assert!(net.packets().is_empty());
    assert_eq!(net.simulation_speed(), 1.0);

    assert_eq!(
        net.load_preset_by_name("mesh"),
        Err(NetError::UnknownPreset("mesh".into()))
    );
    // 失败时保持原状
    assert_eq!(net.topology().devices().len(), 2);
}

#[test]
fn presets_are_reproducible() {
    let mut a = Network::default();
    let mut b = Network::default();
    a.load_preset(Preset::NetworkWithRouter).unwrap();
    b.load_preset(Preset::NetworkWithRouter).unwrap();
    assert_eq!(a.topology().devices(), b.topology().devices());

    // 重新载入后地址不变
    a.load_preset(Preset::NetworkWithRouter).unwrap();
    assert_eq!(a.topology().devices(), b.topology().devices());
}

#[test]
fn clear_simulation_drops_packets_and_device_selection() {
    let mut net = Network::default();
    net.load_preset(Preset::PcsSwitch).unwrap();
    let pc1 = net.topology().device_by_name("PC1").unwrap().id;
    let pc2 = net.topology().device_by_name("PC2").unwrap().id;
    net.topology_mut().select_device(Some(pc1));
    net.send_packet(pc1, pc2, Protocol::Icmp, SimTime::ZERO)
        .unwrap();
    assert!(net.has_live_packets());

    net.clear_simulation();
    assert!(!net.has_live_packets());
    assert!(net.topology().selected_device().is_none());
}

#[test]
fn clock_only_runs_while_packets_are_live() {
    let mut world = NetWorld::new(Network::default());
    world.net.load_preset(Preset::DirectPcs).unwrap();
    let mut sim = Simulator::default();

    world.arm_clock(&mut sim);
    assert_eq!(sim.pending(), 0);

    let pc1 = world.net.topology().device_by_name("PC1").unwrap().id;
    let pc2 = world.net.topology().device_by_name("PC2").unwrap().id;
    world
        .net
        .send_packet(pc1, pc2, Protocol::Data, sim.now())
        .unwrap();
    world.arm_clock(&mut sim);
    world.arm_clock(&mut sim);
    assert_eq!(sim.pending(), 1, "arming twice schedules one tick");

    sim.run(&mut world);
    assert!(world.net.packets().is_empty());
    // 400 单位 / 200 每秒 = 2s 到达，再走 10 单位宽限后移除
    assert_eq!(sim.now(), SimTime::from_millis(2050));
}

#[test]
fn snapshot_serializes_to_json() {
    let mut net = Network::default();
    net.load_preset(Preset::DirectPcs).unwrap();
    let pc1 = net.topology().device_by_name("PC1").unwrap().id;
    let pc2 = net.topology().device_by_name("PC2").unwrap().id;
    net.send_packet(pc1, pc2, Protocol::Icmp, SimTime::ZERO)
        .unwrap();

    let snap = net.snapshot(SimTime::from_millis(10));
    let v = serde_json::to_value(&snap).unwrap();
    assert_eq!(v["t_ns"], 10_000_000);
    assert_eq!(v["devices"].as_array().unwrap().len(), 2);
    assert_eq!(v["devices"][0]["ip"], "192.168.1.10");
    assert_eq!(v["devices"][0]["kind"], "client");
    assert_eq!(v["packets"][0]["protocol"], "ARP");
    assert_eq!(v["packets"][0]["destination_mac"], "FF:FF:FF:FF:FF:FF");
    assert_eq!(v["simulation_speed"], 1.0);

    let back: crate::viz::Snapshot = serde_json::from_value(v).unwrap();
    assert_eq!(back, snap);
}
