use std::net::Ipv4Addr;

use crate::net::{Network, Protocol};
use crate::sim::SimTime;
use crate::term::{Command, CommandError, LineKind, TermLine, Terminal};
use crate::topo::Preset;

fn router_net() -> Network {
    let mut net = Network::default();
    net.load_preset(Preset::NetworkWithRouter).unwrap();
    net
}

fn contents(lines: &[TermLine]) -> Vec<&str> {
    lines.iter().map(|l| l.content.as_str()).collect()
}

#[test]
fn parse_command_set() {
    assert_eq!(
        Command::parse("ping 10.0.0.1"),
        Ok(Some(Command::Ping(Ipv4Addr::new(10, 0, 0, 1))))
    );
    assert_eq!(
        Command::parse("  ARP -a "),
        Ok(Some(Command::Arp { show_all: true }))
    );
    assert_eq!(
        Command::parse("arp"),
        Ok(Some(Command::Arp { show_all: false }))
    );
    assert_eq!(Command::parse("route -n"), Ok(Some(Command::Route)));
    assert_eq!(Command::parse("ipconfig"), Ok(Some(Command::Ifconfig)));
    assert_eq!(Command::parse("ifconfig"), Ok(Some(Command::Ifconfig)));
    assert_eq!(Command::parse("devices"), Ok(Some(Command::Devices)));
    assert_eq!(
        Command::parse("switch Core  Router"),
        Ok(Some(Command::Switch("Core Router".into())))
    );
    assert_eq!(Command::parse("clear"), Ok(Some(Command::Clear)));
    assert_eq!(Command::parse("help"), Ok(Some(Command::Help)));
    assert_eq!(Command::parse("   "), Ok(None));

    assert_eq!(
        Command::parse("ping"),
        Err(CommandError::Usage("ping <ip-address>"))
    );
    assert_eq!(
        Command::parse("ping 300.1.1.1"),
        Err(CommandError::InvalidAddress("300.1.1.1".into()))
    );
    assert_eq!(
        Command::parse("switch"),
        Err(CommandError::Usage("switch <device-name>"))
    );
    assert_eq!(
        Command::parse("traceroute 1.1.1.1"),
        Err(CommandError::NotFound("traceroute".into()))
    );
}

#[test]
fn only_ping_mutates_simulation() {
    assert!(Command::Ping(Ipv4Addr::LOCALHOST).mutates_simulation());
    for cmd in [
        Command::Arp { show_all: true },
        Command::Route,
        Command::Ifconfig,
        Command::Devices,
        Command::Switch("PC1".into()),
        Command::Clear,
        Command::Help,
    ] {
        assert!(!cmd.mutates_simulation(), "{cmd:?}");
    }
}

#[test]
fn prompt_and_switch_follow_current_device() {
    let mut net = router_net();
    let mut term = Terminal::default();
    assert_eq!(term.prompt(&net), "packet-explorer:~$");

    let out = term.execute(&mut net, "switch router1", SimTime::ZERO);
    assert_eq!(out[0].kind, LineKind::Input);
    assert_eq!(out[0].content, "packet-explorer:~$ switch router1");
    assert_eq!(out[1].content, "Switched to Router1 (router)");
    assert_eq!(term.prompt(&net), "Router1@packet-explorer:~$");

    let out = term.execute(&mut net, "switch Nope", SimTime::ZERO);
    assert_eq!(out[1].kind, LineKind::Error);
    assert_eq!(out[1].content, "Device \"Nope\" not found.");
    assert_eq!(term.prompt(&net), "Router1@packet-explorer:~$");
}

#[test]
fn device_commands_require_a_current_device() {
    let mut net = router_net();
    let mut term = Terminal::default();
    for line in ["arp -a", "route", "ifconfig", "ping 192.168.1.11"] {
        let out = term.execute(&mut net, line, SimTime::ZERO);
        assert_eq!(out.len(), 2, "{line}");
        assert_eq!(out[1].kind, LineKind::Error);
        assert!(out[1].content.starts_with("No device selected."));
    }
    assert!(net.packets().is_empty());
}

#[test]
fn unknown_command_prints_hint() {
    let mut net = router_net();
    let mut term = Terminal::default();
    let out = term.execute(&mut net, "foo bar", SimTime::ZERO);
    assert_eq!(
        contents(&out[1..]),
        [
            "Command not found: foo",
            "Type \"help\" for available commands."
        ]
    );
}

#[test]
fn ping_sends_icmp_through_the_engine() {
    let mut net = router_net();
    let pc1 = net.topology().device_by_name("PC1").unwrap().id;
    let mut term = Terminal::new(Some(pc1));

    let out = term.execute(&mut net, "ping 192.168.2.10", SimTime::ZERO);
    assert_eq!(out[1].content, "PING 192.168.2.10 (PC3): 56 data bytes");
    assert!(out[2].content.starts_with("Resolving next hop with ARP"));
    assert_eq!(net.packets().len(), 1);
    assert_eq!(net.packets()[0].protocol, Protocol::Arp);

    let out = term.execute(&mut net, "ping 10.9.9.9", SimTime::ZERO);
    assert_eq!(out[1].content, "PING 10.9.9.9: Host unreachable");
    assert_eq!(net.packets().len(), 1);

    let out = term.execute(&mut net, "ping 192.168.1.10", SimTime::ZERO);
    assert_eq!(out[1].kind, LineKind::Error);
}

#[test]
fn arp_route_and_ifconfig_reports() {
    let mut net = router_net();
    let pc1 = net.topology().device_by_name("PC1").unwrap().id;
    let mut term = Terminal::new(Some(pc1));

    let out = term.execute(&mut net, "arp", SimTime::ZERO);
    assert_eq!(contents(&out[1..]), ["Usage: arp -a (show all entries)"]);

    let out = term.execute(&mut net, "arp -a", SimTime::ZERO);
    assert_eq!(out.last().unwrap().content, "No entries found.");

    let out = term.execute(&mut net, "route", SimTime::ZERO);
    assert_eq!(
        contents(&out[1..]),
        ["Routing table not available for this device type."]
    );

    let out = term.execute(&mut net, "ifconfig", SimTime::ZERO);
    let text = contents(&out[1..]);
    assert_eq!(text[0], "Device: PC1");
    assert_eq!(text[1], "Type: client");
    assert!(text[2].starts_with("MAC Address: "));
    assert_eq!(text[3], "IP Address: 192.168.1.10");
    assert_eq!(text[4], "Subnet Mask: 255.255.255.0");
    assert_eq!(text[5], "Default Gateway: 192.168.1.1");
    assert_eq!(text[6], "Ports: 1");
    assert_eq!(text[7], "  Port 1: up (connected)");

    term.execute(&mut net, "switch Router1", SimTime::ZERO);
    let out = term.execute(&mut net, "route", SimTime::ZERO);
    assert_eq!(
        contents(&out[1..]),
        [
            "Kernel IP routing table",
            "Destination     Gateway         Genmask         Interface",
            "192.168.1.0     0.0.0.0         255.255.255.0   eth0",
            "192.168.2.0     0.0.0.0         255.255.255.0   eth1",
        ]
    );
}

#[test]
fn arp_table_lists_learned_entries() {
    let mut net = router_net();
    let pc1 = net.topology().device_by_name("PC1").unwrap().id;
    let pc2 = net.topology().device_by_name("PC2").unwrap().id;
    net.send_packet(pc1, pc2, Protocol::Icmp, SimTime::ZERO)
        .unwrap();
    for step in 1..=200u64 {
        net.tick(SimTime::from_millis(step * 50));
    }
    let pc2_mac = net.topology().device(pc2).unwrap().mac;

    let mut term = Terminal::new(Some(pc1));
    let out = term.execute(&mut net, "arp -a", SimTime::ZERO);
    assert_eq!(
        contents(&out[1..]),
        [
            "ARP Table:".to_string(),
            "Internet Address      Physical Address      Type".to_string(),
            format!("{:<21} {:<21} dynamic", "192.168.1.11", pc2_mac.to_string()),
        ]
    );
}

#[test]
fn devices_marks_current_and_clear_wipes_history() {
    let mut net = router_net();
    let pc2 = net.topology().device_by_name("PC2").unwrap().id;
    let mut term = Terminal::new(Some(pc2));

    let out = term.execute(&mut net, "devices", SimTime::ZERO);
    assert_eq!(
        contents(&out[1..]),
        [
            "Available devices:",
            "  PC1 (client) - 192.168.1.10",
            "  PC2 (client) - 192.168.1.11 (selected)",
            "  Switch1 (switch) - No IP",
            "  Router1 (router) - 192.168.1.1",
            "  PC3 (client) - 192.168.2.10",
        ]
    );
    assert!(term.history().len() > out.len());

    let out = term.execute(&mut net, "clear", SimTime::ZERO);
    assert!(out.is_empty());
    assert!(term.history().is_empty());

    term.execute(&mut net, "help", SimTime::ZERO);
    assert_eq!(term.history()[1].content, "Available commands:");
}
