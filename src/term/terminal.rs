//! 终端会话

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::command::{Command, CommandError};
use crate::net::{Device, DeviceId, Network, Protocol, SendOutcome};
use crate::sim::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Input,
    Output,
    Error,
}

/// 终端输出的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLine {
    pub kind: LineKind,
    pub content: String,
}

impl TermLine {
    fn input(content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Input,
            content: content.into(),
        }
    }

    fn output(content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Output,
            content: content.into(),
        }
    }

    fn error(content: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Error,
            content: content.into(),
        }
    }
}

const HELP: &[&str] = &[
    "Available commands:",
    "  ping <ip>          - Send ICMP ping to target IP",
    "  arp [-a]           - Show ARP table",
    "  route [-n]         - Show routing table",
    "  ifconfig/ipconfig  - Show interface configuration",
    "  devices            - List all devices",
    "  switch <device>    - Switch to another device",
    "  clear              - Clear terminal",
    "  help               - Show this help message",
    "",
    "Examples:",
    "  ping 192.168.1.2",
    "  arp -a",
    "  switch Router1",
];

/// 终端会话：当前设备 + 输出历史
#[derive(Debug)]
pub struct Terminal {
    current: Option<DeviceId>,
    history: Vec<TermLine>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Terminal {
    pub fn new(current: Option<DeviceId>) -> Self {
        Self {
            current,
            history: vec![
                TermLine::output("Packet Explorer Terminal v1.0"),
                TermLine::output("Type \"help\" for available commands."),
            ],
        }
    }

    pub fn current(&self) -> Option<DeviceId> {
        self.current
    }

    pub fn set_current(&mut self, device: Option<DeviceId>) {
        self.current = device;
    }

    pub fn history(&self) -> &[TermLine] {
        &self.history
    }

    /// 提示符，跟随当前设备名
    pub fn prompt(&self, net: &Network) -> String {
        match self.current_device(net) {
            Some(d) => format!("{}@packet-explorer:~$", d.name),
            None => "packet-explorer:~$".to_string(),
        }
    }

    fn current_device<'n>(&self, net: &'n Network) -> Option<&'n Device> {
        self.current.and_then(|id| net.topology().device(id))
    }

    /// 执行一行输入，返回本次产生的输出（含回显行）并追加到历史
    #[tracing::instrument(skip(self, net), fields(device = ?self.current))]
    pub fn execute(&mut self, net: &mut Network, line: &str, now: SimTime) -> Vec<TermLine> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        let mut out = vec![TermLine::input(format!("{} {}", self.prompt(net), line))];
        match Command::parse(line) {
            Ok(Some(Command::Clear)) => {
                self.history.clear();
                return Vec::new();
            }
            Ok(Some(cmd)) => {
                debug!(?cmd, "执行命令");
                if let Err(e) = self.run(net, cmd, now, &mut out) {
                    out.push(TermLine::error(e.to_string()));
                }
            }
            Ok(None) => {}
            Err(e @ CommandError::NotFound(_)) => {
                out.push(TermLine::error(e.to_string()));
                out.push(TermLine::output("Type \"help\" for available commands."));
            }
            Err(e) => out.push(TermLine::error(e.to_string())),
        }

        self.history.extend(out.iter().cloned());
        out
    }

    fn run(
        &mut self,
        net: &mut Network,
        cmd: Command,
        now: SimTime,
        out: &mut Vec<TermLine>,
    ) -> Result<(), CommandError> {
        match cmd {
            Command::Help => out.extend(HELP.iter().map(|l| TermLine::output(*l))),
            Command::Devices => self.list_devices(net, out),
            Command::Switch(name) => {
                let dev = net
                    .topology()
                    .device_by_name(&name)
                    .ok_or(CommandError::UnknownDevice(name))?;
                out.push(TermLine::output(format!(
                    "Switched to {} ({})",
                    dev.name, dev.kind
                )));
                self.current = Some(dev.id);
            }
            Command::Ping(ip) => self.ping(net, ip, now, out)?,
            Command::Arp { show_all } => {
                let dev = self.current_device(net).ok_or(CommandError::NoDevice)?;
                if !show_all {
                    out.push(TermLine::output("Usage: arp -a (show all entries)"));
                    return Ok(());
                }
                out.push(TermLine::output("ARP Table:"));
                out.push(TermLine::output(
                    "Internet Address      Physical Address      Type",
                ));
                if dev.arp_table.is_empty() {
                    out.push(TermLine::output("No entries found."));
                }
                for (ip, mac) in &dev.arp_table {
                    out.push(TermLine::output(format!(
                        "{:<21} {:<21} dynamic",
                        ip.to_string(),
                        mac.to_string()
                    )));
                }
            }
            Command::Route => {
                let dev = self.current_device(net).ok_or(CommandError::NoDevice)?;
                let Some(routes) = dev.routing_table.as_ref().filter(|_| dev.is_router()) else {
                    out.push(TermLine::output(
                        "Routing table not available for this device type.",
                    ));
                    return Ok(());
                };
                out.push(TermLine::output("Kernel IP routing table"));
                out.push(TermLine::output(
                    "Destination     Gateway         Genmask         Interface",
                ));
                if routes.is_empty() {
                    out.push(TermLine::output("No routes configured."));
                }
                for r in routes {
                    out.push(TermLine::output(format!(
                        "{:<15} {:<15} {:<15} {}",
                        r.network.to_string(),
                        r.gateway.to_string(),
                        r.mask.to_string(),
                        r.interface
                    )));
                }
            }
            Command::Ifconfig => {
                let dev = self.current_device(net).ok_or(CommandError::NoDevice)?;
                ifconfig(dev, out);
            }
            // 在 execute 里处理
            Command::Clear => {}
        }
        Ok(())
    }

    fn ping(
        &self,
        net: &mut Network,
        ip: Ipv4Addr,
        now: SimTime,
        out: &mut Vec<TermLine>,
    ) -> Result<(), CommandError> {
        let source = self.current_device(net).ok_or(CommandError::NoDevice)?.id;
        let Some(target) = net.topology().device_by_ip(ip) else {
            out.push(TermLine::output(format!("PING {ip}: Host unreachable")));
            return Ok(());
        };
        let (target_id, target_name) = (target.id, target.name.clone());

        let outcome = net.send_packet(source, target_id, Protocol::Icmp, now)?;
        info!(%ip, ?outcome, "🏓 ping");
        out.push(TermLine::output(format!(
            "PING {ip} ({target_name}): 56 data bytes"
        )));
        out.push(TermLine::output(match outcome {
            SendOutcome::Sent(id) => format!("ICMP echo request {id} sent"),
            SendOutcome::AwaitingArp(id) => {
                format!(
                    "Resolving next hop with ARP request {id}, echo request will follow"
                )
            }
            SendOutcome::Undeliverable(id) => {
                format!("Destination host unreachable: {id} has no link path")
            }
        }));
        Ok(())
    }

    fn list_devices(&self, net: &Network, out: &mut Vec<TermLine>) {
        out.push(TermLine::output("Available devices:"));
        for d in net.topology().devices() {
            let ip = d.ip.map_or_else(|| "No IP".into(), |ip| ip.to_string());
            let mark = if self.current == Some(d.id) {
                " (selected)"
            } else {
                ""
            };
            out.push(TermLine::output(format!(
                "  {} ({}) - {}{}",
                d.name, d.kind, ip, mark
            )));
        }
    }
}

fn ifconfig(dev: &Device, out: &mut Vec<TermLine>) {
    let or_unset = |a: Option<Ipv4Addr>| a.map_or_else(|| "Not set".into(), |a| a.to_string());

    out.push(TermLine::output(format!("Device: {}", dev.name)));
    out.push(TermLine::output(format!("Type: {}", dev.kind)));
    out.push(TermLine::output(format!("MAC Address: {}", dev.mac)));
    match dev.ip {
        Some(ip) => {
            out.push(TermLine::output(format!("IP Address: {ip}")));
            out.push(TermLine::output(format!(
                "Subnet Mask: {}",
                or_unset(dev.mask)
            )));
            out.push(TermLine::output(format!(
                "Default Gateway: {}",
                or_unset(dev.gateway)
            )));
        }
        None => out.push(TermLine::output("IP Address: Not configured")),
    }
    out.push(TermLine::output(format!("Ports: {}", dev.ports.len())));
    for p in &dev.ports {
        let link = if p.linked_to.is_some() {
            "(connected)"
        } else {
            "(disconnected)"
        };
        out.push(TermLine::output(format!(
            "  {}: {} {}",
            p.name, p.status, link
        )));
    }
}
