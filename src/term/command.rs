//! 命令解析

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::addr::parse_ip;
use crate::error::NetError;

/// 终端命令集
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ping <ip>`
    Ping(Ipv4Addr),
    /// `arp -a`；不带 `-a` 时只打印用法
    Arp { show_all: bool },
    /// `route [-n]`
    Route,
    /// `ifconfig` / `ipconfig`
    Ifconfig,
    Devices,
    /// `switch <name>`，名称可以包含空格
    Switch(String),
    Clear,
    Help,
}

/// 命令解析或执行失败
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("No device selected. Use \"switch <device>\" to select a device.")]
    NoDevice,

    #[error("Device \"{0}\" not found.")]
    UnknownDevice(String),

    #[error(transparent)]
    Net(#[from] NetError),
}

impl Command {
    /// 解析一行输入。空行返回 `Ok(None)`。
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut args = line.split_whitespace();
        let Some(verb) = args.next() else {
            return Ok(None);
        };

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "help" => Command::Help,
            "ping" => {
                let target = args.next().ok_or(CommandError::Usage("ping <ip-address>"))?;
                let ip = parse_ip(target)
                    .map_err(|_| CommandError::InvalidAddress(target.to_string()))?;
                Command::Ping(ip)
            }
            "arp" => Command::Arp {
                show_all: args.next() == Some("-a"),
            },
            "route" => Command::Route,
            "ifconfig" | "ipconfig" => Command::Ifconfig,
            "devices" => Command::Devices,
            "switch" => {
                let name = args.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    return Err(CommandError::Usage("switch <device-name>"));
                }
                Command::Switch(name)
            }
            "clear" => Command::Clear,
            other => return Err(CommandError::NotFound(other.to_string())),
        };
        Ok(Some(cmd))
    }

    /// 是否会修改仿真状态
    pub fn mutates_simulation(&self) -> bool {
        matches!(self, Command::Ping(_))
    }
}
