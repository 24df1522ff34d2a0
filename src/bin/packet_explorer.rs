//! 终端驱动的仿真入口
//!
//! 载入预设拓扑，在指定设备上依次执行终端命令，推进仿真，
//! 最后打印各设备的 ARP 表，可选输出可视化事件与状态快照 JSON。

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use packet_explorer::net::{NetWorld, Network, SimConfig};
use packet_explorer::sim::{SimTime, Simulator};
use packet_explorer::term::{LineKind, Terminal};
use packet_explorer::topo::Preset;
use packet_explorer::viz::VizLogger;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "packet-explorer", about = "以太网/IP 教学网络仿真")]
struct Args {
    /// 预设拓扑：direct-pcs / pcs-switch / network-with-router
    #[arg(long, default_value = "network-with-router")]
    preset: String,
    /// 终端起始设备名
    #[arg(long, default_value = "PC1")]
    from: String,
    /// 终端命令，可重复；全部在 t=0 执行
    #[arg(long = "command")]
    commands: Vec<String>,
    /// 时钟周期（毫秒）
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// 速度倍率
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
    /// 仿真时长上限（毫秒）
    #[arg(long, default_value_t = 60_000)]
    until_ms: u64,
    /// 输出可视化事件 JSON
    #[arg(long)]
    viz_json: Option<PathBuf>,
    /// 输出结束时的状态快照 JSON
    #[arg(long)]
    snapshot_json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let preset: Preset = args.preset.parse()?;

    let cfg = SimConfig {
        tick_interval: SimTime::from_millis(args.tick_ms),
        ..SimConfig::default()
    };
    let mut sim = Simulator::default();
    let mut world = NetWorld::new(Network::with_config(cfg));

    world.net.load_preset(preset)?;
    world.net.set_simulation_speed(args.speed)?;
    if args.viz_json.is_some() {
        world.net.viz = Some(VizLogger::default());
        world.net.emit_viz_meta(sim.now());
    }
    info!(%preset, speed = args.speed, "🚀 仿真启动");

    let from = world
        .net
        .topology()
        .device_by_name(&args.from)
        .map(|d| d.id)
        .ok_or_else(|| format!("device {:?} not found in preset {preset}", args.from))?;
    let mut term = Terminal::new(Some(from));

    for cmd in &args.commands {
        for line in term.execute(&mut world.net, cmd, sim.now()) {
            match line.kind {
                LineKind::Error => println!("error {}", line.content),
                _ => println!("{}", line.content),
            }
        }
        // 命令在事件循环之外修改了网络，补一次时钟调度
        world.arm_clock(&mut sim);
    }

    let until = SimTime::from_millis(args.until_ms);
    sim.run_until(until, &mut world);

    let live = world.net.packets().len();
    if live > 0 {
        warn!(live, "仿真结束时仍有在途数据包");
    }
    println!("live_packets {live}");
    for d in world.net.topology().devices() {
        for (ip, mac) in &d.arp_table {
            println!("arp_entry {} {} {}", d.name, ip, mac);
        }
    }

    if let Some(path) = args.snapshot_json {
        let snap = world.net.snapshot(sim.now());
        fs::write(&path, serde_json::to_string_pretty(&snap)?)?;
        eprintln!("wrote snapshot to {}", path.display());
    }
    if let Some(path) = args.viz_json
        && let Some(v) = world.net.viz.take()
    {
        fs::write(&path, serde_json::to_string_pretty(&v.events)?)?;
        eprintln!("wrote viz events to {}", path.display());
    }
    Ok(())
}
