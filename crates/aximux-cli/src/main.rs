//! `aximux` — command-line control for AXI mux devices.
//!
//! ```text
//! USAGE:
//!   aximux enumerate                              List mux UIO nodes
//!   aximux info <device> -c <ports.toml>          Capability and port table
//!   aximux get <device> <port> [attr] -c <file>   Read port attributes
//!   aximux set <device> <port> <attr> <value> -c <file>
//!                                                 Write one port attribute
//! ```

use anyhow::Result;
use aximux_driver::{
    AttrAccess, AttrKey, Direction, DirectionMode, MuxConfig, MuxDevice, MuxRegistry, UioWindow,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aximux", about = "AXI mux control CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List all mux devices visible through UIO.
    Enumerate,
    /// Show capability and port table of one mux.
    Info {
        /// UIO index (e.g. 0) or device path (e.g. /dev/uio0).
        device: String,
        /// Port configuration file (TOML).
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Read attributes of one port.
    Get {
        /// UIO index (e.g. 0) or device path (e.g. /dev/uio0).
        device: String,
        /// Port index.
        port: usize,
        /// Attribute name; omitted reads every exposed attribute.
        attr: Option<String>,
        /// Port configuration file (TOML).
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write one attribute of one port.
    Set {
        /// UIO index (e.g. 0) or device path (e.g. /dev/uio0).
        device: String,
        /// Port index.
        port: usize,
        /// Attribute name (source, direction_control, direction).
        attr: String,
        /// Value to write.
        value: String,
        /// Port configuration file (TOML).
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Enumerate => cmd_enumerate()?,
        Cmd::Info { device, config } => cmd_info(&device, &config)?,
        Cmd::Get {
            device,
            port,
            attr,
            config,
        } => cmd_get(&device, &config, port, attr.as_deref())?,
        Cmd::Set {
            device,
            port,
            attr,
            value,
            config,
        } => cmd_set(&device, &config, port, &attr, &value)?,
    }

    Ok(())
}

fn cmd_enumerate() -> Result<()> {
    let nodes = aximux_driver::enumerate()?;

    println!("Mux UIO nodes: {}", nodes.len());
    println!();

    for (index, node) in nodes.iter().enumerate() {
        println!(
            "[{index}] {}  {}  ({})",
            node.uio_name,
            node.path.display(),
            node.device_name
        );
    }

    Ok(())
}

fn cmd_info(device: &str, config: &Path) -> Result<()> {
    let (registry, mux) = attach(device, config)?;
    let cap = mux.capability();

    println!("Instance     : {}", mux.name());
    println!("Ports        : {}", mux.ports().len());
    println!("Alt limit    : {} per port", cap.alt_signal_limit);
    println!();

    for port in mux.ports() {
        let selected = match mux.selected_source(port.index()) {
            Ok(value) => {
                let name = port
                    .alternate_names()
                    .get(value as usize)
                    .map_or("?", String::as_str);
                format!("{value} ({name})")
            }
            Err(e) => format!("invalid ({e})"),
        };
        let mode = match mux.direction_mode(port.index())? {
            DirectionMode::Hardware => "HW",
            DirectionMode::Software => "SW",
        };

        let mut line = format!(
            "[{}] {:<16} mode={mode}  source={selected}",
            port.index(),
            port.name()
        );
        if port.schema().get(AttrKey::Direction).is_some() {
            let dir = match mux.direction(port.index())? {
                Direction::Out => "OUT",
                Direction::In => "IN",
            };
            line.push_str(&format!("  dir={dir}"));
        }
        println!("{line}");
        println!("     alternates: {}", port.alternate_names().join(", "));
    }

    mux.detach(&registry);
    Ok(())
}

fn cmd_get(device: &str, config: &Path, port: usize, attr: Option<&str>) -> Result<()> {
    let (registry, mux) = attach(device, config)?;

    match attr {
        Some(name) => {
            let key = parse_attr(name)?;
            print!("{}", mux.read_attr(port, key)?);
        }
        None => {
            for descriptor in mux.port(port)?.schema().entries() {
                let access = match descriptor.access {
                    AttrAccess::ReadWrite => "rw",
                    AttrAccess::ReadOnly => "ro",
                };
                let rendered = match mux.read_attr(port, descriptor.key) {
                    Ok(value) => value.trim_end().replace('\n', ", "),
                    Err(e) => format!("<{e}>"),
                };
                println!("{:<18} [{access}] {rendered}", descriptor.key.as_str());
            }
        }
    }

    mux.detach(&registry);
    Ok(())
}

fn cmd_set(device: &str, config: &Path, port: usize, attr: &str, value: &str) -> Result<()> {
    let (registry, mux) = attach(device, config)?;
    let key = parse_attr(attr)?;

    mux.write_attr(port, key, value)?;
    let now = mux.read_attr(port, key)?;
    println!("{}: port {port} {key} = {}", mux.name(), now.trim_end());

    mux.detach(&registry);
    Ok(())
}

/// Attach over a UIO window named by index or device path.
fn attach(device: &str, config: &Path) -> Result<(MuxRegistry, Arc<MuxDevice>)> {
    let registry = MuxRegistry::new();
    let cfg = MuxConfig::from_path(config)?;
    let window = open_window(device)?;
    let mux = MuxDevice::attach(Box::new(window), &cfg, &registry)?;
    Ok((registry, mux))
}

fn open_window(device: &str) -> Result<UioWindow> {
    // Accept enumeration index or device path
    if let Ok(index) = device.parse::<usize>() {
        let nodes = aximux_driver::enumerate()?;
        let node = nodes.get(index).ok_or_else(|| {
            anyhow::anyhow!("No mux UIO node with index {index} ({} found)", nodes.len())
        })?;
        Ok(node.open()?)
    } else {
        Ok(UioWindow::open(device)?)
    }
}

fn parse_attr(name: &str) -> Result<AttrKey> {
    AttrKey::from_name(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown attribute '{name}' (valid: name, alternates, source, direction_control, direction)"
        )
    })
}
