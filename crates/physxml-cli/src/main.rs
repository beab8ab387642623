//! physxml CLI - Write the physical machine descriptor for a P2V conversion.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use physxml_core::{
    disk_target_dev, map_interface_to_network, read_mac_address, Config, DataConn, HostInfo,
    PhysicalXmlBuilder,
};
use tracing_subscriber::EnvFilter;

/// Generate the physical.xml handed to the conversion server.
#[derive(Parser)]
#[command(name = "physxml")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the physical machine descriptor.
    Generate {
        /// Path to the machine configuration (JSON).
        config: PathBuf,

        /// Remote NBD port of each disk, in disk order.
        #[arg(short, long = "port", value_name = "PORT")]
        ports: Vec<u16>,

        /// Output file, or "-" for stdout.
        #[arg(short, long, default_value = "physical.xml")]
        output: PathBuf,

        /// Host CPU architecture. Defaults to the architecture of this build.
        #[arg(long, default_value = std::env::consts::ARCH)]
        arch: String,

        /// Directory holding <interface>/address files.
        #[arg(long, default_value = physxml_core::config::DEFAULT_SYS_CLASS_NET)]
        sys_class_net: PathBuf,
    },

    /// Show how disks and interfaces will be named in the descriptor.
    Devices {
        /// Path to the machine configuration (JSON).
        config: PathBuf,

        /// Directory holding <interface>/address files.
        #[arg(long, default_value = physxml_core::config::DEFAULT_SYS_CLASS_NET)]
        sys_class_net: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            ports,
            output,
            arch,
            sys_class_net,
        } => {
            let host = HostInfo::new(arch).with_sys_class_net(sys_class_net);
            run_generate(&config, &ports, &output, &host)?;
        }
        Commands::Devices {
            config,
            sys_class_net,
        } => {
            show_devices(&config, &sys_class_net)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    Config::from_json_file(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))
}

fn run_generate(config_path: &Path, ports: &[u16], output: &Path, host: &HostInfo) -> Result<()> {
    let config = load_config(config_path)?;

    if ports.len() != config.disks.len() {
        bail!(
            "{} disk(s) configured but {} port(s) given",
            config.disks.len(),
            ports.len()
        );
    }
    let connections: Vec<DataConn> = ports.iter().copied().map(DataConn::new).collect();
    let builder = PhysicalXmlBuilder::new(&config, host);

    if output == Path::new("-") {
        let stdout = io::stdout();
        let mut out = builder
            .write_to(stdout.lock(), &connections)
            .context("failed to write descriptor to stdout")?;
        writeln!(out)?;
    } else {
        builder
            .write_to_file(&connections, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        eprintln!("Wrote {}", output.display());
    }

    Ok(())
}

fn show_devices(config_path: &Path, sys_class_net: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Devices for {}", config.guestname);
    println!("============{}", "=".repeat(config.guestname.len()));
    println!();

    if config.disks.is_empty() {
        println!("Disks:      None");
    } else {
        println!("Disks:");
        for (i, disk) in config.disks.iter().enumerate() {
            println!("  {}. {} -> {}", i + 1, disk, disk_target_dev(i, disk));
        }
    }

    if !config.removable.is_empty() {
        println!("Removable:");
        for name in &config.removable {
            println!("  - {}", name);
        }
    }

    if config.interfaces.is_empty() {
        println!("Interfaces: None");
    } else {
        println!("Interfaces:");
        for interface in &config.interfaces {
            let network = map_interface_to_network(&config.network_map, interface);
            let mac = read_mac_address(sys_class_net, interface);
            println!(
                "  - {} -> network {} (mac {})",
                interface,
                network,
                mac.address().unwrap_or("unknown")
            );
        }
    }

    Ok(())
}
