//! Physical machine configuration.
//!
//! These types describe the machine being converted. They are filled in by
//! the collector (or loaded from JSON by the CLI) and only read while the
//! descriptor is generated.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default root of the per-interface sysfs tree.
pub const DEFAULT_SYS_CLASS_NET: &str = "/sys/class/net";

/// CPU vendor, model, topology and platform feature flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpuConfig {
    /// CPU vendor string (e.g., "Intel").
    pub vendor: Option<String>,
    /// CPU model name (e.g., "Skylake-Client").
    pub model: Option<String>,
    /// Number of sockets, 0 if unknown.
    pub sockets: u32,
    /// Cores per socket, 0 if unknown.
    pub cores: u32,
    /// Threads per core, 0 if unknown.
    pub threads: u32,
    pub acpi: bool,
    pub apic: bool,
    pub pae: bool,
}

impl CpuConfig {
    /// True if any topology count is known.
    pub fn has_topology(&self) -> bool {
        self.sockets != 0 || self.cores != 0 || self.threads != 0
    }

    /// True if there is anything to put in a `<cpu>` element.
    pub fn has_cpu_info(&self) -> bool {
        self.vendor.is_some() || self.model.is_some() || self.has_topology()
    }
}

/// What the hardware clock is set to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RtcBasis {
    #[default]
    Unknown,
    Utc,
    Localtime,
}

/// Real-time clock settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RtcConfig {
    pub basis: RtcBasis,
    /// Offset from UTC in seconds. Only meaningful when `basis` is `Utc`.
    pub offset: i32,
}

/// Configuration of the physical machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Name given to the converted guest.
    pub guestname: String,
    /// Memory size in bytes.
    pub memory: u64,
    /// Number of virtual CPUs.
    pub vcpus: u32,
    #[serde(default)]
    pub cpu: CpuConfig,
    #[serde(default)]
    pub rtc: RtcConfig,
    /// Disks to convert. An absolute path gets a positional target name,
    /// anything else is used as the target name itself.
    #[serde(default)]
    pub disks: Vec<String>,
    /// Target names of removable media (e.g., "hdc").
    #[serde(default)]
    pub removable: Vec<String>,
    /// Network interfaces to convert (e.g., "eth0").
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Network map rules, either `network` or `interface:network`.
    #[serde(default)]
    pub network_map: Vec<String>,
}

impl Config {
    /// Create a configuration with the given guest name and nothing else set.
    pub fn new(guestname: impl Into<String>) -> Self {
        Self {
            guestname: guestname.into(),
            ..Default::default()
        }
    }

    /// Set the memory size in bytes.
    pub fn with_memory(mut self, bytes: u64) -> Self {
        self.memory = bytes;
        self
    }

    /// Set the vCPU count.
    pub fn with_vcpus(mut self, vcpus: u32) -> Self {
        self.vcpus = vcpus;
        self
    }

    /// Append a disk identifier.
    pub fn with_disk(mut self, disk: impl Into<String>) -> Self {
        self.disks.push(disk.into());
        self
    }

    /// Append a removable medium target name.
    pub fn with_removable(mut self, name: impl Into<String>) -> Self {
        self.removable.push(name.into());
        self
    }

    /// Append a network interface.
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Append a network map rule.
    pub fn with_network_map(mut self, rule: impl Into<String>) -> Self {
        self.network_map.push(rule.into());
        self
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_json_str(&content)
    }
}

/// Data connection carrying one disk's contents to the conversion server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataConn {
    /// Port of the NBD endpoint on the conversion server side of the tunnel.
    pub nbd_remote_port: u16,
}

impl DataConn {
    pub fn new(nbd_remote_port: u16) -> Self {
        Self { nbd_remote_port }
    }
}

/// Facts about the host that are not part of the machine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Host CPU architecture as libvirt names it (e.g., "x86_64").
    pub arch: String,
    /// Directory holding `<interface>/address` files.
    pub sys_class_net: PathBuf,
}

impl HostInfo {
    pub fn new(arch: impl Into<String>) -> Self {
        Self {
            arch: arch.into(),
            sys_class_net: PathBuf::from(DEFAULT_SYS_CLASS_NET),
        }
    }

    /// Read MAC addresses from a different sysfs root.
    pub fn with_sys_class_net(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sys_class_net = dir.into();
        self
    }
}

impl Default for HostInfo {
    fn default() -> Self {
        Self::new(std::env::consts::ARCH)
    }
}
