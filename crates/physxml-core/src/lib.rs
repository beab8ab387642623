//! physxml Core Library
//!
//! This crate writes the physical machine descriptor (`physical.xml`) that a
//! P2V collector hands to the conversion server in place of hypervisor
//! metadata.
//!
//! # Overview
//!
//! The descriptor is libvirt-shaped XML describing memory, CPU topology,
//! clock, platform features and devices of the physical machine. Disks are
//! exposed as NBD network disks whose ports come from the data connections
//! set up by the collector. The main entry point is
//! [`generate_physical_xml`].
//!
//! # Modules
//!
//! - [`error`] - Error types and Result alias
//! - [`config`] - Machine configuration, data connections and host facts
//! - [`devices`] - Disk target naming, network mapping and MAC lookup
//! - [`xml`] - Indented XML writer with error context
//! - [`physical`] - Descriptor generation
//!
//! # Quick Start
//!
//! ```no_run
//! use physxml_core::{generate_physical_xml, Config, DataConn, HostInfo};
//! use std::path::Path;
//!
//! let config = Config::from_json_file(Path::new("/path/to/machine.json")).unwrap();
//! let connections = [DataConn::new(50123)];
//!
//! generate_physical_xml(
//!     &config,
//!     &connections,
//!     &HostInfo::default(),
//!     Path::new("/path/to/physical.xml"),
//! )
//! .unwrap();
//! ```

pub mod config;
pub mod devices;
pub mod error;
pub mod physical;
pub mod xml;

pub use error::{Error, Result};

pub use config::{Config, CpuConfig, DataConn, HostInfo, RtcBasis, RtcConfig};
pub use devices::{
    disk_target_dev, drive_name, map_interface_to_network, positional_target_dev,
    read_mac_address, MacLookup, DEFAULT_NETWORK, MAX_TARGET_DEV_LEN,
};
pub use physical::{generate_physical_xml, PhysicalXmlBuilder};
