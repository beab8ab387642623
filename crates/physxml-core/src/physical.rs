//! Physical machine descriptor generation.
//!
//! Writes `physical.xml`: a minimal, libvirt-shaped description of the
//! physical machine that the conversion server reads in place of real
//! hypervisor metadata. It is never loaded into libvirt itself.
//!
//! # Example
//!
//! ```no_run
//! use physxml_core::{generate_physical_xml, Config, DataConn, HostInfo};
//! use std::path::Path;
//!
//! let config = Config::new("webserver")
//!     .with_memory(4 * 1024 * 1024 * 1024)
//!     .with_vcpus(2)
//!     .with_disk("/dev/sda");
//! let connections = [DataConn::new(50123)];
//!
//! generate_physical_xml(
//!     &config,
//!     &connections,
//!     &HostInfo::default(),
//!     Path::new("/tmp/physical.xml"),
//! )
//! .unwrap();
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::{Config, DataConn, HostInfo, RtcBasis};
use crate::devices::{disk_target_dev, map_interface_to_network, read_mac_address};
use crate::error::{Error, Result};
use crate::xml::XmlDocument;

const DISCLAIMER: &str = " NOTE!

  This libvirt XML is generated by the physxml collector in order to
  communicate with the conversion process running on the conversion
  server.  It is a minimal description of the physical machine.  If the
  target of the conversion is libvirt, the converter generates the real
  target libvirt XML, which has only a little to do with this file.

  TL;DR: Don't try to load this XML into libvirt. ";

/// Builder for the physical machine descriptor.
pub struct PhysicalXmlBuilder<'a> {
    config: &'a Config,
    host: &'a HostInfo,
}

impl<'a> PhysicalXmlBuilder<'a> {
    /// Create a builder for `config` running on `host`.
    pub fn new(config: &'a Config, host: &'a HostInfo) -> Self {
        Self { config, host }
    }

    /// Build the descriptor as a string.
    ///
    /// `connections[i]` must be the data connection of `config.disks[i]`.
    pub fn build(&self, connections: &[DataConn]) -> Result<String> {
        let bytes = self.write_to(Vec::new(), connections)?;
        String::from_utf8(bytes).map_err(|e| Error::xml("finish", "document", e))
    }

    /// Write the descriptor to `path`.
    ///
    /// On failure the partially written file is removed.
    pub fn write_to_file(&self, connections: &[DataConn], path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::io(e, path))?;

        let result = self
            .write_to(BufWriter::new(file), connections)
            .and_then(|mut writer| writer.flush().map_err(|e| Error::io(e, path)));

        if let Err(e) = result {
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "could not remove incomplete descriptor"
                );
            }
            return Err(e);
        }

        tracing::info!(
            path = %path.display(),
            guest = %self.config.guestname,
            "wrote physical machine descriptor"
        );
        Ok(())
    }

    /// Write the whole document into `writer` and return it.
    pub fn write_to<W: Write>(&self, writer: W, connections: &[DataConn]) -> Result<W> {
        let mut doc = XmlDocument::new(writer);

        doc.declaration()?;
        doc.comment(&format!(
            " {} {} ",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))?;
        doc.comment(DISCLAIMER)?;

        doc.element("domain", &[("type", "physical")], |doc| {
            self.write_identity(doc)?;
            self.write_cpu(doc)?;
            self.write_clock(doc)?;
            self.write_os(doc)?;
            self.write_features(doc)?;
            doc.element("devices", &[], |doc| {
                self.write_disks(doc, connections)?;
                self.write_removable(doc)?;
                self.write_interfaces(doc)
            })
        })?;

        doc.finish()
    }

    fn write_identity<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        let memkb = (self.config.memory / 1024).to_string();

        doc.text_element("name", &[], &self.config.guestname)?;
        doc.text_element("memory", &[("unit", "KiB")], &memkb)?;
        doc.text_element("currentMemory", &[("unit", "KiB")], &memkb)?;
        doc.text_element("vcpu", &[], &self.config.vcpus.to_string())
    }

    // https://libvirt.org/formatdomain.html#elementsCPU
    fn write_cpu<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        let cpu = &self.config.cpu;
        if !cpu.has_cpu_info() {
            return Ok(());
        }

        doc.element("cpu", &[("match", "minimum")], |doc| {
            if let Some(vendor) = &cpu.vendor {
                doc.text_element("vendor", &[], vendor)?;
            }
            if let Some(model) = &cpu.model {
                doc.text_element("model", &[("fallback", "allow")], model)?;
            }
            if cpu.has_topology() {
                let counts = [
                    ("sockets", cpu.sockets),
                    ("cores", cpu.cores),
                    ("threads", cpu.threads),
                ];
                let values: Vec<(&str, String)> = counts
                    .iter()
                    .filter(|(_, n)| *n != 0)
                    .map(|(name, n)| (*name, n.to_string()))
                    .collect();
                let attributes: Vec<(&str, &str)> = values
                    .iter()
                    .map(|(name, value)| (*name, value.as_str()))
                    .collect();
                doc.empty("topology", &attributes)?;
            }
            Ok(())
        })
    }

    fn write_clock<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        let rtc = &self.config.rtc;
        match rtc.basis {
            RtcBasis::Unknown => Ok(()),
            RtcBasis::Utc if rtc.offset == 0 => doc.empty("clock", &[("offset", "utc")]),
            RtcBasis::Utc => {
                let adjustment = rtc.offset.to_string();
                doc.empty(
                    "clock",
                    &[
                        ("offset", "variable"),
                        ("basis", "utc"),
                        ("adjustment", adjustment.as_str()),
                    ],
                )
            }
            // The offset is always 0 for a localtime clock.
            RtcBasis::Localtime => doc.empty("clock", &[("offset", "localtime")]),
        }
    }

    fn write_os<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        doc.element("os", &[], |doc| {
            doc.text_element("type", &[("arch", self.host.arch.as_str())], "hvm")
        })
    }

    fn write_features<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        let cpu = &self.config.cpu;
        doc.element("features", &[], |doc| {
            for (name, enabled) in [("acpi", cpu.acpi), ("apic", cpu.apic), ("pae", cpu.pae)] {
                if enabled {
                    doc.empty(name, &[])?;
                }
            }
            Ok(())
        })
    }

    fn write_disks<W: Write>(
        &self,
        doc: &mut XmlDocument<W>,
        connections: &[DataConn],
    ) -> Result<()> {
        for (i, disk) in self.config.disks.iter().enumerate() {
            let conn = connections
                .get(i)
                .ok_or_else(|| Error::missing_connection(i, disk.as_str()))?;
            let target_dev = disk_target_dev(i, disk);
            let port = conn.nbd_remote_port.to_string();

            tracing::debug!(
                disk = %disk,
                target_dev = %target_dev,
                port = conn.nbd_remote_port,
                "disk"
            );

            doc.element("disk", &[("type", "network"), ("device", "disk")], |doc| {
                doc.empty("driver", &[("name", "qemu"), ("type", "raw")])?;
                doc.element("source", &[("protocol", "nbd")], |doc| {
                    doc.empty("host", &[("name", "localhost"), ("port", port.as_str())])
                })?;
                // TODO: set bus="ide" or bus="scsi" once the collector reports the disk bus.
                doc.empty("target", &[("dev", target_dev.as_str())])
            })?;
        }
        Ok(())
    }

    fn write_removable<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        for name in &self.config.removable {
            tracing::debug!(target_dev = %name, "removable medium");

            doc.element("disk", &[("type", "network"), ("device", "cdrom")], |doc| {
                doc.empty("driver", &[("name", "qemu"), ("type", "raw")])?;
                doc.empty("target", &[("dev", name.as_str())])
            })?;
        }
        Ok(())
    }

    fn write_interfaces<W: Write>(&self, doc: &mut XmlDocument<W>) -> Result<()> {
        for interface in &self.config.interfaces {
            let network = map_interface_to_network(&self.config.network_map, interface);
            let mac = read_mac_address(&self.host.sys_class_net, interface);

            tracing::debug!(interface = %interface, network, mac = ?mac.address(), "interface");

            doc.element("interface", &[("type", "network")], |doc| {
                doc.empty("source", &[("network", network)])?;
                doc.empty("target", &[("dev", interface.as_str())])?;
                if let Some(address) = mac.address() {
                    doc.empty("mac", &[("address", address)])?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }
}

/// Write the physical machine descriptor for `config` to `path`.
///
/// # Arguments
///
/// * `config` - The physical machine configuration.
/// * `connections` - One data connection per disk, in disk order.
/// * `host` - Host architecture and sysfs location.
/// * `path` - Destination file; overwritten if it exists.
///
/// # Errors
///
/// Returns an error if the file cannot be written, if the XML writer fails,
/// or if a disk has no data connection. No file is left behind on error.
pub fn generate_physical_xml(
    config: &Config,
    connections: &[DataConn],
    host: &HostInfo,
    path: &Path,
) -> Result<()> {
    PhysicalXmlBuilder::new(config, host).write_to_file(connections, path)
}
