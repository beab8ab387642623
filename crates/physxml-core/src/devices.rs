//! Device resolution.
//!
//! Works out the values a device element needs that are not copied straight
//! from the configuration: disk target names, the target network of each
//! interface and the interface's MAC address.

use std::fs;
use std::path::Path;

/// Longest literal disk name that is used as a target name verbatim.
pub const MAX_TARGET_DEV_LEN: usize = 63;

/// Prefix of positional disk target names.
pub const TARGET_DEV_PREFIX: &str = "sd";

/// Network used when the network map has nothing for an interface.
pub const DEFAULT_NETWORK: &str = "default";

/// Convert a zero-based index to a drive suffix: a, b, ..., z, aa, ab, ...
///
/// This is bijective base-26, the same sequence as spreadsheet columns.
pub fn drive_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(char::from(b'a' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Target name for the disk at `index` when no usable literal name exists.
pub fn positional_target_dev(index: usize) -> String {
    format!("{}{}", TARGET_DEV_PREFIX, drive_name(index))
}

/// Target device name for the disk at `index` of the disk list.
///
/// Absolute paths and literals longer than [`MAX_TARGET_DEV_LEN`] get the
/// positional name for `index`. The index is the position in the whole disk
/// list, so literal names leave gaps in the positional sequence.
pub fn disk_target_dev(index: usize, disk: &str) -> String {
    if disk.starts_with('/') || disk.len() > MAX_TARGET_DEV_LEN {
        positional_target_dev(index)
    } else {
        disk.to_string()
    }
}

/// Map an interface to a target network using the network map rules.
///
/// Rules are tried in order and the first one that applies wins. A rule
/// without a `:` applies to every interface. A rule `iface:network` applies
/// when it starts with `interface` immediately followed by `:`.
pub fn map_interface_to_network<'a, S: AsRef<str>>(
    network_map: &'a [S],
    interface: &str,
) -> &'a str {
    for rule in network_map {
        let rule = rule.as_ref();
        if !rule.contains(':') {
            return rule;
        }
        if let Some(network) = rule
            .strip_prefix(interface)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return network;
        }
    }
    DEFAULT_NETWORK
}

/// Outcome of looking up an interface's MAC address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacLookup {
    Found(String),
    NotFound,
}

impl MacLookup {
    /// The address, if one was found.
    pub fn address(&self) -> Option<&str> {
        match self {
            MacLookup::Found(mac) => Some(mac),
            MacLookup::NotFound => None,
        }
    }
}

/// Read `<sys_class_net>/<interface>/address`.
///
/// Failure to read is not an error: the interface simply has no known MAC.
pub fn read_mac_address(sys_class_net: &Path, interface: &str) -> MacLookup {
    let path = sys_class_net.join(interface).join("address");
    match fs::read_to_string(&path) {
        Ok(mut mac) => {
            if mac.ends_with('\n') {
                mac.pop();
            }
            MacLookup::Found(mac)
        }
        Err(e) => {
            tracing::debug!(interface, path = %path.display(), error = %e, "no MAC address");
            MacLookup::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_name_single_letters() {
        assert_eq!(drive_name(0), "a");
        assert_eq!(drive_name(1), "b");
        assert_eq!(drive_name(25), "z");
    }

    #[test]
    fn test_drive_name_rollover() {
        assert_eq!(drive_name(26), "aa");
        assert_eq!(drive_name(27), "ab");
        assert_eq!(drive_name(51), "az");
        assert_eq!(drive_name(52), "ba");
        assert_eq!(drive_name(701), "zz");
        assert_eq!(drive_name(702), "aaa");
        assert_eq!(drive_name(18277), "zzz");
    }

    #[test]
    fn test_positional_target_dev() {
        assert_eq!(positional_target_dev(0), "sda");
        assert_eq!(positional_target_dev(2), "sdc");
        assert_eq!(positional_target_dev(26), "sdaa");
    }

    #[test]
    fn test_disk_target_dev_absolute_path() {
        assert_eq!(disk_target_dev(0, "/dev/foo"), "sda");
        assert_eq!(disk_target_dev(2, "/dev/bar"), "sdc");
    }

    #[test]
    fn test_disk_target_dev_literal() {
        assert_eq!(disk_target_dev(1, "vdb"), "vdb");
        assert_eq!(disk_target_dev(5, "sda"), "sda");
    }

    #[test]
    fn test_disk_target_dev_length_limit() {
        let fits = "x".repeat(MAX_TARGET_DEV_LEN);
        assert_eq!(disk_target_dev(3, &fits), fits);

        let too_long = "x".repeat(MAX_TARGET_DEV_LEN + 1);
        assert_eq!(disk_target_dev(3, &too_long), "sdd");
    }

    #[test]
    fn test_map_interface_specific_rule() {
        let map = ["eth1:net-b", "default-net"];
        assert_eq!(map_interface_to_network(&map, "eth1"), "net-b");
        assert_eq!(map_interface_to_network(&map, "eth0"), "default-net");
    }

    #[test]
    fn test_map_interface_catch_all_first_wins() {
        let map = ["everything", "eth0:ignored"];
        assert_eq!(map_interface_to_network(&map, "eth0"), "everything");
    }

    #[test]
    fn test_map_interface_requires_exact_name() {
        let map = ["eth10:ten"];
        assert_eq!(map_interface_to_network(&map, "eth1"), DEFAULT_NETWORK);
        assert_eq!(map_interface_to_network(&map, "eth10"), "ten");
    }

    #[test]
    fn test_map_interface_splits_on_first_colon() {
        let map = ["em1:net:with:colons"];
        assert_eq!(map_interface_to_network(&map, "em1"), "net:with:colons");
    }

    #[test]
    fn test_map_interface_alias_name() {
        let map = ["eth0:main", "eth0:1:alias-net"];
        assert_eq!(map_interface_to_network(&map, "eth0:1"), "alias-net");
        assert_eq!(map_interface_to_network(&map, "eth0"), "main");
    }

    #[test]
    fn test_map_interface_empty_map() {
        let map: [&str; 0] = [];
        assert_eq!(map_interface_to_network(&map, "eth0"), "default");
    }

    #[test]
    fn test_read_mac_address_strips_newline() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("eth0")).unwrap();
        fs::write(dir.path().join("eth0/address"), "52:54:00:12:34:56\n").unwrap();

        let mac = read_mac_address(dir.path(), "eth0");
        assert_eq!(mac, MacLookup::Found("52:54:00:12:34:56".to_string()));
        assert_eq!(mac.address(), Some("52:54:00:12:34:56"));
    }

    #[test]
    fn test_read_mac_address_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mac = read_mac_address(dir.path(), "eth9");
        assert_eq!(mac, MacLookup::NotFound);
        assert_eq!(mac.address(), None);
    }
}
