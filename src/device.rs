// SPDX-License-Identifier: GPL-3.0-only
//! Device naming helpers
//!
//! Turns raw block device paths into bare kernel names and decides which
//! names are partitions worth telling the user about.

use once_cell::sync::Lazy;
use regex::Regex;

pub type DeviceName = String;

/// Partition nodes of SCSI/USB disks: `sd` + disk letter + partition number
static PARTITION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new("^sd[a-z][0-9][0-9]*$").expect("partition name pattern is valid"));

/// Strip the `/dev/` prefix and any remaining separators from a device path
///
/// Any string is accepted; input without `/dev/` or `/` comes back unchanged.
pub fn extract_name(path: &str) -> DeviceName {
    path.replace("/dev/", "").replace('/', "")
}

/// Check whether a bare device name is a disk partition (e.g. `sdb1`)
///
/// Whole disks (`sdb`), loop devices and NVMe namespaces are rejected.
pub fn is_partition_name(name: &str) -> bool {
    PARTITION_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_dev_prefix() {
        assert_eq!(extract_name("/dev/sdb1"), "sdb1");
        assert_eq!(extract_name("/dev/loop0"), "loop0");
    }

    #[test]
    fn test_extract_removes_nested_separators() {
        // by-label style paths collapse into one token
        assert_eq!(extract_name("/dev/disk/by-label"), "diskby-label");
        assert_eq!(extract_name("/dev/mapper/root"), "mapperroot");
    }

    #[test]
    fn test_extract_plain_name_is_unchanged() {
        assert_eq!(extract_name("sdc2"), "sdc2");
        assert_eq!(extract_name(""), "");
    }

    #[test]
    fn test_extract_is_idempotent() {
        for path in ["/dev/sda1", "/dev/mapper/home", "nvme0n1p3", "/weird/"] {
            let once = extract_name(path);
            assert_eq!(extract_name(&once), once);
            assert!(!once.contains('/'));
        }
    }

    #[test]
    fn test_partition_names_accepted() {
        assert!(is_partition_name("sda1"));
        assert!(is_partition_name("sdb12"));
        assert!(is_partition_name("sdz9"));
    }

    #[test]
    fn test_non_partition_names_rejected() {
        assert!(!is_partition_name("sda"));
        assert!(!is_partition_name("sdaa1"));
        assert!(!is_partition_name("sd1a"));
        assert!(!is_partition_name("sdA1"));
        assert!(!is_partition_name("loop0"));
        assert!(!is_partition_name("nvme0n1p1"));
        assert!(!is_partition_name("sdb1x"));
        assert!(!is_partition_name(""));
    }
}
