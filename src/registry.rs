// SPDX-License-Identifier: GPL-3.0-only
//! Name cache for attached block devices
//!
//! UDisks2 only tells us the object path of a removed device, so the name
//! seen when it was added is kept here until the matching removal.

use std::collections::HashMap;

use crate::device::DeviceName;
use crate::error::{AppError, Result};

/// Object path assigned by UDisks2 to a block device
pub type DeviceAddress = String;

/// Maps device addresses to the name recorded on their last "added" event
///
/// Owned by the monitor and only touched from the event loop.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    names: HashMap<DeviceAddress, DeviceName>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the name for an address
    pub fn record(&mut self, address: DeviceAddress, name: DeviceName) {
        if let Some(previous) = self.names.insert(address.clone(), name) {
            debug!(address = %address, previous = %previous, "Overwrote registry entry");
        }
    }

    /// Take the name recorded for an address
    ///
    /// The entry is dropped: a device can only be removed once. Fails with
    /// [`AppError::UnknownDevice`] if the address was never recorded or has
    /// already been recalled.
    pub fn recall(&mut self, address: &str) -> Result<DeviceName> {
        self.names
            .remove(address)
            .ok_or_else(|| AppError::UnknownDevice(address.to_string()))
    }

    #[cfg(test)]
    pub fn contains(&self, address: &str) -> bool {
        self.names.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
