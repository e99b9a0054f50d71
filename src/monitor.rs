// SPDX-License-Identifier: GPL-3.0-only
//! Device event handling
//!
//! The [`Monitor`] is the single consumer of [`DeviceEvent`]s. It owns the
//! device registry and runs each handler to completion before taking the next
//! event, so no locking is involved.
//!
//! # Failure handling
//!
//! Handlers fail on malformed payloads, on removals of devices that were never
//! recorded (including devices attached before the daemon started) and when
//! the notification command cannot be run. By default such failures are
//! logged and the monitor moves on; with `fail_fast` the first one ends
//! [`Monitor::run`] with that error.
//!
//! An `InterfacesRemoved` signal whose interface list lacks the Block
//! interface is skipped before the registry is consulted, whether or not the
//! address was ever recorded. UDisks2 reports jobs and interface-only
//! removals through the same signal. The lookup miss applies to block device
//! removals only.

use tokio::sync::mpsc;

use crate::config::Config;
use crate::device::{extract_name, is_partition_name};
use crate::error::Result;
use crate::notifier::{Notification, Notifier};
use crate::registry::DeviceRegistry;
use crate::udisks::{self, DeviceEvent, InterfaceProperties};

pub struct Monitor<N> {
    config: Config,
    registry: DeviceRegistry,
    notifier: N,
}

impl<N: Notifier> Monitor<N> {
    pub fn new(config: Config, notifier: N) -> Self {
        Self {
            config,
            registry: DeviceRegistry::new(),
            notifier,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Dispatch one event to its handler
    pub fn handle(&mut self, event: DeviceEvent) -> Result<()> {
        trace!(address = %event.address(), "Dispatching device event");
        match event {
            DeviceEvent::Added { address, interfaces } => self.on_added(address, &interfaces),
            DeviceEvent::Removed { address, interfaces } => self.on_removed(&address, &interfaces),
        }
    }

    fn on_added(&mut self, address: String, interfaces: &InterfaceProperties) -> Result<()> {
        let Some(path) = udisks::block_device_path(&address, interfaces)? else {
            debug!(address = %address, "Ignoring added object without a block device");
            return Ok(());
        };

        let name = extract_name(&path);
        info!(address = %address, device = %name, "Block device added");
        self.registry.record(address, name.clone());

        if is_partition_name(&name) {
            self.send(Notification::plugged_in(&self.config.mount_path(&name)))?;
        }

        Ok(())
    }

    fn on_removed(&mut self, address: &str, interfaces: &[String]) -> Result<()> {
        if !udisks::has_block_interface(interfaces) {
            debug!(address = %address, "Ignoring removed object without a block device");
            return Ok(());
        }

        let name = self.registry.recall(address)?;
        info!(address = %address, device = %name, "Block device removed");

        if is_partition_name(&name) {
            self.send(Notification::removed(&self.config.mount_path(&name)))?;
        }

        Ok(())
    }

    fn send(&self, notification: Notification) -> Result<()> {
        debug!(title = %notification.title, body = %notification.body, "Sending notification");
        self.notifier.notify(&notification)
    }

    /// Consume events in order until the sender side closes
    pub async fn run(mut self, mut events: mpsc::Receiver<Result<DeviceEvent>>) -> Result<()> {
        info!("Listening for removable storage events");

        while let Some(event) = events.recv().await {
            if let Err(e) = event.and_then(|event| self.handle(event)) {
                if self.config.fail_fast {
                    error!("Stopping on failed device event: {}", e);
                    return Err(e);
                }
                warn!("Failed to handle device event: {}", e);
            }
        }

        if self.registry.is_empty() {
            warn!("Device event channel closed");
        } else {
            warn!(
                "Device event channel closed with {} device(s) still recorded",
                self.registry.len()
            );
        }
        Ok(())
    }
}
