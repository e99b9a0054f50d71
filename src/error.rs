// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the daemon
//!
//! Every failure point of the event pipeline has its own variant so the
//! monitor can log it (or stop on it) with a legible message.

use thiserror::Error;

use crate::registry::DeviceAddress;

/// Main daemon error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A signal body could not be decoded into the expected shape
    #[error("Malformed {member} signal: {source}")]
    MalformedSignal {
        member: String,
        #[source]
        source: zbus::Error,
    },

    /// The Block interface is present but carries no Device property
    #[error("Block device {0} has no Device property")]
    MissingDeviceProperty(DeviceAddress),

    /// The Device property is not a NUL-terminated UTF-8 byte array
    #[error("Invalid Device property on {address}: {reason}")]
    InvalidDeviceProperty { address: DeviceAddress, reason: String },

    /// A removal arrived for an address that was never recorded
    #[error("Device {0} was removed but never seen being added")]
    UnknownDevice(DeviceAddress),

    /// The external notification command could not be run
    #[error("Failed to run notification command {command}: {source}")]
    Notify {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// D-Bus error
    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
