// SPDX-License-Identifier: GPL-3.0-only
//! UDisks2 signal subscription
//!
//! UDisks2 announces hot-plugged objects through the standard
//! `org.freedesktop.DBus.ObjectManager` signals. The [`Listener`] subscribes
//! to both of them with a single match rule, so events reach the monitor in
//! the order the bus delivered them, and decodes each body into an owned
//! [`DeviceEvent`].

use std::collections::HashMap;

use futures::StreamExt;
use tokio::sync::mpsc;
use zbus::message::Type as MessageType;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};
use zbus::{Connection, MatchRule, Message, MessageStream};

use crate::error::{AppError, Result};
use crate::registry::DeviceAddress;

pub const OBJECT_MANAGER_INTERFACE: &str = "org.freedesktop.DBus.ObjectManager";
pub const BLOCK_INTERFACE: &str = "org.freedesktop.UDisks2.Block";
pub const DEVICE_PROPERTY: &str = "Device";

const INTERFACES_ADDED: &str = "InterfacesAdded";
const INTERFACES_REMOVED: &str = "InterfacesRemoved";

/// Interface name -> property name -> value, as carried by `InterfacesAdded`
pub type InterfaceProperties = HashMap<String, HashMap<String, OwnedValue>>;

/// One object manager signal, detached from the bus message
#[derive(Debug)]
pub enum DeviceEvent {
    Added {
        address: DeviceAddress,
        interfaces: InterfaceProperties,
    },
    Removed {
        address: DeviceAddress,
        interfaces: Vec<String>,
    },
}

impl DeviceEvent {
    pub fn address(&self) -> &str {
        match self {
            DeviceEvent::Added { address, .. } | DeviceEvent::Removed { address, .. } => address,
        }
    }
}

/// Read the raw device path from an `InterfacesAdded` payload
///
/// Returns `Ok(None)` when the object does not implement the Block interface
/// (jobs, drives, the manager itself). The `Device` property is a byte array
/// with a trailing NUL; every NUL byte is dropped before decoding.
pub fn block_device_path(address: &str, interfaces: &InterfaceProperties) -> Result<Option<String>> {
    let Some(block) = interfaces.get(BLOCK_INTERFACE) else {
        return Ok(None);
    };

    let value = block
        .get(DEVICE_PROPERTY)
        .ok_or_else(|| AppError::MissingDeviceProperty(address.to_string()))?;

    let invalid = |reason: String| AppError::InvalidDeviceProperty {
        address: address.to_string(),
        reason,
    };

    let mut bytes = match &**value {
        Value::Array(array) => array
            .iter()
            .map(|element| match element {
                Value::U8(byte) => Ok(*byte),
                other => Err(invalid(format!(
                    "expected bytes, found element of type {}",
                    other.value_signature()
                ))),
            })
            .collect::<Result<Vec<u8>>>()?,
        other => {
            return Err(invalid(format!(
                "expected a byte array, found {}",
                other.value_signature()
            )));
        }
    };

    bytes.retain(|byte| *byte != 0);
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| invalid(e.to_string()))
}

/// Whether an `InterfacesRemoved` payload concerns a block device
pub fn has_block_interface(interfaces: &[String]) -> bool {
    interfaces.iter().any(|name| name == BLOCK_INTERFACE)
}

/// Decode an object manager signal
///
/// Returns `None` for signals of other members.
pub fn decode_signal(message: &Message) -> Option<Result<DeviceEvent>> {
    let header = message.header();
    let member = header.member()?.as_str();
    let body = message.body();

    let malformed = |source: zbus::Error| AppError::MalformedSignal {
        member: member.to_string(),
        source,
    };

    let event = match member {
        INTERFACES_ADDED => body
            .deserialize::<(OwnedObjectPath, InterfaceProperties)>()
            .map(|(path, interfaces)| DeviceEvent::Added {
                address: path.to_string(),
                interfaces,
            })
            .map_err(malformed),
        INTERFACES_REMOVED => body
            .deserialize::<(OwnedObjectPath, Vec<String>)>()
            .map(|(path, interfaces)| DeviceEvent::Removed {
                address: path.to_string(),
                interfaces,
            })
            .map_err(malformed),
        _ => return None,
    };

    Some(event)
}

/// Subscription to the UDisks2 object manager signals on one connection
pub struct Listener {
    stream: MessageStream,
}

impl Listener {
    /// Register the match rule for object manager signals under `path_namespace`
    pub async fn subscribe(connection: &Connection, path_namespace: &str, queue_size: usize) -> Result<Self> {
        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .interface(OBJECT_MANAGER_INTERFACE)?
            .path_namespace(path_namespace)?
            .build();

        let stream = MessageStream::for_match_rule(rule, connection, Some(queue_size)).await?;

        info!("Subscribed to {} signals under {}", OBJECT_MANAGER_INTERFACE, path_namespace);

        Ok(Self { stream })
    }

    /// Forward decoded events until the bus stream or the receiver goes away
    pub async fn run(mut self, events: mpsc::Sender<Result<DeviceEvent>>) {
        while let Some(message) = self.stream.next().await {
            let event = match message {
                Ok(message) => match decode_signal(&message) {
                    Some(event) => event,
                    None => continue,
                },
                Err(e) => Err(AppError::DBus(e)),
            };

            if events.send(event).await.is_err() {
                debug!("Event receiver dropped, stopping listener");
                return;
            }
        }

        warn!("D-Bus message stream ended");
    }
}
