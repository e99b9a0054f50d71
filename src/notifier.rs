// SPDX-License-Identifier: GPL-3.0-only
//! Desktop notifications
//!
//! Notifications are delivered by an external command (`notify-send` by
//! default) so the daemon needs no session bus connection of its own.

use std::process::Command;

use crate::error::{AppError, Result};

/// A titled message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn plugged_in(mount_path: &str) -> Self {
        Self {
            title: "USB plugged in".to_string(),
            body: format!("Mounting to {}", mount_path),
        }
    }

    pub fn removed(mount_path: &str) -> Self {
        Self {
            title: "USB removed".to_string(),
            body: format!("Unmounting from {}", mount_path),
        }
    }
}

/// Something that can put a notification in front of the user
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Runs `<command> <title> <body>` and waits for it to exit
///
/// This blocks the caller until the command finishes. The exit status is
/// not checked; only a failure to start the command is an error.
#[derive(Debug, Clone)]
pub struct NotifySend {
    command: String,
}

impl NotifySend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Notifier for NotifySend {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let status = Command::new(&self.command)
            .arg(&notification.title)
            .arg(&notification.body)
            .status()
            .map_err(|source| AppError::Notify {
                command: self.command.clone(),
                source,
            })?;

        if !status.success() {
            debug!(command = %self.command, %status, "Notification command exited unsuccessfully");
        }

        Ok(())
    }
}
