// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::monitor::Monitor;
use crate::notifier::NotifySend;
use crate::udisks::Listener;

#[macro_use]
extern crate tracing;

mod config;
mod device;
mod error;
mod monitor;
mod notifier;
mod registry;
mod udisks;

fn setup_logs() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}=info",
        env!("CARGO_CRATE_NAME")
    )));

    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn load_config() -> Config {
    let Some(path) = Config::default_path() else {
        warn!("no config directory available, using defaults");
        return Config::default();
    };

    match Config::load(&path) {
        Ok(config) => {
            info!("configuration loaded from {}", path.display());
            config
        }
        Err(err) => {
            error!("errors loading config: {}", err);
            Config::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    setup_logs();
    let config = load_config();

    let connection = zbus::Connection::system()
        .await
        .context("Failed to connect to D-Bus system bus")?;

    let listener = Listener::subscribe(&connection, &config.udisks_path, config.queue_size)
        .await
        .context("Failed to subscribe to UDisks2 object manager signals")?;

    let (tx, rx) = mpsc::channel(config.queue_size);
    tokio::spawn(listener.run(tx));

    let notifier = NotifySend::new(config.notify_command.clone());
    Monitor::new(config, notifier)
        .run(rx)
        .await
        .context("Device monitor stopped")?;

    Ok(())
}
