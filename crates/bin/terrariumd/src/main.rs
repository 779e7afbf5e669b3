//! # terrariumd — terrarium control daemon
//!
//! Composition root that wires the collaborators around the arbitration
//! engine and runs the control loop.
//!
//! ## Responsibilities
//! - Parse configuration (`terrarium.toml`, env vars)
//! - Initialize logging
//! - Load the terrarium settings (timers, temperature rules, sprayer rule)
//! - Construct the sensor adapter, trace bus and arbiter
//! - Tick the controller once per second
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use terrarium_adapter_sensor_file::FileTemperatureSensor;
use terrarium_app::arbiter::Arbiter;
use terrarium_app::controller::ClimateController;
use terrarium_app::ports::SystemClock;
use terrarium_app::trace_bus::InProcessTraceBus;
use terrarium_domain::device::DeviceRegistry;
use terrarium_domain::event::StateChange;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load().context("failed to load terrarium.toml")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Settings
    let registry = DeviceRegistry::default();
    let settings_path = &config.controller.settings_path;
    let settings = settings::load(settings_path, &registry)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    tracing::info!(
        timers = settings.timers.len(),
        rules = settings.rules.len(),
        sprayer_actions = settings.sprayer_rule.actions.len(),
        "settings loaded"
    );

    // Trace bus
    let bus = Arc::new(InProcessTraceBus::new(config.controller.trace_capacity));
    tokio::spawn(log_state_changes(bus.subscribe()));
    tracing::debug!(
        capacity = config.controller.trace_capacity,
        listeners = bus.listeners(),
        "trace bus ready"
    );

    // Controller
    let sensor = FileTemperatureSensor::new(&config.sensor.path)
        .with_millidegrees(config.sensor.millidegrees);
    let arbiter = Arbiter::new(registry, settings, Arc::clone(&bus))?;
    let controller = Arc::new(
        ClimateController::new(SystemClock, sensor, arbiter)
            .with_lifetime_counting(config.controller.count_lifetime),
    );
    controller.start();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::info!(sensor = %config.sensor.path.display(), "terrariumd running");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Sensor reads on 1-Wire buses block for up to a second.
                let controller = Arc::clone(&controller);
                tokio::task::spawn_blocking(move || controller.tick()).await?;
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn log_state_changes(mut receiver: broadcast::Receiver<StateChange>) {
    loop {
        match receiver.recv().await {
            Ok(change) => tracing::info!(
                target: "terrarium::trace",
                device = %change.device,
                on = change.is_on(),
                at = change.at,
                "{change}"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "trace logger lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
