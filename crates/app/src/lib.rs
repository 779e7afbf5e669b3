//! # terrarium-app
//!
//! Application layer: the device-ownership **arbitration engine** and the
//! **port definitions** (traits) it is driven through.
//!
//! ## Responsibilities
//! - [`arbiter::Arbiter`] owns the device state table and the rule state,
//!   and runs the timer, sprayer and temperature engines plus the expiry
//!   sweep through a single mutation primitive.
//! - [`controller::ClimateController`] turns a 1 Hz tick into second and
//!   minute passes under one lock.
//! - Define **port traits** the outer layer implements:
//!   - `Clock` — wall-clock time for a tick
//!   - `TemperatureProvider` — terrarium temperature
//!   - `TraceSink` — receives every state change
//! - Provide **in-process infrastructure** (trace bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `terrarium-domain` only (plus `tokio::sync` for channels).

pub mod arbiter;
pub mod controller;
pub mod ports;
pub mod trace_bus;

#[cfg(test)]
pub(crate) mod testing;
