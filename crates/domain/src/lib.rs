//! # terrarium-domain
//!
//! Pure domain model for the terrarium climate and lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, wall-clock helpers, times of day
//! - Define **Devices** (named actuators: lights, fans, mist, sprayer, pump, …)
//!   and the registry that lists them
//! - Define the **ownership model**: [`Horizon`](device::Horizon) (how long a
//!   device stays on) and [`Owner`](device::Owner) (which control source may
//!   change it)
//! - Define **Timers**, **Temperature rules** and the **Sprayer rule**
//! - Define the **Settings** bundle with its normalization and validation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod event;
pub mod rule;
pub mod settings;
pub mod timer;
