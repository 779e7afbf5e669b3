//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the arbitration core and the outside
//! world. They are defined here (in `app`) so that both the engine and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod temperature;
pub mod trace_sink;

pub use clock::{Clock, SystemClock};
pub use temperature::TemperatureProvider;
pub use trace_sink::TraceSink;
