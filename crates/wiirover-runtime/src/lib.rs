//! `wiirover-runtime` – wiring the core to the drivers
//!
//! # Modules
//!
//! - [`rover`] – [`Rover`][rover::Rover]: owns the
//!   [`DriveMapper`][wiirover_control::DriveMapper], the
//!   [`ProximityClassifier`][wiirover_control::ProximityClassifier] and the
//!   driver trait objects from `wiirover-hal`, and turns stick samples, range
//!   readings and button presses into wheel speeds and LED modes.  The caller
//!   decides how often to feed it; nothing here sleeps or spawns.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber (`RUST_LOG` filter, optional JSON output).

pub mod rover;
pub mod telemetry;

pub use rover::{Rover, RoverConfig, RoverStatus};
pub use telemetry::{LogFormat, init_tracing};
