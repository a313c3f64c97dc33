//! `wiirover-control` – motion and proximity decision logic
//!
//! The pure core of wiirover.  Nothing in this crate touches hardware,
//! sleeps, or keeps state between calls; collaborators in `wiirover-hal`
//! sample the devices and feed the numbers in.
//!
//! # Modules
//!
//! - [`drive`] – [`DriveMapper`][drive::DriveMapper]: converts a normalized
//!   [`StickVector`][wiirover_types::StickVector] into a
//!   [`WheelCommand`][wiirover_types::WheelCommand] for a differential-drive
//!   chassis (dead zone, turn-in-place, left/right arcs).
//! - [`proximity`] – [`ProximityClassifier`][proximity::ProximityClassifier]:
//!   converts a [`Distance`][wiirover_types::Distance] into an
//!   [`AlertTier`][wiirover_types::AlertTier] through a configurable table
//!   of [`AlertBand`][proximity::AlertBand]s, and resolves a tier back to its
//!   blink frequency.

pub mod drive;
pub mod proximity;

pub use drive::{DriveConfig, DriveMapper};
pub use proximity::{AlertBand, ProximityClassifier, ProximityPolicy};
