//! `wiirover-hal` – collaborator contracts around the control core
//!
//! Drivers for the motion controller, the wheels, the range sensor and the
//! alert LED live outside this workspace.  This crate pins down what they
//! must provide (traits) and the arithmetic every driver shares, so that the
//! arithmetic is tested once and the drivers stay thin.
//!
//! # Modules
//!
//! - [`input`] – [`StickNormalizer`][input::StickNormalizer]: raw stick
//!   sample to [`StickVector`][wiirover_types::StickVector] (baseline,
//!   divisor, upper clamp, change threshold).
//! - [`motor`] – [`WheelMotor`][motor::WheelMotor] trait,
//!   [`DutyCycle`][motor::DutyCycle] forward/backward split and the
//!   two-channel [`HBridgeMotor`][motor::HBridgeMotor].
//! - [`ranging`] – [`RangeSensor`][ranging::RangeSensor] trait and
//!   [`echo_to_distance`][ranging::echo_to_distance].
//! - [`indicator`] – [`Indicator`][indicator::Indicator] trait and the
//!   [`AlertDriver`][indicator::AlertDriver] transition tracker.
//! - [`buttons`] – [`ButtonMap`][buttons::ButtonMap]: button to
//!   [`ButtonAction`][buttons::ButtonAction] dispatch table.
//! - [`sim`] – in-process stand-ins for every driver trait.

pub mod buttons;
pub mod indicator;
pub mod input;
pub mod motor;
pub mod ranging;
pub mod sim;

pub use buttons::{ButtonAction, ButtonMap};
pub use indicator::{AlertDriver, Indicator, LedMode, LedTransition, SensorFaultPolicy};
pub use input::{StickCalibration, StickNormalizer};
pub use motor::{DutyCycle, HBridgeMotor, PwmChannel, WheelMotor};
pub use ranging::{RangeSensor, SPEED_OF_SOUND_MPS, echo_to_distance, echo_to_distance_with};
