use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized stick displacement.
///
/// `x` is lateral deflection (positive = right) and `y` is forward/back
/// deflection.  Both are conceptually in `[-1, 1]` once the input driver has
/// removed the center baseline and divided by the full deflection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickVector {
    pub x: f64,
    pub y: f64,
}

impl StickVector {
    pub const CENTERED: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the displacement.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Power requested for each side of a differential-drive chassis.
///
/// Sign is direction, magnitude is the fraction of full speed.  Values are
/// typically in `[-1, 1]` but arcs may reach `sqrt(2)` for unit-square input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    pub left: f64,
    pub right: f64,
}

impl WheelCommand {
    /// Both wheels at rest.
    pub const STOP: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Multiply both wheels by the actuator's range, e.g. `100.0` for a
    /// percentage duty cycle.
    pub fn scaled(self, range: f64) -> Self {
        Self {
            left: self.left * range,
            right: self.right * range,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// A single range reading, in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance(f64);

impl Distance {
    pub fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub fn meters(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} m", self.0)
    }
}

/// Discrete obstacle-alert level.
///
/// `Rate(rank)` ranks run from `1` (slowest blink, farthest band) up to the
/// number of bands in the active proximity policy (fastest blink, closest
/// band).  The derived ordering therefore follows urgency:
/// `Off < Rate(1) < Rate(2) < …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertTier {
    Off,
    Rate(u8),
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertTier::Off => write!(f, "off"),
            AlertTier::Rate(rank) => write!(f, "rate-{rank}"),
        }
    }
}

/// Buttons that can raise an event: the controller's own buttons plus the
/// push button wired to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Home,
    Plus,
    Minus,
    A,
    One,
    Two,
    Board,
}

impl Button {
    pub const ALL: [Button; 7] = [
        Button::Home,
        Button::Plus,
        Button::Minus,
        Button::A,
        Button::One,
        Button::Two,
        Button::Board,
    ];
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Home => "home",
            Button::Plus => "plus",
            Button::Minus => "minus",
            Button::A => "a",
            Button::One => "one",
            Button::Two => "two",
            Button::Board => "board",
        };
        f.write_str(name)
    }
}

impl FromStr for Button {
    type Err = RoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Button::Home),
            "plus" | "+" => Ok(Button::Plus),
            "minus" | "-" => Ok(Button::Minus),
            "a" => Ok(Button::A),
            "one" | "1" => Ok(Button::One),
            "two" | "2" => Ok(Button::Two),
            "board" => Ok(Button::Board),
            other => Err(RoverError::InvalidInput {
                field: "button".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Error type shared by every wiirover crate.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoverError {
    #[error("Invalid input for {field}: {value}")]
    InvalidInput { field: String, value: String },

    #[error("Sensor fault: reported distance {distance_m} m")]
    SensorFault { distance_m: f64 },

    #[error("Unknown alert tier: rate-{0}")]
    UnknownTier(u8),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },
}
