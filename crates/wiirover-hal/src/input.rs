//! [`StickNormalizer`] – raw nunchuk stick samples to [`StickVector`]s.
//!
//! The stick reports each axis as an unsigned byte (`u8`) that rests near
//! `127`.
//! Normalization subtracts that center, divides by the usable deflection of
//! each axis, and caps the result at `1.0`.  Only the upper end is capped:
//! full deflection on the low side can read slightly past `-1.0`.
//!
//! Samples that differ from the previous one by less than the change
//! threshold on both axes are dropped, so a stick resting in place produces
//! no events.

use serde::{Deserialize, Serialize};
use wiirover_types::{RoverError, StickVector};

/// Per-controller stick calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickCalibration {
    /// Raw reading of a centered stick, `[x, y]`.
    #[serde(default = "default_center")]
    pub center: [i32; 2],
    /// Raw deflection that counts as full scale, `[x, y]`.
    #[serde(default = "default_divisor")]
    pub divisor: [f64; 2],
    /// Minimum per-axis change (raw units) that produces a new event.
    #[serde(default = "default_change_threshold")]
    pub change_threshold: i32,
}

fn default_center() -> [i32; 2] {
    [127, 127]
}
fn default_divisor() -> [f64; 2] {
    [127.0, 100.0]
}
fn default_change_threshold() -> i32 {
    1
}

impl Default for StickCalibration {
    fn default() -> Self {
        Self {
            center: default_center(),
            divisor: default_divisor(),
            change_threshold: default_change_threshold(),
        }
    }
}

impl StickCalibration {
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] when a divisor is zero or not
    /// finite, or the change threshold is negative.
    pub fn validate(&self) -> Result<(), RoverError> {
        for (axis, divisor) in ["x", "y"].iter().zip(self.divisor) {
            if !divisor.is_finite() || divisor == 0.0 {
                return Err(RoverError::InvalidConfig(format!(
                    "stick divisor for {axis} must be finite and non-zero, got {divisor}"
                )));
            }
        }
        if self.change_threshold < 0 {
            return Err(RoverError::InvalidConfig(format!(
                "stick change_threshold must not be negative, got {}",
                self.change_threshold
            )));
        }
        Ok(())
    }
}

/// Stateful filter from raw stick samples to normalized [`StickVector`]s.
#[derive(Debug, Clone)]
pub struct StickNormalizer {
    calibration: StickCalibration,
    last_direction: [i64; 2],
}

impl Default for StickNormalizer {
    fn default() -> Self {
        Self {
            calibration: StickCalibration::default(),
            last_direction: [0, 0],
        }
    }
}

impl StickNormalizer {
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] when `calibration` fails
    /// [`StickCalibration::validate`].
    pub fn new(calibration: StickCalibration) -> Result<Self, RoverError> {
        calibration.validate()?;
        Ok(Self {
            calibration,
            last_direction: [0, 0],
        })
    }

    pub fn calibration(&self) -> &StickCalibration {
        &self.calibration
    }

    /// Feed one raw sample.
    ///
    /// Returns `None` when the sample moved less than the change threshold on
    /// both axes since the previous sample.  The previous sample is updated
    /// either way.
    ///
    /// ```rust
    /// use wiirover_hal::input::StickNormalizer;
    ///
    /// let mut stick = StickNormalizer::default();
    /// assert!(stick.normalize(127, 127).is_none());
    ///
    /// let v = stick.normalize(254, 227).unwrap();
    /// assert_eq!((v.x, v.y), (1.0, 1.0));
    /// ```
    pub fn normalize(&mut self, raw_x: u8, raw_y: u8) -> Option<StickVector> {
        // Widened so any calibrated center stays in range.
        let [cx, cy] = self.calibration.center.map(i64::from);
        let direction = [i64::from(raw_x) - cx, i64::from(raw_y) - cy];
        let [lx, ly] = self.last_direction;
        self.last_direction = direction;

        let threshold = i64::from(self.calibration.change_threshold);
        if (lx - direction[0]).abs() < threshold && (ly - direction[1]).abs() < threshold {
            return None;
        }

        let [dx, dy] = self.calibration.divisor;
        Some(StickVector::new(
            (direction[0] as f64 / dx).min(1.0),
            (direction[1] as f64 / dy).min(1.0),
        ))
    }

    /// Forget the previous sample, as if the stick had just been centered.
    pub fn reset(&mut self) {
        self.last_direction = [0, 0];
    }
}
