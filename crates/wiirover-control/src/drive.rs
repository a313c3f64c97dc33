//! [`DriveMapper`] – stick displacement to differential-drive wheel power.
//!
//! The mapper has three driving modes once the stick leaves the dead zone:
//!
//! | Condition | Mode | `(left, right)` |
//! |---|---|---|
//! | `|y| < dead_zone` | turn in place | `(-x, x)` |
//! | `x > 0` | right-leaning arc | `(d·|y|, d·m)` |
//! | `x <= 0` | left-leaning arc | `(d·m, d·|y|)` |
//!
//! where `m` is the stick magnitude and `d` the sign of `y` (`0` when
//! `y == 0`).  The branches are tested in that order, so a stick pushed
//! straight forward (`x == 0`) falls into the left-leaning arc.
//!
//! Only `y` is checked against the dead zone before the turn-in-place
//! branch; there is no matching check on `x` alone.
//!
//! # Example
//!
//! ```rust
//! use wiirover_control::drive::DriveMapper;
//! use wiirover_types::{StickVector, WheelCommand};
//!
//! let mapper = DriveMapper::default();
//!
//! // Centered stick: robot stays put.
//! assert_eq!(mapper.map(StickVector::new(0.0, 0.0)).unwrap(), WheelCommand::STOP);
//!
//! // Full right, no forward intent: spin clockwise.
//! let spin = mapper.map(StickVector::new(1.0, 0.0)).unwrap();
//! assert_eq!(spin, WheelCommand::new(-1.0, 1.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use wiirover_types::{RoverError, StickVector, WheelCommand};

/// Tunables for [`DriveMapper`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Stick magnitudes at or below this value are treated as centered, and
    /// `|y|` below it selects turn-in-place.
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f64,
}

fn default_dead_zone() -> f64 {
    0.1
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            dead_zone: default_dead_zone(),
        }
    }
}

impl DriveConfig {
    /// Check that the dead zone is a finite, non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> Result<(), RoverError> {
        if !self.dead_zone.is_finite() || self.dead_zone < 0.0 {
            return Err(RoverError::InvalidConfig(format!(
                "dead_zone must be finite and non-negative, got {}",
                self.dead_zone
            )));
        }
        Ok(())
    }
}

/// Converts a normalized [`StickVector`] into a [`WheelCommand`].
///
/// The mapper holds only its validated configuration and is `Send + Sync`;
/// [`DriveMapper::map`] is a pure function of its argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveMapper {
    dead_zone: f64,
}

impl Default for DriveMapper {
    fn default() -> Self {
        Self {
            dead_zone: default_dead_zone(),
        }
    }
}

impl DriveMapper {
    /// Build a mapper from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] when the dead zone is negative or
    /// not finite.
    pub fn new(config: DriveConfig) -> Result<Self, RoverError> {
        config.validate()?;
        Ok(Self {
            dead_zone: config.dead_zone,
        })
    }

    pub fn dead_zone(&self) -> f64 {
        self.dead_zone
    }

    /// Map `stick` to raw wheel power.
    ///
    /// The result is not scaled to any actuator range; see
    /// [`WheelCommand::scaled`].  Inputs outside `[-1, 1]` are used as given.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidInput`] when either axis is NaN or
    /// infinite, or when the axes are finite but so large that their
    /// magnitude overflows `f64`.
    pub fn map(&self, stick: StickVector) -> Result<WheelCommand, RoverError> {
        check_axis("stick.x", stick.x)?;
        check_axis("stick.y", stick.y)?;

        let StickVector { x, y } = stick;
        let magnitude = stick.magnitude();
        check_axis("stick.magnitude", magnitude)?;

        let command = if magnitude <= self.dead_zone {
            WheelCommand::STOP
        } else {
            let d = sign(y);
            if y.abs() < self.dead_zone {
                WheelCommand::new(-x, x)
            } else if x > 0.0 {
                WheelCommand::new(d * y.abs(), d * magnitude)
            } else {
                WheelCommand::new(d * magnitude, d * y.abs())
            }
        };

        debug!(x, y, left = command.left, right = command.right, "wheels mapped");
        Ok(command)
    }
}

fn check_axis(field: &str, value: f64) -> Result<(), RoverError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RoverError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

// `f64::signum` maps zero to one; the mapper needs zero to stay zero.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;
    const SQRT_2: f64 = std::f64::consts::SQRT_2;

    fn map(x: f64, y: f64) -> WheelCommand {
        DriveMapper::default().map(StickVector::new(x, y)).unwrap()
    }

    fn assert_close(actual: WheelCommand, left: f64, right: f64) {
        assert!(
            (actual.left - left).abs() < TOL && (actual.right - right).abs() < TOL,
            "expected ({left}, {right}), got ({}, {})",
            actual.left,
            actual.right
        );
    }

    fn grid() -> Vec<f64> {
        (-10..=10).map(|i| f64::from(i) / 10.0).collect()
    }

    #[test]
    fn centered_stick_is_exact_stop() {
        assert_eq!(map(0.0, 0.0), WheelCommand::STOP);
    }

    #[test]
    fn inside_dead_zone_is_exact_stop() {
        for (x, y) in [(0.05, 0.05), (-0.07, 0.0), (0.0, -0.09), (0.06, -0.06)] {
            assert_eq!(map(x, y), WheelCommand::STOP, "({x}, {y})");
        }
    }

    #[test]
    fn magnitude_on_dead_zone_boundary_is_stop() {
        // hypot(0.1, 0) == 0.1 exactly; the boundary is inclusive.
        assert_eq!(map(0.1, 0.0), WheelCommand::STOP);
        assert_eq!(map(0.0, -0.1), WheelCommand::STOP);
    }

    #[test]
    fn every_grid_point_in_dead_zone_stops() {
        let mapper = DriveMapper::default();
        for x in grid() {
            for y in grid() {
                let stick = StickVector::new(x * 0.1, y * 0.1);
                if stick.magnitude() <= mapper.dead_zone() {
                    assert_eq!(mapper.map(stick).unwrap(), WheelCommand::STOP);
                }
            }
        }
    }

    #[test]
    fn small_y_turns_in_place() {
        assert_close(map(0.5, 0.05), -0.5, 0.5);
        assert_close(map(-1.0, 0.0), 1.0, -1.0);
        assert_close(map(1.0, -0.09), -1.0, 1.0);
    }

    #[test]
    fn turn_in_place_holds_across_grid() {
        let mapper = DriveMapper::default();
        for x in grid() {
            for y in [-0.09, -0.05, 0.0, 0.05, 0.09] {
                let stick = StickVector::new(x, y);
                if stick.magnitude() > mapper.dead_zone() {
                    assert_close(mapper.map(stick).unwrap(), -x, x);
                }
            }
        }
    }

    #[test]
    fn straight_forward_takes_left_arc() {
        // x == 0 belongs to the x <= 0 branch: both wheels get |y| == m.
        assert_close(map(0.0, 1.0), 1.0, 1.0);
        assert_close(map(0.0, -1.0), -1.0, -1.0);
    }

    #[test]
    fn diagonal_forward_right() {
        assert_close(map(1.0, 1.0), 1.0, SQRT_2);
    }

    #[test]
    fn diagonal_backward_left() {
        assert_close(map(-1.0, -1.0), -SQRT_2, -1.0);
    }

    #[test]
    fn arcs_give_more_power_to_outer_wheel() {
        let right = map(0.6, 0.8);
        assert_close(right, 0.8, 1.0);

        let left = map(-0.6, 0.8);
        assert_close(left, 1.0, 0.8);

        let reverse_right = map(0.6, -0.8);
        assert_close(reverse_right, -0.8, -1.0);
    }

    #[test]
    fn mirrored_stick_swaps_wheels() {
        for x in grid() {
            if x == 0.0 {
                continue;
            }
            for y in grid() {
                let a = map(x, y);
                let b = map(-x, y);
                assert!((b.left - a.right).abs() < TOL, "({x}, {y})");
                assert!((b.right - a.left).abs() < TOL, "({x}, {y})");
            }
        }
    }

    #[test]
    fn wheel_power_bounded_by_stick_magnitude() {
        for x in grid() {
            for y in grid() {
                let cmd = map(x, y);
                let bound = y.abs().max(x.hypot(y)) + TOL;
                assert!(cmd.left.abs() <= bound, "({x}, {y})");
                assert!(cmd.right.abs() <= bound, "({x}, {y})");
                assert!(bound <= SQRT_2 + TOL);
            }
        }
    }

    #[test]
    fn out_of_range_input_is_not_clamped() {
        assert_close(map(2.0, 0.0), -2.0, 2.0);
        assert_close(map(0.0, 3.0), 3.0, 3.0);
    }

    #[test]
    fn repeated_calls_agree() {
        let mapper = DriveMapper::default();
        for x in grid() {
            for y in grid() {
                let stick = StickVector::new(x, y);
                assert_eq!(mapper.map(stick).unwrap(), mapper.map(stick).unwrap());
            }
        }
    }

    #[test]
    fn nan_input_is_rejected() {
        let mapper = DriveMapper::default();
        let err = mapper.map(StickVector::new(f64::NAN, 0.5)).unwrap_err();
        assert!(matches!(err, RoverError::InvalidInput { ref field, .. } if field == "stick.x"));
    }

    #[test]
    fn infinite_input_is_rejected() {
        let mapper = DriveMapper::default();
        let err = mapper
            .map(StickVector::new(0.2, f64::NEG_INFINITY))
            .unwrap_err();
        assert!(matches!(err, RoverError::InvalidInput { ref field, .. } if field == "stick.y"));
    }

    #[test]
    fn overflowing_magnitude_is_rejected() {
        let mapper = DriveMapper::default();
        let err = mapper
            .map(StickVector::new(f64::MAX, -f64::MAX))
            .unwrap_err();
        assert!(
            matches!(err, RoverError::InvalidInput { ref field, .. } if field == "stick.magnitude")
        );

        let cmd = mapper.map(StickVector::new(f64::MAX, 0.0)).unwrap();
        assert!(cmd.left.is_finite() && cmd.right.is_finite());
    }

    #[test]
    fn zero_dead_zone_with_zero_y_yields_no_drive() {
        // With no dead zone, y == 0 skips turn-in-place and d == 0 zeroes the
        // arc; this mirrors the branch order exactly.
        let mapper = DriveMapper::new(DriveConfig { dead_zone: 0.0 }).unwrap();
        assert_eq!(
            mapper.map(StickVector::new(1.0, 0.0)).unwrap(),
            WheelCommand::STOP
        );
    }

    #[test]
    fn custom_dead_zone_widens_turn_band() {
        let mapper = DriveMapper::new(DriveConfig { dead_zone: 0.3 }).unwrap();
        assert_close(mapper.map(StickVector::new(0.8, 0.25)).unwrap(), -0.8, 0.8);
        assert_eq!(
            mapper.map(StickVector::new(0.2, 0.2)).unwrap(),
            WheelCommand::STOP
        );
    }

    #[test]
    fn invalid_dead_zone_rejected() {
        for dead_zone in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                DriveMapper::new(DriveConfig { dead_zone }),
                Err(RoverError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn config_defaults_when_field_missing() {
        let cfg: DriveConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, DriveConfig::default());
        assert!((cfg.dead_zone - 0.1).abs() < TOL);
    }
}
