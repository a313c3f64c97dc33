//! `RangeSensor` trait for distance sensors, and the echo-time conversion
//! used by ultrasonic modules.

use std::time::Duration;

use wiirover_types::{Distance, RoverError};

/// Speed of sound in dry air at roughly 20 °C.
pub const SPEED_OF_SOUND_MPS: f64 = 343.0;

/// A sensor that reports the free space in front of the robot.
pub trait RangeSensor: Send + Sync {
    /// Stable identifier, e.g. `"front_ultrasound"`.
    fn id(&self) -> &str;

    /// Take one reading.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if no reading could be taken
    /// (e.g. the echo never arrived).
    fn measure(&mut self) -> Result<Distance, RoverError>;
}

/// Convert the round-trip time of an ultrasonic ping into a one-way distance,
/// assuming [`SPEED_OF_SOUND_MPS`].
///
/// ```rust
/// use std::time::Duration;
/// use wiirover_hal::ranging::echo_to_distance;
///
/// // 2 ms there and back is about 34 cm.
/// let d = echo_to_distance(Duration::from_millis(2));
/// assert!((d.meters() - 0.343).abs() < 1e-9);
/// ```
pub fn echo_to_distance(elapsed: Duration) -> Distance {
    echo_to_distance_with(elapsed, SPEED_OF_SOUND_MPS)
}

/// Like [`echo_to_distance`] with an explicit speed of sound in m/s.
pub fn echo_to_distance_with(elapsed: Duration, speed_of_sound_mps: f64) -> Distance {
    Distance::from_meters(elapsed.as_secs_f64() * speed_of_sound_mps / 2.0)
}
