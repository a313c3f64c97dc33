//! `WheelMotor` trait for the two drive wheels, and the H-bridge duty split
//! every PWM wheel driver shares.
//!
//! A wheel is driven by two PWM channels: one pushes forward, the other
//! backward.  Only one of them may carry a duty cycle at any time, and the
//! idle channel is zeroed before the active one is raised.

use std::fmt;

use tracing::debug;
use wiirover_types::RoverError;

/// Default upper bound of a PWM duty cycle, in percent.
pub const MAX_DUTY_PERCENT: f64 = 100.0;

/// A drive wheel on one side of the chassis.
pub trait WheelMotor: Send + Sync {
    /// Stable identifier, e.g. `"left_wheel"`.
    fn id(&self) -> &str;

    /// Command a signed speed in actuator units (percent of full duty for the
    /// stock drivers).  Positive drives forward.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the command cannot be applied.
    fn set_speed(&mut self, speed: f64) -> Result<(), RoverError>;

    /// The most recently commanded speed.
    fn speed(&self) -> f64;
}

/// A single PWM output.
pub trait PwmChannel: Send + Sync {
    /// Set the duty cycle in percent.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the output rejects the value.
    fn set_duty(&mut self, percent: f64) -> Result<(), RoverError>;
}

/// Forward/backward duty pair for one H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DutyCycle {
    pub forward: f64,
    pub backward: f64,
}

impl DutyCycle {
    /// Split a signed `speed` into the two channel duties, each clamped to
    /// `[0, max_duty]`.
    ///
    /// Positive speeds go to `forward`; zero and negative speeds go to
    /// `backward` as a magnitude.  NaN leaves both channels idle.
    ///
    /// ```rust
    /// use wiirover_hal::motor::DutyCycle;
    ///
    /// let duty = DutyCycle::split(-40.0, 100.0);
    /// assert_eq!(duty, DutyCycle { forward: 0.0, backward: 40.0 });
    /// ```
    pub fn split(speed: f64, max_duty: f64) -> Self {
        if speed.is_nan() {
            Self::default()
        } else if speed > 0.0 {
            Self {
                forward: speed.min(max_duty),
                backward: 0.0,
            }
        } else {
            Self {
                forward: 0.0,
                backward: (-speed).min(max_duty),
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.backward == 0.0
    }
}

/// A [`WheelMotor`] built from two [`PwmChannel`]s.
pub struct HBridgeMotor {
    id: String,
    forward: Box<dyn PwmChannel>,
    backward: Box<dyn PwmChannel>,
    max_duty: f64,
    speed: f64,
}

impl HBridgeMotor {
    pub fn new(
        id: impl Into<String>,
        forward: Box<dyn PwmChannel>,
        backward: Box<dyn PwmChannel>,
    ) -> Self {
        Self {
            id: id.into(),
            forward,
            backward,
            max_duty: MAX_DUTY_PERCENT,
            speed: 0.0,
        }
    }

    pub fn with_max_duty(mut self, max_duty: f64) -> Self {
        self.max_duty = max_duty;
        self
    }
}

impl fmt::Debug for HBridgeMotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HBridgeMotor")
            .field("id", &self.id)
            .field("max_duty", &self.max_duty)
            .field("speed", &self.speed)
            .finish()
    }
}

impl WheelMotor for HBridgeMotor {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_speed(&mut self, speed: f64) -> Result<(), RoverError> {
        if speed.is_nan() {
            return Err(RoverError::InvalidInput {
                field: format!("{}.speed", self.id),
                value: speed.to_string(),
            });
        }
        let duty = DutyCycle::split(speed, self.max_duty);
        if speed > 0.0 {
            self.backward.set_duty(0.0)?;
            self.forward.set_duty(duty.forward)?;
        } else {
            self.forward.set_duty(0.0)?;
            self.backward.set_duty(duty.backward)?;
        }
        debug!(wheel = %self.id, speed, forward = duty.forward, backward = duty.backward, "duty applied");
        self.speed = speed;
        Ok(())
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(&'static str, f64)>>>;

    struct RecordingPwm {
        name: &'static str,
        log: Log,
    }

    impl PwmChannel for RecordingPwm {
        fn set_duty(&mut self, percent: f64) -> Result<(), RoverError> {
            self.log.lock().unwrap().push((self.name, percent));
            Ok(())
        }
    }

    struct BrokenPwm;

    impl PwmChannel for BrokenPwm {
        fn set_duty(&mut self, _percent: f64) -> Result<(), RoverError> {
            Err(RoverError::HardwareFault {
                component: "pwm".to_string(),
                details: "channel not started".to_string(),
            })
        }
    }

    fn motor(log: &Log) -> HBridgeMotor {
        HBridgeMotor::new(
            "left_wheel",
            Box::new(RecordingPwm {
                name: "fwd",
                log: log.clone(),
            }),
            Box::new(RecordingPwm {
                name: "bck",
                log: log.clone(),
            }),
        )
    }

    #[test]
    fn split_positive_goes_forward() {
        assert_eq!(
            DutyCycle::split(55.0, 100.0),
            DutyCycle {
                forward: 55.0,
                backward: 0.0
            }
        );
    }

    #[test]
    fn split_zero_is_idle() {
        assert!(DutyCycle::split(0.0, 100.0).is_idle());
    }

    #[test]
    fn split_clamps_to_max_duty() {
        // An arc can ask for sqrt(2) * 100 percent.
        let duty = DutyCycle::split(141.42, 100.0);
        assert_eq!(duty.forward, 100.0);
        let duty = DutyCycle::split(-141.42, 80.0);
        assert_eq!(duty.backward, 80.0);
    }

    #[test]
    fn forward_zeroes_backward_channel_first() {
        let log = Log::default();
        let mut m = motor(&log);
        m.set_speed(30.0).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("bck", 0.0), ("fwd", 30.0)]);
        assert_eq!(m.speed(), 30.0);
    }

    #[test]
    fn reverse_zeroes_forward_channel_first() {
        let log = Log::default();
        let mut m = motor(&log);
        m.set_speed(-70.0).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("fwd", 0.0), ("bck", 70.0)]);
    }

    #[test]
    fn max_duty_limits_channel() {
        let log = Log::default();
        let mut m = motor(&log).with_max_duty(50.0);
        m.set_speed(90.0).unwrap();
        assert_eq!(log.lock().unwrap().last(), Some(&("fwd", 50.0)));
        // The commanded speed is remembered unclamped.
        assert_eq!(m.speed(), 90.0);
    }

    #[test]
    fn split_nan_is_idle() {
        assert!(DutyCycle::split(f64::NAN, 100.0).is_idle());
    }

    #[test]
    fn nan_speed_rejected_without_touching_channels() {
        let log = Log::default();
        let mut m = motor(&log);
        m.set_speed(40.0).unwrap();
        let err = m.set_speed(f64::NAN).unwrap_err();
        assert!(matches!(err, RoverError::InvalidInput { ref field, .. } if field == "left_wheel.speed"));
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(m.speed(), 40.0);
    }

    #[test]
    fn channel_failure_propagates_and_keeps_last_speed() {
        let log = Log::default();
        let mut m = HBridgeMotor::new(
            "right_wheel",
            Box::new(BrokenPwm),
            Box::new(RecordingPwm { name: "bck", log }),
        );
        let result = m.set_speed(-10.0);
        assert!(matches!(result, Err(RoverError::HardwareFault { .. })));
        assert_eq!(m.speed(), 0.0);
    }
}
