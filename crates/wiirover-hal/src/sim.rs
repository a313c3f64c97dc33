//! In-process stand-ins for every driver trait, so the rover can run in
//! tests and from the CLI without a board attached.
//!
//! | Driver | Stub behaviour |
//! |---|---|
//! | [`SimMotor`] | Stores the last speed and the [`DutyCycle`] it splits into. |
//! | [`SimIndicator`] | Stores the last [`LedMode`]. |
//! | [`SimRangeSensor`] | Replays queued readings; reports a fault when the queue is empty. |
//! | [`SimPwm`] | Stores the last duty cycle; shares it through a handle. |

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use wiirover_types::{Distance, RoverError};

use crate::indicator::{Indicator, LedMode};
use crate::motor::{DutyCycle, MAX_DUTY_PERCENT, PwmChannel, WheelMotor};
use crate::ranging::RangeSensor;

// ────────────────────────────────────────────────────────────────────────────
// Wheels
// ────────────────────────────────────────────────────────────────────────────

/// A simulated wheel that records the most recent speed.  Always succeeds.
#[derive(Debug)]
pub struct SimMotor {
    id: String,
    speed: f64,
    duty: DutyCycle,
}

impl SimMotor {
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            speed: 0.0,
            duty: DutyCycle::default(),
        })
    }

    pub fn duty(&self) -> DutyCycle {
        self.duty
    }
}

impl WheelMotor for SimMotor {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_speed(&mut self, speed: f64) -> Result<(), RoverError> {
        self.speed = speed;
        self.duty = DutyCycle::split(speed, MAX_DUTY_PERCENT);
        Ok(())
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}

/// A simulated PWM output.  The duty cycle is readable through
/// [`SimPwm::handle`] after the channel has been boxed into a motor.
#[derive(Debug, Default)]
pub struct SimPwm {
    duty: Arc<Mutex<f64>>,
}

impl SimPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Arc<Mutex<f64>> {
        self.duty.clone()
    }
}

impl PwmChannel for SimPwm {
    fn set_duty(&mut self, percent: f64) -> Result<(), RoverError> {
        let mut duty = self.duty.lock().map_err(|_| RoverError::HardwareFault {
            component: "sim_pwm".to_string(),
            details: "duty lock poisoned".to_string(),
        })?;
        *duty = percent;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LED
// ────────────────────────────────────────────────────────────────────────────

/// A simulated LED that records the current mode.  Always succeeds.
#[derive(Debug)]
pub struct SimIndicator {
    id: String,
    mode: LedMode,
}

impl SimIndicator {
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            mode: LedMode::default(),
        })
    }
}

impl Indicator for SimIndicator {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_state(&mut self, on: bool) -> Result<(), RoverError> {
        self.mode = LedMode::Steady(on);
        Ok(())
    }

    fn start_blinking(&mut self, frequency_hz: f64) -> Result<(), RoverError> {
        self.mode = LedMode::Blinking { frequency_hz };
        Ok(())
    }

    fn mode(&self) -> LedMode {
        self.mode
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Range sensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated range sensor that replays queued readings in order.
#[derive(Debug)]
pub struct SimRangeSensor {
    id: String,
    readings: VecDeque<Distance>,
}

impl SimRangeSensor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            readings: VecDeque::new(),
        }
    }

    /// Queue `readings` (in meters) behind any already queued.
    pub fn with_readings(mut self, readings: impl IntoIterator<Item = f64>) -> Self {
        self.readings
            .extend(readings.into_iter().map(Distance::from_meters));
        self
    }

    pub fn push(&mut self, reading: Distance) {
        self.readings.push_back(reading);
    }

    pub fn pending(&self) -> usize {
        self.readings.len()
    }
}

impl RangeSensor for SimRangeSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn measure(&mut self) -> Result<Distance, RoverError> {
        self.readings
            .pop_front()
            .ok_or_else(|| RoverError::HardwareFault {
                component: self.id.clone(),
                details: "no echo received".to_string(),
            })
    }
}
