//! [`Rover`] – the event handlers that connect the control core to the
//! drivers.
//!
//! Three kinds of events come in:
//!
//! 1. **Stick samples** – normalized by the
//!    [`StickNormalizer`][wiirover_hal::StickNormalizer], mapped by the
//!    [`DriveMapper`], scaled by `actuation_range` and written to both wheels.
//! 2. **Range readings** – classified by the [`ProximityClassifier`]; the
//!    tier's blink rate goes through the [`AlertDriver`] to the LED.  Faulty
//!    readings apply the configured
//!    [`SensorFaultPolicy`][wiirover_hal::SensorFaultPolicy] and are returned
//!    to the caller as errors.
//! 3. **Button presses** – looked up in the [`ButtonMap`].
//!
//! # Example
//!
//! ```rust
//! use wiirover_hal::LedMode;
//! use wiirover_runtime::{Rover, RoverConfig};
//! use wiirover_types::Distance;
//!
//! let mut rover = Rover::simulated(RoverConfig::default()).unwrap();
//!
//! // Stick pushed straight forward.
//! let cmd = rover.on_stick_sample(127, 227).unwrap().unwrap();
//! assert_eq!((cmd.left, cmd.right), (100.0, 100.0));
//!
//! // Obstacle at 15 cm: blink at 5 Hz.
//! rover.on_distance(Distance::from_meters(0.15)).unwrap();
//! assert_eq!(rover.led_mode(), LedMode::Blinking { frequency_hz: 5.0 });
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wiirover_control::{DriveConfig, DriveMapper, ProximityClassifier, ProximityPolicy};
use wiirover_hal::sim::{SimIndicator, SimMotor};
use wiirover_hal::{
    AlertDriver, ButtonAction, ButtonMap, Indicator, LedMode, RangeSensor, SensorFaultPolicy,
    StickCalibration, StickNormalizer, WheelMotor,
};
use wiirover_types::{AlertTier, Button, Distance, RoverError, StickVector, WheelCommand};

/// Everything needed to build a [`Rover`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoverConfig {
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub proximity: ProximityPolicy,
    #[serde(default)]
    pub stick: StickCalibration,
    /// Multiplier from raw wheel power to actuator units (percent of duty).
    #[serde(default = "default_actuation_range")]
    pub actuation_range: f64,
    #[serde(default)]
    pub fault_policy: SensorFaultPolicy,
}

fn default_actuation_range() -> f64 {
    100.0
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            drive: DriveConfig::default(),
            proximity: ProximityPolicy::default(),
            stick: StickCalibration::default(),
            actuation_range: default_actuation_range(),
            fault_policy: SensorFaultPolicy::default(),
        }
    }
}

/// Whether the rover should keep processing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoverStatus {
    Running,
    Stopping,
}

/// The rover's event handlers and the drivers they write to.
pub struct Rover {
    mapper: DriveMapper,
    classifier: ProximityClassifier,
    normalizer: StickNormalizer,
    buttons: ButtonMap,
    alerts: AlertDriver,
    actuation_range: f64,
    left: Box<dyn WheelMotor>,
    right: Box<dyn WheelMotor>,
    led: Box<dyn Indicator>,
    last_command: WheelCommand,
    last_tier: Option<AlertTier>,
    status: RoverStatus,
}

impl Rover {
    /// Build a rover from `config` and the three drivers.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] when any section of `config` is
    /// rejected.
    pub fn new(
        config: RoverConfig,
        left: Box<dyn WheelMotor>,
        right: Box<dyn WheelMotor>,
        led: Box<dyn Indicator>,
    ) -> Result<Self, RoverError> {
        if !config.actuation_range.is_finite() || config.actuation_range <= 0.0 {
            return Err(RoverError::InvalidConfig(format!(
                "actuation_range must be finite and positive, got {}",
                config.actuation_range
            )));
        }

        Ok(Self {
            mapper: DriveMapper::new(config.drive)?,
            classifier: ProximityClassifier::new(config.proximity)?,
            normalizer: StickNormalizer::new(config.stick)?,
            buttons: ButtonMap::default(),
            alerts: AlertDriver::new(config.fault_policy),
            actuation_range: config.actuation_range,
            left,
            right,
            led,
            last_command: WheelCommand::STOP,
            last_tier: None,
            status: RoverStatus::Running,
        })
    }

    /// Build a rover on simulated wheels (`"left_wheel"`, `"right_wheel"`)
    /// and a simulated `"alert_led"`.
    ///
    /// # Errors
    ///
    /// Same as [`Rover::new`].
    pub fn simulated(config: RoverConfig) -> Result<Self, RoverError> {
        Self::new(
            config,
            SimMotor::new("left_wheel"),
            SimMotor::new("right_wheel"),
            SimIndicator::new("alert_led"),
        )
    }

    /// Replace the button bindings.
    pub fn with_buttons(mut self, buttons: ButtonMap) -> Self {
        self.buttons = buttons;
        self
    }

    // ────────────────────────────────────────────────────────────────────
    // Driving
    // ────────────────────────────────────────────────────────────────────

    /// Handle a raw stick sample.
    ///
    /// Returns the scaled command written to the wheels, or `None` when the
    /// sample did not move far enough to count as a new event.
    ///
    /// # Errors
    ///
    /// Propagates wheel driver faults.
    pub fn on_stick_sample(
        &mut self,
        raw_x: u8,
        raw_y: u8,
    ) -> Result<Option<WheelCommand>, RoverError> {
        match self.normalizer.normalize(raw_x, raw_y) {
            Some(stick) => self.drive(stick).map(Some),
            None => Ok(None),
        }
    }

    /// Map an already-normalized `stick` and write it to the wheels.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidInput`] for non-finite axes (the wheels
    /// are left untouched) and propagates wheel driver faults.
    pub fn drive(&mut self, stick: StickVector) -> Result<WheelCommand, RoverError> {
        let command = self.mapper.map(stick)?.scaled(self.actuation_range);
        self.apply_wheels(command)?;
        debug!(
            x = stick.x,
            y = stick.y,
            left = command.left,
            right = command.right,
            "wheels commanded"
        );
        Ok(command)
    }

    /// Write `command` to both wheels.  If the right wheel refuses, the left
    /// one is halted again so the chassis does not pivot on a single wheel.
    fn apply_wheels(&mut self, command: WheelCommand) -> Result<(), RoverError> {
        self.left.set_speed(command.left)?;
        if let Err(e) = self.right.set_speed(command.right) {
            if let Err(halt) = self.left.set_speed(0.0) {
                warn!(error = %halt, wheel = self.left.id(), "failed to halt wheel");
            }
            self.last_command = WheelCommand::new(self.left.speed(), self.right.speed());
            return Err(e);
        }
        self.last_command = command;
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Proximity
    // ────────────────────────────────────────────────────────────────────

    /// Handle one range reading.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::SensorFault`] for negative or NaN readings, after
    /// applying the fault policy to the LED.  LED driver faults propagate.
    pub fn on_distance(&mut self, distance: Distance) -> Result<AlertTier, RoverError> {
        let tier = match self.classifier.classify(distance) {
            Ok(tier) => tier,
            Err(e) => {
                self.handle_sensor_fault(&e)?;
                return Err(e);
            }
        };

        let rate = self.classifier.rate_for(tier)?;
        self.alerts.apply_rate(rate, self.led.as_mut())?;

        if self.last_tier != Some(tier) {
            info!(distance = %distance, tier = %tier, rate_hz = rate, "alert tier changed");
        }
        self.last_tier = Some(tier);
        Ok(tier)
    }

    /// Take one reading from `sensor` and handle it.
    ///
    /// # Errors
    ///
    /// A failed measurement is treated like a sensor fault: the fault policy
    /// is applied and the sensor's error is returned.
    pub fn poll_range(&mut self, sensor: &mut dyn RangeSensor) -> Result<AlertTier, RoverError> {
        match sensor.measure() {
            Ok(distance) => self.on_distance(distance),
            Err(e) => {
                self.handle_sensor_fault(&e)?;
                Err(e)
            }
        }
    }

    fn handle_sensor_fault(&mut self, error: &RoverError) -> Result<(), RoverError> {
        warn!(error = %error, policy = ?self.alerts.fault_policy(), "range reading rejected");
        self.alerts
            .apply_sensor_fault(self.led.as_mut())
            .map(|_| ())
    }

    // ────────────────────────────────────────────────────────────────────
    // Buttons
    // ────────────────────────────────────────────────────────────────────

    /// Handle a button press.
    ///
    /// # Errors
    ///
    /// Propagates wheel and LED driver faults.
    pub fn on_button(&mut self, button: Button) -> Result<RoverStatus, RoverError> {
        match self.buttons.action_for(button) {
            None => debug!(%button, "button not bound"),
            Some(ButtonAction::Shutdown) => {
                info!(%button, "shutdown requested");
                self.stop()?;
                self.status = RoverStatus::Stopping;
            }
            Some(ButtonAction::Led(on)) => {
                self.alerts
                    .request_and_apply(LedMode::Steady(on), self.led.as_mut())?;
            }
            Some(ButtonAction::Blink(frequency_hz)) => {
                self.alerts
                    .request_and_apply(LedMode::Blinking { frequency_hz }, self.led.as_mut())?;
            }
        }
        Ok(self.status)
    }

    /// Halt both wheels and darken the LED.
    ///
    /// # Errors
    ///
    /// Propagates wheel and LED driver faults.
    pub fn stop(&mut self) -> Result<(), RoverError> {
        self.apply_wheels(WheelCommand::STOP)?;
        self.alerts
            .request_and_apply(LedMode::Steady(false), self.led.as_mut())?;
        self.normalizer.reset();
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Inspection
    // ────────────────────────────────────────────────────────────────────

    pub fn status(&self) -> RoverStatus {
        self.status
    }

    pub fn last_command(&self) -> WheelCommand {
        self.last_command
    }

    pub fn last_tier(&self) -> Option<AlertTier> {
        self.last_tier
    }

    /// Speeds last accepted by the left and right wheel drivers.
    pub fn wheel_speeds(&self) -> (f64, f64) {
        (self.left.speed(), self.right.speed())
    }

    pub fn led_mode(&self) -> LedMode {
        self.led.mode()
    }

    pub fn mapper(&self) -> &DriveMapper {
        &self.mapper
    }

    pub fn classifier(&self) -> &ProximityClassifier {
        &self.classifier
    }
}
