//! `Indicator` trait for the alert LED, and [`AlertDriver`], which decides
//! when a running blink cycle has to be cancelled and restarted.
//!
//! The driver behind an [`Indicator`] owns the blink timing itself; this
//! module only tells it what to do next.  Requesting the mode that is already
//! active is a no-op so a steady stream of identical range readings does not
//! keep restarting the cycle.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use wiirover_types::RoverError;

/// A single LED that can be lit, dark, or blinking.
pub trait Indicator: Send + Sync {
    /// Stable identifier, e.g. `"alert_led"`.
    fn id(&self) -> &str;

    /// Stop any blink cycle and hold the LED at `on`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the LED cannot be driven.
    fn set_state(&mut self, on: bool) -> Result<(), RoverError>;

    /// Cancel any blink cycle and start a new one at `frequency_hz`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the LED cannot be driven.
    fn start_blinking(&mut self, frequency_hz: f64) -> Result<(), RoverError>;

    /// The mode the LED was last put in.
    fn mode(&self) -> LedMode;
}

/// What the LED is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedMode {
    Steady(bool),
    Blinking { frequency_hz: f64 },
}

impl Default for LedMode {
    fn default() -> Self {
        LedMode::Steady(false)
    }
}

/// The action an [`Indicator`] must take after a mode request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedTransition {
    /// Requested mode is already active.
    Unchanged,
    /// Cancel the current cycle (if any) and hold the LED at this level.
    Steady(bool),
    /// Cancel the current cycle and restart blinking; the LED is on for
    /// `half_period`, then off for `half_period`.
    Restart {
        frequency_hz: f64,
        half_period: Duration,
    },
}

impl LedTransition {
    /// Forward this transition to `indicator`.
    ///
    /// # Errors
    ///
    /// Propagates the indicator's [`RoverError::HardwareFault`].
    pub fn apply_to(self, indicator: &mut dyn Indicator) -> Result<(), RoverError> {
        match self {
            LedTransition::Unchanged => Ok(()),
            LedTransition::Steady(on) => indicator.set_state(on),
            LedTransition::Restart { frequency_hz, .. } => indicator.start_blinking(frequency_hz),
        }
    }
}

/// What to do with the LED when the range sensor reports a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFaultPolicy {
    /// Keep whatever the LED was doing.
    #[default]
    HoldLast,
    /// Turn the LED off.
    LedOff,
}

/// Time the LED spends in each half of one blink at `frequency_hz`.
pub fn half_period(frequency_hz: f64) -> Duration {
    Duration::from_secs_f64(0.5 / frequency_hz)
}

/// Tracks the active LED mode and turns mode requests into
/// [`LedTransition`]s.
#[derive(Debug, Clone, Default)]
pub struct AlertDriver {
    mode: LedMode,
    fault_policy: SensorFaultPolicy,
}

impl AlertDriver {
    pub fn new(fault_policy: SensorFaultPolicy) -> Self {
        Self {
            mode: LedMode::default(),
            fault_policy,
        }
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }

    pub fn fault_policy(&self) -> SensorFaultPolicy {
        self.fault_policy
    }

    /// Request `mode`.  Non-positive or non-finite blink frequencies are
    /// treated as a request to turn the LED off.
    ///
    /// The requested mode is recorded as active immediately.  Use
    /// [`AlertDriver::request_and_apply`] when the transition is forwarded to
    /// a real [`Indicator`] that may refuse it.
    pub fn request(&mut self, mode: LedMode) -> LedTransition {
        let (mode, transition) = self.plan(mode);
        self.commit(mode);
        transition
    }

    /// Request `mode` and forward the transition to `indicator`.  The mode
    /// only becomes active once the indicator has accepted it, so a failed
    /// write is retried by the next identical request.
    ///
    /// # Errors
    ///
    /// Propagates the indicator's [`RoverError::HardwareFault`].
    pub fn request_and_apply(
        &mut self,
        mode: LedMode,
        indicator: &mut dyn Indicator,
    ) -> Result<LedTransition, RoverError> {
        let (mode, transition) = self.plan(mode);
        transition.apply_to(indicator)?;
        self.commit(mode);
        Ok(transition)
    }

    /// Request the mode for a proximity blink rate, where `0.0` means the
    /// alert is off.
    pub fn on_rate(&mut self, frequency_hz: f64) -> LedTransition {
        self.request(rate_mode(frequency_hz))
    }

    /// [`AlertDriver::on_rate`], forwarded to `indicator`.
    ///
    /// # Errors
    ///
    /// Propagates the indicator's [`RoverError::HardwareFault`].
    pub fn apply_rate(
        &mut self,
        frequency_hz: f64,
        indicator: &mut dyn Indicator,
    ) -> Result<LedTransition, RoverError> {
        self.request_and_apply(rate_mode(frequency_hz), indicator)
    }

    /// Apply the configured [`SensorFaultPolicy`] after a failed reading.
    pub fn on_sensor_fault(&mut self) -> LedTransition {
        match self.fault_policy {
            SensorFaultPolicy::HoldLast => LedTransition::Unchanged,
            SensorFaultPolicy::LedOff => self.request(LedMode::Steady(false)),
        }
    }

    /// [`AlertDriver::on_sensor_fault`], forwarded to `indicator`.
    ///
    /// # Errors
    ///
    /// Propagates the indicator's [`RoverError::HardwareFault`].
    pub fn apply_sensor_fault(
        &mut self,
        indicator: &mut dyn Indicator,
    ) -> Result<LedTransition, RoverError> {
        match self.fault_policy {
            SensorFaultPolicy::HoldLast => Ok(LedTransition::Unchanged),
            SensorFaultPolicy::LedOff => {
                self.request_and_apply(LedMode::Steady(false), indicator)
            }
        }
    }

    fn plan(&self, mode: LedMode) -> (LedMode, LedTransition) {
        let mode = match mode {
            LedMode::Blinking { frequency_hz }
                if !frequency_hz.is_finite() || frequency_hz <= 0.0 =>
            {
                LedMode::Steady(false)
            }
            other => other,
        };

        let transition = if mode == self.mode {
            LedTransition::Unchanged
        } else {
            match mode {
                LedMode::Steady(on) => LedTransition::Steady(on),
                LedMode::Blinking { frequency_hz } => LedTransition::Restart {
                    frequency_hz,
                    half_period: half_period(frequency_hz),
                },
            }
        };
        (mode, transition)
    }

    fn commit(&mut self, mode: LedMode) {
        if mode != self.mode {
            info!(from = ?self.mode, to = ?mode, "LED mode change");
            self.mode = mode;
        }
    }
}

fn rate_mode(frequency_hz: f64) -> LedMode {
    if frequency_hz > 0.0 {
        LedMode::Blinking { frequency_hz }
    } else {
        LedMode::Steady(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLed {
        mode: LedMode,
        writes: usize,
    }

    impl Indicator for MockLed {
        fn id(&self) -> &str {
            "alert_led"
        }

        fn set_state(&mut self, on: bool) -> Result<(), RoverError> {
            self.mode = LedMode::Steady(on);
            self.writes += 1;
            Ok(())
        }

        fn start_blinking(&mut self, frequency_hz: f64) -> Result<(), RoverError> {
            self.mode = LedMode::Blinking { frequency_hz };
            self.writes += 1;
            Ok(())
        }

        fn mode(&self) -> LedMode {
            self.mode
        }
    }

    #[test]
    fn starts_dark() {
        assert_eq!(AlertDriver::default().mode(), LedMode::Steady(false));
    }

    #[test]
    fn new_rate_restarts_with_half_period() {
        let mut driver = AlertDriver::default();
        let t = driver.on_rate(10.0);
        assert_eq!(
            t,
            LedTransition::Restart {
                frequency_hz: 10.0,
                half_period: Duration::from_millis(50),
            }
        );
        assert_eq!(driver.mode(), LedMode::Blinking { frequency_hz: 10.0 });
    }

    #[test]
    fn same_rate_is_unchanged() {
        let mut driver = AlertDriver::default();
        driver.on_rate(3.0);
        assert_eq!(driver.on_rate(3.0), LedTransition::Unchanged);
    }

    #[test]
    fn rate_change_restarts_cycle() {
        let mut driver = AlertDriver::default();
        driver.on_rate(1.0);
        assert!(matches!(
            driver.on_rate(5.0),
            LedTransition::Restart { frequency_hz, .. } if frequency_hz == 5.0
        ));
    }

    #[test]
    fn zero_rate_turns_led_off_once() {
        let mut driver = AlertDriver::default();
        driver.on_rate(2.0);
        assert_eq!(driver.on_rate(0.0), LedTransition::Steady(false));
        assert_eq!(driver.on_rate(0.0), LedTransition::Unchanged);
    }

    #[test]
    fn invalid_blink_frequency_means_off() {
        let mut driver = AlertDriver::default();
        driver.request(LedMode::Steady(true));
        assert_eq!(
            driver.request(LedMode::Blinking {
                frequency_hz: f64::NAN
            }),
            LedTransition::Steady(false)
        );
    }

    #[test]
    fn steady_request_cancels_blink() {
        let mut driver = AlertDriver::default();
        driver.on_rate(10.0);
        assert_eq!(
            driver.request(LedMode::Steady(true)),
            LedTransition::Steady(true)
        );
    }

    #[test]
    fn hold_last_policy_keeps_blinking() {
        let mut driver = AlertDriver::new(SensorFaultPolicy::HoldLast);
        driver.on_rate(5.0);
        assert_eq!(driver.on_sensor_fault(), LedTransition::Unchanged);
        assert_eq!(driver.mode(), LedMode::Blinking { frequency_hz: 5.0 });
    }

    #[test]
    fn led_off_policy_darkens_led() {
        let mut driver = AlertDriver::new(SensorFaultPolicy::LedOff);
        driver.on_rate(5.0);
        assert_eq!(driver.on_sensor_fault(), LedTransition::Steady(false));
    }

    #[test]
    fn transitions_apply_to_indicator() {
        let mut led = MockLed {
            mode: LedMode::default(),
            writes: 0,
        };
        let mut driver = AlertDriver::default();

        driver.on_rate(2.0).apply_to(&mut led).unwrap();
        assert_eq!(led.mode(), LedMode::Blinking { frequency_hz: 2.0 });

        driver.on_rate(2.0).apply_to(&mut led).unwrap();
        assert_eq!(led.writes, 1);

        driver.on_rate(0.0).apply_to(&mut led).unwrap();
        assert_eq!(led.mode(), LedMode::Steady(false));
        assert_eq!(led.writes, 2);
    }

    struct StuckLed {
        refusals: usize,
        mode: LedMode,
    }

    impl Indicator for StuckLed {
        fn id(&self) -> &str {
            "alert_led"
        }

        fn set_state(&mut self, on: bool) -> Result<(), RoverError> {
            self.mode = LedMode::Steady(on);
            Ok(())
        }

        fn start_blinking(&mut self, frequency_hz: f64) -> Result<(), RoverError> {
            if self.refusals > 0 {
                self.refusals -= 1;
                return Err(RoverError::HardwareFault {
                    component: "alert_led".to_string(),
                    details: "gpio busy".to_string(),
                });
            }
            self.mode = LedMode::Blinking { frequency_hz };
            Ok(())
        }

        fn mode(&self) -> LedMode {
            self.mode
        }
    }

    #[test]
    fn refused_blink_is_retried_on_next_request() {
        let mut led = StuckLed {
            refusals: 1,
            mode: LedMode::default(),
        };
        let mut driver = AlertDriver::default();

        assert!(driver.apply_rate(10.0, &mut led).is_err());
        assert_eq!(driver.mode(), LedMode::Steady(false));

        let t = driver.apply_rate(10.0, &mut led).unwrap();
        assert!(matches!(t, LedTransition::Restart { .. }));
        assert_eq!(led.mode(), LedMode::Blinking { frequency_hz: 10.0 });
        assert_eq!(driver.mode(), led.mode());

        assert_eq!(
            driver.apply_rate(10.0, &mut led).unwrap(),
            LedTransition::Unchanged
        );
    }

    #[test]
    fn apply_sensor_fault_follows_policy() {
        let mut led = MockLed {
            mode: LedMode::default(),
            writes: 0,
        };
        let mut hold = AlertDriver::new(SensorFaultPolicy::HoldLast);
        hold.apply_rate(5.0, &mut led).unwrap();
        hold.apply_sensor_fault(&mut led).unwrap();
        assert_eq!(led.mode(), LedMode::Blinking { frequency_hz: 5.0 });

        let mut off = AlertDriver::new(SensorFaultPolicy::LedOff);
        off.apply_rate(5.0, &mut led).unwrap();
        off.apply_sensor_fault(&mut led).unwrap();
        assert_eq!(led.mode(), LedMode::Steady(false));
        assert_eq!(off.mode(), LedMode::Steady(false));
    }

    #[test]
    fn fault_policy_parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: SensorFaultPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "led_off""#).unwrap();
        assert_eq!(w.policy, SensorFaultPolicy::LedOff);
    }
}
