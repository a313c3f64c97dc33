//! [`ProximityClassifier`] – range reading to obstacle-alert tier.
//!
//! A [`ProximityPolicy`] is an ordered table of [`AlertBand`]s.  The first
//! band (in ascending threshold order) whose `below_m` is strictly greater
//! than the reading selects the tier; a reading beyond every band is
//! [`AlertTier::Off`].
//!
//! The default policy:
//!
//! | Distance | Blink | Tier |
//! |---|---|---|
//! | `< 0.1 m` | 10 Hz | `Rate(5)` |
//! | `< 0.2 m` | 5 Hz | `Rate(4)` |
//! | `< 0.3 m` | 3 Hz | `Rate(3)` |
//! | `< 0.5 m` | 2 Hz | `Rate(2)` |
//! | `< 1.0 m` | 1 Hz | `Rate(1)` |
//! | otherwise | – | `Off` |
//!
//! Classification has no memory: a reading hovering on a threshold can flip
//! between neighbouring tiers on every poll.
//!
//! # Example
//!
//! ```rust
//! use wiirover_control::proximity::ProximityClassifier;
//! use wiirover_types::{AlertTier, Distance};
//!
//! let classifier = ProximityClassifier::default();
//!
//! let tier = classifier.classify(Distance::from_meters(0.25)).unwrap();
//! assert_eq!(tier, AlertTier::Rate(3));
//! assert_eq!(classifier.rate_for(tier).unwrap(), 3.0);
//!
//! assert_eq!(classifier.classify(Distance::from_meters(5.0)).unwrap(), AlertTier::Off);
//! assert!(classifier.classify(Distance::from_meters(-0.1)).is_err());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use wiirover_types::{AlertTier, Distance, RoverError};

/// One row of the proximity table: readings strictly below `below_m` blink
/// at `frequency_hz` (unless an earlier, closer band matched first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertBand {
    pub below_m: f64,
    pub frequency_hz: f64,
}

impl AlertBand {
    pub const fn new(below_m: f64, frequency_hz: f64) -> Self {
        Self {
            below_m,
            frequency_hz,
        }
    }
}

/// Threshold table used by [`ProximityClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityPolicy {
    #[serde(default = "default_bands")]
    pub bands: Vec<AlertBand>,
}

fn default_bands() -> Vec<AlertBand> {
    vec![
        AlertBand::new(0.1, 10.0),
        AlertBand::new(0.2, 5.0),
        AlertBand::new(0.3, 3.0),
        AlertBand::new(0.5, 2.0),
        AlertBand::new(1.0, 1.0),
    ]
}

impl Default for ProximityPolicy {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

impl ProximityPolicy {
    /// Check the table for shape problems.
    ///
    /// A valid table has between 1 and 255 bands, finite positive thresholds
    /// in strictly ascending order, and finite positive frequencies that never
    /// increase from one band to the next.  The last rule is what keeps the
    /// blink rate monotonic in distance.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<(), RoverError> {
        if self.bands.is_empty() {
            return Err(invalid("proximity policy needs at least one band".into()));
        }
        if self.bands.len() > usize::from(u8::MAX) {
            return Err(invalid(format!(
                "proximity policy has {} bands, at most {} are supported",
                self.bands.len(),
                u8::MAX
            )));
        }

        for (i, band) in self.bands.iter().enumerate() {
            if !band.below_m.is_finite() || band.below_m <= 0.0 {
                return Err(invalid(format!(
                    "band {i}: threshold must be finite and positive, got {}",
                    band.below_m
                )));
            }
            if !band.frequency_hz.is_finite() || band.frequency_hz <= 0.0 {
                return Err(invalid(format!(
                    "band {i}: frequency must be finite and positive, got {}",
                    band.frequency_hz
                )));
            }
        }

        for (i, pair) in self.bands.windows(2).enumerate() {
            let (closer, farther) = (pair[0], pair[1]);
            if farther.below_m <= closer.below_m {
                return Err(invalid(format!(
                    "band {}: threshold {} must be greater than {}",
                    i + 1,
                    farther.below_m,
                    closer.below_m
                )));
            }
            if farther.frequency_hz > closer.frequency_hz {
                return Err(invalid(format!(
                    "band {}: frequency {} Hz exceeds the closer band's {} Hz",
                    i + 1,
                    farther.frequency_hz,
                    closer.frequency_hz
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> RoverError {
    RoverError::InvalidConfig(msg)
}

/// Maps a [`Distance`] to an [`AlertTier`] using a validated
/// [`ProximityPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityClassifier {
    bands: Vec<AlertBand>,
}

impl Default for ProximityClassifier {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

impl ProximityClassifier {
    /// Build a classifier from `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidConfig`] when the policy fails
    /// [`ProximityPolicy::validate`].
    pub fn new(policy: ProximityPolicy) -> Result<Self, RoverError> {
        policy.validate()?;
        Ok(Self {
            bands: policy.bands,
        })
    }

    /// The bands in ascending threshold order.
    pub fn bands(&self) -> &[AlertBand] {
        &self.bands
    }

    /// Classify a single reading.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::SensorFault`] when the reading is negative or
    /// NaN; neither can come from a healthy sensor.
    pub fn classify(&self, distance: Distance) -> Result<AlertTier, RoverError> {
        let meters = distance.meters();
        if meters.is_nan() || meters < 0.0 {
            return Err(RoverError::SensorFault { distance_m: meters });
        }

        let tier = self
            .bands
            .iter()
            .position(|band| meters < band.below_m)
            .map_or(AlertTier::Off, |index| self.tier_at(index));

        debug!(distance_m = meters, tier = %tier, "distance classified");
        Ok(tier)
    }

    /// Blink frequency for `tier`, with [`AlertTier::Off`] reported as `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::UnknownTier`] when the rank does not exist in this
    /// classifier's policy.
    pub fn rate_for(&self, tier: AlertTier) -> Result<f64, RoverError> {
        match tier {
            AlertTier::Off => Ok(0.0),
            AlertTier::Rate(rank) => self
                .band_index(rank)
                .map(|index| self.bands[index].frequency_hz)
                .ok_or(RoverError::UnknownTier(rank)),
        }
    }

    // Band 0 is the closest and fastest, so it carries the highest rank.
    fn tier_at(&self, index: usize) -> AlertTier {
        // Policy validation caps the band count at u8::MAX.
        AlertTier::Rate((self.bands.len() - index) as u8)
    }

    fn band_index(&self, rank: u8) -> Option<usize> {
        let rank = usize::from(rank);
        (1..=self.bands.len())
            .contains(&rank)
            .then(|| self.bands.len() - rank)
    }
}
