//! Fixed 24-hour demand profile.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Number of hourly slots in one simulated day.
pub const HOURS_PER_DAY: usize = 24;

/// Hourly flow demand for one day (m³/h), index 0 is midnight.
///
/// Always exactly 24 finite, non-negative values whose daily total is also
/// finite. Negative inputs are clamped to zero on construction; non-finite
/// inputs are rejected.
///
/// # Examples
///
/// ```
/// use peakflow_sim::profile::HourlyProfile;
///
/// let p = HourlyProfile::new([2.0; 24]).unwrap();
/// assert_eq!(p.total(), 48.0);
/// assert_eq!(p.at(23), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct HourlyProfile([f64; HOURS_PER_DAY]);

impl HourlyProfile {
    /// Builds a profile from 24 values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MalformedProfile`] if any value is NaN or infinite,
    /// or if the values are so large that their sum overflows.
    pub fn new(values: [f64; HOURS_PER_DAY]) -> Result<Self, SimError> {
        let mut clamped = values;
        for (hour, v) in clamped.iter_mut().enumerate() {
            if !v.is_finite() {
                return Err(SimError::MalformedProfile(format!(
                    "hour {hour} has non-finite value {v}"
                )));
            }
            if *v < 0.0 {
                log::debug!("clamping negative demand {v} at hour {hour} to 0");
                *v = 0.0;
            }
        }
        let total: f64 = clamped.iter().sum();
        if !total.is_finite() {
            return Err(SimError::MalformedProfile(
                "daily total overflows".to_string(),
            ));
        }
        Ok(Self(clamped))
    }

    /// Builds a profile from a slice that must hold exactly 24 values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MalformedProfile`] on a length mismatch or
    /// non-finite values. Slices are never truncated or padded.
    pub fn from_slice(values: &[f64]) -> Result<Self, SimError> {
        let array: [f64; HOURS_PER_DAY] = values.try_into().map_err(|_| {
            SimError::MalformedProfile(format!(
                "expected {HOURS_PER_DAY} hourly values, got {}",
                values.len()
            ))
        })?;
        Self::new(array)
    }

    /// Wraps compile-time constants known to be valid.
    pub(crate) const fn from_raw(values: [f64; HOURS_PER_DAY]) -> Self {
        Self(values)
    }

    /// Demand at `hour` (0..24).
    ///
    /// # Panics
    ///
    /// Panics if `hour >= 24`.
    pub fn at(&self, hour: usize) -> f64 {
        self.0[hour]
    }

    /// Underlying hourly values.
    pub fn values(&self) -> &[f64; HOURS_PER_DAY] {
        &self.0
    }

    /// Iterates over the hourly values, midnight first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Sum of all hourly values (m³ over the day).
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Mean hourly demand.
    pub fn mean(&self) -> f64 {
        self.total() / HOURS_PER_DAY as f64
    }

    /// Largest hourly value.
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest hourly value.
    pub fn min(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

impl Index<usize> for HourlyProfile {
    type Output = f64;

    fn index(&self, hour: usize) -> &f64 {
        &self.0[hour]
    }
}

impl TryFrom<Vec<f64>> for HourlyProfile {
    type Error = SimError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&values)
    }
}

impl From<HourlyProfile> for Vec<f64> {
    fn from(profile: HourlyProfile) -> Self {
        profile.0.to_vec()
    }
}
