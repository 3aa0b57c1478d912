//! Error types for the simulation core.

use thiserror::Error;

/// Failures raised by the simulation core and its baseline sources.
///
/// `DataUnavailable` is absorbed by the simulator (it falls back to the
/// built-in profile). Every other variant is a rejection surfaced to the
/// caller before any simulation work happens.
///
/// # Examples
///
/// ```
/// use peakflow_sim::error::SimError;
///
/// let err = SimError::InvalidScenario("rainy_day".to_string());
/// assert!(err.to_string().contains("rainy_day"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The historical baseline could not be produced.
    #[error("baseline data unavailable: {0}")]
    DataUnavailable(String),

    /// Scenario tag outside the known set.
    #[error("invalid scenario \"{0}\", expected one of: normal_day, hot_day, football_day, combined")]
    InvalidScenario(String),

    /// A demand-response parameter is out of range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Constraint that was violated.
        reason: &'static str,
    },

    /// A demand profile with the wrong shape or non-finite values.
    #[error("malformed profile: {0}")]
    MalformedProfile(String),
}

impl SimError {
    /// Short machine-readable tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataUnavailable(_) => "data_unavailable",
            Self::InvalidScenario(_) => "invalid_scenario",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::MalformedProfile(_) => "malformed_profile",
        }
    }
}
