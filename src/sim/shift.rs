//! Demand-response load shifting out of red hours.

use crate::error::SimError;
use crate::profile::HourlyProfile;

use super::stress::StressEvaluator;
use super::types::{SimulationParameters, TrafficLight};

/// A single move of demand between two hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shift {
    pub from_hour: usize,
    pub to_hour: usize,
    /// Volume moved (m³).
    pub amount: f64,
}

/// Moves a share of each red hour's demand to a later hour.
///
/// Red hours are identified once, from the unshifted profile. Hours that
/// receive load keep the classification they had before shifting began, and
/// nothing is re-evaluated mid-pass. Each move is zero-sum, so the daily
/// total is conserved.
#[derive(Debug, Clone, Copy)]
pub struct DemandResponseShifter {
    evaluator: StressEvaluator,
}

impl DemandResponseShifter {
    pub fn new(evaluator: StressEvaluator) -> Self {
        Self { evaluator }
    }

    /// Plans the moves for `demand` without applying them.
    ///
    /// Returns one [`Shift`] per red hour, in increasing hour order. The
    /// target wraps past midnight.
    pub fn plan(&self, demand: &HourlyProfile, params: &SimulationParameters) -> Vec<Shift> {
        let snapshot = self.evaluator.evaluate(demand);
        let colors = self.evaluator.classify_all(&snapshot);
        let share = params.shifted_share();
        let model = self.evaluator.model();

        colors
            .iter()
            .enumerate()
            .filter(|(_, color)| **color == TrafficLight::Red)
            .map(|(hour, _)| Shift {
                from_hour: hour,
                to_hour: model.shift_target(hour),
                amount: demand[hour] * share,
            })
            .collect()
    }

    /// Returns the demand profile after applying every planned shift.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MalformedProfile`] if a receiving hour overflows.
    pub fn apply(
        &self,
        demand: &HourlyProfile,
        params: &SimulationParameters,
    ) -> Result<HourlyProfile, SimError> {
        let mut flex = *demand.values();
        for shift in self.plan(demand, params) {
            log::debug!(
                "shifting {:.3} m3 from hour {} to hour {}",
                shift.amount,
                shift.from_hour,
                shift.to_hour
            );
            flex[shift.from_hour] -= shift.amount;
            flex[shift.to_hour] += shift.amount;
        }
        HourlyProfile::new(flex)
    }
}
