//! Stress index, reservoir balance, and traffic-light classification.

use crate::profile::{HOURS_PER_DAY, HourlyProfile};

use super::types::{ModelConfig, TrafficLight};

/// Per-hour stress indices and tank levels derived from one demand profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressProfile {
    /// `demand / max_safe_flow`, not capped at 1.0.
    pub stress_index: [f64; HOURS_PER_DAY],
    /// Reservoir volume at the start of each hour (m³).
    pub tank_level: [f64; HOURS_PER_DAY],
}

impl StressProfile {
    /// Lowest tank level over the day (m³).
    pub fn min_tank(&self) -> f64 {
        self.tank_level.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Evaluates a demand profile against the supply zone's physical limits.
///
/// Stateless between calls; every evaluation recomputes the inflow rate from
/// the profile it is given.
#[derive(Debug, Clone, Copy)]
pub struct StressEvaluator {
    model: ModelConfig,
}

impl StressEvaluator {
    /// Creates an evaluator for the given model constants.
    pub fn new(model: ModelConfig) -> Self {
        Self { model }
    }

    /// Returns a reference to the model constants.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Computes the stress index and simulated tank level for every hour.
    ///
    /// The tank starts at `tank_capacity * initial_tank_ratio`. Inflow is a
    /// constant `mean(demand) * inflow_multiplier`. Each later hour's level
    /// depends only on the previous hour's level and demand, and is clamped
    /// to `[0, tank_capacity]` before feeding the next step.
    pub fn evaluate(&self, demand: &HourlyProfile) -> StressProfile {
        let m = &self.model;
        let stress_index = std::array::from_fn(|h| demand[h] / m.max_safe_flow);

        let inflow = demand.mean() * m.inflow_multiplier;
        let mut tank_level = [0.0; HOURS_PER_DAY];
        tank_level[0] = m.initial_tank_level();
        for h in 1..HOURS_PER_DAY {
            let next = tank_level[h - 1] + inflow - demand[h - 1];
            tank_level[h] = next.clamp(0.0, m.tank_capacity);
        }

        StressProfile {
            stress_index,
            tank_level,
        }
    }

    /// Classifies one hour from its stress index and tank level.
    ///
    /// Red conditions are checked before yellow ones.
    pub fn classify(&self, stress_index: f64, tank_level: f64) -> TrafficLight {
        let t = &self.model.thresholds;
        let tank_ratio = tank_level / self.model.tank_capacity;
        if stress_index >= t.red_stress || tank_ratio < t.red_tank_ratio {
            TrafficLight::Red
        } else if stress_index >= t.yellow_stress || tank_ratio < t.yellow_tank_ratio {
            TrafficLight::Yellow
        } else {
            TrafficLight::Green
        }
    }

    /// Classifies every hour of an evaluated profile independently.
    pub fn classify_all(&self, profile: &StressProfile) -> [TrafficLight; HOURS_PER_DAY] {
        std::array::from_fn(|h| self.classify(profile.stress_index[h], profile.tank_level[h]))
    }
}
