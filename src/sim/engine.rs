//! Simulation orchestrator: baseline, scenario, stress, shifting, and summary.

use std::fmt;
use std::sync::Arc;

use crate::baseline::{BaselineSource, fallback_profile};
use crate::error::SimError;
use crate::profile::HourlyProfile;

use super::kpi::SummaryStats;
use super::scenario::ScenarioKind;
use super::shift::DemandResponseShifter;
use super::stress::StressEvaluator;
use super::types::{
    BaselineOrigin, HourResult, ModelConfig, SimulationParameters, SimulationResult,
};

/// Runs complete single-day simulations.
///
/// Holds no per-run state, so one instance can serve concurrent callers.
/// Every run re-fetches the baseline from its source.
#[derive(Clone)]
pub struct Simulator {
    model: ModelConfig,
    source: Option<Arc<dyn BaselineSource>>,
}

impl Simulator {
    /// Creates a simulator without a baseline source; every run uses the
    /// built-in fallback profile.
    pub fn new(model: ModelConfig) -> Self {
        Self {
            model,
            source: None,
        }
    }

    /// Creates a simulator that asks `source` for the baseline on every run.
    pub fn with_source(model: ModelConfig, source: Arc<dyn BaselineSource>) -> Self {
        Self {
            model,
            source: Some(source),
        }
    }

    /// Returns a reference to the model constants.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Simulates one day for a scenario and demand-response settings.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Demand scenario to apply to the baseline
    /// * `participation_rate` - Fraction of red-hour flow eligible for shifting, in `[0, 1]`
    /// * `shift_fraction` - Fraction of the eligible flow moved, in `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for out-of-range rates and
    /// [`SimError::MalformedProfile`] if the scenario or the shift overflows
    /// the demand. Baseline failures never surface here; the fallback profile
    /// is used instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use peakflow_sim::sim::engine::Simulator;
    /// use peakflow_sim::sim::scenario::ScenarioKind;
    /// use peakflow_sim::sim::types::ModelConfig;
    ///
    /// let sim = Simulator::new(ModelConfig::default());
    /// let result = sim.simulate(ScenarioKind::NormalDay, 0.25, 0.3).unwrap();
    /// assert_eq!(result.hourly_data.len(), 24);
    /// ```
    pub fn simulate(
        &self,
        scenario: ScenarioKind,
        participation_rate: f64,
        shift_fraction: f64,
    ) -> Result<SimulationResult, SimError> {
        let params = SimulationParameters::new(scenario, participation_rate, shift_fraction)?;
        self.simulate_with(&params)
    }

    /// Simulates one day with already validated parameters.
    pub fn simulate_with(
        &self,
        params: &SimulationParameters,
    ) -> Result<SimulationResult, SimError> {
        let (baseline, origin) = self.resolve_baseline();
        self.simulate_profile(&baseline, params, origin)
    }

    /// Simulates one day on an explicit baseline, bypassing the source.
    pub fn simulate_profile(
        &self,
        baseline: &HourlyProfile,
        params: &SimulationParameters,
        origin: BaselineOrigin,
    ) -> Result<SimulationResult, SimError> {
        let evaluator = StressEvaluator::new(self.model);
        let shifter = DemandResponseShifter::new(evaluator);

        let demand = params.scenario.apply(baseline)?;
        let stress = evaluator.evaluate(&demand);
        let colors = evaluator.classify_all(&stress);

        let demand_flex = shifter.apply(&demand, params)?;
        let stress_flex = evaluator.evaluate(&demand_flex);
        let colors_flex = evaluator.classify_all(&stress_flex);

        let hourly_data = std::array::from_fn(|h| HourResult {
            hour: h,
            demand: demand[h],
            demand_flex: demand_flex[h],
            stress_index: stress.stress_index[h],
            stress_index_flex: stress_flex.stress_index[h],
            tank_level: stress.tank_level[h],
            tank_level_flex: stress_flex.tank_level[h],
            color: colors[h],
            color_flex: colors_flex[h],
        });
        let stats = SummaryStats::from_hours(&hourly_data, self.model.tank_capacity);

        log::info!(
            "simulated {} with {} baseline: red hours {} -> {}",
            params.scenario,
            origin,
            stats.red_hours,
            stats.red_hours_flex
        );

        Ok(SimulationResult {
            hourly_data,
            stats,
            config: *params,
            baseline_source: origin,
        })
    }

    fn resolve_baseline(&self) -> (HourlyProfile, BaselineOrigin) {
        let Some(source) = &self.source else {
            return (fallback_profile(), BaselineOrigin::Fallback);
        };
        match source.fetch() {
            Ok(profile) => (profile, source.origin()),
            Err(e) => {
                log::warn!(
                    "baseline source '{}' unavailable ({e}); using fallback profile",
                    source.name()
                );
                (fallback_profile(), BaselineOrigin::Fallback)
            }
        }
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("model", &self.model)
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .finish()
    }
}
