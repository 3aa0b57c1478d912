//! Named demand scenarios and the multiplicative modifier they apply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::profile::HourlyProfile;

/// Evening hours affected by a hot day (18:00 to 21:59).
const HOT_DAY_HOURS: [usize; 4] = [18, 19, 20, 21];
const HOT_DAY_FACTOR: f64 = 1.6;
/// Half-time of the evening match.
const FOOTBALL_HOUR: usize = 20;
const FOOTBALL_FACTOR: f64 = 2.2;

/// Exceptional-demand day selected for a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ScenarioKind {
    /// Typical consumption, baseline untouched.
    #[default]
    NormalDay,
    /// Evening watering and showers, hours 18-21 scaled by 1.6.
    HotDay,
    /// Half-time spike, hour 20 scaled by 2.2.
    FootballDay,
    /// Hot day and football match together.
    Combined,
}

/// Catalog entry describing a scenario to front ends.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl ScenarioKind {
    /// Every scenario, in catalog order.
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::NormalDay,
        ScenarioKind::HotDay,
        ScenarioKind::FootballDay,
        ScenarioKind::Combined,
    ];

    /// Wire tag of the scenario.
    pub fn id(self) -> &'static str {
        match self {
            Self::NormalDay => "normal_day",
            Self::HotDay => "hot_day",
            Self::FootballDay => "football_day",
            Self::Combined => "combined",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::NormalDay => "Normal Day",
            Self::HotDay => "Hot Summer Day",
            Self::FootballDay => "Football Match Day",
            Self::Combined => "Combined Stress",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::NormalDay => "Typical consumption pattern from the historical baseline",
            Self::HotDay => "1.6x usage during evening hours (18:00-22:00)",
            Self::FootballDay => "2.2x spike at 20:00 (halftime)",
            Self::Combined => "Hot day + football match combined",
        }
    }

    /// Catalog entry for this scenario.
    pub fn info(self) -> ScenarioInfo {
        ScenarioInfo {
            id: self.id(),
            name: self.display_name(),
            description: self.description(),
        }
    }

    /// Full scenario catalog.
    pub fn catalog() -> Vec<ScenarioInfo> {
        Self::ALL.iter().map(|k| k.info()).collect()
    }

    /// Applies the scenario to `baseline` and returns the perturbed profile.
    ///
    /// The input is never modified. `Combined` scales the hot-day hours first
    /// and then the football hour, so hour 20 ends up at `1.6 * 2.2` times
    /// its baseline value.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MalformedProfile`] if scaling pushes the profile
    /// out of the finite range.
    pub fn apply(self, baseline: &HourlyProfile) -> Result<HourlyProfile, SimError> {
        let mut demand = *baseline.values();
        match self {
            Self::NormalDay => {}
            Self::HotDay => scale_hot_day(&mut demand),
            Self::FootballDay => demand[FOOTBALL_HOUR] *= FOOTBALL_FACTOR,
            Self::Combined => {
                scale_hot_day(&mut demand);
                demand[FOOTBALL_HOUR] *= FOOTBALL_FACTOR;
            }
        }
        HourlyProfile::new(demand)
    }
}

fn scale_hot_day(demand: &mut [f64]) {
    for h in HOT_DAY_HOURS {
        demand[h] *= HOT_DAY_FACTOR;
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ScenarioKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal_day" => Ok(Self::NormalDay),
            "hot_day" => Ok(Self::HotDay),
            "football_day" => Ok(Self::FootballDay),
            "combined" => Ok(Self::Combined),
            other => Err(SimError::InvalidScenario(other.to_string())),
        }
    }
}

impl TryFrom<String> for ScenarioKind {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
