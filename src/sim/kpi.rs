//! Post-hoc summary statistics from per-hour results.

use std::fmt;

use serde::Serialize;

use super::types::{HourResult, TrafficLight};

/// Aggregate indicators for a simulated day, baseline and flex side by side.
///
/// Computed from the assembled hour records so the summary can never drift
/// from the per-hour data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Peak hourly demand before shifting (m³/h).
    pub max_demand: f64,
    /// Peak hourly demand after shifting (m³/h).
    pub max_demand_flex: f64,
    /// Number of red hours before shifting.
    pub red_hours: usize,
    /// Number of red hours after shifting.
    pub red_hours_flex: usize,
    /// Lowest tank level before shifting, percent of capacity.
    pub min_tank: f64,
    /// Lowest tank level after shifting, percent of capacity.
    pub min_tank_flex: f64,
}

impl SummaryStats {
    /// Computes the statistics from hour records.
    ///
    /// # Arguments
    ///
    /// * `hours` - Hour records of one run
    /// * `tank_capacity` - Reservoir capacity used to express tank minima in percent
    pub fn from_hours(hours: &[HourResult], tank_capacity: f64) -> Self {
        if hours.is_empty() {
            return Self {
                max_demand: 0.0,
                max_demand_flex: 0.0,
                red_hours: 0,
                red_hours_flex: 0,
                min_tank: 0.0,
                min_tank_flex: 0.0,
            };
        }

        let mut max_demand = f64::NEG_INFINITY;
        let mut max_demand_flex = f64::NEG_INFINITY;
        let mut min_tank = f64::INFINITY;
        let mut min_tank_flex = f64::INFINITY;
        let mut red_hours = 0_usize;
        let mut red_hours_flex = 0_usize;

        for h in hours {
            max_demand = max_demand.max(h.demand);
            max_demand_flex = max_demand_flex.max(h.demand_flex);
            min_tank = min_tank.min(h.tank_level);
            min_tank_flex = min_tank_flex.min(h.tank_level_flex);
            if h.color == TrafficLight::Red {
                red_hours += 1;
            }
            if h.color_flex == TrafficLight::Red {
                red_hours_flex += 1;
            }
        }

        Self {
            max_demand,
            max_demand_flex,
            red_hours,
            red_hours_flex,
            min_tank: min_tank / tank_capacity * 100.0,
            min_tank_flex: min_tank_flex / tank_capacity * 100.0,
        }
    }

    /// Red hours removed by demand response (negative if shifting added some).
    pub fn red_hours_avoided(&self) -> i64 {
        self.red_hours as i64 - self.red_hours_flex as i64
    }

    /// Peak demand reduction achieved by shifting (m³/h).
    pub fn peak_reduction(&self) -> f64 {
        self.max_demand - self.max_demand_flex
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Stress Report ---")?;
        writeln!(f, "Max demand:            {:.2} m3/h", self.max_demand)?;
        writeln!(f, "Max demand flex:       {:.2} m3/h", self.max_demand_flex)?;
        writeln!(f, "Red hours:             {}", self.red_hours)?;
        writeln!(f, "Red hours flex:        {}", self.red_hours_flex)?;
        writeln!(f, "Min tank:              {:.1}%", self.min_tank)?;
        write!(f, "Min tank flex:         {:.1}%", self.min_tank_flex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hour(hour: usize, demand: f64, tank: f64, color: TrafficLight) -> HourResult {
        HourResult {
            hour,
            demand,
            demand_flex: demand * 0.5,
            stress_index: demand / 800.0,
            stress_index_flex: demand * 0.5 / 800.0,
            tank_level: tank,
            tank_level_flex: tank + 100.0,
            color,
            color_flex: TrafficLight::Green,
        }
    }

    #[test]
    fn maxima_and_minima() {
        let hours = vec![
            make_hour(0, 10.0, 2100.0, TrafficLight::Green),
            make_hour(1, 30.0, 1500.0, TrafficLight::Yellow),
            make_hour(2, 20.0, 2400.0, TrafficLight::Green),
        ];
        let stats = SummaryStats::from_hours(&hours, 3000.0);
        assert_eq!(stats.max_demand, 30.0);
        assert_eq!(stats.max_demand_flex, 15.0);
        assert_eq!(stats.min_tank, 50.0);
        assert!((stats.min_tank_flex - 1600.0 / 30.0).abs() < 1e-9);
        assert!((stats.peak_reduction() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn red_hour_counting() {
        let mut hours = vec![make_hour(0, 10.0, 2000.0, TrafficLight::Red); 5];
        hours[1].color = TrafficLight::Green;
        hours[3].color_flex = TrafficLight::Red;
        let stats = SummaryStats::from_hours(&hours, 3000.0);
        assert_eq!(stats.red_hours, 4);
        assert_eq!(stats.red_hours_flex, 1);
        assert_eq!(stats.red_hours_avoided(), 3);
    }

    #[test]
    fn empty_hours() {
        let stats = SummaryStats::from_hours(&[], 3000.0);
        assert_eq!(stats.red_hours, 0);
        assert_eq!(stats.max_demand, 0.0);
    }

    #[test]
    fn display_lists_every_metric() {
        let hours = vec![make_hour(0, 10.0, 2100.0, TrafficLight::Green)];
        let s = SummaryStats::from_hours(&hours, 3000.0).to_string();
        for label in [
            "Max demand:",
            "Max demand flex:",
            "Red hours:",
            "Red hours flex:",
            "Min tank:",
            "Min tank flex:",
        ] {
            assert!(s.contains(label), "missing {label}");
        }
    }
}
