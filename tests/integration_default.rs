//! Integration tests for the full simulation pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use peakflow_sim::baseline::{BaselineSource, CsvHistory, TimedSource};
use peakflow_sim::profile::HOURS_PER_DAY;
use peakflow_sim::sim::engine::Simulator;
use peakflow_sim::sim::scenario::ScenarioKind;
use peakflow_sim::sim::types::{BaselineOrigin, SimulationParameters, TrafficLight};

#[test]
fn fallback_run_matches_reference_values() {
    let sim = Simulator::new(common::default_model());
    let r = sim
        .simulate(
            ScenarioKind::NormalDay,
            SimulationParameters::DEFAULT_PARTICIPATION_RATE,
            SimulationParameters::DEFAULT_SHIFT_FRACTION,
        )
        .unwrap();

    assert_eq!(r.hourly_data.len(), HOURS_PER_DAY);
    assert_eq!(r.hourly_data[0].tank_level, 2100.0);
    assert_eq!(r.stats.max_demand, 30.0);
    assert_eq!(r.stats.red_hours, 0);
    assert_eq!(r.baseline_source, BaselineOrigin::Fallback);
    for (h, hour) in r.hourly_data.iter().enumerate() {
        assert_eq!(hour.hour, h);
    }
}

#[test]
fn determinism_two_identical_runs_produce_identical_results() {
    let sim = common::fixed_simulator(common::profile_with_peak(19, 750.0));
    let r1 = sim.simulate(ScenarioKind::Combined, 0.3, 0.7).unwrap();
    let r2 = sim.simulate(ScenarioKind::Combined, 0.3, 0.7).unwrap();
    assert_eq!(r1, r2);
}

#[test]
fn red_hour_shift_moves_load_three_hours_later() {
    let sim = common::fixed_simulator(common::profile_with_peak(5, 700.0));
    let r = sim.simulate(ScenarioKind::NormalDay, 0.25, 0.3).unwrap();
    let moved = 700.0 * 0.075;
    assert!((r.hourly_data[5].demand_flex - (700.0 - moved)).abs() < 1e-9);
    assert!((r.hourly_data[8].demand_flex - (100.0 + moved)).abs() < 1e-9);
}

#[test]
fn late_red_hour_wraps_past_midnight() {
    let sim = common::fixed_simulator(common::profile_with_peak(22, 700.0));
    let r = sim.simulate(ScenarioKind::NormalDay, 0.5, 0.5).unwrap();
    assert!(r.hourly_data[22].demand_flex < r.hourly_data[22].demand);
    assert!(r.hourly_data[1].demand_flex > r.hourly_data[1].demand);
}

#[test]
fn tank_depletion_alone_turns_hours_red() {
    // front-loaded demand drains the reservoir while stress stays low
    let mut values = [0.0; HOURS_PER_DAY];
    for v in values.iter_mut().take(12) {
        *v = 400.0;
    }
    let profile = peakflow_sim::profile::HourlyProfile::new(values).unwrap();
    let sim = common::fixed_simulator(profile);
    let r = sim.simulate(ScenarioKind::NormalDay, 0.0, 0.0).unwrap();

    for h in &r.hourly_data {
        assert!(h.stress_index < 0.85);
    }
    let red: Vec<usize> = r
        .hourly_data
        .iter()
        .filter(|h| h.color == TrafficLight::Red)
        .map(|h| h.hour)
        .collect();
    assert_eq!(red, (9..=14).collect::<Vec<_>>());
    assert_eq!(r.stats.red_hours, 6);
    // lowest level 180 m3 at hour 12
    assert!((r.stats.min_tank - 6.0).abs() < 1e-9);
}

#[test]
fn football_scenario_flexes_the_kickoff_peak() {
    let sim = common::fixed_simulator(common::flat_profile(350.0));
    let r = sim.simulate(ScenarioKind::FootballDay, 0.5, 0.5).unwrap();
    // 350 * 2.2 = 770 -> stress 0.9625
    assert_eq!(r.hourly_data[20].color, TrafficLight::Red);
    assert!((r.hourly_data[20].demand_flex - 770.0 * 0.75).abs() < 1e-9);
    assert!((r.hourly_data[23].demand_flex - (350.0 + 770.0 * 0.25)).abs() < 1e-9);
    assert!(r.stats.peak_reduction() > 0.0);
}

#[test]
fn history_sample_drives_baseline() {
    let history: Arc<dyn BaselineSource> = Arc::new(CsvHistory::new(common::sample_history_path()));
    let baseline = history.fetch().unwrap();
    // three days at 19x, 20x and 21x the reference shape average to 20x
    assert!((baseline.at(18) - 600.0).abs() < 0.01);
    assert!((baseline.at(5) - 60.0).abs() < 0.01);

    let (loaded, summary) = CsvHistory::new(common::sample_history_path()).load().unwrap();
    assert_eq!(loaded, baseline);
    assert_eq!(summary.first_day.to_string(), "2024-06-04");
    assert_eq!(summary.last_day.to_string(), "2024-06-06");
    assert_eq!(summary.hours, 72);
    // every hour is covered, so the daily baseline is a third of the delivery
    assert!((summary.total_delivery - 3.0 * baseline.total()).abs() < 1e-6);

    let sim = Simulator::with_source(
        common::default_model(),
        Arc::new(TimedSource::new(history, Duration::from_secs(5))),
    );
    let r = sim.simulate(ScenarioKind::HotDay, 0.4, 0.5).unwrap();
    assert_eq!(r.baseline_source, BaselineOrigin::History);
    assert_eq!(r.stats.red_hours, 3);
    assert!((r.stats.max_demand - 960.0).abs() < 0.1);
}

#[test]
fn missing_history_falls_back_to_builtin_profile() {
    let sim = Simulator::with_source(
        common::default_model(),
        Arc::new(CsvHistory::new("/nonexistent/meter_readings.csv")),
    );
    let r = sim.simulate(ScenarioKind::NormalDay, 0.25, 0.3).unwrap();
    assert_eq!(r.baseline_source, BaselineOrigin::Fallback);
    assert_eq!(r.stats.max_demand, 30.0);
}

#[test]
fn invalid_parameters_are_rejected_before_simulating() {
    let sim = Simulator::new(common::default_model());
    let err = sim.simulate(ScenarioKind::HotDay, 0.5, 1.01).unwrap_err();
    assert_eq!(err.kind(), "invalid_parameter");
    assert!("rainy_day".parse::<ScenarioKind>().is_err());
}
