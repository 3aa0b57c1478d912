//! peakflow-sim entry point: CLI wiring and config-driven simulation.

mod cli;

use std::io::{self, Write};

use anyhow::{Context, bail};
use clap::Parser;

use peakflow_sim::io::export::{export_csv, write_json};
use peakflow_sim::sim::scenario::ScenarioKind;
use peakflow_sim::sim::types::SimulationResult;

use crate::cli::Cli;

fn print_catalog(out: &mut impl Write) -> io::Result<()> {
    for info in ScenarioKind::catalog() {
        writeln!(out, "{:<14} {:<20} {}", info.id, info.name, info.description)?;
    }
    Ok(())
}

fn print_report(out: &mut impl Write, result: &SimulationResult) -> io::Result<()> {
    let c = &result.config;
    writeln!(
        out,
        "Scenario: {} ({})",
        c.scenario.display_name(),
        c.scenario.id()
    )?;
    writeln!(out, "Baseline: {}", result.baseline_source)?;
    writeln!(out, "Participation rate: {:.2}", c.participation_rate)?;
    writeln!(out, "Shift fraction: {:.2}", c.shift_fraction)?;
    writeln!(out)?;

    for h in &result.hourly_data {
        writeln!(out, "{h}")?;
    }

    let stats = &result.stats;
    writeln!(out, "\n{stats}")?;
    writeln!(out, "Red hours avoided:     {}", stats.red_hours_avoided())?;
    writeln!(out, "Peak reduction:        {:.2} m3/h", stats.peak_reduction())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut stdout = io::stdout().lock();

    if cli.list_scenarios {
        print_catalog(&mut stdout)?;
        return Ok(());
    }

    let cfg = cli.load_config()?;

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("configuration rejected ({} error(s))", errors.len());
    }

    let params = cfg.parameters()?;
    let simulator = cfg.simulator()?;
    let result = simulator.simulate_with(&params)?;

    if cli.json {
        write_json(&result, &mut stdout)?;
    } else {
        print_report(&mut stdout, &result)?;
    }

    if let Some(path) = &cli.telemetry_out {
        export_csv(&result, path)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        eprintln!("Telemetry written to {}", path.display());
    }

    Ok(())
}
