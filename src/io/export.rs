//! CSV and JSON export for simulation results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::SimulationResult;

/// Column header for the hourly CSV export.
const HEADER: &str = "hour,demand,demand_flex,stress_index,stress_index_flex,\
                      tank_level,tank_level_flex,color,color_flex";

/// Exports the hourly records of a result to a CSV file at the given path.
///
/// Writes a header row followed by one row per hour. Produces deterministic
/// output for identical inputs.
///
/// # Arguments
///
/// * `result` - Completed simulation result
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(result: &SimulationResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(result, buf)
}

/// Writes the hourly records of a result as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(result: &SimulationResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for h in &result.hourly_data {
        wtr.write_record(&[
            h.hour.to_string(),
            format!("{:.4}", h.demand),
            format!("{:.4}", h.demand_flex),
            format!("{:.4}", h.stress_index),
            format!("{:.4}", h.stress_index_flex),
            format!("{:.4}", h.tank_level),
            format!("{:.4}", h.tank_level_flex),
            h.color.to_string(),
            h.color_flex.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the full result (hours, stats, parameters, baseline origin) as
/// pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_json(result: &SimulationResult, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, result)?;
    writeln!(writer)?;
    Ok(())
}
