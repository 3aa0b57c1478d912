use std::path::PathBuf;

use clap::Parser;

use peakflow_sim::config::{ConfigError, RunConfig};

/// Hourly water demand stress simulator with demand-response load shifting.
#[derive(Debug, Parser)]
#[command(name = "peakflow-sim", version, about)]
pub struct Cli {
    /// Load configuration from a TOML file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (default, district)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Scenario id (normal_day, hot_day, football_day, combined)
    #[arg(long, value_name = "ID")]
    pub scenario: Option<String>,

    /// Fraction of red-hour flow eligible for shifting
    #[arg(long, value_name = "RATE", allow_negative_numbers = true)]
    pub participation: Option<f64>,

    /// Fraction of the eligible flow that is moved
    #[arg(long, value_name = "FRACTION", allow_negative_numbers = true)]
    pub shift: Option<f64>,

    /// CSV file of historical delivery readings to build the baseline from
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Export hourly results to CSV
    #[arg(long, value_name = "PATH")]
    pub telemetry_out: Option<PathBuf>,

    /// Print the result as JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Print the scenario catalog and exit
    #[arg(long)]
    pub list_scenarios: bool,
}

impl Cli {
    /// Loads the selected configuration: `--config` file, else `--preset`,
    /// else the default preset.
    pub fn load_config(&self) -> Result<RunConfig, ConfigError> {
        let mut cfg = match (&self.config, &self.preset) {
            (Some(path), _) => RunConfig::from_toml_file(path)?,
            (None, Some(name)) => RunConfig::from_preset(name)?,
            (None, None) => RunConfig::default_preset(),
        };
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, cfg: &mut RunConfig) {
        if let Some(scenario) = &self.scenario {
            cfg.simulation.scenario = scenario.clone();
        }
        if let Some(p) = self.participation {
            cfg.simulation.participation_rate = p;
        }
        if let Some(s) = self.shift {
            cfg.simulation.shift_fraction = s;
        }
        if let Some(path) = &self.history {
            cfg.baseline.history_csv = Some(path.clone());
            cfg.baseline.profile = None;
        }
    }
}
