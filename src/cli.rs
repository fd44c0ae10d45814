use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "fleet-soc-sim",
    version,
    about = "Simulates battery SOC across a fleet's slotted day schedule"
)]
pub struct Cli {
    /// Scenario file (.toml or .json)
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,
    /// Built-in preset (default: depot_day)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,
    /// Write per-slot SOC telemetry to a CSV file
    #[arg(long, value_name = "PATH")]
    pub soc_out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit with status 2 if any vehicle is stranded
    #[arg(long)]
    pub strict: bool,
    /// Print built-in preset names and exit
    #[arg(long)]
    pub list_presets: bool,
    /// Start the REST API server after the simulation
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the scenario comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Preset(String),
}

pub const DEFAULT_PRESET: &str = "depot_day";

impl Cli {
    pub fn source(&self) -> Source {
        match (&self.scenario, &self.preset) {
            (Some(path), _) => Source::File(path.clone()),
            (None, Some(name)) => Source::Preset(name.clone()),
            (None, None) => Source::Preset(DEFAULT_PRESET.to_string()),
        }
    }
}
