//! Fleet SOC simulator entry point: CLI wiring and scenario loading.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_soc_sim::config::ScenarioConfig;
use fleet_soc_sim::error::{Error, Result};
use fleet_soc_sim::io::export::export_csv;
use fleet_soc_sim::reporting::RunReport;
use fleet_soc_sim::scenario::Scenario;
use fleet_soc_sim::sim::kpi::FleetSummary;

use cli::{Cli, OutputFormat, Source};

/// Exit status when `--strict` is set and a vehicle strands.
const EXIT_STRANDED: u8 = 2;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &Source) -> Result<Scenario> {
    let (mut cfg, fallback_name) = match source {
        Source::File(path) => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("scenario")
                .to_string();
            (ScenarioConfig::from_file(path)?, stem)
        }
        Source::Preset(name) => (ScenarioConfig::from_preset(name)?, name.clone()),
    };
    if cfg.name.is_empty() {
        cfg.name = fallback_name;
    }
    cfg.build().map_err(Error::Invalid)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.list_presets {
        for name in ScenarioConfig::PRESETS {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let scenario = match load(&cli.source()) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = scenario.run();
    let summary = FleetSummary::from_report(&report);
    let conflicts = scenario.charger_conflicts();
    if !conflicts.is_empty() {
        tracing::warn!(count = conflicts.len(), "charger double-bookings in schedule");
    }

    let run = RunReport {
        scenario: &scenario.name,
        grid: &scenario.grid,
        summary: &summary,
        charger_conflicts: &conflicts,
        report: &report,
    };
    match cli.format {
        OutputFormat::Text => println!("{run}"),
        OutputFormat::Json => match run.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        },
    }

    if report.is_rejected() {
        return ExitCode::FAILURE;
    }

    if let Some(ref path) = cli.soc_out {
        if let Err(e) = export_csv(&report, &scenario.vehicles, &scenario.grid, path) {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        eprintln!("SOC telemetry written to {}", path.display());
    }

    let stranded = report.stranded_vehicles().count();

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(fleet_soc_sim::api::AppState::new(scenario, report, summary));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("error: failed to create tokio runtime: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = rt.block_on(fleet_soc_sim::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    if cli.strict && stranded > 0 {
        eprintln!("{stranded} vehicle(s) stranded");
        return ExitCode::from(EXIT_STRANDED);
    }

    ExitCode::SUCCESS
}
