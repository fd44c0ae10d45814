//! Human-readable and JSON rendering of a simulation run.

use std::fmt;

use serde::Serialize;

use crate::fleet::conflicts::ChargerConflict;
use crate::sim::clock::TimeGrid;
use crate::sim::kpi::FleetSummary;
use crate::sim::thresholds::SocBand;
use crate::sim::types::{SimulationReport, SimulationResult};

/// Everything shown for one run, borrowed from its owners.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub scenario: &'a str,
    pub grid: &'a TimeGrid,
    pub summary: &'a FleetSummary,
    pub charger_conflicts: &'a [ChargerConflict],
    pub report: &'a SimulationReport,
}

impl RunReport<'_> {
    /// Pretty-printed JSON of the whole run.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Scenario: {} ({} slots x {} min) ===",
            self.scenario, self.grid.slot_count, self.grid.slot_minutes
        )?;

        if self.report.is_rejected() {
            writeln!(f, "\nSimulation rejected:")?;
            for e in &self.report.global_errors {
                writeln!(f, "  - {e}")?;
            }
            return Ok(());
        }

        for result in self.report.per_vehicle.values() {
            writeln!(f)?;
            write_vehicle(f, self.grid, result)?;
        }

        if !self.charger_conflicts.is_empty() {
            writeln!(f, "\nCharger conflicts:")?;
            for c in self.charger_conflicts {
                let holders: Vec<&str> = c.vehicles.iter().map(|v| v.as_str()).collect();
                writeln!(
                    f,
                    "  {} {}: {}",
                    self.grid.slot_label(c.slot),
                    c.charger,
                    holders.join(", ")
                )?;
            }
        }

        write!(f, "\n{}", self.summary)
    }
}

fn write_vehicle(f: &mut fmt::Formatter<'_>, grid: &TimeGrid, r: &SimulationResult) -> fmt::Result {
    writeln!(f, "{}", r.vehicle_id)?;
    if r.is_diesel {
        return writeln!(f, "  Diesel vehicle: SOC simulation not applicable");
    }

    if let (Some(end), Some(min)) = (r.final_soc(), r.min_soc()) {
        writeln!(f, "  Ending SOC: {end:.1}%   Minimum SOC: {min:.1}%")?;
    }
    writeln!(
        f,
        "  Energy consumed: {:.2} kWh   charged: {:.2} kWh",
        r.total_energy_consumed_kwh, r.total_energy_charged_kwh
    )?;

    let triggers: Vec<String> = [SocBand::Low, SocBand::Critical, SocBand::Stranded]
        .into_iter()
        .filter_map(|band| {
            r.trigger_times
                .get(band)
                .map(|slot| format!("{band} at {} (slot {slot})", grid.slot_label(slot)))
        })
        .collect();
    if triggers.is_empty() {
        writeln!(f, "  Triggers: none")?;
    } else {
        writeln!(f, "  Triggers: {}", triggers.join(", "))?;
    }

    if !r.warnings.is_empty() {
        writeln!(f, "  Warnings:")?;
        for w in &r.warnings {
            writeln!(f, "    - {w}")?;
        }
    }
    Ok(())
}
