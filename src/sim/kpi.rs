//! Post-hoc fleet summary computed from a simulation report.

use std::fmt;

use serde::Serialize;

use super::thresholds::SocBand;
use super::types::{SimulationReport, SimulationResult};
use crate::fleet::vehicle::VehicleId;

/// Headline numbers for one simulated (non-diesel) vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub vehicle_id: VehicleId,
    pub final_soc_pct: f64,
    pub min_soc_pct: f64,
    pub energy_consumed_kwh: f64,
    pub energy_charged_kwh: f64,
    /// Worst band entered during the day.
    pub worst_band: Option<SocBand>,
    pub warning_count: usize,
}

impl VehicleSummary {
    /// Returns `None` for diesel placeholders.
    pub fn from_result(result: &SimulationResult) -> Option<Self> {
        if result.is_diesel {
            return None;
        }
        Some(Self {
            vehicle_id: result.vehicle_id.clone(),
            final_soc_pct: result.final_soc()?,
            min_soc_pct: result.min_soc()?,
            energy_consumed_kwh: result.total_energy_consumed_kwh,
            energy_charged_kwh: result.total_energy_charged_kwh,
            worst_band: result.trigger_times.worst(),
            warning_count: result.warnings.len(),
        })
    }
}

/// Aggregate indicators for a whole fleet run.
///
/// Computed post-hoc from a [`SimulationReport`] so the summary can never
/// disagree with the per-vehicle results it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FleetSummary {
    /// EVs that went through the SOC simulation.
    pub vehicles_simulated: usize,
    /// Diesel vehicles skipped.
    pub diesel_skipped: usize,
    /// Vehicles whose worst band was low.
    pub low_count: usize,
    pub critical_count: usize,
    pub stranded_count: usize,
    pub total_energy_consumed_kwh: f64,
    pub total_energy_charged_kwh: f64,
    /// Lowest SOC reached by any vehicle, and which one.
    pub lowest_soc: Option<(VehicleId, f64)>,
    pub vehicles: Vec<VehicleSummary>,
}

impl FleetSummary {
    /// Summarizes every vehicle in `report`.
    ///
    /// A rejected report yields an all-zero summary.
    pub fn from_report(report: &SimulationReport) -> Self {
        let mut summary = Self::default();

        for result in report.per_vehicle.values() {
            let Some(vehicle) = VehicleSummary::from_result(result) else {
                summary.diesel_skipped += 1;
                continue;
            };

            summary.vehicles_simulated += 1;
            summary.total_energy_consumed_kwh += vehicle.energy_consumed_kwh;
            summary.total_energy_charged_kwh += vehicle.energy_charged_kwh;

            match vehicle.worst_band {
                Some(SocBand::Low) => summary.low_count += 1,
                Some(SocBand::Critical) => summary.critical_count += 1,
                Some(SocBand::Stranded) => summary.stranded_count += 1,
                None => {}
            }

            let is_lower = summary
                .lowest_soc
                .as_ref()
                .is_none_or(|(_, lowest)| vehicle.min_soc_pct < *lowest);
            if is_lower {
                summary.lowest_soc = Some((vehicle.vehicle_id.clone(), vehicle.min_soc_pct));
            }

            summary.vehicles.push(vehicle);
        }

        summary
    }

    /// Vehicles that never dropped below the low threshold.
    pub fn healthy_count(&self) -> usize {
        self.vehicles_simulated - self.low_count - self.critical_count - self.stranded_count
    }
}

impl fmt::Display for FleetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Fleet Summary ---")?;
        writeln!(
            f,
            "Vehicles simulated:    {} ({} diesel skipped)",
            self.vehicles_simulated, self.diesel_skipped
        )?;
        writeln!(f, "Healthy:               {}", self.healthy_count())?;
        writeln!(f, "Low SOC:               {}", self.low_count)?;
        writeln!(f, "Critical SOC:          {}", self.critical_count)?;
        writeln!(f, "Stranded:              {}", self.stranded_count)?;
        writeln!(
            f,
            "Energy consumed:       {:.2} kWh",
            self.total_energy_consumed_kwh
        )?;
        writeln!(
            f,
            "Energy charged:        {:.2} kWh",
            self.total_energy_charged_kwh
        )?;
        match &self.lowest_soc {
            Some((id, soc)) => write!(f, "Lowest SOC:            {soc:.1}% ({id})"),
            None => write!(f, "Lowest SOC:            n/a"),
        }
    }
}
