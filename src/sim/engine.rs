//! Simulation driver: walks every vehicle through every slot of the grid.

use std::collections::{BTreeMap, HashSet};

use crate::fleet::charger::{Charger, ChargerCatalog};
use crate::fleet::schedule::{ScheduleEntry, SlotActivity};
use crate::fleet::vehicle::{VehicleEnergyParameters, VehicleId, VehicleSchedule};

use super::clock::TimeGrid;
use super::step::step;
use super::thresholds::{EPSILON, SocBand, ThresholdMonitor};
use super::types::{SimulationReport, SimulationResult, WarningKind, WarningLog};

/// Simulation engine holding the grid, fleet parameters, and a charger
/// catalog snapshot.
///
/// Pure with respect to its inputs: [`Engine::run`] can be called any number
/// of times and always yields the same report for the same schedule.
#[derive(Debug, Clone)]
pub struct Engine {
    grid: TimeGrid,
    params: VehicleEnergyParameters,
    catalog: ChargerCatalog,
}

impl Engine {
    /// Creates a new engine.
    ///
    /// # Arguments
    ///
    /// * `grid` - Slot calendar to simulate over
    /// * `params` - Fleet energy parameters shared by all EVs
    /// * `chargers` - Flat charger list, indexed into a catalog snapshot
    pub fn new(grid: TimeGrid, params: VehicleEnergyParameters, chargers: &[Charger]) -> Self {
        Self {
            grid,
            params,
            catalog: ChargerCatalog::new(chargers),
        }
    }

    /// Precondition checks that reject a whole run.
    pub fn preconditions(&self, vehicles: &[VehicleSchedule]) -> Vec<String> {
        let mut errors: Vec<String> = self
            .grid
            .validate()
            .into_iter()
            .chain(self.params.validate())
            .map(|e| e.to_string())
            .collect();

        if vehicles.is_empty() {
            errors.push("schedule is empty: no vehicles to simulate".to_string());
        }

        let mut seen = HashSet::new();
        for vehicle in vehicles {
            if !seen.insert(&vehicle.id) {
                errors.push(format!("duplicate vehicle id \"{}\"", vehicle.id));
            }
        }

        errors
    }

    /// Simulates every vehicle and assembles the fleet report.
    ///
    /// Returns a rejected report (no per-vehicle results) when any
    /// precondition fails.
    pub fn run(&self, vehicles: &[VehicleSchedule]) -> SimulationReport {
        let errors = self.preconditions(vehicles);
        if !errors.is_empty() {
            tracing::info!(errors = errors.len(), "simulation rejected");
            return SimulationReport::rejected(errors);
        }

        let per_vehicle: BTreeMap<VehicleId, SimulationResult> = vehicles
            .iter()
            .map(|v| (v.id.clone(), self.simulate_vehicle(v)))
            .collect();

        SimulationReport {
            per_vehicle,
            global_errors: Vec::new(),
        }
    }

    /// Simulates a single vehicle over the whole grid.
    ///
    /// Assumes the engine's parameters are valid; [`Engine::run`] checks
    /// this before calling here.
    pub fn simulate_vehicle(&self, vehicle: &VehicleSchedule) -> SimulationResult {
        let n = self.grid.slot_count;

        if vehicle.is_diesel() {
            tracing::debug!(vehicle = %vehicle.id, "diesel vehicle, skipping SOC simulation");
            return SimulationResult::diesel(vehicle.id.clone(), n);
        }

        if vehicle.slots.len() > n {
            tracing::warn!(
                vehicle = %vehicle.id,
                slots = vehicle.slots.len(),
                slot_count = n,
                "schedule longer than the grid, extra slots ignored"
            );
        }

        let slot_hours = self.grid.slot_hours();
        let mut soc = vehicle.effective_start_soc();
        let mut series = Vec::with_capacity(n + 1);
        let mut consumed_kwh = 0.0;
        let mut charged_kwh = 0.0;
        let mut monitor = ThresholdMonitor::new(&self.params);
        let mut warnings = WarningLog::default();

        tracing::debug!(vehicle = %vehicle.id, start_soc = soc, "simulating vehicle");

        for slot in self.grid.slots() {
            series.push(Some(soc));

            let entry = vehicle.entry(slot);
            let activity = SlotActivity::from(entry);

            let rate = match activity {
                SlotActivity::Charge => self.charger_rate(vehicle, slot, entry, &mut warnings),
                _ => None,
            };

            if activity.is_driving() && soc < EPSILON {
                warnings.push_once(
                    WarningKind::StrandedAttempt,
                    Some(slot),
                    format!(
                        "Stranded alert at {}: attempted {activity} with 0% SOC",
                        self.grid.slot_label(slot)
                    ),
                );
            }

            let outcome = step(soc, activity, rate, &self.params, slot_hours);
            if outcome.energy_delta_kwh < 0.0 {
                consumed_kwh -= outcome.energy_delta_kwh;
            } else {
                charged_kwh += outcome.energy_delta_kwh;
            }

            if let Some(band) = monitor.observe(slot, outcome.next_soc_pct) {
                let (kind, prefix) = match band {
                    SocBand::Low => (WarningKind::LowSoc, "Low SOC warning"),
                    SocBand::Critical => (WarningKind::CriticalSoc, "Critical SOC"),
                    SocBand::Stranded => (WarningKind::Stranded, "Stranded alert"),
                };
                warnings.push_once(
                    kind,
                    Some(slot),
                    format!(
                        "{prefix} at {}: SOC dropped below {}% (predicted {:.1}%)",
                        self.grid.slot_label(slot),
                        monitor.threshold_pct(band),
                        outcome.next_soc_pct
                    ),
                );
            }

            soc = outcome.next_soc_pct;
        }
        series.push(Some(soc));

        tracing::debug!(
            vehicle = %vehicle.id,
            final_soc = soc,
            consumed_kwh,
            charged_kwh,
            warnings = warnings.len(),
            "vehicle simulated"
        );

        SimulationResult {
            vehicle_id: vehicle.id.clone(),
            is_diesel: false,
            soc_time_series: series,
            total_energy_consumed_kwh: consumed_kwh,
            total_energy_charged_kwh: charged_kwh,
            trigger_times: monitor.triggers(),
            warnings: warnings.into_vec(),
        }
    }

    /// Resolves the charge rate of a CHARGE slot, logging a schedule warning
    /// when no energy can be delivered.
    fn charger_rate(
        &self,
        vehicle: &VehicleSchedule,
        slot: usize,
        entry: Option<&ScheduleEntry>,
        warnings: &mut WarningLog,
    ) -> Option<f64> {
        let label = self.grid.slot_label(slot);

        let Some(charger) = entry
            .and_then(|e| e.charger_ref.as_ref())
            .filter(|c| !c.as_str().trim().is_empty())
        else {
            warnings.push_once(
                WarningKind::MissingCharger,
                Some(slot),
                format!("Schedule error at {label}: CHARGE activity has no charger assigned"),
            );
            return None;
        };

        match self.catalog.rate_kw(charger) {
            Ok(rate) => Some(rate),
            Err(err) => {
                let kind = WarningKind::UnknownCharger {
                    charger: err.charger_id().clone(),
                };
                if warnings.push_once(
                    kind,
                    Some(slot),
                    format!("Config error at {label}: {err}; no energy delivered"),
                ) {
                    tracing::warn!(vehicle = %vehicle.id, slot, %err, "charger lookup failed");
                }
                None
            }
        }
    }
}

/// Simulates `schedule` on the default one-day grid (96 x 15 min).
///
/// # Arguments
///
/// * `schedule` - One row per vehicle
/// * `params` - Fleet energy parameters
/// * `chargers` - Charger catalog snapshot
pub fn simulate(
    schedule: &[VehicleSchedule],
    params: &VehicleEnergyParameters,
    chargers: &[Charger],
) -> SimulationReport {
    Engine::new(TimeGrid::default(), params.clone(), chargers).run(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::vehicle::FuelType;

    fn engine() -> Engine {
        Engine::new(
            TimeGrid::default(),
            VehicleEnergyParameters::default(),
            &[Charger::new("depot-1", 150.0), Charger::new("broken", 0.0)],
        )
    }

    fn ev(id: &str, start_soc: f64) -> VehicleSchedule {
        VehicleSchedule::new(id, FuelType::Ev, start_soc, &TimeGrid::default())
    }

    #[test]
    fn series_has_one_entry_per_slot_plus_final() {
        let result = engine().simulate_vehicle(&ev("v", 50.0));
        assert_eq!(result.soc_time_series.len(), 97);
        assert!(result.soc_time_series.iter().all(|s| *s == Some(50.0)));
    }

    #[test]
    fn short_schedule_is_padded_as_unscheduled() {
        let mut v = ev("v", 50.0);
        v.slots.truncate(3);
        v.slots[0] = Some(ScheduleEntry::run());
        let result = engine().simulate_vehicle(&v);
        assert_eq!(result.soc_time_series.len(), 97);
        assert_eq!(result.soc_at(1), result.final_soc());
    }

    #[test]
    fn oversized_schedule_is_truncated() {
        let mut v = ev("v", 50.0);
        v.slots.extend(std::iter::repeat_n(Some(ScheduleEntry::run()), 10));
        let result = engine().simulate_vehicle(&v);
        assert_eq!(result.soc_time_series.len(), 97);
        assert_eq!(result.total_energy_consumed_kwh, 0.0);
    }

    #[test]
    fn unknown_charger_warns_once_per_id() {
        let mut v = ev("v", 50.0);
        v.assign(0..4, Some(ScheduleEntry::charge("ghost"))).unwrap();
        v.assign(4..6, Some(ScheduleEntry::charge("broken"))).unwrap();
        let result = engine().simulate_vehicle(&v);
        assert_eq!(result.total_energy_charged_kwh, 0.0);
        assert_eq!(result.final_soc(), Some(50.0));
        let charger_warnings: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| matches!(w.kind, WarningKind::UnknownCharger { .. }))
            .collect();
        assert_eq!(charger_warnings.len(), 2);
        assert!(charger_warnings[0].message.contains("ghost"));
        assert_eq!(charger_warnings[0].slot, Some(0));
        assert!(charger_warnings[1].message.contains("broken"));
    }

    #[test]
    fn empty_charger_id_counts_as_missing() {
        let mut v = ev("v", 50.0);
        v.assign(2..3, Some(ScheduleEntry::charge(""))).unwrap();
        let result = engine().simulate_vehicle(&v);
        assert!(result.has_warning(&WarningKind::MissingCharger));
    }

    #[test]
    fn run_at_empty_raises_stranded_attempt() {
        let mut v = ev("v", 0.0);
        v.assign(0..3, Some(ScheduleEntry::deadhead())).unwrap();
        let result = engine().simulate_vehicle(&v);
        assert_eq!(result.trigger_times.stranded, Some(0));
        assert_eq!(result.trigger_times.critical, None);
        assert_eq!(result.trigger_times.low, None);
        assert!(result.has_warning(&WarningKind::StrandedAttempt));
        assert!(result.has_warning(&WarningKind::Stranded));
        let attempts = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::StrandedAttempt)
            .count();
        assert_eq!(attempts, 1);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.message.contains("attempted DEADHEAD with 0% SOC"))
        );
    }

    #[test]
    fn charge_after_stranding_recovers_soc() {
        let mut v = ev("v", 10.0);
        v.assign(0..4, Some(ScheduleEntry::run())).unwrap();
        v.assign(4..8, Some(ScheduleEntry::charge("depot-1"))).unwrap();
        let result = engine().simulate_vehicle(&v);
        assert_eq!(result.trigger_times.stranded, Some(1));
        assert!(result.final_soc().unwrap() > 30.0);
        assert!((result.total_energy_charged_kwh - 150.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_params_reject_the_run() {
        let params = VehicleEnergyParameters {
            ess_capacity_kwh: -1.0,
            ..VehicleEnergyParameters::default()
        };
        let report = simulate(&[ev("v", 50.0)], &params, &[]);
        assert!(report.is_rejected());
        assert!(report.per_vehicle.is_empty());
        assert!(report.global_errors[0].contains("ess_capacity_kwh"));
    }

    #[test]
    fn oversized_grid_rejects_the_run() {
        let grid = TimeGrid {
            slot_minutes: 15,
            slot_count: usize::MAX,
        };
        let mut diesel = ev("d", 50.0);
        diesel.fuel_type = FuelType::Diesel;
        let report = Engine::new(grid, VehicleEnergyParameters::default(), &[]).run(&[diesel]);
        assert!(report.is_rejected());
        assert!(report.per_vehicle.is_empty());
        assert!(report.global_errors.iter().any(|e| e.contains("grid.slot_count")));
    }

    #[test]
    fn duplicate_ids_reject_the_run() {
        let report = simulate(
            &[ev("v", 50.0), ev("v", 60.0)],
            &VehicleEnergyParameters::default(),
            &[],
        );
        assert!(report.per_vehicle.is_empty());
        assert!(report.global_errors.iter().any(|e| e.contains("duplicate")));
    }

    #[test]
    fn run_is_repeatable() {
        let mut v = ev("v", 40.0);
        v.assign(0..40, Some(ScheduleEntry::run())).unwrap();
        v.assign(40..42, Some(ScheduleEntry::charge_unassigned())).unwrap();
        let e = engine();
        assert_eq!(e.run(std::slice::from_ref(&v)), e.run(std::slice::from_ref(&v)));
    }
}
