//! A validated, runnable scenario.

use crate::fleet::charger::Charger;
use crate::fleet::conflicts::{ChargerConflict, find_charger_conflicts};
use crate::fleet::vehicle::{VehicleEnergyParameters, VehicleSchedule};
use crate::sim::clock::TimeGrid;
use crate::sim::engine::Engine;
use crate::sim::types::SimulationReport;

/// Everything one simulation run needs, produced by
/// [`ScenarioConfig::build`](crate::config::ScenarioConfig::build).
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub grid: TimeGrid,
    pub params: VehicleEnergyParameters,
    pub chargers: Vec<Charger>,
    /// One full-length row per vehicle.
    pub vehicles: Vec<VehicleSchedule>,
}

impl Scenario {
    pub fn engine(&self) -> Engine {
        Engine::new(self.grid, self.params.clone(), &self.chargers)
    }

    /// Runs the SOC simulation over every vehicle.
    pub fn run(&self) -> SimulationReport {
        self.engine().run(&self.vehicles)
    }

    /// Charger double-bookings in the schedule; advisory, the engine ignores them.
    pub fn charger_conflicts(&self) -> Vec<ChargerConflict> {
        find_charger_conflicts(&self.vehicles, &self.grid)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScenarioConfig;

    #[test]
    fn depot_day_runs_without_stranding() {
        let scenario = ScenarioConfig::depot_day().build().unwrap();
        let report = scenario.run();
        assert!(!report.is_rejected());
        assert_eq!(report.per_vehicle.len(), 4);
        assert_eq!(report.stranded_vehicles().count(), 0);
        assert!(scenario.charger_conflicts().is_empty());
    }

    #[test]
    fn conflict_preset_reports_overlap() {
        let scenario = ScenarioConfig::charger_conflict().build().unwrap();
        let conflicts = scenario.charger_conflicts();
        let slots: Vec<usize> = conflicts.iter().map(|c| c.slot).collect();
        assert_eq!(slots, vec![50, 51, 52, 53]);
    }

    #[test]
    fn stranding_preset_strands_both_buses() {
        let report = ScenarioConfig::stranding().build().unwrap().run();
        assert_eq!(report.stranded_vehicles().count(), 2);
    }
}
