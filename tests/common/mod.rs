//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use fleet_soc_sim::fleet::{Charger, FuelType, ScheduleEntry, VehicleEnergyParameters, VehicleSchedule};
use fleet_soc_sim::sim::clock::TimeGrid;

/// Slot energy at the default parameters: 55 kW for 15 minutes.
pub const RUN_SLOT_KWH: f64 = 13.75;

/// Default fleet parameters (435 kWh, 55 kW, low 20 %, critical 10 %, stranded 5 %).
pub fn default_params() -> VehicleEnergyParameters {
    VehicleEnergyParameters::default()
}

/// Default grid (96 slots of 15 minutes).
pub fn default_grid() -> TimeGrid {
    TimeGrid::default()
}

/// Depot catalog: a 150 kW fast charger and a 60 kW slow one.
pub fn depot_chargers() -> Vec<Charger> {
    vec![Charger::new("fast", 150.0), Charger::new("slow", 60.0)]
}

/// An EV with an empty (all unscheduled) day.
pub fn ev(id: &str, start_soc: f64) -> VehicleSchedule {
    VehicleSchedule::new(id, FuelType::Ev, start_soc, &default_grid())
}

/// An EV running every slot of the day.
pub fn ev_all(id: &str, start_soc: f64, entry: ScheduleEntry) -> VehicleSchedule {
    let mut v = ev(id, start_soc);
    v.slots = vec![Some(entry); default_grid().slot_count];
    v
}

pub fn diesel(id: &str) -> VehicleSchedule {
    VehicleSchedule::new(id, FuelType::Diesel, 100.0, &default_grid())
}

/// Asserts two floats agree to within `tol`.
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected} ± {tol}, got {actual}"
    );
}
