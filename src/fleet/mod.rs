//! Fleet input model: vehicles, their slot schedules, and the charger catalog.

/// Charger catalog and rate lookup.
pub mod charger;
pub mod conflicts;
/// Schedule entries and per-slot activity resolution.
pub mod schedule;
/// Vehicle schedules and fleet energy parameters.
pub mod vehicle;

pub use charger::{Charger, ChargerCatalog, ChargerId};
pub use conflicts::{ChargerConflict, find_charger_conflicts};
pub use schedule::{ActivityKind, ScheduleEntry, SlotActivity};
pub use vehicle::{FuelType, VehicleEnergyParameters, VehicleId, VehicleSchedule};
