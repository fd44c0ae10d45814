//! Cross-vehicle charger double-booking check.
//!
//! The engine simulates every vehicle independently and trusts its input, so
//! two buses can "share" a charger in the same slot without complaint. This
//! pass finds those bookings up front; callers decide whether to block on it.

use std::collections::BTreeMap;

use serde::Serialize;

use super::charger::ChargerId;
use super::schedule::ActivityKind;
use super::vehicle::{VehicleId, VehicleSchedule};
use crate::sim::clock::TimeGrid;

/// One charger booked by more than one vehicle in the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargerConflict {
    pub slot: usize,
    pub charger: ChargerId,
    /// Vehicles holding the booking, in schedule order.
    pub vehicles: Vec<VehicleId>,
}

/// Lists every `(slot, charger)` pair assigned to two or more non-diesel vehicles.
///
/// Only slots inside `grid` are scanned. Results are ordered by slot, then
/// charger id.
pub fn find_charger_conflicts(
    vehicles: &[VehicleSchedule],
    grid: &TimeGrid,
) -> Vec<ChargerConflict> {
    let mut bookings: BTreeMap<(usize, &ChargerId), Vec<&VehicleId>> = BTreeMap::new();

    for vehicle in vehicles.iter().filter(|v| !v.is_diesel()) {
        for (slot, entry) in vehicle.slots.iter().take(grid.slot_count).enumerate() {
            let Some(entry) = entry else { continue };
            if entry.activity != ActivityKind::Charge {
                continue;
            }
            if let Some(charger) = &entry.charger_ref {
                bookings.entry((slot, charger)).or_default().push(&vehicle.id);
            }
        }
    }

    bookings
        .into_iter()
        .filter(|(_, holders)| holders.len() > 1)
        .map(|((slot, charger), holders)| ChargerConflict {
            slot,
            charger: charger.clone(),
            vehicles: holders.into_iter().cloned().collect(),
        })
        .collect()
}
