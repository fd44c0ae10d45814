//! Simulation outputs: per-vehicle results, warnings, and the fleet report.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::thresholds::TriggerTimes;
use crate::fleet::charger::ChargerId;
use crate::fleet::vehicle::VehicleId;

/// Category of a per-vehicle warning; doubles as its de-duplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    LowSoc,
    CriticalSoc,
    Stranded,
    /// RUN or DEADHEAD scheduled while the battery is already empty.
    StrandedAttempt,
    /// CHARGE slot with no charger assigned.
    MissingCharger,
    /// CHARGE slot pointing at a charger that is unknown or has no usable rate.
    UnknownCharger { charger: ChargerId },
    /// Vehicle has no SOC semantics (diesel).
    NotApplicable,
}

/// One human-readable issue attached to a vehicle result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Slot of the first occurrence; `None` for whole-vehicle notices.
    pub slot: Option<usize>,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered warning list that keeps only the first warning of each kind.
#[derive(Debug, Clone, Default)]
pub struct WarningLog {
    entries: Vec<Warning>,
    seen: HashSet<WarningKind>,
}

impl WarningLog {
    /// Appends a warning unless one of the same kind is already logged.
    ///
    /// Returns `true` if the warning was added.
    pub fn push_once(
        &mut self,
        kind: WarningKind,
        slot: Option<usize>,
        message: impl Into<String>,
    ) -> bool {
        if !self.seen.insert(kind.clone()) {
            return false;
        }
        self.entries.push(Warning {
            kind,
            slot,
            message: message.into(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}

/// Simulation outcome for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub vehicle_id: VehicleId,
    pub is_diesel: bool,
    /// SOC (%) before each slot plus the end-of-day value (`slot_count + 1`
    /// entries). Diesel vehicles carry `None` in every entry.
    pub soc_time_series: Vec<Option<f64>>,
    pub total_energy_consumed_kwh: f64,
    pub total_energy_charged_kwh: f64,
    pub trigger_times: TriggerTimes,
    pub warnings: Vec<Warning>,
}

impl SimulationResult {
    /// Placeholder for a vehicle without SOC semantics.
    pub fn diesel(vehicle_id: VehicleId, slot_count: usize) -> Self {
        Self {
            vehicle_id,
            is_diesel: true,
            soc_time_series: vec![None; slot_count + 1],
            total_energy_consumed_kwh: 0.0,
            total_energy_charged_kwh: 0.0,
            trigger_times: TriggerTimes::default(),
            warnings: vec![Warning {
                kind: WarningKind::NotApplicable,
                slot: None,
                message: "fuel type is diesel; simulation not applicable".to_string(),
            }],
        }
    }

    /// SOC at the end of the day.
    pub fn final_soc(&self) -> Option<f64> {
        self.soc_time_series.last().copied().flatten()
    }

    /// Lowest SOC anywhere in the series.
    pub fn min_soc(&self) -> Option<f64> {
        self.soc_time_series
            .iter()
            .flatten()
            .copied()
            .reduce(f64::min)
    }

    /// SOC before `slot` (or at end of day for `slot == slot_count`).
    pub fn soc_at(&self, slot: usize) -> Option<f64> {
        self.soc_time_series.get(slot).copied().flatten()
    }

    pub fn has_warning(&self, kind: &WarningKind) -> bool {
        self.warnings.iter().any(|w| &w.kind == kind)
    }

    pub fn is_stranded(&self) -> bool {
        self.trigger_times.stranded.is_some()
    }
}

/// Outcome of one `simulate` call over a whole fleet.
///
/// When `global_errors` is non-empty the run was rejected up front and
/// `per_vehicle` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub per_vehicle: BTreeMap<VehicleId, SimulationResult>,
    pub global_errors: Vec<String>,
}

impl SimulationReport {
    pub fn rejected(global_errors: Vec<String>) -> Self {
        Self {
            per_vehicle: BTreeMap::new(),
            global_errors,
        }
    }

    pub fn is_rejected(&self) -> bool {
        !self.global_errors.is_empty()
    }

    pub fn vehicle(&self, id: &str) -> Option<&SimulationResult> {
        self.per_vehicle.get(id)
    }

    pub fn stranded_vehicles(&self) -> impl Iterator<Item = &VehicleId> {
        self.per_vehicle
            .values()
            .filter(|r| r.is_stranded())
            .map(|r| &r.vehicle_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_log_keeps_first_of_each_kind() {
        let mut log = WarningLog::default();
        assert!(log.push_once(WarningKind::MissingCharger, Some(5), "first"));
        assert!(!log.push_once(WarningKind::MissingCharger, Some(9), "second"));
        assert!(log.push_once(WarningKind::LowSoc, Some(10), "low"));
        let entries = log.into_vec();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[0].slot, Some(5));
    }

    #[test]
    fn unknown_charger_is_keyed_by_id() {
        let mut log = WarningLog::default();
        let a = WarningKind::UnknownCharger {
            charger: ChargerId::from("a"),
        };
        let b = WarningKind::UnknownCharger {
            charger: ChargerId::from("b"),
        };
        assert!(log.push_once(a.clone(), Some(1), "a"));
        assert!(log.push_once(b, Some(2), "b"));
        assert!(!log.push_once(a, Some(3), "a again"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn diesel_placeholder_shape() {
        let r = SimulationResult::diesel(VehicleId::from("d-1"), 96);
        assert!(r.is_diesel);
        assert_eq!(r.soc_time_series.len(), 97);
        assert_eq!(r.final_soc(), None);
        assert_eq!(r.min_soc(), None);
        assert!(r.trigger_times.is_empty());
        assert!(r.has_warning(&WarningKind::NotApplicable));
    }

    #[test]
    fn min_and_final_soc() {
        let r = SimulationResult {
            vehicle_id: VehicleId::from("v"),
            is_diesel: false,
            soc_time_series: vec![Some(90.0), Some(40.0), Some(60.0)],
            total_energy_consumed_kwh: 0.0,
            total_energy_charged_kwh: 0.0,
            trigger_times: TriggerTimes::default(),
            warnings: Vec::new(),
        };
        assert_eq!(r.min_soc(), Some(40.0));
        assert_eq!(r.final_soc(), Some(60.0));
        assert_eq!(r.soc_at(1), Some(40.0));
        assert_eq!(r.soc_at(3), None);
    }

    #[test]
    fn diesel_series_serializes_as_nulls() {
        let r = SimulationResult::diesel(VehicleId::from("d"), 2);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["soc_time_series"], serde_json::json!([null, null, null]));
        assert_eq!(json["warnings"][0]["kind"], "not_applicable");
    }
}
