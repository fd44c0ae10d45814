use std::borrow::Borrow;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::schedule::{ActivityKind, ScheduleEntry};
use crate::error::ConfigError;
use crate::sim::clock::TimeGrid;

/// Stranded threshold used when none is configured (%).
pub const DEFAULT_STRANDED_SOC_PCT: f64 = 5.0;

/// Start SOC used when a schedule carries none, or an unusable one.
pub const DEFAULT_START_SOC_PCT: f64 = 90.0;

/// Identifier of a vehicle in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl VehicleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for VehicleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drivetrain of a vehicle. Only `Ev` vehicles have SOC semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelType {
    #[default]
    #[serde(rename = "EV", alias = "BEB", alias = "ev", alias = "beb")]
    Ev,
    #[serde(rename = "Diesel", alias = "diesel", alias = "DIESEL")]
    Diesel,
}

/// Fleet-wide energy parameters shared by every EV in a simulation.
///
/// Invariant (checked by [`VehicleEnergyParameters::validate`]):
/// `stranded_soc_pct <= critical_soc_pct <= low_soc_pct`, all within `[0, 100]`.
///
/// Every field except `stranded_soc_pct` must be present when deserializing;
/// the fleet defaults only come from [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleEnergyParameters {
    /// Battery (ESS) capacity in kWh (must be > 0).
    #[serde(alias = "essCapacity")]
    pub ess_capacity_kwh: f64,
    /// Energy use rate while driving, RUN or DEADHEAD (kW, >= 0).
    #[serde(alias = "euRate")]
    pub energy_use_rate_kw: f64,
    /// Low SOC warning threshold (%).
    #[serde(alias = "warningThresholdLow")]
    pub low_soc_pct: f64,
    /// Critical SOC warning threshold (%).
    #[serde(alias = "warningThresholdCritical")]
    pub critical_soc_pct: f64,
    /// Stranded threshold (%).
    #[serde(default = "default_stranded_soc_pct")]
    pub stranded_soc_pct: f64,
}

fn default_stranded_soc_pct() -> f64 {
    DEFAULT_STRANDED_SOC_PCT
}

impl Default for VehicleEnergyParameters {
    fn default() -> Self {
        Self {
            ess_capacity_kwh: 435.0,
            energy_use_rate_kw: 55.0,
            low_soc_pct: 20.0,
            critical_soc_pct: 10.0,
            stranded_soc_pct: DEFAULT_STRANDED_SOC_PCT,
        }
    }
}

impl VehicleEnergyParameters {
    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the parameters are usable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.ess_capacity_kwh.is_finite() && self.ess_capacity_kwh > 0.0) {
            errors.push(ConfigError::new("vehicle.ess_capacity_kwh", "must be > 0"));
        }
        if !(self.energy_use_rate_kw.is_finite() && self.energy_use_rate_kw >= 0.0) {
            errors.push(ConfigError::new("vehicle.energy_use_rate_kw", "must be >= 0"));
        }

        let thresholds = [
            ("vehicle.low_soc_pct", self.low_soc_pct),
            ("vehicle.critical_soc_pct", self.critical_soc_pct),
            ("vehicle.stranded_soc_pct", self.stranded_soc_pct),
        ];
        let mut in_range = true;
        for (field, value) in thresholds {
            if !(0.0..=100.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0, 100]"));
                in_range = false;
            }
        }

        if in_range {
            if self.critical_soc_pct > self.low_soc_pct {
                errors.push(ConfigError::new(
                    "vehicle.critical_soc_pct",
                    "must be <= vehicle.low_soc_pct",
                ));
            }
            if self.stranded_soc_pct > self.critical_soc_pct {
                errors.push(ConfigError::new(
                    "vehicle.critical_soc_pct",
                    "must be >= vehicle.stranded_soc_pct",
                ));
            }
        }

        errors
    }
}

/// Problems applying an edit to a [`VehicleSchedule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("slot range {start}..{end} is empty")]
    EmptyRange { start: usize, end: usize },
    #[error("slot {slot} is outside the schedule ({slot_count} slots)")]
    SlotOutOfRange { slot: usize, slot_count: usize },
    #[error("diesel vehicle \"{0}\" cannot be assigned a CHARGE activity")]
    DieselCharge(VehicleId),
}

/// One vehicle row of the schedule grid.
///
/// `slots[i]` is the entry for slot `i`; `None` means unscheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSchedule {
    #[serde(alias = "busId")]
    pub id: VehicleId,
    #[serde(default, alias = "busName")]
    pub name: Option<String>,
    #[serde(default, alias = "busType")]
    pub fuel_type: FuelType,
    /// Start-of-day SOC (%). Missing or invalid values fall back to
    /// [`DEFAULT_START_SOC_PCT`].
    #[serde(default, alias = "startSOC")]
    pub start_soc: Option<f64>,
    #[serde(default, alias = "schedule")]
    pub slots: Vec<Option<ScheduleEntry>>,
}

impl VehicleSchedule {
    /// Creates an empty (all unscheduled) schedule sized to `grid`.
    pub fn new(id: &str, fuel_type: FuelType, start_soc: f64, grid: &TimeGrid) -> Self {
        Self {
            id: VehicleId::from(id),
            name: None,
            fuel_type,
            start_soc: Some(start_soc),
            slots: vec![None; grid.slot_count],
        }
    }

    pub fn is_diesel(&self) -> bool {
        self.fuel_type == FuelType::Diesel
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Entry at `slot`, or `None` if unscheduled or beyond the stored row.
    pub fn entry(&self, slot: usize) -> Option<&ScheduleEntry> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Start SOC with the fallback applied.
    pub fn effective_start_soc(&self) -> f64 {
        match self.start_soc {
            Some(soc) if soc.is_finite() && (0.0..=100.0).contains(&soc) => soc,
            other => {
                tracing::warn!(
                    vehicle = %self.id,
                    start_soc = ?other,
                    "missing or invalid start SOC, using {DEFAULT_START_SOC_PCT}%"
                );
                DEFAULT_START_SOC_PCT
            }
        }
    }

    /// Writes `entry` into every slot of `range` (`None` clears).
    ///
    /// # Errors
    ///
    /// Rejects empty ranges, ranges past the end of the row, and CHARGE on a
    /// diesel vehicle. On error the schedule is unchanged.
    pub fn assign(
        &mut self,
        range: Range<usize>,
        entry: Option<ScheduleEntry>,
    ) -> Result<(), ScheduleError> {
        if range.is_empty() {
            return Err(ScheduleError::EmptyRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.slots.len() {
            return Err(ScheduleError::SlotOutOfRange {
                slot: range.end - 1,
                slot_count: self.slots.len(),
            });
        }
        if self.is_diesel()
            && entry
                .as_ref()
                .is_some_and(|e| e.activity == ActivityKind::Charge)
        {
            return Err(ScheduleError::DieselCharge(self.id.clone()));
        }

        for slot in &mut self.slots[range] {
            slot.clone_from(&entry);
        }
        Ok(())
    }
}
