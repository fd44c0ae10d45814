//! Scenario files (TOML or JSON) and built-in preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};
use crate::fleet::charger::{Charger, ChargerId};
use crate::fleet::schedule::{ActivityKind, ScheduleEntry};
use crate::fleet::vehicle::{FuelType, VehicleEnergyParameters, VehicleId, VehicleSchedule};
use crate::scenario::Scenario;
use crate::sim::clock::{TimeGrid, parse_hhmm};

/// Top-level scenario configuration.
///
/// All sections have defaults; a file only needs to list its chargers and
/// vehicles. Load with [`ScenarioConfig::from_file`] or start from a preset
/// with [`ScenarioConfig::from_preset`], then call [`ScenarioConfig::build`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Free-form scenario label shown in reports.
    #[serde(default)]
    pub name: String,
    /// Slot calendar.
    #[serde(default)]
    pub grid: TimeGrid,
    /// Fleet energy parameters shared by all EVs. An omitted section uses
    /// the fleet defaults; a present one must be complete.
    #[serde(default, alias = "parameters")]
    pub vehicle: VehicleEnergyParameters,
    /// Charger catalog.
    #[serde(default)]
    pub chargers: Vec<Charger>,
    /// One entry per vehicle row.
    #[serde(default, alias = "buses")]
    pub vehicles: Vec<VehicleConfig>,
}

/// One vehicle row as written in a scenario file.
///
/// `slots` (a raw per-slot array) is applied first, then `blocks` in order,
/// so a later block overwrites whatever an earlier one put in its slots.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleConfig {
    #[serde(alias = "busId")]
    pub id: String,
    #[serde(default, alias = "busName")]
    pub name: Option<String>,
    #[serde(default, alias = "busType")]
    pub fuel_type: FuelType,
    #[serde(default, alias = "startSOC")]
    pub start_soc: Option<f64>,
    #[serde(default, alias = "schedule")]
    pub slots: Vec<Option<ScheduleEntry>>,
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

/// An activity over a wall-clock range, `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockConfig {
    /// `HH:MM`, floored to its slot.
    pub start: String,
    /// `HH:MM` (`24:00` allowed), rounded up to the next slot boundary.
    pub end: String,
    pub activity: ActivityKind,
    #[serde(default, alias = "chargerId", alias = "charger_ref")]
    pub charger: Option<ChargerId>,
}

impl BlockConfig {
    pub fn new(start: &str, end: &str, activity: ActivityKind) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            activity,
            charger: None,
        }
    }

    pub fn charge(start: &str, end: &str, charger: &str) -> Self {
        Self {
            charger: Some(ChargerId::from(charger)),
            ..Self::new(start, end, ActivityKind::Charge)
        }
    }

    fn entry(&self) -> ScheduleEntry {
        ScheduleEntry {
            activity: self.activity,
            charger_ref: self.charger.clone(),
        }
    }
}

impl VehicleConfig {
    fn new(id: &str, fuel_type: FuelType, start_soc: f64, blocks: Vec<BlockConfig>) -> Self {
        Self {
            id: id.to_string(),
            fuel_type,
            start_soc: Some(start_soc),
            blocks,
            ..Self::default()
        }
    }
}

fn run(start: &str, end: &str) -> BlockConfig {
    BlockConfig::new(start, end, ActivityKind::Run)
}

fn deadhead(start: &str, end: &str) -> BlockConfig {
    BlockConfig::new(start, end, ActivityKind::Deadhead)
}

fn rest(start: &str, end: &str) -> BlockConfig {
    BlockConfig::new(start, end, ActivityKind::Break)
}

impl ScenarioConfig {
    /// A normal depot day: three EVs that stay above stranding and one diesel.
    pub fn depot_day() -> Self {
        Self {
            name: "depot_day".to_string(),
            grid: TimeGrid::default(),
            vehicle: VehicleEnergyParameters::default(),
            chargers: vec![
                Charger {
                    name: Some("Depot fast charger".to_string()),
                    ..Charger::new("depot-1", 150.0)
                },
                Charger {
                    name: Some("Depot slow charger".to_string()),
                    ..Charger::new("depot-2", 60.0)
                },
            ],
            vehicles: vec![
                VehicleConfig::new(
                    "bus-101",
                    FuelType::Ev,
                    90.0,
                    vec![
                        run("05:00", "09:00"),
                        BlockConfig::charge("09:00", "10:30", "depot-1"),
                        rest("10:30", "11:00"),
                        run("11:00", "15:00"),
                        deadhead("15:00", "15:30"),
                        BlockConfig::charge("15:30", "18:00", "depot-2"),
                        run("18:00", "21:00"),
                    ],
                ),
                VehicleConfig::new(
                    "bus-102",
                    FuelType::Ev,
                    80.0,
                    vec![
                        run("06:00", "11:00"),
                        deadhead("11:00", "11:30"),
                        BlockConfig::charge("11:30", "13:00", "depot-1"),
                        run("13:00", "17:00"),
                    ],
                ),
                VehicleConfig::new(
                    "bus-103",
                    FuelType::Ev,
                    95.0,
                    vec![
                        run("07:00", "10:00"),
                        rest("10:00", "10:30"),
                        run("10:30", "13:00"),
                        BlockConfig::charge("13:00", "14:00", "depot-2"),
                    ],
                ),
                VehicleConfig::new(
                    "diesel-7",
                    FuelType::Diesel,
                    100.0,
                    vec![run("07:00", "19:00")],
                ),
            ],
        }
    }

    /// Vehicles that run out of energy: one never charges, one is sent to a
    /// charger missing from the catalog.
    pub fn stranding() -> Self {
        Self {
            name: "stranding".to_string(),
            grid: TimeGrid::default(),
            vehicle: VehicleEnergyParameters::default(),
            chargers: vec![Charger::new("depot-1", 150.0)],
            vehicles: vec![
                VehicleConfig::new("bus-201", FuelType::Ev, 90.0, vec![run("00:00", "24:00")]),
                VehicleConfig::new(
                    "bus-202",
                    FuelType::Ev,
                    60.0,
                    vec![
                        run("06:00", "10:00"),
                        BlockConfig::charge("10:00", "11:00", "depot-9"),
                        run("11:00", "16:00"),
                        BlockConfig::charge("16:00", "17:00", "depot-1"),
                    ],
                ),
            ],
        }
    }

    /// Two buses booked on the same charger over an overlapping window.
    pub fn charger_conflict() -> Self {
        Self {
            name: "charger_conflict".to_string(),
            grid: TimeGrid::default(),
            vehicle: VehicleEnergyParameters::default(),
            chargers: vec![Charger::new("depot-1", 150.0)],
            vehicles: vec![
                VehicleConfig::new(
                    "bus-301",
                    FuelType::Ev,
                    70.0,
                    vec![
                        run("08:00", "12:00"),
                        BlockConfig::charge("12:00", "13:30", "depot-1"),
                        run("13:30", "16:00"),
                    ],
                ),
                VehicleConfig::new(
                    "bus-302",
                    FuelType::Ev,
                    70.0,
                    vec![
                        run("08:30", "12:30"),
                        BlockConfig::charge("12:30", "14:00", "depot-1"),
                        run("14:00", "16:30"),
                    ],
                ),
            ],
        }
    }

    /// Names of built-in presets.
    pub const PRESETS: &[&str] = &["depot_day", "stranding", "charger_conflict"];

    /// Loads a built-in preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPreset`] if `name` is not one of [`Self::PRESETS`].
    pub fn from_preset(name: &str) -> Result<Self> {
        match name {
            "depot_day" => Ok(Self::depot_day()),
            "stranding" => Ok(Self::stranding()),
            "charger_conflict" => Ok(Self::charger_conflict()),
            _ => Err(Error::UnknownPreset {
                name: name.to_string(),
                available: Self::PRESETS.join(", "),
            }),
        }
    }

    /// Loads a scenario file, choosing the format from its extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has another extension,
    /// or does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if ext != "toml" && ext != "json" {
            return Err(Error::UnsupportedFormat(path.display().to_string()));
        }

        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if ext == "json" {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] on syntax errors or unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parses a scenario from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on syntax errors or unknown fields.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the scenario builds.
    pub fn validate(&self) -> Vec<ConfigError> {
        self.build().err().unwrap_or_default()
    }

    /// Resolves blocks into slot rows and checks every constraint.
    ///
    /// # Errors
    ///
    /// Returns every problem found, not just the first.
    pub fn build(&self) -> std::result::Result<Scenario, Vec<ConfigError>> {
        let mut errors = self.grid.validate();
        errors.extend(self.vehicle.validate());

        for (i, charger) in self.chargers.iter().enumerate() {
            if charger.id.as_str().trim().is_empty() {
                errors.push(ConfigError::new(format!("chargers[{i}].id"), "must not be empty"));
            }
            if !(charger.rate_kw.is_finite() && charger.rate_kw > 0.0) {
                errors.push(ConfigError::new(format!("chargers[{i}].rate_kw"), "must be > 0"));
            }
        }

        let mut seen = HashSet::new();
        let mut vehicles = Vec::with_capacity(self.vehicles.len());
        for (i, v) in self.vehicles.iter().enumerate() {
            if v.id.trim().is_empty() {
                errors.push(ConfigError::new(format!("vehicles[{i}].id"), "must not be empty"));
            } else if !seen.insert(v.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("vehicles[{i}].id"),
                    format!("duplicate vehicle id \"{}\"", v.id),
                ));
            }
            if let Some(soc) = v.start_soc {
                if !(0.0..=100.0).contains(&soc) {
                    errors.push(ConfigError::new(
                        format!("vehicles[{i}].start_soc"),
                        "must be in [0, 100]",
                    ));
                }
            }
            if self.grid.slot_count > 0 && self.grid.slot_minutes > 0 {
                vehicles.push(self.build_vehicle(i, v, &mut errors));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Scenario {
            name: self.name.clone(),
            grid: self.grid,
            params: self.vehicle.clone(),
            chargers: self.chargers.clone(),
            vehicles,
        })
    }

    fn build_vehicle(
        &self,
        i: usize,
        v: &VehicleConfig,
        errors: &mut Vec<ConfigError>,
    ) -> VehicleSchedule {
        let grid = &self.grid;
        let mut schedule = VehicleSchedule {
            id: VehicleId(v.id.clone()),
            name: v.name.clone(),
            fuel_type: v.fuel_type,
            start_soc: v.start_soc,
            slots: vec![None; grid.slot_count],
        };

        if v.slots.len() > grid.slot_count {
            errors.push(ConfigError::new(
                format!("vehicles[{i}].slots"),
                format!(
                    "has {} entries but the grid has {} slots",
                    v.slots.len(),
                    grid.slot_count
                ),
            ));
        }
        for (slot, entry) in v.slots.iter().take(grid.slot_count).enumerate() {
            if let Some(entry) = entry {
                if let Err(e) = schedule.assign(slot..slot + 1, Some(entry.clone())) {
                    errors.push(ConfigError::new(format!("vehicles[{i}].slots[{slot}]"), e.to_string()));
                }
            }
        }

        for (j, block) in v.blocks.iter().enumerate() {
            let field = format!("vehicles[{i}].blocks[{j}]");
            let Some(start) = parse_hhmm(&block.start) else {
                errors.push(ConfigError::new(format!("{field}.start"), "expected HH:MM"));
                continue;
            };
            let Some(end) = parse_hhmm(&block.end) else {
                errors.push(ConfigError::new(format!("{field}.end"), "expected HH:MM"));
                continue;
            };
            if start >= end {
                errors.push(ConfigError::new(field, "start must be before end"));
                continue;
            }
            if end > grid.total_minutes() {
                errors.push(ConfigError::new(
                    format!("{field}.end"),
                    format!("past the end of the grid ({} minutes)", grid.total_minutes()),
                ));
                continue;
            }

            let slot_minutes = u64::from(grid.slot_minutes);
            let range = usize::try_from(start / slot_minutes).unwrap_or(usize::MAX)
                ..usize::try_from(end.div_ceil(slot_minutes)).unwrap_or(usize::MAX);
            if let Err(e) = schedule.assign(range, Some(block.entry())) {
                errors.push(ConfigError::new(field, e.to_string()));
            }
        }

        schedule
    }
}
