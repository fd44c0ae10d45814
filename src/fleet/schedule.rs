//! Schedule grid entries and their resolution into per-slot activities.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::charger::ChargerId;

/// Activity a planner can put into a slot.
///
/// Deserializes from the upper-case wire names (`"RUN"`, `"DEADHEAD"`,
/// `"BREAK"`, `"CHARGE"`, case-insensitive). Any other string is read as
/// `Break`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum ActivityKind {
    Run,
    Deadhead,
    Break,
    Charge,
}

impl From<String> for ActivityKind {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "RUN" => Self::Run,
            "DEADHEAD" => Self::Deadhead,
            "CHARGE" => Self::Charge,
            "BREAK" => Self::Break,
            other => {
                tracing::warn!(activity = other, "unknown activity, treating as BREAK");
                Self::Break
            }
        }
    }
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "RUN",
            Self::Deadhead => "DEADHEAD",
            Self::Break => "BREAK",
            Self::Charge => "CHARGE",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assigned slot of a vehicle schedule.
///
/// `charger_ref` only matters for `Charge`; a `Charge` entry without one is a
/// schedule error reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub activity: ActivityKind,
    #[serde(default, alias = "chargerId", alias = "charger")]
    pub charger_ref: Option<ChargerId>,
}

impl ScheduleEntry {
    pub fn new(activity: ActivityKind) -> Self {
        Self {
            activity,
            charger_ref: None,
        }
    }

    pub fn run() -> Self {
        Self::new(ActivityKind::Run)
    }

    pub fn deadhead() -> Self {
        Self::new(ActivityKind::Deadhead)
    }

    pub fn rest() -> Self {
        Self::new(ActivityKind::Break)
    }

    pub fn charge(charger: &str) -> Self {
        Self {
            activity: ActivityKind::Charge,
            charger_ref: Some(ChargerId::from(charger)),
        }
    }

    /// A `Charge` entry with no charger, as an incomplete editor assignment leaves it.
    pub fn charge_unassigned() -> Self {
        Self::new(ActivityKind::Charge)
    }
}

/// Energy-relevant activity of one slot after resolving unscheduled slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotActivity {
    Run,
    Deadhead,
    Break,
    Charge,
    /// No entry in the slot; same energy effect as `Break`.
    Unscheduled,
}

impl SlotActivity {
    /// Whether the slot draws traction energy.
    pub fn is_driving(self) -> bool {
        matches!(self, Self::Run | Self::Deadhead)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "RUN",
            Self::Deadhead => "DEADHEAD",
            Self::Break => "BREAK",
            Self::Charge => "CHARGE",
            Self::Unscheduled => "IDLE",
        }
    }
}

impl From<Option<&ScheduleEntry>> for SlotActivity {
    fn from(entry: Option<&ScheduleEntry>) -> Self {
        match entry.map(|e| e.activity) {
            Some(ActivityKind::Run) => Self::Run,
            Some(ActivityKind::Deadhead) => Self::Deadhead,
            Some(ActivityKind::Break) => Self::Break,
            Some(ActivityKind::Charge) => Self::Charge,
            None => Self::Unscheduled,
        }
    }
}

impl fmt::Display for SlotActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
