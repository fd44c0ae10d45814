//! Fixed-size slot calendar for the operating day.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default slot duration in minutes.
pub const DEFAULT_SLOT_MINUTES: u32 = 15;
/// Default number of slots (one calendar day at 15-minute slots).
pub const DEFAULT_SLOT_COUNT: usize = 96;
/// Largest accepted number of slots.
pub const MAX_SLOT_COUNT: usize = 10_000;
/// Longest accepted horizon: one week.
pub const MAX_GRID_MINUTES: u64 = 7 * 24 * 60;

/// A fixed slot calendar: `slot_count` consecutive slots of `slot_minutes` each.
///
/// Pure arithmetic, no state. Slot `i` covers the half-open interval
/// `[i * slot_minutes, (i + 1) * slot_minutes)` minutes after the start of
/// the operating day.
///
/// # Examples
///
/// ```
/// use fleet_soc_sim::sim::clock::TimeGrid;
///
/// let grid = TimeGrid::default();
/// assert_eq!(grid.slot_count, 96);
/// assert_eq!(grid.slot_label(34), "08:30");
/// assert_eq!(grid.slot_from_minutes(8 * 60 + 44), Some(34));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeGrid {
    /// Duration of one slot in minutes (must be > 0).
    pub slot_minutes: u32,
    /// Number of slots in the grid (must be > 0).
    pub slot_count: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            slot_minutes: DEFAULT_SLOT_MINUTES,
            slot_count: DEFAULT_SLOT_COUNT,
        }
    }
}

impl TimeGrid {
    /// Creates a new grid.
    ///
    /// # Panics
    ///
    /// Panics if `slot_minutes` or `slot_count` is zero.
    pub fn new(slot_minutes: u32, slot_count: usize) -> Self {
        assert!(slot_minutes > 0, "slot_minutes must be > 0");
        assert!(slot_count > 0, "slot_count must be > 0");
        Self {
            slot_minutes,
            slot_count,
        }
    }

    /// Checks that both dimensions are non-zero and the grid spans at most
    /// [`MAX_SLOT_COUNT`] slots and [`MAX_GRID_MINUTES`] minutes.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.slot_minutes == 0 {
            errors.push(ConfigError::new("grid.slot_minutes", "must be > 0"));
        }
        if self.slot_count == 0 {
            errors.push(ConfigError::new("grid.slot_count", "must be > 0"));
        } else if self.slot_count > MAX_SLOT_COUNT {
            errors.push(ConfigError::new(
                "grid.slot_count",
                format!("must be <= {MAX_SLOT_COUNT}"),
            ));
        }

        let span = u64::try_from(self.slot_count)
            .ok()
            .and_then(|count| u64::from(self.slot_minutes).checked_mul(count));
        if span.is_none_or(|minutes| minutes > MAX_GRID_MINUTES) {
            errors.push(ConfigError::new(
                "grid",
                format!("slot_minutes * slot_count must be <= {MAX_GRID_MINUTES} minutes"),
            ));
        }
        errors
    }

    /// Duration of one slot in hours.
    pub fn slot_hours(&self) -> f64 {
        f64::from(self.slot_minutes) / 60.0
    }

    /// Total minutes covered by the grid.
    pub fn total_minutes(&self) -> u64 {
        u64::from(self.slot_minutes) * self.slot_count as u64
    }

    /// Iterates slot indices in order.
    pub fn slots(&self) -> Range<usize> {
        0..self.slot_count
    }

    /// Minutes from the start of the day at which `slot` begins.
    pub fn slot_start_minutes(&self, slot: usize) -> u64 {
        u64::from(self.slot_minutes) * slot as u64
    }

    /// Converts a slot index to `(hour, minute)` of its start time.
    pub fn slot_to_hm(&self, slot: usize) -> (u64, u64) {
        let minutes = self.slot_start_minutes(slot);
        (minutes / 60, minutes % 60)
    }

    /// Formats the start of `slot` as `HH:MM`.
    pub fn slot_label(&self, slot: usize) -> String {
        let (h, m) = self.slot_to_hm(slot);
        format!("{h:02}:{m:02}")
    }

    /// Maps minutes since start of day to the containing slot (`floor(minutes / slot_minutes)`).
    ///
    /// Returns `None` when the time falls outside the grid.
    pub fn slot_from_minutes(&self, minutes: u64) -> Option<usize> {
        let slot = usize::try_from(minutes / u64::from(self.slot_minutes)).ok()?;
        (slot < self.slot_count).then_some(slot)
    }

    /// Maps an `(hour, minute)` wall-clock time to its slot.
    pub fn slot_from_hm(&self, hour: u64, minute: u64) -> Option<usize> {
        if minute >= 60 {
            return None;
        }
        self.slot_from_minutes(hour * 60 + minute)
    }
}

/// Parses `HH:MM` into minutes since start of day.
///
/// Accepts `24:00` (end of day) but no other hour >= 24.
pub fn parse_hhmm(s: &str) -> Option<u64> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u64 = h.parse().ok()?;
    let m: u64 = m.parse().ok()?;
    if m >= 60 || h > 24 || (h == 24 && m != 0) {
        return None;
    }
    Some(h * 60 + m)
}
