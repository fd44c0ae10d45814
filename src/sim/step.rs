//! Per-slot energy balance for one vehicle.

use crate::fleet::schedule::SlotActivity;
use crate::fleet::vehicle::VehicleEnergyParameters;

/// Result of advancing one vehicle by one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// SOC after the slot (%), always within `[0, 100]`.
    pub next_soc_pct: f64,
    /// Signed energy moved into the battery (kWh; negative = consumed).
    pub energy_delta_kwh: f64,
    /// Demand or supply the activity asked for before truncation (kWh, >= 0).
    pub requested_kwh: f64,
}

impl StepOutcome {
    fn idle(soc_pct: f64) -> Self {
        Self {
            next_soc_pct: soc_pct.clamp(0.0, 100.0),
            energy_delta_kwh: 0.0,
            requested_kwh: 0.0,
        }
    }
}

/// Advances `soc_pct` through one slot of `activity`.
///
/// # Arguments
///
/// * `soc_pct` - SOC at the start of the slot (%)
/// * `activity` - Resolved activity of the slot
/// * `charger_rate_kw` - Rate of the assigned charger; only read for `Charge`
/// * `params` - Fleet energy parameters (capacity must be > 0)
/// * `slot_hours` - Slot duration in hours
///
/// Driving consumption truncates at 0 % and charging truncates at 100 %.
/// A `Charge` slot without a usable rate (missing, non-positive, or not
/// finite) transfers nothing; reporting that is left to the caller.
pub fn step(
    soc_pct: f64,
    activity: SlotActivity,
    charger_rate_kw: Option<f64>,
    params: &VehicleEnergyParameters,
    slot_hours: f64,
) -> StepOutcome {
    let capacity = params.ess_capacity_kwh;

    // `limit` is the SOC reached when truncation binds.
    let (energy_delta_kwh, requested_kwh, limit) = match activity {
        SlotActivity::Run | SlotActivity::Deadhead => {
            let demand = params.energy_use_rate_kw * slot_hours;
            let available = (soc_pct / 100.0 * capacity).max(0.0);
            (-demand.min(available), demand, (demand >= available).then_some(0.0))
        }
        SlotActivity::Charge => match charger_rate_kw {
            Some(rate) if rate.is_finite() && rate > 0.0 => {
                let supply = rate * slot_hours;
                let headroom = ((100.0 - soc_pct) / 100.0 * capacity).max(0.0);
                (supply.min(headroom), supply, (supply >= headroom).then_some(100.0))
            }
            _ => return StepOutcome::idle(soc_pct),
        },
        SlotActivity::Break | SlotActivity::Unscheduled => return StepOutcome::idle(soc_pct),
    };

    let next_soc_pct = limit
        .unwrap_or(soc_pct + energy_delta_kwh / capacity * 100.0)
        .clamp(0.0, 100.0);

    StepOutcome {
        next_soc_pct,
        energy_delta_kwh,
        requested_kwh,
    }
}
