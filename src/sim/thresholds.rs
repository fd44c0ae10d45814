//! First-occurrence SOC threshold detection.

use std::fmt;

use serde::Serialize;

use crate::fleet::vehicle::VehicleEnergyParameters;

/// Tolerance applied to threshold comparisons so a SOC sitting exactly on a
/// threshold does not flicker across it.
pub const EPSILON: f64 = 1e-5;

/// SOC severity bands, ordered from mildest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SocBand {
    Low,
    Critical,
    Stranded,
}

impl SocBand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Critical => "critical",
            Self::Stranded => "stranded",
        }
    }
}

impl fmt::Display for SocBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First slot at which each band was entered, if ever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TriggerTimes {
    pub low: Option<usize>,
    pub critical: Option<usize>,
    pub stranded: Option<usize>,
}

impl TriggerTimes {
    /// Worst band recorded so far.
    pub fn worst(&self) -> Option<SocBand> {
        if self.stranded.is_some() {
            Some(SocBand::Stranded)
        } else if self.critical.is_some() {
            Some(SocBand::Critical)
        } else if self.low.is_some() {
            Some(SocBand::Low)
        } else {
            None
        }
    }

    pub fn get(&self, band: SocBand) -> Option<usize> {
        match band {
            SocBand::Low => self.low,
            SocBand::Critical => self.critical,
            SocBand::Stranded => self.stranded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.worst().is_none()
    }
}

/// Watches one vehicle's SOC trajectory and records first crossings.
///
/// Bands are checked stranded, then critical, then low. A band is only
/// recorded while no worse band has been, so once a vehicle is critical the
/// low band stays empty, and once stranded both milder bands stay as they
/// were. At most one band is recorded per observation.
#[derive(Debug, Clone)]
pub struct ThresholdMonitor {
    low_pct: f64,
    critical_pct: f64,
    stranded_pct: f64,
    triggers: TriggerTimes,
}

impl ThresholdMonitor {
    pub fn new(params: &VehicleEnergyParameters) -> Self {
        Self {
            low_pct: params.low_soc_pct,
            critical_pct: params.critical_soc_pct,
            stranded_pct: params.stranded_soc_pct,
            triggers: TriggerTimes::default(),
        }
    }

    /// Checks the post-slot SOC of `slot`; returns the band newly recorded, if any.
    pub fn observe(&mut self, slot: usize, soc_pct: f64) -> Option<SocBand> {
        let below = |threshold: f64| soc_pct < threshold - EPSILON;
        let t = &mut self.triggers;

        if t.stranded.is_none() && below(self.stranded_pct) {
            t.stranded = Some(slot);
            return Some(SocBand::Stranded);
        }
        if t.critical.is_none() && t.stranded.is_none() && below(self.critical_pct) {
            t.critical = Some(slot);
            return Some(SocBand::Critical);
        }
        if t.low.is_none() && t.critical.is_none() && t.stranded.is_none() && below(self.low_pct)
        {
            t.low = Some(slot);
            return Some(SocBand::Low);
        }
        None
    }

    /// Threshold (%) that defines `band`.
    pub fn threshold_pct(&self, band: SocBand) -> f64 {
        match band {
            SocBand::Low => self.low_pct,
            SocBand::Critical => self.critical_pct,
            SocBand::Stranded => self.stranded_pct,
        }
    }

    pub fn triggers(&self) -> TriggerTimes {
        self.triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> ThresholdMonitor {
        ThresholdMonitor::new(&VehicleEnergyParameters::default())
    }

    #[test]
    fn gradual_decline_records_each_band_once() {
        let mut m = monitor();
        assert_eq!(m.observe(0, 25.0), None);
        assert_eq!(m.observe(1, 19.0), Some(SocBand::Low));
        assert_eq!(m.observe(2, 18.0), None);
        assert_eq!(m.observe(3, 9.0), Some(SocBand::Critical));
        assert_eq!(m.observe(4, 4.0), Some(SocBand::Stranded));
        assert_eq!(m.observe(5, 0.0), None);
        assert_eq!(
            m.triggers(),
            TriggerTimes {
                low: Some(1),
                critical: Some(3),
                stranded: Some(4),
            }
        );
    }

    #[test]
    fn straight_to_stranded_suppresses_milder_bands() {
        let mut m = monitor();
        assert_eq!(m.observe(7, 2.0), Some(SocBand::Stranded));
        assert_eq!(m.observe(8, 2.0), None);
        let t = m.triggers();
        assert_eq!(t.stranded, Some(7));
        assert_eq!(t.critical, None);
        assert_eq!(t.low, None);
        assert_eq!(t.worst(), Some(SocBand::Stranded));
    }

    #[test]
    fn jump_into_critical_skips_low() {
        let mut m = monitor();
        assert_eq!(m.observe(3, 8.0), Some(SocBand::Critical));
        assert_eq!(m.observe(4, 15.0), None);
        assert_eq!(m.triggers().low, None);
    }

    #[test]
    fn exactly_on_threshold_does_not_trigger() {
        let mut m = monitor();
        assert_eq!(m.observe(0, 20.0), None);
        assert_eq!(m.observe(1, 20.0 - EPSILON / 2.0), None);
        assert_eq!(m.observe(2, 19.9), Some(SocBand::Low));
    }

    #[test]
    fn recovery_does_not_clear_triggers() {
        let mut m = monitor();
        m.observe(0, 15.0);
        m.observe(1, 80.0);
        m.observe(2, 15.0);
        assert_eq!(m.triggers().low, Some(0));
    }

    #[test]
    fn bands_are_ordered_by_severity() {
        assert!(SocBand::Stranded > SocBand::Critical);
        assert!(SocBand::Critical > SocBand::Low);
        assert_eq!(TriggerTimes::default().worst(), None);
    }
}
