use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a charger in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargerId(pub String);

impl ChargerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChargerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ChargerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChargerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A depot charger with a constant delivery rate.
///
/// Legacy catalogs spell the rate `rate` or `rateKw`; both are accepted and
/// normalized to `rate_kw` at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Charger {
    pub id: ChargerId,
    /// Display name; falls back to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Charge rate in kW (must be > 0 to deliver energy).
    #[serde(alias = "rate", alias = "rateKw")]
    pub rate_kw: f64,
}

impl Charger {
    pub fn new(id: &str, rate_kw: f64) -> Self {
        Self {
            id: ChargerId::from(id),
            name: None,
            rate_kw,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Reasons a CHARGE slot could not be served by the catalog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChargerLookupError {
    #[error("charger \"{0}\" is not in the catalog")]
    Unknown(ChargerId),
    #[error("charger \"{id}\" has invalid rate {rate_kw} kW")]
    InvalidRate { id: ChargerId, rate_kw: f64 },
}

impl ChargerLookupError {
    pub fn charger_id(&self) -> &ChargerId {
        match self {
            Self::Unknown(id) | Self::InvalidRate { id, .. } => id,
        }
    }
}

/// Read-only snapshot of the charger catalog, indexed by id.
///
/// If the same id appears twice, the later entry wins.
#[derive(Debug, Clone, Default)]
pub struct ChargerCatalog {
    by_id: HashMap<ChargerId, Charger>,
}

impl ChargerCatalog {
    pub fn new(chargers: &[Charger]) -> Self {
        let mut by_id = HashMap::with_capacity(chargers.len());
        for charger in chargers {
            if by_id.insert(charger.id.clone(), charger.clone()).is_some() {
                tracing::warn!(charger = %charger.id, "duplicate charger id in catalog, keeping the last entry");
            }
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Charger> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns the usable charge rate for `id`.
    ///
    /// # Errors
    ///
    /// `Unknown` if the id is not in the catalog, `InvalidRate` if its rate is
    /// non-positive or not finite.
    pub fn rate_kw(&self, id: &ChargerId) -> Result<f64, ChargerLookupError> {
        let charger = self
            .by_id
            .get(id)
            .ok_or_else(|| ChargerLookupError::Unknown(id.clone()))?;
        if charger.rate_kw.is_finite() && charger.rate_kw > 0.0 {
            Ok(charger.rate_kw)
        } else {
            Err(ChargerLookupError::InvalidRate {
                id: id.clone(),
                rate_kw: charger.rate_kw,
            })
        }
    }
}
