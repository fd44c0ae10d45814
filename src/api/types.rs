//! API request and response bodies.

use serde::{Deserialize, Serialize};

use crate::fleet::charger::Charger;
use crate::fleet::conflicts::ChargerConflict;
use crate::fleet::vehicle::{VehicleEnergyParameters, VehicleSchedule};
use crate::sim::clock::TimeGrid;
use crate::sim::kpi::FleetSummary;
use crate::sim::types::SimulationReport;

/// `GET /report` body.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub scenario: String,
    pub grid: TimeGrid,
    pub summary: FleetSummary,
    pub charger_conflicts: Vec<ChargerConflict>,
    pub report: SimulationReport,
}

/// `POST /simulate` body: everything the engine needs, nothing more.
///
/// The grid falls back to its default when omitted. Energy parameters are
/// kept raw so that missing or malformed ones reject the run instead of
/// failing the request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulateRequest {
    #[serde(default)]
    pub grid: TimeGrid,
    #[serde(default, alias = "parameters")]
    pub params: Option<serde_json::Value>,
    #[serde(default)]
    pub chargers: Vec<Charger>,
    #[serde(default, alias = "schedule")]
    pub vehicles: Vec<VehicleSchedule>,
}

impl SimulateRequest {
    /// Decodes the posted energy parameters.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for `global_errors` when the parameters are
    /// absent or do not deserialize (missing field, wrong type, unknown key).
    pub fn energy_params(&self) -> Result<VehicleEnergyParameters, String> {
        let Some(raw) = &self.params else {
            return Err("energy parameters missing: \"params\" is required".to_string());
        };
        VehicleEnergyParameters::deserialize(raw)
            .map_err(|e| format!("invalid energy parameters: {e}"))
    }
}

/// `POST /simulate` response.
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub summary: FleetSummary,
    pub charger_conflicts: Vec<ChargerConflict>,
    pub report: SimulationReport,
}

/// Error body for 4xx responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
