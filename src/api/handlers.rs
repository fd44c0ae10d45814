//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{ErrorResponse, ReportResponse, SimulateRequest, SimulateResponse};
use crate::fleet::conflicts::find_charger_conflicts;
use crate::sim::engine::Engine;
use crate::sim::kpi::FleetSummary;
use crate::sim::types::{SimulationReport, SimulationResult};

/// Returns the full run held in state.
///
/// `GET /report` → 200 + `ReportResponse` JSON
pub async fn get_report(State(state): State<Arc<AppState>>) -> Json<ReportResponse> {
    Json(ReportResponse {
        scenario: state.scenario.name.clone(),
        grid: state.scenario.grid,
        summary: state.summary.clone(),
        charger_conflicts: state.conflicts.clone(),
        report: state.report.clone(),
    })
}

/// Returns one vehicle's simulation result.
///
/// `GET /vehicles/{id}` → 200 + `SimulationResult` JSON
/// `GET /vehicles/{unknown}` → 404 + `ErrorResponse`
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SimulationResult>, (StatusCode, Json<ErrorResponse>)> {
    state.report.vehicle(&id).cloned().map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no vehicle with id \"{id}\""),
            }),
        )
    })
}

/// Simulates a posted schedule without touching shared state.
///
/// `POST /simulate` → 200 + `SimulateResponse` JSON
/// → 422 + `SimulateResponse` when the report carries global errors,
/// including missing or incomplete energy parameters
pub async fn post_simulate(Json(req): Json<SimulateRequest>) -> (StatusCode, Json<SimulateResponse>) {
    let report = match req.energy_params() {
        Ok(params) => Engine::new(req.grid, params, &req.chargers).run(&req.vehicles),
        Err(message) => SimulationReport::rejected(
            std::iter::once(message)
                .chain(req.grid.validate().iter().map(ToString::to_string))
                .collect(),
        ),
    };
    let status = if report.is_rejected() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let summary = FleetSummary::from_report(&report);

    (
        status,
        Json(SimulateResponse {
            summary,
            charger_conflicts: find_charger_conflicts(&req.vehicles, &req.grid),
            report,
        }),
    )
}
