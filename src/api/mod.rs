//! REST API over a completed simulation run.
//!
//! Endpoints:
//! - `GET /report`: scenario, grid, fleet summary, conflicts, and full report
//! - `GET /vehicles/{id}`: one vehicle's result
//! - `POST /simulate`: stateless evaluation of a posted schedule

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::fleet::conflicts::ChargerConflict;
use crate::scenario::Scenario;
use crate::sim::kpi::FleetSummary;
use crate::sim::types::SimulationReport;

pub use types::{ErrorResponse, ReportResponse, SimulateRequest, SimulateResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once after the CLI run completes and wrapped in `Arc`; read-only,
/// so no locks.
pub struct AppState {
    pub scenario: Scenario,
    pub report: SimulationReport,
    pub summary: FleetSummary,
    pub conflicts: Vec<ChargerConflict>,
}

impl AppState {
    pub fn new(scenario: Scenario, report: SimulationReport, summary: FleetSummary) -> Self {
        let conflicts = scenario.charger_conflicts();
        Self {
            scenario,
            report,
            summary,
            conflicts,
        }
    }

    /// Runs `scenario` and wraps the outcome.
    pub fn from_scenario(scenario: Scenario) -> Self {
        let report = scenario.run();
        let summary = FleetSummary::from_report(&report);
        Self::new(scenario, report, summary)
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/report", get(handlers::get_report))
        .route("/vehicles/{id}", get(handlers::get_vehicle))
        .route("/simulate", post(handlers::post_simulate))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot bind to `addr` or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
