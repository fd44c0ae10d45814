//! Battery state-of-charge simulation for slot-scheduled EV fleets.

/// REST API over simulation results (feature `api`).
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
/// Vehicles, schedules, and chargers.
pub mod fleet;
pub mod io;
pub mod reporting;
pub mod scenario;
/// Simulation engine, step function, thresholds, and summaries.
pub mod sim;
