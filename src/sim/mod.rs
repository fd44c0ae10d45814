/// Slot calendar and wall-clock conversion.
pub mod clock;
pub mod engine;
/// Fleet summary indicators.
pub mod kpi;
pub mod step;
/// SOC band detection.
pub mod thresholds;
pub mod types;

pub use engine::{Engine, simulate};
pub use types::{SimulationReport, SimulationResult, Warning, WarningKind};
