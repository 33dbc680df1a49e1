// Application layer (simulation use case)
pub mod application;

// Infrastructure layer (errors, logging)
pub mod infrastructure;

pub use application::{DeviceSummary, SimulationConfig, SimulationReport, run_simulation};
pub use infrastructure::{CliError, LogConfig, Result};
