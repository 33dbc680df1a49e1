pub mod simulation;

pub use simulation::{DeviceSummary, SimulationConfig, SimulationReport, run_simulation};
