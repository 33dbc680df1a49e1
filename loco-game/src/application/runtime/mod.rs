mod config;
mod session_runtime;

pub use config::{
    RuntimeConfig, DEFAULT_COMMAND_CAPACITY, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
pub use session_runtime::{GameCommand, SessionRuntime, SessionSnapshot};
