use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_COMMAND_CAPACITY: usize = 100;
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Tuning for the background session task
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub poll_interval: Duration,
    pub command_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Clamped to [`MIN_POLL_INTERVAL`]; a tokio interval cannot tick at zero
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Zero is bumped to one, the minimum a bounded channel accepts
    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }
}
