mod config;
mod events;
mod manager;

pub use config::{ConnectionConfig, DEFAULT_INVITE_TIMEOUT, DEFAULT_SERVICE_TYPE};
pub use events::ConnectionEvent;
pub use manager::ConnectionManager;
