pub mod events;
pub mod runtime;
pub mod service;

pub use events::GameEvent;
pub use runtime::{GameCommand, RuntimeConfig, SessionRuntime, SessionSnapshot};
pub use service::GameService;
