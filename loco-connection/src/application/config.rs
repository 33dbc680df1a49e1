use crate::infrastructure::error::{ConnectionError, Result};
use instant::Duration;

pub const DEFAULT_SERVICE_TYPE: &str = "loco-game";

/// How long an outbound invitation stays valid before the transport abandons it
pub const DEFAULT_INVITE_TIMEOUT: Duration = Duration::from_secs(120);

const MAX_SERVICE_TYPE_LEN: usize = 15;

/// Configuration for a connection core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Discovery scope; only devices advertising the same type see each other
    service_type: String,

    invite_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            invite_timeout: DEFAULT_INVITE_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Config for a custom service type.
    ///
    /// Service types are 1-15 characters of lowercase ASCII letters, digits
    /// and hyphens, and may not start, end or repeat a hyphen.
    pub fn new(service_type: impl Into<String>) -> Result<Self> {
        let service_type = service_type.into();
        validate_service_type(&service_type)?;

        Ok(Self {
            service_type,
            ..Default::default()
        })
    }

    pub fn with_invite_timeout(mut self, timeout: Duration) -> Self {
        self.invite_timeout = timeout;
        self
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    pub fn invite_timeout(&self) -> Duration {
        self.invite_timeout
    }
}

fn validate_service_type(service_type: &str) -> Result<()> {
    let invalid = || ConnectionError::InvalidServiceType(service_type.to_string());

    if service_type.is_empty() || service_type.len() > MAX_SERVICE_TYPE_LEN {
        return Err(invalid());
    }
    if !service_type
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid());
    }
    if service_type.starts_with('-') || service_type.ends_with('-') || service_type.contains("--")
    {
        return Err(invalid());
    }
    Ok(())
}
