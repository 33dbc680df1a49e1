use std::fmt;

/// What the local device is doing in the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionRole {
    /// Not hosting and not joined
    #[default]
    Idle,
    Hosting,
    Participant,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRole::Idle => write!(f, "idle"),
            SessionRole::Hosting => write!(f, "hosting"),
            SessionRole::Participant => write!(f, "participant"),
        }
    }
}
