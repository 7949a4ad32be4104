use std::fmt;
use std::str::FromStr;

/// Result of the device-credential challenge for the current arming period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorizationState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl AuthorizationState {
    pub fn is_granted(self) -> bool {
        self == AuthorizationState::Granted
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthorizationState::Unknown => "unknown",
            AuthorizationState::Granted => "granted",
            AuthorizationState::Denied => "denied",
        };
        f.write_str(label)
    }
}

/// Foreground state reported by the host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Inactive,
    Background,
    Other(String),
}

impl LifecycleState {
    /// True for the states a return to `Active` should re-challenge from.
    pub fn is_away(&self) -> bool {
        matches!(self, LifecycleState::Inactive | LifecycleState::Background)
    }
}

impl FromStr for LifecycleState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "active" => LifecycleState::Active,
            "inactive" => LifecycleState::Inactive,
            "background" => LifecycleState::Background,
            other => LifecycleState::Other(other.to_string()),
        })
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Active => f.write_str("active"),
            LifecycleState::Inactive => f.write_str("inactive"),
            LifecycleState::Background => f.write_str("background"),
            LifecycleState::Other(label) => f.write_str(label),
        }
    }
}
