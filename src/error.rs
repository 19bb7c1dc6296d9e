use thiserror::Error;

/// Startup configuration problems. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failures of the upstream like API.
#[derive(Debug, Error)]
pub enum LikeApiError {
    /// Upstream answered with something other than 200.
    #[error("like API returned HTTP {0}")]
    Status(u16),
    /// Network fault, timeout or an unreadable body.
    #[error("failed to fetch like info: {0}")]
    Fetch(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("missing permissions to delete message")]
    PermissionDenied,
    #[error("failed to delete message: {0}")]
    Transport(String),
}
