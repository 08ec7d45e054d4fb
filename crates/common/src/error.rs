use thiserror::Error;

/// Top-level error type for geomcp operations.
#[derive(Debug, Error)]
pub enum GeoMcpError {
    // --- Startup errors (process must not serve) ---
    #[error("Configuration error: {0}")]
    Config(String),

    // --- Routing errors (client's fault, answered with HTTP 400) ---
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No session ID provided")]
    MissingSessionId,

    // --- Tool-call errors (reported inside the session, session survives) ---
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Provider error: {0}")]
    Provider(String),

    // --- Channel errors (session is torn down) ---
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl GeoMcpError {
    /// Whether the caller sent a request that can never succeed as-is.
    pub fn is_routing_error(&self) -> bool {
        matches!(self, Self::SessionNotFound(_) | Self::MissingSessionId)
    }

    /// Whether this error is reported as a failed tool result rather than
    /// a protocol or HTTP error.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Self::InvalidArguments(_) | Self::Provider(_))
    }

    /// Whether the owning session must be destroyed.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Serialization(_))
    }
}
