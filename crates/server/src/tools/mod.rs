pub mod duration;
pub mod handlers;
pub mod registry;

pub use duration::duration_to_seconds;
pub use registry::{ToolDefinition, ToolExecutionResult, ToolHandlerContext, ToolKind, ToolRegistry};

use geomcp_common::GeoMcpError;

use crate::provider::ProviderError;

/// Failure of a single tool invocation. Always reported to the caller as an
/// `isError` tool result; the session is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to serialize tool result: {0}")]
    Output(serde_json::Error),
}

impl From<ToolError> for GeoMcpError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::InvalidArguments(msg) => GeoMcpError::InvalidArguments(msg),
            ToolError::Provider(p) => p.into(),
            ToolError::Output(e) => GeoMcpError::Serialization(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_conversion() {
        let err: GeoMcpError = ToolError::InvalidArguments("address must not be blank".into()).into();
        assert!(matches!(err, GeoMcpError::InvalidArguments(_)));
        assert!(err.is_tool_failure());

        let err: GeoMcpError = ToolError::Provider(ProviderError::RateLimited("slow down".into())).into();
        assert!(matches!(err, GeoMcpError::Provider(_)));
    }
}
