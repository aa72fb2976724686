use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// These never leave the registry: [`ToolRegistry::invoke`] renders them as
/// text for the model.
///
/// [`ToolRegistry::invoke`]: super::ToolRegistry::invoke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    Execution(String),
}
