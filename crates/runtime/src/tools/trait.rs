//! Tool trait.

use crate::model::ToolSpec;
use crate::tools::{ToolArguments, ToolError};
use async_trait::async_trait;

/// A function the model may ask the host to run.
///
/// Implementations do their own I/O and report failures as [`ToolError`];
/// the registry turns those into text for the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Definition advertised to the model.
    fn spec(&self) -> ToolSpec;

    /// Run the tool with already-parsed arguments.
    async fn execute(&self, args: ToolArguments) -> Result<String, ToolError>;
}
