//! Tool registry and the tools exposed to the model.

pub mod crypto;
pub mod errors;
mod registry;
mod r#trait;
mod types;

pub use crypto::{BitcoinPrice, CryptoCompare, CryptoPrice, QuoteSource};
pub use errors::ToolError;
pub use r#trait::Tool;
pub use registry::{TOOL_FAILED, ToolRegistry};
pub use types::ToolArguments;
