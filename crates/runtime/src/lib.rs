//! Parley runtime — a tool-calling conversation loop over a chat model.
//!
//! # Overview
//!
//! - **Session**: owns the append-only history and runs one turn per user
//!   input, dispatching at most one tool call before the final answer.
//! - **Backend**: a trait over chat-completion providers; [`OpenAiBackend`]
//!   speaks the OpenAI Chat Completions wire format.
//! - **ToolRegistry**: the functions advertised to the model. Invocation
//!   never fails; problems come back as text for the model.
//! - **Observer**: sees every message as it is appended.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use runtime::{CryptoCompare, OpenAiBackend, Session, TracingObserver};
//! use runtime::tools::crypto::default_registry;
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = OpenAiBackend::builder("sk-...", "gpt-3.5-turbo").build();
//! let tools = Arc::new(default_registry(Arc::new(CryptoCompare::new())));
//!
//! let mut session = Session::new(backend, tools, "You are a helpful assistant.", TracingObserver);
//! let outcome = session.chat("What's the price of bitcoin?").await?;
//! println!("{}", outcome.reply);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
pub mod observer;
mod session;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};

pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, OpenAiBackend,
    OpenAiBackendBuilder, Role, ToolCall, ToolSpec, Usage,
};

pub use observer::{NullObserver, Observer, TracingObserver, Transcript};

pub use session::{Session, SessionId, ToolInvocation, TurnOutcome, TurnState};

pub use tools::{
    BitcoinPrice, CryptoCompare, CryptoPrice, QuoteSource, TOOL_FAILED, Tool, ToolArguments,
    ToolError, ToolRegistry,
};
