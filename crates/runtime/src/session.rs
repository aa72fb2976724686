//! Session management: the turn-by-turn protocol between user, model and tools.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::model::{Backend, Message, ModelRequest, ModelResponse, ToolCall, ToolSpec, Usage};
use crate::observer::Observer;
use crate::tools::ToolRegistry;
use crate::Result;

/// A unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a session is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingUserInput,
    ModelRequested,
    ToolDispatch,
    ModelRequestedAgain,
}

/// A tool call the model made during a turn, with the text it got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub call: ToolCall,
    pub output: String,
}

/// What one completed turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Final assistant text.
    pub reply: String,
    /// Set when the model called a tool before answering.
    pub tool: Option<ToolInvocation>,
    /// Token usage summed over the turn's model calls.
    pub usage: Usage,
}

/// A conversation session.
///
/// Owns the append-only history. Every appended message is handed to the
/// observer before the call that appended it returns.
///
/// The model may request at most one tool call per turn; when a response
/// carries several, only the first is honored.
pub struct Session<B> {
    pub id: SessionId,
    backend: B,
    tools: Arc<ToolRegistry>,
    observer: Box<dyn Observer>,
    messages: Vec<Message>,
    state: TurnState,
}

impl<B: Backend> Session<B> {
    /// Create a session seeded with a single system message.
    pub fn new(
        backend: B,
        tools: Arc<ToolRegistry>,
        system: impl Into<String>,
        observer: impl Observer + 'static,
    ) -> Self {
        let mut session = Self {
            id: SessionId::new(),
            backend,
            tools,
            observer: Box::new(observer),
            messages: Vec::new(),
            state: TurnState::AwaitingUserInput,
        };
        session.push(Message::system(system));
        debug!(session = %session.id, tools = session.tools.len(), "session started");
        session
    }

    /// Conversation history, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Send a user message and run the turn to its final answer.
    ///
    /// Model failures abort the turn and are returned as errors. Messages
    /// appended before the failure stay in history. Tool failures never
    /// surface here; they reach the model as tool output.
    pub async fn chat(&mut self, user_input: &str) -> Result<TurnOutcome> {
        let result = self.run_turn(user_input).await;
        self.transition(TurnState::AwaitingUserInput);
        result
    }

    async fn run_turn(&mut self, user_input: &str) -> Result<TurnOutcome> {
        self.push(Message::user(user_input));

        self.transition(TurnState::ModelRequested);
        let first = self.complete(true).await?;
        let mut usage = first.usage;

        let Some(call) = first.message.tool_call.clone() else {
            let reply = first.message.text().to_string();
            self.push(first.message);
            return Ok(TurnOutcome {
                reply,
                tool: None,
                usage,
            });
        };

        self.push(first.message);

        self.transition(TurnState::ToolDispatch);
        let output = self.tools.invoke(&call.name, &call.arguments).await;
        self.push(Message::tool_result(&call.id, &call.name, &output));

        // Tools are not re-advertised: the model is expected to answer now.
        self.transition(TurnState::ModelRequestedAgain);
        let second = self.complete(false).await?;
        usage.prompt_tokens += second.usage.prompt_tokens;
        usage.completion_tokens += second.usage.completion_tokens;

        // A further call would be left without a result, so only its text is kept.
        let answer = match second.message.tool_call {
            Some(extra) => {
                warn!(session = %self.id, tool = %extra.name, "ignoring tool call in answer to a tool result");
                Message::assistant(second.message.content.unwrap_or_default())
            }
            None => second.message,
        };
        let reply = answer.text().to_string();
        self.push(answer);

        Ok(TurnOutcome {
            reply,
            tool: Some(ToolInvocation { call, output }),
            usage,
        })
    }

    /// Re-send the current history without appending anything.
    pub async fn replay(&self) -> Result<Message> {
        let response = self
            .backend
            .call(ModelRequest {
                messages: &self.messages,
                tools: self.tools.list_definitions(),
            })
            .await?;
        Ok(response.message)
    }

    async fn complete(&self, advertise_tools: bool) -> Result<ModelResponse> {
        let tools: &[ToolSpec] = if advertise_tools {
            self.tools.list_definitions()
        } else {
            &[]
        };

        let response = self
            .backend
            .call(ModelRequest {
                messages: &self.messages,
                tools,
            })
            .await?;

        debug!(
            session = %self.id,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            tool_call = response.message.is_tool_call(),
            "completion received"
        );
        Ok(response)
    }

    fn push(&mut self, message: Message) {
        self.observer.on_message(&message);
        self.messages.push(message);
    }

    fn transition(&mut self, next: TurnState) {
        debug!(session = %self.id, from = ?self.state, to = ?next, "turn state");
        self.state = next;
    }
}

impl<B> Drop for Session<B> {
    fn drop(&mut self) {
        info!(session = %self.id, messages = self.messages.len(), "session ended");
    }
}
