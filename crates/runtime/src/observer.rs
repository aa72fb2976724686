//! Observers see every message as it is appended to a conversation.

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::model::{Message, Role};

/// Receives each message in the same step it is appended to history.
pub trait Observer: Send {
    fn on_message(&mut self, message: &Message);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_message(&mut self, _message: &Message) {}
}

/// Emits each message as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_message(&mut self, message: &Message) {
        match message.role {
            Role::Assistant if message.is_tool_call() => {
                if let Some(call) = &message.tool_call {
                    info!(role = %message.role, call_id = %call.id, "{call}");
                }
            }
            Role::Tool => info!(
                role = %message.role,
                tool = message.tool_name.as_deref().unwrap_or_default(),
                "{}",
                message.text()
            ),
            _ => info!(role = %message.role, "{}", message.text()),
        }
    }
}

/// Keeps a copy of every message it sees, shared with the caller.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages observed so far.
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Observer for Transcript {
    fn on_message(&mut self, message: &Message) {
        match self.messages.lock() {
            Ok(mut m) => m.push(message.clone()),
            Err(poisoned) => poisoned.into_inner().push(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolCall;

    fn conversation() -> Vec<Message> {
        vec![
            Message::system("sys"),
            Message::user("btc?"),
            Message::assistant_tool_call(ToolCall {
                id: "c1".into(),
                name: "get_bitcoin_price".into(),
                arguments: "{}".into(),
            }),
            Message::tool_result("c1", "get_bitcoin_price", "The price of bitcoin is $1"),
            Message::assistant("It is $1."),
        ]
    }

    #[test]
    fn transcript_shares_what_it_sees() {
        let transcript = Transcript::new();
        let mut observer = transcript.clone();
        for message in conversation() {
            observer.on_message(&message);
        }
        assert_eq!(transcript.messages(), conversation());
    }

    #[test]
    fn tracing_and_null_observers_accept_every_role() {
        let mut tracing = TracingObserver;
        let mut null = NullObserver;
        for message in conversation() {
            tracing.on_message(&message);
            null.on_message(&message);
        }
    }
}
