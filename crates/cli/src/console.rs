//! Colorized console rendering of conversation messages.

use std::io::{self, Write};

use chrono::Local;
use colored::{ColoredString, Colorize};
use runtime::{Message, Observer, Role};

/// Prints every message to stdout, colored by role.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn on_message(&mut self, message: &Message) {
        let time = Local::now().format("%H:%M:%S");
        let mut stdout = io::stdout().lock();
        // Console output is informational; a closed stdout must not end the turn.
        let _ = writeln!(stdout, "[{time}] {}", paint(message.role, &line(message)));
    }
}

/// Plain text for one message, without color or timestamp.
pub fn line(message: &Message) -> String {
    match message.role {
        Role::System => format!("system: {}", message.text()),
        Role::User => format!("user: {}", message.text()),
        Role::Assistant => match &message.tool_call {
            Some(call) => format!("assistant: {call}"),
            None => format!("assistant: {}", message.text()),
        },
        Role::Tool => format!(
            "tool ({}): {}",
            message.tool_name.as_deref().unwrap_or("?"),
            message.text()
        ),
    }
}

fn paint(role: Role, text: &str) -> ColoredString {
    match role {
        Role::System => text.red(),
        Role::User => text.green(),
        Role::Assistant => text.blue(),
        Role::Tool => text.magenta(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use runtime::ToolCall;

    #[test]
    fn renders_each_role() {
        assert_eq!(line(&Message::system("be nice")), "system: be nice");
        assert_eq!(line(&Message::user("hi")), "user: hi");
        assert_eq!(line(&Message::assistant("hello")), "assistant: hello");
        assert_eq!(
            line(&Message::tool_result("c1", "get_bitcoin_price", "The price of bitcoin is $1")),
            "tool (get_bitcoin_price): The price of bitcoin is $1"
        );
    }

    #[test]
    fn renders_tool_call_instead_of_content() {
        let msg = Message::assistant_tool_call(ToolCall {
            id: "c1".into(),
            name: "get_crypto_price".into(),
            arguments: r#"{"currency":"Dogecoin","currency_code":"DOGE"}"#.into(),
        });
        assert_eq!(
            line(&msg),
            r#"assistant: get_crypto_price({"currency":"Dogecoin","currency_code":"DOGE"})"#
        );
    }

    #[test]
    fn paint_keeps_text() {
        assert!(paint(Role::Tool, "x").to_string().contains('x'));
    }
}
