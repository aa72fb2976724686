//! Tool registry: the catalogue of functions exposed to the model.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::model::ToolSpec;
use crate::tools::{Tool, ToolArguments, ToolError};

/// Result text handed to the model when a tool fails at runtime.
pub const TOOL_FAILED: &str = "The function failed to run";

/// A tool with its advertised definition.
struct RegisteredTool {
    spec: ToolSpec,
    tool: Box<dyn Tool>,
}

/// Maps tool names to definitions and implementations.
///
/// Built once at startup and read-only afterwards. Invocation never fails:
/// every problem comes back as text the model can react to.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    specs: Vec<ToolSpec>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name replaces the earlier one
    /// in place.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Box::new(tool));
        self
    }

    fn register(&mut self, tool: Box<dyn Tool>) {
        let spec = tool.spec();
        let entry = RegisteredTool {
            spec: spec.clone(),
            tool,
        };

        match self.index.get(&spec.name) {
            Some(&pos) => {
                warn!(tool = %spec.name, "replacing previously registered tool");
                self.tools[pos] = entry;
                self.specs[pos] = spec;
            }
            None => {
                self.index.insert(spec.name.clone(), self.tools.len());
                self.tools.push(entry);
                self.specs.push(spec);
            }
        }
    }

    /// Definitions to advertise to the model, in registration order.
    pub fn list_definitions(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the named tool with the raw argument payload from the model.
    pub async fn invoke(&self, name: &str, raw_arguments: &str) -> String {
        match self.try_invoke(name, raw_arguments).await {
            Ok(output) => output,
            Err(err) => {
                warn!(tool = name, error = %err, "tool call failed");
                soft_failure(name, &err)
            }
        }
    }

    async fn try_invoke(&self, name: &str, raw_arguments: &str) -> Result<String, ToolError> {
        let registered = self
            .index
            .get(name)
            .map(|&pos| &self.tools[pos])
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let args = ToolArguments::parse(raw_arguments)?;
        debug!(tool = %registered.spec.name, ?args, "executing tool");
        registered.tool.execute(args).await
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Render a tool error as the text the model receives.
fn soft_failure(name: &str, err: &ToolError) -> String {
    match err {
        ToolError::NotFound(_) => format!("Error: function {name} does not exist"),
        ToolError::InvalidInput(detail) => {
            format!("Error: invalid arguments for function {name}: {detail}")
        }
        ToolError::Execution(_) => TOOL_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".into(),
                description: "Echo the text back".into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            }
        }

        async fn execute(&self, args: ToolArguments) -> Result<String, ToolError> {
            Ok(args.required_str("text")?.to_string())
        }
    }

    struct Broken(&'static str);

    #[async_trait]
    impl Tool for Broken {
        fn spec(&self) -> ToolSpec {
            ToolSpec::without_parameters(self.0, "Always fails")
        }

        async fn execute(&self, _args: ToolArguments) -> Result<String, ToolError> {
            Err(ToolError::Execution("upstream unavailable".into()))
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().with_tool(Echo).with_tool(Broken("broken"))
    }

    #[tokio::test]
    async fn invokes_registered_tool() {
        let out = registry().invoke("echo", r#"{"text":"hi"}"#).await;
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_soft_failure() {
        for name in ["get_weather", "", "ECHO", "echo "] {
            let out = registry().invoke(name, "{}").await;
            assert!(out.contains("does not exist"), "{out}");
            assert!(out.contains(name), "{out}");
        }
    }

    #[tokio::test]
    async fn malformed_arguments_are_soft_failure() {
        for raw in ["{", "not json", "[1]", "\"text\"", r#"{"text": 1}"#, "{}"] {
            let out = registry().invoke("echo", raw).await;
            assert!(out.starts_with("Error: invalid arguments for function echo"), "{out}");
        }
    }

    #[tokio::test]
    async fn execution_error_is_failure_text() {
        let out = registry().invoke("broken", "").await;
        assert_eq!(out, TOOL_FAILED);
    }

    #[test]
    fn definitions_keep_registration_order() {
        let names: Vec<_> = registry()
            .list_definitions()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, ["echo", "broken"]);
    }

    #[test]
    fn duplicate_name_replaces_in_place() {
        let reg = ToolRegistry::new()
            .with_tool(Broken("echo"))
            .with_tool(Broken("other"))
            .with_tool(Echo);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.list_definitions()[0].description, "Echo the text back");
        assert!(reg.contains("other"));
    }

    #[test]
    fn empty_registry_has_no_tools() {
        let reg = ToolRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.list_definitions().is_empty());
    }
}
