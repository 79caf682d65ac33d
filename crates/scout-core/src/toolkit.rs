//! Named-operation table that a host agent calls tools through
//!
//! Tools are registered under their name and invoked with string arguments.
//! [`ToolRegistry::invoke`] always produces text: unknown names, missing
//! arguments and tool errors all come back as `"Error: ..."`.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

pub use scout_tools::ToolResult;

/// Trait for tools that can be executed by the agent
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args_schema(&self) -> &str;
    async fn execute(&self, args: &HashMap<String, String>) -> Result<ToolResult>;
}

/// A group of related tools registered together
pub trait Toolkit: Send + Sync {
    fn name(&self) -> &str;
    fn tools(self: Arc<Self>) -> Vec<Arc<dyn Tool>>;
}

/// Registry of available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if self.tools.contains_key(tool.name()) {
            warn!("Replacing already registered tool: {}", tool.name());
        }
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn register_toolkit<T: Toolkit + 'static>(&mut self, toolkit: Arc<T>) {
        debug!("Registering toolkit: {}", toolkit.name());
        for tool in toolkit.tools() {
            self.register(tool);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Run a tool by name and flatten the outcome to text
    pub async fn invoke(&self, name: &str, args: &HashMap<String, String>) -> String {
        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return format!("Error: unknown tool '{}'", name);
        };

        match tool.execute(args).await {
            Ok(result) => result.into_text(),
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }

    /// Generate tool descriptions for the prompt
    pub fn generate_description(&self) -> String {
        if self.tools.is_empty() {
            return "No tools available.".to_string();
        }

        let mut desc = String::from("Available tools:\n\n");

        for tool in self.tools.values() {
            desc.push_str(&format!(
                "{}:\n  Description: {}\n  Args: {}\n\n",
                tool.name(),
                tool.description(),
                tool.args_schema()
            ));
        }

        desc
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
