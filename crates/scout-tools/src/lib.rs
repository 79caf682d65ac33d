//! Scout Tools - Brave Search for agents
//!
//! - brave: Brave Search API client and response projection
//! - web_search: the same search as a rig tool

pub mod brave;
pub mod web_search;

pub use brave::{
    BraveClient, BraveError, ParsedEntry, SearchConfig, SearchResponse, SummaryBlock, WebHit,
    DEFAULT_NUM_RESULTS, MISSING_API_KEY_MESSAGE,
};
pub use web_search::{WebSearch, WebSearchArgs, SEARCH_BRAVE_DESCRIPTION};

/// Tool execution result
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// The text an agent sees, whether or not the tool succeeded.
    pub fn into_text(self) -> String {
        if self.success {
            self.output
        } else {
            self.error.unwrap_or(self.output)
        }
    }
}
