//! `search_brave` exposed as a rig tool

use crate::brave::{BraveClient, DEFAULT_NUM_RESULTS};
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

pub const SEARCH_BRAVE_DESCRIPTION: &str =
    "Use this function to search Brave Search for a query. Returns the search results in JSON format.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchArgs {
    #[schemars(description = "The query to search for")]
    pub query: String,
    #[schemars(description = "Number of results to return. Defaults to 10.")]
    #[serde(default)]
    pub num_results: Option<u32>,
}

#[derive(Clone)]
pub struct WebSearch {
    client: Arc<BraveClient>,
}

impl WebSearch {
    pub fn new(client: Arc<BraveClient>) -> Self {
        Self { client }
    }
}

impl Tool for WebSearch {
    const NAME: &'static str = "search_brave";
    // Failures come back as text, never as a tool error
    type Error = Infallible;
    type Args = WebSearchArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: SEARCH_BRAVE_DESCRIPTION.to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The query to search for"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results to return. Defaults to 10."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let num_results = args.num_results.unwrap_or(DEFAULT_NUM_RESULTS);
        Ok(self.client.search(&args.query, num_results).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brave::{SearchConfig, MISSING_API_KEY_MESSAGE};
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_definition() {
        let client = BraveClient::new(None, SearchConfig::default()).unwrap();
        let tool = WebSearch::new(Arc::new(client));

        let def = tokio_test::block_on(tool.definition(String::new()));
        assert_eq!(def.name, "search_brave");
        assert_eq!(def.parameters["required"], json!(["query"]));
    }

    #[test]
    fn test_args_default_num_results() {
        let args: WebSearchArgs = serde_json::from_value(json!({ "query": "rust" })).unwrap();
        assert_eq!(args.query, "rust");
        assert!(args.num_results.is_none());
    }

    #[tokio::test]
    async fn test_call_without_key_returns_message() {
        let client = BraveClient::new(None, SearchConfig::default()).unwrap();
        let tool = WebSearch::new(Arc::new(client));

        let output = tool
            .call(WebSearchArgs {
                query: "rust".to_string(),
                num_results: None,
            })
            .await
            .unwrap();
        assert_eq!(output, MISSING_API_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_call_passes_num_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("count", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "web": { "results": [] } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BraveClient::new(Some("key".to_string()), SearchConfig::default())
            .unwrap()
            .with_endpoint(server.uri());
        let tool = WebSearch::new(Arc::new(client));

        let output = tool
            .call(WebSearchArgs {
                query: "rust".to_string(),
                num_results: Some(3),
            })
            .await
            .unwrap();
        assert_eq!(output, "[]");
    }
}
