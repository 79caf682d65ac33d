//! Brave Search toolkit for the agent

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use scout_tools::{BraveClient, DEFAULT_NUM_RESULTS, SEARCH_BRAVE_DESCRIPTION};

use crate::toolkit::{Tool, Toolkit, ToolResult};

const SEARCH_ARGS_SCHEMA: &str =
    r#"{"query": "The query to search for", "num_results": "Number of results to return (default 10)"}"#;

/// Wraps one [`BraveClient`] and exposes it under the host's calling conventions
#[derive(Debug, Clone)]
pub struct BraveSearch {
    client: Arc<BraveClient>,
}

impl BraveSearch {
    pub fn new(client: BraveClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<BraveClient> {
        &self.client
    }

    /// Search Brave and return the results as a JSON string.
    pub async fn search_brave(&self, query: &str, num_results: u32) -> String {
        self.client.search(query, num_results).await
    }

    /// Same as [`Self::search_brave`], for frameworks that call `run`.
    pub async fn run(&self, query: &str, num_results: u32) -> String {
        self.search_brave(query, num_results).await
    }
}

impl Toolkit for BraveSearch {
    fn name(&self) -> &str {
        "brave_search"
    }

    fn tools(self: Arc<Self>) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(SearchOperation {
                toolkit: self.clone(),
                name: "search_brave",
            }),
            Arc::new(SearchOperation {
                toolkit: self,
                name: "run",
            }),
        ]
    }
}

/// One named entry point into the toolkit
struct SearchOperation {
    toolkit: Arc<BraveSearch>,
    name: &'static str,
}

#[async_trait]
impl Tool for SearchOperation {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        SEARCH_BRAVE_DESCRIPTION
    }

    fn args_schema(&self) -> &str {
        SEARCH_ARGS_SCHEMA
    }

    async fn execute(&self, args: &HashMap<String, String>) -> Result<ToolResult> {
        let query = args
            .get("query")
            .ok_or_else(|| anyhow::anyhow!("'query' argument is required"))?;

        let num_results = args
            .get("num_results")
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(DEFAULT_NUM_RESULTS);

        let output = match self.name {
            "run" => self.toolkit.run(query, num_results).await,
            _ => self.toolkit.search_brave(query, num_results).await,
        };
        Ok(ToolResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::ToolRegistry;
    use scout_tools::{SearchConfig, MISSING_API_KEY_MESSAGE};
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry_with(client: BraveClient) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_toolkit(Arc::new(BraveSearch::new(client)));
        registry
    }

    fn query(q: &str) -> HashMap<String, String> {
        HashMap::from([("query".to_string(), q.to_string())])
    }

    #[test]
    fn test_toolkit_registers_both_names() {
        let client = BraveClient::new(None, SearchConfig::default()).unwrap();
        let registry = registry_with(client);

        assert_eq!(registry.names(), vec!["run", "search_brave"]);
        assert!(registry
            .generate_description()
            .contains(SEARCH_BRAVE_DESCRIPTION));
    }

    #[tokio::test]
    async fn test_missing_key_through_registry() {
        let client = BraveClient::new(None, SearchConfig::default()).unwrap();
        let registry = registry_with(client);

        assert_eq!(
            registry.invoke("search_brave", &query("rust")).await,
            MISSING_API_KEY_MESSAGE
        );
        assert_eq!(
            registry.invoke("run", &query("rust")).await,
            MISSING_API_KEY_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_missing_query_argument() {
        let client = BraveClient::new(Some("key".to_string()), SearchConfig::default()).unwrap();
        let registry = registry_with(client);

        let out = registry.invoke("search_brave", &HashMap::new()).await;
        assert_eq!(out, "Error: 'query' argument is required");
    }

    #[tokio::test]
    async fn test_run_matches_search_brave() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "capital of France"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web": { "results": [{
                    "url": "https://x.com",
                    "title": "Paris",
                    "description": "Capital of France"
                }]}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = BraveClient::new(Some("key".to_string()), SearchConfig::default())
            .unwrap()
            .with_endpoint(server.uri());
        let toolkit = BraveSearch::new(client);

        let searched = toolkit.search_brave("capital of France", 10).await;
        let ran = toolkit.run("capital of France", 10).await;
        assert_eq!(searched, ran);
        assert!(searched.contains("\"title\": \"Paris\""));
    }

    #[tokio::test]
    async fn test_num_results_argument() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = BraveClient::new(Some("key".to_string()), SearchConfig::default())
            .unwrap()
            .with_endpoint(server.uri());
        let registry = registry_with(client);

        let mut args = query("rust");
        args.insert("num_results".to_string(), "5".to_string());
        assert_eq!(registry.invoke("search_brave", &args).await, "[]");

        args.insert("num_results".to_string(), "lots".to_string());
        assert_eq!(registry.invoke("search_brave", &args).await, "[]");
    }
}
