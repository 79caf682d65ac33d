//! Brave Search API client
//!
//! Builds a single web search request from an immutable [`SearchConfig`],
//! sends it, and reshapes the response into a compact JSON string:
//! - web results reduced to url, title, description and extra snippets
//! - the summarizer block (when the API returns one) appended last
//!
//! [`BraveClient::search`] never fails. Every error is flattened into a
//! string so that an agent pipeline calling it only ever sees text.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Returned instead of searching when no API key is configured.
pub const MISSING_API_KEY_MESSAGE: &str = "Please set the BRAVE_SEARCH_API_KEY";

/// Result count used when neither the caller nor the config asks for one.
pub const DEFAULT_NUM_RESULTS: u32 = 10;

const SUBSCRIPTION_HEADER: &str = "X-Subscription-Token";

#[derive(Debug, thiserror::Error)]
pub enum BraveError {
    #[error("{}", MISSING_API_KEY_MESSAGE)]
    MissingApiKey,
    #[error("Invalid API key: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BraveError {
    /// Flatten into the text handed back to the tool caller.
    pub fn into_tool_output(self) -> String {
        match self {
            BraveError::MissingApiKey => MISSING_API_KEY_MESSAGE.to_string(),
            other => format!("Error: {}", other),
        }
    }
}

/// Search options sent with every request.
///
/// `None` means the parameter is left out of the request entirely; the API
/// treats the presence of a key as meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Country code for results, e.g. "us"
    pub country: Option<String>,
    /// Language of the results, e.g. "en"
    pub search_lang: Option<String>,
    /// Language of the response UI strings, e.g. "en-US"
    pub ui_lang: Option<String>,
    /// "off", "moderate" or "strict"
    pub safesearch: Option<String>,
    pub text_decorations: Option<bool>,
    pub spellcheck: Option<bool>,
    /// Overrides the per-call result count when set (and non-zero)
    pub num_results: Option<u32>,
    /// "pd" (24h), "pw" (week), "pm" (month), "py" (year) or a date range
    pub freshness: Option<String>,
    /// Comma-separated result types, e.g. "web,news"
    pub result_filter: Option<String>,
    /// Re-ranking profile, passed through as-is
    pub goggles_id: Option<String>,
    /// "metric" or "imperial"
    pub units: Option<String>,
    pub extra_snippets: Option<bool>,
    /// Ask the API for a summarizer block
    pub summary: Option<bool>,
    /// Log the rendered results after each successful search
    pub show_results: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            country: Some("us".to_string()),
            search_lang: Some("en".to_string()),
            ui_lang: Some("en-US".to_string()),
            safesearch: Some("moderate".to_string()),
            text_decorations: Some(true),
            spellcheck: Some(true),
            num_results: None,
            freshness: None,
            result_filter: None,
            goggles_id: None,
            units: None,
            extra_snippets: None,
            summary: Some(true),
            show_results: false,
        }
    }
}

impl SearchConfig {
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_search_lang(mut self, lang: impl Into<String>) -> Self {
        self.search_lang = Some(lang.into());
        self
    }

    pub fn with_ui_lang(mut self, lang: impl Into<String>) -> Self {
        self.ui_lang = Some(lang.into());
        self
    }

    pub fn with_safesearch(mut self, level: impl Into<String>) -> Self {
        self.safesearch = Some(level.into());
        self
    }

    pub fn with_text_decorations(mut self, enabled: bool) -> Self {
        self.text_decorations = Some(enabled);
        self
    }

    pub fn with_spellcheck(mut self, enabled: bool) -> Self {
        self.spellcheck = Some(enabled);
        self
    }

    pub fn with_num_results(mut self, count: u32) -> Self {
        self.num_results = Some(count);
        self
    }

    pub fn with_freshness(mut self, freshness: impl Into<String>) -> Self {
        self.freshness = Some(freshness.into());
        self
    }

    pub fn with_result_filter(mut self, filter: impl Into<String>) -> Self {
        self.result_filter = Some(filter.into());
        self
    }

    pub fn with_goggles_id(mut self, goggles_id: impl Into<String>) -> Self {
        self.goggles_id = Some(goggles_id.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_extra_snippets(mut self, enabled: bool) -> Self {
        self.extra_snippets = Some(enabled);
        self
    }

    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.summary = Some(enabled);
        self
    }

    pub fn with_show_results(mut self, enabled: bool) -> Self {
        self.show_results = enabled;
        self
    }
}

#[derive(Clone)]
pub struct BraveClient {
    client: reqwest::Client,
    has_api_key: bool,
    config: Arc<SearchConfig>,
    endpoint: String,
}

impl BraveClient {
    /// A missing key is not an error here; searches report it instead.
    pub fn new(api_key: Option<String>, config: SearchConfig) -> Result<Self, BraveError> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("BRAVE_SEARCH_API_KEY not set - searches will return a configuration message");
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &api_key {
            let mut token = HeaderValue::from_str(key)?;
            token.set_sensitive(true);
            headers.insert(SUBSCRIPTION_HEADER, token);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            has_api_key: api_key.is_some(),
            config: Arc::new(config),
            endpoint: BRAVE_SEARCH_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.has_api_key
    }

    /// Request parameters for a query, in a fixed order, unset options dropped.
    pub fn params(&self, query: &str, num_results: u32) -> Vec<(&'static str, String)> {
        let cfg = &*self.config;
        let count = cfg.num_results.filter(|&n| n > 0).unwrap_or(num_results);

        let candidates: [(&'static str, Option<String>); 14] = [
            ("q", Some(query.to_string())),
            ("country", cfg.country.clone()),
            ("search_lang", cfg.search_lang.clone()),
            ("ui_lang", cfg.ui_lang.clone()),
            ("safesearch", cfg.safesearch.clone()),
            ("text_decorations", cfg.text_decorations.map(|b| b.to_string())),
            ("spellcheck", cfg.spellcheck.map(|b| b.to_string())),
            ("count", Some(count.to_string())),
            ("freshness", cfg.freshness.clone()),
            ("result_filter", cfg.result_filter.clone()),
            ("goggles_id", cfg.goggles_id.clone()),
            ("units", cfg.units.clone()),
            ("extra_snippets", cfg.extra_snippets.map(|b| b.to_string())),
            ("summary", cfg.summary.map(|b| b.to_string())),
        ];

        candidates
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }

    /// Search and return the pretty-printed results, or the flattened error.
    pub async fn search(&self, query: &str, num_results: u32) -> String {
        match self.try_search(query, num_results).await {
            Ok(rendered) => rendered,
            Err(BraveError::MissingApiKey) => MISSING_API_KEY_MESSAGE.to_string(),
            Err(e) => {
                error!("Failed to search Brave: {}", e);
                e.into_tool_output()
            }
        }
    }

    pub async fn try_search(&self, query: &str, num_results: u32) -> Result<String, BraveError> {
        if !self.has_api_key {
            return Err(BraveError::MissingApiKey);
        }

        info!("Searching Brave for: {}", query);
        let params = self.params(query, num_results);
        debug!(?params, "Brave request parameters");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BraveError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.bytes().await?;
        let search_response: SearchResponse = serde_json::from_slice(&body)?;
        let rendered = render_pretty(&search_response.project())?;

        if self.config.show_results {
            info!("{}", rendered);
        }

        Ok(rendered)
    }
}

impl std::fmt::Debug for BraveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraveClient")
            .field("api_key", &self.has_api_key.then_some("[REDACTED]"))
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub web: Option<WebResults>,
    /// Kept loosely typed; only a handful of keys are projected.
    #[serde(default)]
    pub summarizer: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebResults {
    #[serde(default)]
    pub results: Option<Vec<SearchResult>>,
}

/// Fields stay untyped so an odd value upstream is passed through as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub url: Option<Value>,
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub extra_snippets: Option<Value>,
}

// ============================================================================
// Projected Output
// ============================================================================

/// One element of the returned JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedEntry {
    Web(WebHit),
    Summarizer { summarizer: SummaryBlock },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebHit {
    pub url: Value,
    pub title: Value,
    pub description: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_snippets: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBlock {
    #[serde(rename = "type")]
    pub summary_type: Value,
    pub status: Value,
    pub title: Value,
    pub summary: Value,
    pub followups: Value,
    /// `Some(Value::Null)` when the key exists upstream with a null value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichments: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities_infos: Option<Value>,
}

impl From<&SearchResult> for WebHit {
    fn from(result: &SearchResult) -> Self {
        Self {
            url: result.url.clone().unwrap_or(Value::Null),
            title: result.title.clone().unwrap_or(Value::Null),
            description: result.description.clone().unwrap_or(Value::Null),
            extra_snippets: result.extra_snippets.clone().filter(is_truthy),
        }
    }
}

/// Empty lists, strings and objects, zero and false count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

impl SummaryBlock {
    /// `None` for an empty summarizer object.
    pub fn from_summarizer(summarizer: &Map<String, Value>) -> Option<Self> {
        if summarizer.is_empty() {
            return None;
        }

        let field = |key: &str| summarizer.get(key).cloned().unwrap_or(Value::Null);
        let list = |key: &str| {
            summarizer
                .get(key)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()))
        };

        Some(Self {
            summary_type: field("type"),
            status: field("status"),
            title: field("title"),
            summary: list("summary"),
            followups: list("followups"),
            enrichments: summarizer.get("enrichments").cloned(),
            entities_infos: summarizer.get("entities_infos").cloned(),
        })
    }
}

impl SearchResponse {
    /// Web hits in upstream order, then the summarizer if there is one.
    pub fn project(&self) -> Vec<ParsedEntry> {
        let mut entries: Vec<ParsedEntry> = self
            .web
            .as_ref()
            .and_then(|web| web.results.as_ref())
            .map(|results| {
                results
                    .iter()
                    .map(|r| ParsedEntry::Web(WebHit::from(r)))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(summarizer) = self
            .summarizer
            .as_ref()
            .and_then(SummaryBlock::from_summarizer)
        {
            entries.push(ParsedEntry::Summarizer { summarizer });
        }

        entries
    }
}

/// Serialize with a four-space indent, escaping non-ASCII as `\uXXXX`.
pub fn render_pretty(entries: &[ParsedEntry]) -> Result<String, BraveError> {
    let mut buf = Vec::new();
    let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"    "));
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut ser)?;
    // output is pure ASCII
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Pretty layout with every non-ASCII char written as UTF-16 escapes
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
