use anyhow::{bail, Context, Result};

use scout_tools::SearchConfig;

/// Unsets an optional search parameter when used as a value.
const UNSET: &str = "none";

#[derive(Debug, Clone)]
pub struct Config {
    pub brave_api_key: Option<String>,
    /// Overrides the Brave endpoint (proxies, tests)
    pub brave_endpoint: Option<String>,
    pub search: SearchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = SearchConfig::default();

        let text = |key: &str, default: Option<String>| match lookup(key) {
            Some(v) if v.trim().eq_ignore_ascii_case(UNSET) => None,
            Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            _ => default,
        };

        let flag = |key: &str, default: Option<bool>| -> Result<Option<bool>> {
            match lookup(key) {
                Some(v) if !v.trim().is_empty() => parse_flag(&v)
                    .with_context(|| format!("{} must be true/false/1/0/yes/no or none", key)),
                _ => Ok(default),
            }
        };

        let num_results = match lookup("BRAVE_SEARCH_NUM_RESULTS") {
            Some(v) if v.trim().eq_ignore_ascii_case(UNSET) => None,
            Some(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<u32>()
                    .context("BRAVE_SEARCH_NUM_RESULTS must be a non-negative integer")?,
            ),
            _ => defaults.num_results,
        };

        let search = SearchConfig {
            country: text("BRAVE_SEARCH_COUNTRY", defaults.country),
            search_lang: text("BRAVE_SEARCH_LANG", defaults.search_lang),
            ui_lang: text("BRAVE_SEARCH_UI_LANG", defaults.ui_lang),
            safesearch: text("BRAVE_SEARCH_SAFESEARCH", defaults.safesearch),
            text_decorations: flag("BRAVE_SEARCH_TEXT_DECORATIONS", defaults.text_decorations)?,
            spellcheck: flag("BRAVE_SEARCH_SPELLCHECK", defaults.spellcheck)?,
            num_results,
            freshness: text("BRAVE_SEARCH_FRESHNESS", defaults.freshness),
            result_filter: text("BRAVE_SEARCH_RESULT_FILTER", defaults.result_filter),
            goggles_id: text("BRAVE_SEARCH_GOGGLES_ID", defaults.goggles_id),
            units: text("BRAVE_SEARCH_UNITS", defaults.units),
            extra_snippets: flag("BRAVE_SEARCH_EXTRA_SNIPPETS", defaults.extra_snippets)?,
            summary: flag("BRAVE_SEARCH_SUMMARY", defaults.summary)?,
            show_results: flag("BRAVE_SEARCH_SHOW_RESULTS", Some(defaults.show_results))?
                .unwrap_or(false),
        };

        Ok(Self {
            brave_api_key: lookup("BRAVE_SEARCH_API_KEY").filter(|k| !k.trim().is_empty()),
            brave_endpoint: lookup("BRAVE_SEARCH_ENDPOINT").filter(|e| !e.trim().is_empty()),
            search,
        })
    }
}

fn parse_flag(value: &str) -> Result<Option<bool>> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        UNSET => Ok(None),
        other => bail!("invalid boolean '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_empty_environment() {
        let config = config_from(&[]).unwrap();
        assert!(config.brave_api_key.is_none());
        assert!(config.brave_endpoint.is_none());
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BRAVE_SEARCH_API_KEY", "secret"),
            ("BRAVE_SEARCH_COUNTRY", "gb"),
            ("BRAVE_SEARCH_FRESHNESS", "pd"),
            ("BRAVE_SEARCH_NUM_RESULTS", "5"),
            ("BRAVE_SEARCH_EXTRA_SNIPPETS", "yes"),
            ("BRAVE_SEARCH_SHOW_RESULTS", "1"),
        ])
        .unwrap();

        assert_eq!(config.brave_api_key.as_deref(), Some("secret"));
        assert_eq!(config.search.country.as_deref(), Some("gb"));
        assert_eq!(config.search.freshness.as_deref(), Some("pd"));
        assert_eq!(config.search.num_results, Some(5));
        assert_eq!(config.search.extra_snippets, Some(true));
        assert!(config.search.show_results);
    }

    #[test]
    fn test_none_unsets_defaults() {
        let config = config_from(&[
            ("BRAVE_SEARCH_COUNTRY", "none"),
            ("BRAVE_SEARCH_SUMMARY", "NONE"),
        ])
        .unwrap();

        assert!(config.search.country.is_none());
        assert!(config.search.summary.is_none());
        assert_eq!(config.search.search_lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = config_from(&[("BRAVE_SEARCH_API_KEY", "")]).unwrap();
        assert!(config.brave_api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("BRAVE_SEARCH_NUM_RESULTS", "ten")]).is_err());
        assert!(config_from(&[("BRAVE_SEARCH_SPELLCHECK", "maybe")]).is_err());
    }
}
