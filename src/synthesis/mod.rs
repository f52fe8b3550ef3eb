//! LLM-assisted synthesis of merged facet data.
//!
//! The text-generation service is a black-box collaborator behind the
//! [`LlmProvider`] trait. Input context is truncated to per-facet character
//! caps before submission; malformed output is replaced by a documented
//! fallback structure and logged, never propagated.

use crate::facet::{FacetResult, FieldValue, SENTINEL};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod anthropic;
mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Request envelope shared by the concrete providers.
pub struct ProviderRequest<'a> {
    /// Fully rendered prompt text.
    pub prompt: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token budget.
    pub max_tokens: usize,
}

/// Trait implemented by concrete LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier used in logs.
    fn name(&self) -> &'static str;

    /// Submits the request and returns the raw completion text.
    async fn answer(&self, request: &ProviderRequest<'_>) -> Result<String>;
}

/// Per-facet-slice character caps applied before submission, chosen to keep
/// prompt cost bounded.
const OVERVIEW_CAP: usize = 1200;
const FINANCIAL_CAP: usize = 500;
const NEWS_CAP: usize = 1500;

const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: usize = 600;

/// Structured synthesis returned by the collaborator (or the fallback).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    /// Two-to-three sentence executive summary.
    pub executive_summary: String,
    /// Overall sentiment label: positive, negative, neutral, or mixed.
    pub sentiment: String,
    /// Recurring themes across the facets.
    #[serde(default)]
    pub key_themes: Vec<String>,
    /// Short forward-looking note.
    #[serde(default)]
    pub outlook: String,
}

impl Synthesis {
    /// Documented fallback used when the collaborator's output cannot be
    /// parsed: fixed placeholder strings and a neutral sentiment.
    pub fn fallback() -> Self {
        Self {
            executive_summary: "Summary not available".to_string(),
            sentiment: "neutral".to_string(),
            key_themes: Vec::new(),
            outlook: SENTINEL.to_string(),
        }
    }
}

/// Synthesizes an executive view of the merged facets. Never fails: a
/// provider error or malformed response degrades to [`Synthesis::fallback`].
pub async fn synthesize(
    provider: &dyn LlmProvider,
    company: &str,
    facets: &BTreeMap<String, FacetResult>,
) -> Synthesis {
    let prompt = build_prompt(company, facets);
    let request = ProviderRequest {
        prompt: &prompt,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };
    match provider.answer(&request).await {
        Ok(raw) => match parse_synthesis(&raw) {
            Some(synthesis) => synthesis,
            None => {
                tracing::warn!(provider = provider.name(), "synthesis output unparsable, using fallback");
                Synthesis::fallback()
            }
        },
        Err(err) => {
            tracing::warn!(provider = provider.name(), %err, "synthesis request failed, using fallback");
            Synthesis::fallback()
        }
    }
}

fn build_prompt(company: &str, facets: &BTreeMap<String, FacetResult>) -> String {
    let mut sections = Vec::new();
    if let Some(text) = facet_slice(facets, "overview", &["description", "founded", "headquarters", "ownership"], OVERVIEW_CAP) {
        sections.push(format!("Overview:\n{text}"));
    }
    if let Some(text) = facet_slice(facets, "financials", &["data_type", "market_cap", "revenue_ttm", "sector"], FINANCIAL_CAP) {
        sections.push(format!("Financials:\n{text}"));
    }
    if let Some(text) = facet_slice(facets, "news", &["positive", "negative", "neutral", "key_articles", "controversies"], NEWS_CAP) {
        sections.push(format!("Recent news:\n{text}"));
    }

    format!(
        "You are preparing a business-intelligence brief on {company}.\n\n{body}\n\n\
         Respond with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"executive_summary\": string, \"sentiment\": \"positive\"|\"negative\"|\"neutral\"|\"mixed\", \
         \"key_themes\": [string], \"outlook\": string}}",
        body = sections.join("\n\n"),
    )
}

fn facet_slice(
    facets: &BTreeMap<String, FacetResult>,
    facet: &str,
    keys: &[&str],
    cap: usize,
) -> Option<String> {
    let result = facets.get(facet)?;
    if result.confidence == 0.0 {
        return None;
    }
    let mut lines = Vec::new();
    for key in keys {
        let Some(value) = result.data.get(*key) else {
            continue;
        };
        if value.is_placeholder() {
            continue;
        }
        let rendered = match value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Items(items) => items.join("; "),
        };
        lines.push(format!("{key}: {rendered}"));
    }
    if lines.is_empty() {
        None
    } else {
        Some(truncate_chars(&lines.join("\n"), cap))
    }
}

/// Pulls the first JSON object out of the completion, tolerating code fences
/// and prose around it.
fn parse_synthesis(raw: &str) -> Option<Synthesis> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::FacetResult;

    fn facets_with_overview() -> BTreeMap<String, FacetResult> {
        let mut result = FacetResult::empty(&["description"]);
        result.confidence = 0.8;
        result.data.insert(
            "description".to_string(),
            FieldValue::Text("Acme builds rockets.".to_string()),
        );
        let mut facets = BTreeMap::new();
        facets.insert("overview".to_string(), result);
        facets
    }

    #[test]
    fn prompt_includes_only_usable_facets() {
        let facets = facets_with_overview();
        let prompt = build_prompt("Acme", &facets);
        assert!(prompt.contains("Acme builds rockets."));
        assert!(!prompt.contains("Financials:"));
        assert!(prompt.contains("executive_summary"));
    }

    #[test]
    fn zero_confidence_facets_are_excluded_from_the_prompt() {
        let mut facets = facets_with_overview();
        facets.insert("financials".to_string(), FacetResult::empty(&["market_cap"]));
        let prompt = build_prompt("Acme", &facets);
        assert!(!prompt.contains("Financials:"));
    }

    #[test]
    fn fenced_json_responses_parse() {
        let raw = "Here is the brief:\n```json\n{\"executive_summary\": \"Solid quarter.\", \"sentiment\": \"positive\", \"key_themes\": [\"growth\"], \"outlook\": \"stable\"}\n```";
        let synthesis = parse_synthesis(raw).expect("parses");
        assert_eq!(synthesis.sentiment, "positive");
        assert_eq!(synthesis.key_themes, vec!["growth".to_string()]);
    }

    #[test]
    fn malformed_responses_fall_back() {
        assert_eq!(parse_synthesis("no json here"), None);
        assert_eq!(parse_synthesis("{broken"), None);
        let fallback = Synthesis::fallback();
        assert_eq!(fallback.sentiment, "neutral");
        assert_eq!(fallback.executive_summary, "Summary not available");
    }
}
