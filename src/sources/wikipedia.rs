//! Encyclopedic lookup with name-variant and fuzzy-match disambiguation.

use crate::extract;
use crate::facet::{SourceRecord, SourceRef};
use crate::fetch::{self, FetchError};
use crate::resolve;
use crate::sources::{reliability, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const SUMMARY_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const SEARCH_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
const SEARCH_LIMIT: &str = "8";

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: DesktopUrls,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: SearchQuery,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    title: String,
}

/// Adapter over the Wikipedia REST summary endpoint.
pub struct WikipediaAdapter {
    client: Client,
}

impl WikipediaAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn summary(&self, title: &str) -> Result<PageSummary, FetchError> {
        let slug = title.replace(' ', "_");
        let url = format!("{SUMMARY_ENDPOINT}/{slug}");
        fetch::get_json(&self.client, &url, &[]).await
    }

    async fn search_titles(&self, query: &str) -> Vec<String> {
        let url = match Url::parse_with_params(
            SEARCH_ENDPOINT,
            &[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", SEARCH_LIMIT),
            ],
        ) {
            Ok(url) => url,
            Err(_) => return Vec::new(),
        };
        match fetch::get_json::<SearchResponse>(&self.client, url.as_str(), &[]).await {
            Ok(response) => response
                .query
                .search
                .into_iter()
                .map(|page| page.title)
                .collect(),
            Err(err) => {
                tracing::debug!(%err, "wikipedia search unavailable");
                Vec::new()
            }
        }
    }

    fn record_from_summary(&self, summary: &PageSummary) -> SourceRecord {
        let url = summary
            .content_urls
            .as_ref()
            .map(|urls| urls.desktop.page.clone());
        let origin = SourceRef::new("Wikipedia", summary.title.clone(), url);
        let mut record = SourceRecord::new(origin, reliability::WIKIPEDIA);

        let text = summary.extract.as_str();
        if text.trim().is_empty() {
            return record;
        }
        record.set("description", extract::clean_description(text));
        record.set("founded", extract::founding_year(text));
        if let Some(names) = extract::founders(text) {
            record.set_items("founders", names);
        }
        record.set("headquarters", extract::headquarters(text));
        record.set("ownership", extract::ownership(text));
        record.set("history", extract::history(text));
        record
    }
}

/// A lookup counts as resolved once it yields at least one structured
/// attribute beyond the prose description.
fn is_structured(record: &SourceRecord) -> bool {
    ["founded", "founders", "headquarters", "ownership"]
        .iter()
        .any(|key| {
            record
                .fields
                .get(*key)
                .map(|value| !value.is_placeholder())
                .unwrap_or(false)
        })
}

/// Outcome of one lookup attempt in the disambiguation ladder.
enum Attempt {
    /// Structured attributes extracted; the ladder stops here.
    Structured(SourceRecord),
    /// A page answered but yielded prose only; kept as the last attempt.
    Thin(SourceRecord),
    /// The lookup itself failed.
    Failed(String),
}

/// Decision state for the disambiguation ladder: the first structured
/// attempt wins outright, otherwise the very last attempted lookup is the
/// result — never an error.
struct Resolution {
    last_attempt: Option<SourceRecord>,
    last_reason: String,
}

impl Resolution {
    fn new() -> Self {
        Self {
            last_attempt: None,
            last_reason: String::from("no lookup attempted"),
        }
    }

    /// Folds in one attempt; `Some` short-circuits the ladder.
    fn absorb(&mut self, attempt: Attempt) -> Option<SourceRecord> {
        match attempt {
            Attempt::Structured(record) => Some(record),
            Attempt::Thin(record) => {
                self.last_attempt = Some(record);
                None
            }
            Attempt::Failed(reason) => {
                self.last_reason = reason;
                None
            }
        }
    }

    fn finish(self) -> SourceOutcome {
        match self.last_attempt {
            Some(record) if record.has_data() => SourceOutcome::Fetched(record),
            _ => SourceOutcome::missing("wikipedia", self.last_reason),
        }
    }
}

#[async_trait]
impl SourceAdapter for WikipediaAdapter {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let mut resolution = Resolution::new();

        for variant in resolve::name_variants(company) {
            if let Some(record) = resolution.absorb(self.attempt(&variant).await) {
                return SourceOutcome::Fetched(record);
            }
        }

        // Variants exhausted; fall back to fuzzy matching against the
        // search index.
        let titles = self.search_titles(company).await;
        for candidate in resolve::fuzzy_candidates(company, &titles) {
            if let Some(record) = resolution.absorb(self.attempt(&candidate).await) {
                return SourceOutcome::Fetched(record);
            }
        }

        resolution.finish()
    }
}

impl WikipediaAdapter {
    async fn attempt(&self, title: &str) -> Attempt {
        match self.summary(title).await {
            Ok(summary) => {
                let record = self.record_from_summary(&summary);
                if is_structured(&record) {
                    Attempt::Structured(record)
                } else {
                    Attempt::Thin(record)
                }
            }
            Err(err) => Attempt::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str, extract: &str) -> PageSummary {
        PageSummary {
            title: title.to_string(),
            extract: extract.to_string(),
            content_urls: Some(ContentUrls {
                desktop: DesktopUrls {
                    page: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
                },
            }),
        }
    }

    #[test]
    fn summary_text_becomes_structured_fields() {
        let adapter = WikipediaAdapter::new(Client::new());
        let page = summary(
            "Tesla, Inc.",
            "Tesla, Inc. is an American company headquartered in Austin, Texas. \
             It was founded in 2003 by Martin Eberhard and Marc Tarpenning. \
             The company is listed on the NASDAQ exchange.",
        );
        let record = adapter.record_from_summary(&page);
        assert!(is_structured(&record));
        assert_eq!(record.reliability, reliability::WIKIPEDIA);
        assert_eq!(record.origin.kind, "Wikipedia");
        assert!(record.fields.contains_key("founded"));
        assert!(record.fields.contains_key("headquarters"));
        assert!(record.fields.contains_key("ownership"));
    }

    #[test]
    fn prose_without_attributes_is_not_structured() {
        let adapter = WikipediaAdapter::new(Client::new());
        let page = summary("Acme", "Acme is a well-known fictional brand of products.");
        let record = adapter.record_from_summary(&page);
        assert!(!is_structured(&record));
        assert!(record.has_data());
    }

    /// Simulates a ladder where only the "Acme, Inc." variant resolves to
    /// structured attributes.
    fn canned_attempt(adapter: &WikipediaAdapter, title: &str) -> Attempt {
        match title {
            "acme" => Attempt::Failed("acme answered 404".to_string()),
            "Acme" => Attempt::Thin(
                adapter.record_from_summary(&summary("Acme", "Acme is a fictional brand.")),
            ),
            "Acme, Inc." => Attempt::Structured(adapter.record_from_summary(&summary(
                "Acme, Inc.",
                "Acme, Inc. was founded in 1952 and is headquartered in Fairfield, New Jersey.",
            ))),
            other => Attempt::Failed(format!("{other} answered 404")),
        }
    }

    #[test]
    fn variant_ladder_returns_the_structured_variant() {
        let adapter = WikipediaAdapter::new(Client::new());
        let mut resolution = Resolution::new();
        let mut resolved = None;
        for variant in crate::resolve::name_variants("acme") {
            if let Some(record) = resolution.absorb(canned_attempt(&adapter, &variant)) {
                resolved = Some(record);
                break;
            }
        }
        let record = resolved.expect("the Acme, Inc. variant resolves");
        assert_eq!(record.origin.title, "Acme, Inc.");
        assert_eq!(
            record.fields.get("founded"),
            Some(&crate::facet::FieldValue::Text("1952".to_string()))
        );
    }

    #[test]
    fn exhausted_ladder_returns_the_last_attempt_not_an_error() {
        let adapter = WikipediaAdapter::new(Client::new());
        let mut resolution = Resolution::new();
        for title in ["missing-one", "missing-two"] {
            assert!(resolution
                .absorb(canned_attempt(&adapter, title))
                .is_none());
        }
        // A thin page after failures still counts as the last attempt.
        let thin = Attempt::Thin(
            adapter.record_from_summary(&summary("Acme", "Acme is a fictional brand.")),
        );
        assert!(resolution.absorb(thin).is_none());
        match resolution.finish() {
            SourceOutcome::Fetched(record) => assert_eq!(record.origin.title, "Acme"),
            SourceOutcome::Missing(miss) => panic!("expected last attempt, got {miss:?}"),
        }
    }

    #[test]
    fn all_failures_surface_the_final_reason() {
        let mut resolution = Resolution::new();
        assert!(resolution
            .absorb(Attempt::Failed("first reason".to_string()))
            .is_none());
        assert!(resolution
            .absorb(Attempt::Failed("final reason".to_string()))
            .is_none());
        match resolution.finish() {
            SourceOutcome::Missing(miss) => assert_eq!(miss.reason, "final reason"),
            SourceOutcome::Fetched(record) => panic!("expected a miss, got {record:?}"),
        }
    }
}
