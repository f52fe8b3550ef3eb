//! Customers facet adapters: client names and customer segments mined from
//! encyclopedic prose, the company's own site, and templated web searches.

use crate::extract;
use crate::facet::{SourceRecord, SourceRef};
use crate::fetch;
use crate::sources::website::WebsiteAdapter;
use crate::sources::{reliability, search, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

const SUMMARY_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const HITS_PER_QUERY: usize = 5;

/// Query templates probed for client and segment mentions.
const SEARCH_TEMPLATES: &[&str] = &[
    "\"{}\" clients customers list",
    "\"{}\" case studies success stories",
    "\"{}\" partnerships collaborations",
    "\"{}\" serves industries sectors",
    "\"{}\" target market customer base",
];

fn mined_record(origin: SourceRef, reliability: f64, text: &str, company: &str) -> SourceRecord {
    let mut record = SourceRecord::new(origin, reliability);
    record.set_items("clients", extract::client_mentions(text, company));
    record.set_items("segments", extract::customer_segments(text));
    record
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
}

/// Mines the company's encyclopedic summary for client mentions.
pub struct WikiClientsAdapter {
    client: Client,
}

impl WikiClientsAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for WikiClientsAdapter {
    fn name(&self) -> &'static str {
        "wiki-clients"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let slug = company.replace(' ', "_");
        let url = format!("{SUMMARY_ENDPOINT}/{slug}");
        let summary: PageSummary = match fetch::get_json(&self.client, &url, &[]).await {
            Ok(summary) => summary,
            Err(err) => return SourceOutcome::missing("wiki-clients", err.to_string()),
        };
        if summary.extract.trim().is_empty() {
            return SourceOutcome::missing("wiki-clients", "summary empty");
        }
        let origin = SourceRef::new("Wikipedia", summary.title.clone(), None);
        let text = format!("{} {}", summary.title, summary.extract);
        let record = mined_record(origin, reliability::CUSTOMER_WIKIPEDIA, &text, company);
        if record.has_data() {
            SourceOutcome::Fetched(record)
        } else {
            SourceOutcome::missing("wiki-clients", "no client or segment mentions")
        }
    }
}

/// Mines the company's own about-page prose for client mentions.
pub struct WebsiteClientsAdapter {
    website: WebsiteAdapter,
}

impl WebsiteClientsAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self {
            website: WebsiteAdapter::new(client),
        }
    }
}

#[async_trait]
impl SourceAdapter for WebsiteClientsAdapter {
    fn name(&self) -> &'static str {
        "website-clients"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let Some(about) = self.website.harvest_about_text(company).await else {
            return SourceOutcome::missing("website-clients", "no about-page content found");
        };
        let origin = SourceRef::new("Official Website", "About Page", Some(about.url));
        let record = mined_record(origin, reliability::CUSTOMER_WEBSITE, &about.text, company);
        if record.has_data() {
            SourceOutcome::Fetched(record)
        } else {
            SourceOutcome::missing("website-clients", "no client or segment mentions")
        }
    }
}

/// Mines general web-search snippets through the five query templates.
pub struct SearchClientsAdapter {
    client: Client,
    query_delay: Duration,
}

impl SearchClientsAdapter {
    /// Builds the adapter; `query_delay` spaces out successive searches.
    pub fn new(client: Client, query_delay: Duration) -> Self {
        Self {
            client,
            query_delay,
        }
    }
}

#[async_trait]
impl SourceAdapter for SearchClientsAdapter {
    fn name(&self) -> &'static str {
        "search-clients"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let mut clients = Vec::new();
        let mut segments = Vec::new();
        let mut first_url = None;

        for (index, template) in SEARCH_TEMPLATES.iter().enumerate() {
            if index > 0 && !self.query_delay.is_zero() {
                sleep(self.query_delay).await;
            }
            let query = template.replace("{}", company);
            for hit in search::duckduckgo(&self.client, &query, HITS_PER_QUERY).await {
                let text = format!("{} {}", hit.title, hit.snippet);
                for client_name in extract::client_mentions(&text, company) {
                    if !clients
                        .iter()
                        .any(|seen: &String| seen.eq_ignore_ascii_case(&client_name))
                    {
                        clients.push(client_name);
                    }
                }
                for segment in extract::customer_segments(&text) {
                    if !segments.contains(&segment) {
                        segments.push(segment);
                    }
                }
                if first_url.is_none() && !hit.url.is_empty() {
                    first_url = Some(hit.url);
                }
            }
        }

        if clients.is_empty() && segments.is_empty() {
            return SourceOutcome::missing("search-clients", "no mentions across queries");
        }
        let origin = SourceRef::new("Web Search", "Client and segment mentions", first_url);
        let mut record = SourceRecord::new(origin, reliability::CUSTOMER_SEARCH);
        record.set_items("clients", clients);
        record.set_items("segments", segments);
        SourceOutcome::Fetched(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::FieldValue;

    #[test]
    fn mined_records_carry_clients_and_segments() {
        let origin = SourceRef::new("Wikipedia", "Acme", None);
        let text = "Acme's clients include Globex Corporation. It serves enterprise and healthcare organizations such as hospitals.";
        let record = mined_record(origin, reliability::CUSTOMER_WIKIPEDIA, text, "Acme");
        assert!(record.has_data());
        match record.fields.get("segments") {
            Some(FieldValue::Items(segments)) => {
                assert!(segments.contains(&"Enterprise".to_string()));
                assert!(segments.contains(&"Healthcare".to_string()));
            }
            other => panic!("expected segments, got {other:?}"),
        }
    }

    #[test]
    fn empty_text_yields_an_unusable_record() {
        let origin = SourceRef::new("Wikipedia", "Acme", None);
        let record = mined_record(origin, reliability::CUSTOMER_WIKIPEDIA, "nothing of note", "Acme");
        assert!(!record.has_data());
    }
}
