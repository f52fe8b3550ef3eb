//! Employer-review adapter: best-effort rating extraction from review-site
//! search snippets.

use crate::extract;
use crate::facet::{SourceRecord, SourceRef};
use crate::sources::{reliability, search, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

const HITS_PER_QUERY: usize = 5;
const HIGHLIGHT_CAP: usize = 3;

const REVIEW_QUERIES: &[&str] = &[
    "\"{}\" glassdoor reviews rating",
    "\"{}\" employee reviews pros cons",
];

/// Adapter mining employer-review signals out of web-search snippets. Review
/// sites block anonymous scrapers aggressively, so search snippets are the
/// reliable surface.
pub struct ReviewSnippetsAdapter {
    client: Client,
    query_delay: Duration,
}

impl ReviewSnippetsAdapter {
    /// Builds the adapter; `query_delay` spaces out successive searches.
    pub fn new(client: Client, query_delay: Duration) -> Self {
        Self {
            client,
            query_delay,
        }
    }
}

#[async_trait]
impl SourceAdapter for ReviewSnippetsAdapter {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let mut rating = None;
        let mut highlights = Vec::new();
        let mut first_url = None;

        for (index, template) in REVIEW_QUERIES.iter().enumerate() {
            if index > 0 && !self.query_delay.is_zero() {
                sleep(self.query_delay).await;
            }
            let query = template.replace("{}", company);
            for hit in search::duckduckgo(&self.client, &query, HITS_PER_QUERY).await {
                let text = format!("{} {}", hit.title, hit.snippet);
                if rating.is_none() {
                    rating = extract::review_rating(&text);
                }
                if highlights.len() < HIGHLIGHT_CAP && !hit.snippet.is_empty() {
                    let line = first_sentence(&hit.snippet);
                    if !highlights.iter().any(|seen: &String| seen == &line) {
                        highlights.push(line);
                    }
                }
                if first_url.is_none() && !hit.url.is_empty() {
                    first_url = Some(hit.url);
                }
            }
        }

        if rating.is_none() && highlights.is_empty() {
            return SourceOutcome::missing("reviews", "no review snippets surfaced");
        }
        let origin = SourceRef::new("Employer Reviews", "Review-site search snippets", first_url);
        let mut record = SourceRecord::new(origin, reliability::REVIEW_SNIPPETS);
        record.set(
            "rating",
            rating.map(|value| format!("{value} out of 5")),
        );
        record.set_items("review_highlights", highlights);
        SourceOutcome::Fetched(record)
    }
}

fn first_sentence(snippet: &str) -> String {
    snippet
        .split('.')
        .next()
        .unwrap_or(snippet)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sentence_stops_at_the_period() {
        assert_eq!(
            first_sentence("Employees praise the culture. Pay is average."),
            "Employees praise the culture"
        );
        assert_eq!(first_sentence("No period here"), "No period here");
    }
}
