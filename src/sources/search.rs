//! General-purpose web search over DuckDuckGo: instant-answer API first,
//! HTML results as a fallback when the API comes back thin.

use crate::fetch;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

const INSTANT_ENDPOINT: &str = "https://api.duckduckgo.com/";
const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const MIN_INSTANT_HITS: usize = 3;
const RELATED_TOPIC_CAP: usize = 3;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Result title (or leading text for related topics).
    pub title: String,
    /// Result URL; may be empty for abstract-only answers.
    pub url: String,
    /// Snippet text.
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
}

/// Runs a query, returning at most `limit` hits. Failures degrade to an
/// empty result list; search is always best-effort.
pub async fn duckduckgo(client: &Client, query: &str, limit: usize) -> Vec<SearchHit> {
    let mut hits = instant_answers(client, query).await;
    if hits.len() < MIN_INSTANT_HITS {
        hits.extend(html_results(client, query, limit).await);
    }
    hits.truncate(limit);
    hits
}

async fn instant_answers(client: &Client, query: &str) -> Vec<SearchHit> {
    let Ok(url) = Url::parse_with_params(
        INSTANT_ENDPOINT,
        &[("q", query), ("format", "json"), ("no_html", "1")],
    ) else {
        return Vec::new();
    };
    let answer: InstantAnswer = match fetch::get_json(client, url.as_str(), &[]).await {
        Ok(answer) => answer,
        Err(err) => {
            tracing::debug!(%err, "instant-answer search unavailable");
            return Vec::new();
        }
    };

    let mut hits = Vec::new();
    if !answer.abstract_text.is_empty() {
        let title = if answer.heading.is_empty() {
            query.to_string()
        } else {
            answer.heading.clone()
        };
        hits.push(SearchHit {
            title,
            url: answer.abstract_url.clone(),
            snippet: answer.abstract_text.clone(),
        });
    }
    for topic in answer.related_topics.into_iter().take(RELATED_TOPIC_CAP) {
        if topic.text.is_empty() {
            continue;
        }
        hits.push(SearchHit {
            title: topic.text.chars().take(100).collect(),
            url: topic.first_url,
            snippet: topic.text,
        });
    }
    hits
}

async fn html_results(client: &Client, query: &str, limit: usize) -> Vec<SearchHit> {
    let Ok(url) = Url::parse_with_params(HTML_ENDPOINT, &[("q", query)]) else {
        return Vec::new();
    };
    let html = match fetch::get_text(client, url.as_str()).await {
        Ok(html) => html,
        Err(err) => {
            tracing::debug!(%err, "html search unavailable");
            return Vec::new();
        }
    };
    parse_html_results(&html, limit)
}

fn parse_html_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let result = Selector::parse("div.result").expect("result selector");
    let title = Selector::parse("a.result__a").expect("title selector");
    let snippet = Selector::parse(".result__snippet").expect("snippet selector");

    let document = Html::parse_document(html);
    document
        .select(&result)
        .take(limit)
        .filter_map(|row| {
            let anchor = row.select(&title).next()?;
            let hit_title = anchor.text().collect::<String>().trim().to_string();
            if hit_title.is_empty() {
                return None;
            }
            let hit_url = anchor.value().attr("href").unwrap_or_default().to_string();
            let hit_snippet = row
                .select(&snippet)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(SearchHit {
                title: hit_title,
                url: hit_url,
                snippet: hit_snippet,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_results_are_parsed_from_result_rows() {
        let html = r#"<html><body>
            <div class="result">
              <a class="result__a" href="https://example.com/one">First Result</a>
              <a class="result__snippet">Snippet one text.</a>
            </div>
            <div class="result">
              <a class="result__a" href="https://example.com/two">Second Result</a>
              <a class="result__snippet">Snippet two text.</a>
            </div>
        </body></html>"#;
        let hits = parse_html_results(html, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "First Result");
        assert_eq!(hits[0].url, "https://example.com/one");
        assert_eq!(hits[1].snippet, "Snippet two text.");
    }

    #[test]
    fn html_result_limit_is_honored() {
        let row = r#"<div class="result"><a class="result__a" href="u">T</a></div>"#;
        let html = format!("<html><body>{}</body></html>", row.repeat(5));
        assert_eq!(parse_html_results(&html, 2).len(), 2);
    }
}
