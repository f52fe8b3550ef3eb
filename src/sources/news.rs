//! News-search adapter with keyword sentiment classification.

use crate::extract::{self, Sentiment};
use crate::facet::{FieldValue, SourceRecord, SourceRef};
use crate::fetch;
use crate::sources::{SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const ENDPOINT: &str = "https://newsapi.org/v2/everything";
const WINDOW_DAYS: i64 = 30;
const PAGE_SIZE: &str = "20";
const TOP_ARTICLES: usize = 5;
const TOP_EXAMPLES: usize = 3;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: String,
    #[serde(rename = "totalResults", default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    source: ArticleSource,
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: String,
}

/// Adapter over the news-search service's `everything` endpoint.
pub struct NewsAdapter {
    client: Client,
    api_key: String,
}

impl NewsAdapter {
    /// Builds the adapter; the API key is injected, never embedded.
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    fn query_url(&self, company: &str) -> Option<Url> {
        let to_date = Utc::now();
        let from_date = to_date - ChronoDuration::days(WINDOW_DAYS);
        Url::parse_with_params(
            ENDPOINT,
            &[
                ("q", company),
                ("from", &from_date.format("%Y-%m-%d").to_string()),
                ("to", &to_date.format("%Y-%m-%d").to_string()),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("pageSize", PAGE_SIZE),
            ],
        )
        .ok()
    }
}

#[async_trait]
impl SourceAdapter for NewsAdapter {
    fn name(&self) -> &'static str {
        "news"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let Some(url) = self.query_url(company) else {
            return SourceOutcome::missing("news", "query construction failed");
        };
        let response: NewsResponse = match fetch::get_json(
            &self.client,
            url.as_str(),
            &[("X-Api-Key", self.api_key.as_str())],
        )
        .await
        {
            Ok(response) => response,
            Err(err) => return SourceOutcome::missing("news", err.to_string()),
        };
        if response.status != "ok" || response.articles.is_empty() {
            return SourceOutcome::missing("news", "no articles in the 30-day window");
        }
        SourceOutcome::Fetched(build_record(&response))
    }
}

fn build_record(response: &NewsResponse) -> SourceRecord {
    let mut positive = 0u64;
    let mut negative = 0u64;
    let mut positive_examples = Vec::new();
    let mut negative_examples = Vec::new();
    let mut controversies = Vec::new();
    let mut future_plans = Vec::new();

    for article in &response.articles {
        let description = article.description.as_deref().unwrap_or_default();
        let (sentiment, _) = extract::classify_sentiment(&article.title, description);
        match sentiment {
            Sentiment::Positive => {
                positive += 1;
                if positive_examples.len() < TOP_EXAMPLES {
                    positive_examples.push(article.title.clone());
                }
            }
            Sentiment::Negative => {
                negative += 1;
                if negative_examples.len() < TOP_EXAMPLES {
                    negative_examples.push(article.title.clone());
                }
            }
            Sentiment::Neutral => {}
        }
        if !extract::matched_keywords(extract::CONTROVERSY_KEYWORDS, &article.title, description)
            .is_empty()
            && controversies.len() < TOP_ARTICLES
        {
            controversies.push(article.title.clone());
        }
        if !extract::matched_keywords(extract::FUTURE_PLAN_KEYWORDS, &article.title, description)
            .is_empty()
            && future_plans.len() < TOP_ARTICLES
        {
            future_plans.push(article.title.clone());
        }
    }

    let analyzed = response.articles.len() as u64;
    let neutral = analyzed - positive - negative;
    let key_articles: Vec<String> = response
        .articles
        .iter()
        .take(TOP_ARTICLES)
        .map(|article| format!("{} ({})", article.title, article.source.name))
        .collect();

    let origin = SourceRef::new(
        "News Search",
        format!("{} articles in a {WINDOW_DAYS}-day window", response.total_results),
        None,
    );
    let confidence = confidence_ladder(response.total_results, analyzed, positive, negative);
    let mut record = SourceRecord::new(origin, confidence);
    record.set("total_articles", Some(response.total_results as f64));
    record.set("articles_analyzed", Some(analyzed as f64));
    record.fields.insert(
        "positive".to_string(),
        FieldValue::Number(positive as f64),
    );
    record.fields.insert(
        "negative".to_string(),
        FieldValue::Number(negative as f64),
    );
    record
        .fields
        .insert("neutral".to_string(), FieldValue::Number(neutral as f64));
    record.set_items("key_articles", key_articles);
    record.set_items("positive_examples", positive_examples);
    record.set_items("negative_examples", negative_examples);
    record.set_items("controversies", controversies);
    record.set_items("future_plans", future_plans);
    record
}

/// Confidence ladder over article volume, recency, analysis coverage and
/// polarity diversity. The step values are carried-over tunables.
fn confidence_ladder(total: u64, analyzed: u64, positive: u64, negative: u64) -> f64 {
    let mut score: f64 = match total {
        t if t > 100 => 0.4,
        t if t > 50 => 0.3,
        t if t > 10 => 0.2,
        _ => 0.1,
    };
    // Everything analyzed sits inside the 30-day window.
    score += 0.3;
    score += match analyzed {
        a if a >= 20 => 0.2,
        a if a >= 10 => 0.15,
        _ => 0.1,
    };
    if positive > 0 && negative > 0 {
        score += 0.1;
    } else if positive > 0 || negative > 0 {
        score += 0.05;
    }
    score.min(1.0)
}
