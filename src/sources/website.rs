//! Official company-website scraping: about-page discovery and text harvest.

use crate::extract;
use crate::facet::{SourceRecord, SourceRef};
use crate::fetch;
use crate::sources::{reliability, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

const FALLBACK_PATHS: &[&str] = &["/about", "/about-us", "/company", "/our-story", "/"];
const MIN_PARAGRAPH_LEN: usize = 50;
const EXCERPT_CAP: usize = 1000;

struct PageSelectors {
    anchors: Selector,
    paragraphs: Selector,
}

impl PageSelectors {
    fn new() -> Self {
        Self {
            anchors: Selector::parse("a[href]").expect("anchor selector"),
            paragraphs: Selector::parse("p").expect("paragraph selector"),
        }
    }
}

/// Harvested about-page content: the page URL plus its paragraph text.
pub(crate) struct AboutText {
    pub url: String,
    pub text: String,
}

/// Adapter that scrapes the company's own site for self-described content.
pub struct WebsiteAdapter {
    client: Client,
    selectors: PageSelectors,
}

impl WebsiteAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            selectors: PageSelectors::new(),
        }
    }

    /// Guesses the company's base URL from its name: strip punctuation, take
    /// the first token, probe `www.` then the bare domain, and fall back to
    /// the first candidate when neither answers.
    async fn derive_base_url(&self, company: &str) -> String {
        let lowered: String = company
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
            .collect();
        let token = lowered
            .split_whitespace()
            .next()
            .map(str::to_string)
            .unwrap_or(lowered);
        let candidates = [
            format!("https://www.{token}.com"),
            format!("https://{token}.com"),
        ];
        for candidate in &candidates {
            if fetch::head_ok(&self.client, candidate).await {
                return candidate.clone();
            }
        }
        candidates[0].clone()
    }

    /// Looks for an "about" or "our story" link on the homepage.
    async fn find_about_url(&self, base_url: &str) -> Option<String> {
        let html = fetch::get_text(&self.client, base_url).await.ok()?;
        let href = self.about_href(&html)?;
        let base = Url::parse(base_url).ok()?;
        base.join(&href).ok().map(|joined| joined.to_string())
    }

    fn about_href(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        for anchor in document.select(&self.selectors.anchors) {
            let text = anchor.text().collect::<String>().to_lowercase();
            if text.contains("about") || text.contains("our story") {
                if let Some(href) = anchor.value().attr("href") {
                    return Some(href.to_string());
                }
            }
        }
        None
    }

    fn paragraph_excerpt(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let paragraphs: Vec<String> = document
            .select(&self.selectors.paragraphs)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|text| text.len() > MIN_PARAGRAPH_LEN)
            .collect();
        if paragraphs.is_empty() {
            return None;
        }
        Some(truncate_chars(&paragraphs.join("\n"), EXCERPT_CAP))
    }

    /// Fetches the best available about-page text for the company. Shared
    /// with the customers facet, which mines the same prose for client
    /// mentions.
    pub(crate) async fn harvest_about_text(&self, company: &str) -> Option<AboutText> {
        let base_url = self.derive_base_url(company).await;
        let candidates = match self.find_about_url(&base_url).await {
            Some(about) => vec![about],
            None => FALLBACK_PATHS
                .iter()
                .filter_map(|path| {
                    Url::parse(&base_url)
                        .ok()
                        .and_then(|base| base.join(path).ok())
                })
                .map(|url| url.to_string())
                .collect(),
        };

        for url in candidates {
            let Ok(html) = fetch::get_text(&self.client, &url).await else {
                continue;
            };
            if let Some(text) = self.paragraph_excerpt(&html) {
                return Some(AboutText { url, text });
            }
        }
        None
    }
}

#[async_trait]
impl SourceAdapter for WebsiteAdapter {
    fn name(&self) -> &'static str {
        "website"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let Some(about) = self.harvest_about_text(company).await else {
            return SourceOutcome::missing("website", "no about-page content found");
        };
        let origin = SourceRef::new("Official Website", "About Page", Some(about.url));
        let mut record = SourceRecord::new(origin, reliability::WEBSITE);
        record.set("description", extract::clean_description(&about.text));
        if record.has_data() {
            SourceOutcome::Fetched(record)
        } else {
            SourceOutcome::missing("website", "about-page text too thin to keep")
        }
    }
}

/// Truncates on a character boundary so multi-byte content cannot split.
fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}
