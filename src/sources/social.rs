//! Social-platform presence adapters: one adapter per platform, each
//! guessing profile handles and pulling counts out of the raw page with a
//! pattern ladder.

use crate::facet::{SourceRecord, SourceRef};
use crate::fetch;
use crate::sources::{reliability, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;

/// Follower counts below this are treated as scraping noise.
const MIN_FOLLOWERS: u64 = 1000;
/// Employee counts below this are treated as scraping noise.
const MIN_EMPLOYEES: u64 = 10;

const LINKEDIN_FOLLOWER_PATTERNS: &[&str] = &[
    r"(?i)([\d,]+)\s*followers",
    r"(?i)followers[:\s]+([\d,]+)",
];
const LINKEDIN_EMPLOYEE_PATTERNS: &[&str] = &[
    r"(?i)([\d,]+)\s*employees",
    r"(?i)employees[:\s]+([\d,]+)",
];
const TWITTER_FOLLOWER_PATTERNS: &[&str] = &[
    r#""followers_count":(\d+)"#,
    r"(?i)([\d.,]+[KM]?)\s*Followers",
];
const INSTAGRAM_FOLLOWER_PATTERNS: &[&str] = &[
    r#""edge_followed_by":\{"count":(\d+)\}"#,
    r#""followers":(\d+)"#,
    r#"(?i)content="([\d.]+[KM]?)\s*Followers"#,
    r"(?i)([\d.]+[KM]?)\s*followers",
];
const YOUTUBE_SUBSCRIBER_PATTERNS: &[&str] = &[
    r#""subscriberCountText":\{"simpleText":"([\d.KM]+)\s*subscribers""#,
    r#""subscriberCount":"(\d+)""#,
    r"(?i)([\d.]+[KM]?)\s*subscribers",
];

static LINKEDIN_FOLLOWERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(LINKEDIN_FOLLOWER_PATTERNS));
static LINKEDIN_EMPLOYEES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(LINKEDIN_EMPLOYEE_PATTERNS));
static TWITTER_FOLLOWERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(TWITTER_FOLLOWER_PATTERNS));
static INSTAGRAM_FOLLOWERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(INSTAGRAM_FOLLOWER_PATTERNS));
static YOUTUBE_SUBSCRIBERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(YOUTUBE_SUBSCRIBER_PATTERNS));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("social pattern compiles"))
        .collect()
}

/// The platforms researched; Facebook is deliberately absent — its pages
/// block anonymous clients too often to be worth an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialPlatform {
    /// Company page with follower and employee counts.
    LinkedIn,
    /// Profile follower counts.
    Twitter,
    /// Business-profile follower counts.
    Instagram,
    /// Channel subscriber counts.
    YouTube,
}

impl SocialPlatform {
    /// Display name used in provenance and the `platforms` list field.
    pub fn display(&self) -> &'static str {
        match self {
            SocialPlatform::LinkedIn => "LinkedIn",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::YouTube => "YouTube",
        }
    }

    fn field_prefix(&self) -> &'static str {
        match self {
            SocialPlatform::LinkedIn => "linkedin",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::YouTube => "youtube",
        }
    }

    fn profile_urls(&self, company: &str) -> Vec<String> {
        let squashed = squash_handle(company);
        let hyphenated = hyphenate_handle(company);
        let first_word: String = company
            .split_whitespace()
            .next()
            .unwrap_or(company)
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        match self {
            SocialPlatform::LinkedIn => vec![
                format!("https://www.linkedin.com/company/{hyphenated}"),
                format!("https://www.linkedin.com/company/{squashed}"),
            ],
            SocialPlatform::Twitter => dedup(vec![
                format!("https://twitter.com/{squashed}"),
                format!("https://twitter.com/{first_word}"),
            ]),
            SocialPlatform::Instagram => dedup(vec![
                format!("https://www.instagram.com/{squashed}/"),
                format!("https://www.instagram.com/{first_word}/"),
            ]),
            SocialPlatform::YouTube => vec![
                format!("https://www.youtube.com/@{squashed}"),
                format!("https://www.youtube.com/c/{squashed}"),
            ],
        }
    }

    fn parse(&self, html: &str, url: &str) -> Option<SourceRecord> {
        let prefix = self.field_prefix();
        let origin = SourceRef::new(self.display(), format!("{} profile", self.display()), Some(url.to_string()));
        let mut record = SourceRecord::new(origin, reliability::SOCIAL_PLATFORM);
        record.set(&format!("{prefix}_url"), Some(url));

        let mut found = false;
        match self {
            SocialPlatform::LinkedIn => {
                if let Some(count) = ladder_count(&LINKEDIN_FOLLOWERS, html, MIN_FOLLOWERS) {
                    record.set(&format!("{prefix}_followers"), Some(count));
                    found = true;
                }
                if let Some(count) = ladder_count(&LINKEDIN_EMPLOYEES, html, MIN_EMPLOYEES) {
                    record.set(&format!("{prefix}_employees"), Some(count));
                    found = true;
                }
            }
            SocialPlatform::Twitter => {
                if let Some(count) = ladder_value(&TWITTER_FOLLOWERS, html) {
                    record.set(&format!("{prefix}_followers"), Some(count));
                    found = true;
                }
            }
            SocialPlatform::Instagram => {
                if let Some(count) = ladder_value(&INSTAGRAM_FOLLOWERS, html) {
                    record.set(&format!("{prefix}_followers"), Some(count));
                    found = true;
                }
            }
            SocialPlatform::YouTube => {
                if let Some(count) = ladder_value(&YOUTUBE_SUBSCRIBERS, html) {
                    record.set(&format!("{prefix}_subscribers"), Some(count));
                    found = true;
                }
            }
        }

        if found {
            record.set_items("platforms", vec![self.display().to_string()]);
            Some(record)
        } else {
            None
        }
    }
}

/// Adapter for one social platform.
pub struct SocialAdapter {
    platform: SocialPlatform,
    client: Client,
}

impl SocialAdapter {
    /// Builds an adapter for the given platform.
    pub fn new(platform: SocialPlatform, client: Client) -> Self {
        Self { platform, client }
    }
}

#[async_trait]
impl SourceAdapter for SocialAdapter {
    fn name(&self) -> &'static str {
        self.platform.field_prefix()
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let mut last_reason = String::from("no profile candidates");
        for url in self.platform.profile_urls(company) {
            match fetch::get_text(&self.client, &url).await {
                Ok(html) => {
                    if let Some(record) = self.platform.parse(&html, &url) {
                        return SourceOutcome::Fetched(record);
                    }
                    last_reason = format!("no counts recognized at {url}");
                }
                Err(err) => last_reason = err.to_string(),
            }
        }
        SourceOutcome::missing(self.platform.field_prefix(), last_reason)
    }
}

fn squash_handle(company: &str) -> String {
    company
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | ',' | '.'))
        .collect()
}

fn hyphenate_handle(company: &str) -> String {
    company
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| !matches!(c, ',' | '.'))
        .collect()
}

fn dedup(urls: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for url in urls {
        if !seen.contains(&url) {
            seen.push(url);
        }
    }
    seen
}

/// First ladder match parsed as an integer above a sanity floor, humanized.
fn ladder_count(ladder: &[Regex], html: &str, floor: u64) -> Option<String> {
    for pattern in ladder {
        if let Some(caps) = pattern.captures(html) {
            if let Some(raw) = caps.get(1) {
                let digits = raw.as_str().replace(',', "");
                if let Ok(count) = digits.parse::<u64>() {
                    if count > floor {
                        return Some(humanize(count));
                    }
                }
            }
        }
    }
    None
}

/// First ladder match kept as-is when already humanized (`3.2M`), otherwise
/// parsed and humanized.
fn ladder_value(ladder: &[Regex], html: &str) -> Option<String> {
    for pattern in ladder {
        if let Some(caps) = pattern.captures(html) {
            if let Some(raw) = caps.get(1) {
                let value = raw.as_str().replace(',', "");
                if let Ok(count) = value.parse::<u64>() {
                    return Some(humanize(count));
                }
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn humanize(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::FieldValue;

    #[test]
    fn handles_are_derived_from_the_company_name() {
        assert_eq!(squash_handle("Tesla, Inc."), "teslainc");
        assert_eq!(hyphenate_handle("Meta Platforms"), "meta-platforms");
    }

    #[test]
    fn linkedin_counts_require_sanity_floors() {
        let html = "Acme Corp has 12,500 followers and 340 employees on record";
        let record = SocialPlatform::LinkedIn
            .parse(html, "https://www.linkedin.com/company/acme")
            .expect("record");
        assert_eq!(
            record.fields.get("linkedin_followers"),
            Some(&FieldValue::Text("12.5K".to_string()))
        );
        assert_eq!(
            record.fields.get("linkedin_employees"),
            Some(&FieldValue::Text("340".to_string()))
        );

        // Below-floor counts are scraping noise, not data.
        assert!(SocialPlatform::LinkedIn
            .parse("only 40 followers", "https://example.com")
            .is_none());
    }

    #[test]
    fn instagram_raw_counts_are_humanized() {
        let html = r#"{"edge_followed_by":{"count":2400000}}"#;
        let record = SocialPlatform::Instagram
            .parse(html, "https://www.instagram.com/acme/")
            .expect("record");
        assert_eq!(
            record.fields.get("instagram_followers"),
            Some(&FieldValue::Text("2.4M".to_string()))
        );
    }

    #[test]
    fn youtube_humanized_counts_pass_through() {
        let html = r#""subscriberCountText":{"simpleText":"1.2M subscribers""#;
        let record = SocialPlatform::YouTube
            .parse(html, "https://www.youtube.com/@acme")
            .expect("record");
        assert_eq!(
            record.fields.get("youtube_subscribers"),
            Some(&FieldValue::Text("1.2M".to_string()))
        );
    }

    #[test]
    fn found_platforms_are_listed_for_the_merge() {
        let record = SocialPlatform::Twitter
            .parse(r#""followers_count":52000"#, "https://twitter.com/acme")
            .expect("record");
        assert_eq!(
            record.fields.get("platforms"),
            Some(&FieldValue::Items(vec!["Twitter".to_string()]))
        );
    }
}
