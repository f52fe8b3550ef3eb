//! Pattern-ladder extraction of structured attributes from free text.
//!
//! Every extractor works the same way: an ordered table of regular
//! expressions, most specific first, evaluated until one matches. The tables
//! are data, not branch cascades, so adding a pattern is a one-line change.
//! Extraction is deterministic and a miss is simply `None`.

use regex::Regex;
use std::sync::LazyLock;

/// Minimum length for an extracted name; shorter matches are noise.
const MIN_NAME_LEN: usize = 3;

const FOUNDED_PATTERNS: &[&str] = &[
    r"(?i)founded in (\d{4})",
    r"(?i)established in (\d{4})",
    r"(?i)incorporated in (\d{4})",
    r"(?i)founded on.*?(\d{4})",
    r"(?i)established on.*?(\d{4})",
    r"(?i)founded.*?(\d{4})",
    r"(?i)established.*?(\d{4})",
    r"(?i)formed in (\d{4})",
    r"(?i)created in (\d{4})",
];

const FOUNDER_PATTERNS: &[&str] = &[
    r"(?i)co-founded by ([^.]+)",
    r"(?i)founded by ([^.]+)",
    r"(?i)founders? ([^.]+)",
    r"(?i)established by ([^.]+)",
    r"(?i)created by ([^.]+)",
];

const HEADQUARTERS_PATTERNS: &[&str] = &[
    r"(?i)headquartered in ([^.]+)",
    r"(?i)headquarters in ([^.]+)",
    r"(?i)based in ([^.]+)",
    r"(?i)located in ([^.]+)",
    r"(?i)headquarters:? ([^.]+)",
    r"(?i)HQ:? ([^.]+)",
];

const SUBSIDIARY_PATTERNS: &[&str] = &[
    r"(?i)subsidiary of ([^.]+)",
    r"(?i)owned by ([^.]+)",
    r"(?i)division of ([^.]+)",
];

const PUBLIC_MARKERS: &[&str] = &[
    "publicly traded",
    "public company",
    "listed on",
    "trades on",
    "nasdaq",
    "nyse",
    "stock exchange",
];

const PRIVATE_MARKERS: &[&str] = &["private company", "privately held", "private corporation"];

const HISTORY_KEYWORDS: &[&str] = &[
    "history",
    "founded",
    "established",
    "started",
    "began",
    "originally",
    "initially",
    "first",
    "early",
    "development",
];

/// Keywords flagging an article as negative; checked before the positive set.
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "controversy",
    "lawsuit",
    "scandal",
    "decline",
    "loss",
    "fired",
    "problem",
    "drop",
    "decrease",
    "fall",
    "worst",
    "crash",
    "fails",
    "wrong",
    "mistake",
    "regulatory",
    "caught",
    "low",
    "down",
    "challenge",
    "issue",
    "concern",
    "warning",
    "risk",
    "threat",
    "crisis",
];

/// Keywords flagging an article as positive.
pub const POSITIVE_KEYWORDS: &[&str] = &[
    "growth",
    "success",
    "expansion",
    "funding",
    "award",
    "innovation",
    "profit",
    "launch",
    "breakthrough",
    "achievement",
    "delivered",
    "completed",
    "strong",
    "record",
    "best",
    "win",
    "milestone",
    "advance",
    "progress",
    "improve",
    "boost",
    "rise",
    "up",
];

/// Keywords suggesting an article describes a controversy.
pub const CONTROVERSY_KEYWORDS: &[&str] = &[
    "lawsuit",
    "scandal",
    "investigation",
    "fine",
    "penalty",
    "controversy",
    "criticized",
    "accused",
];

/// Keywords suggesting an article announces future plans.
pub const FUTURE_PLAN_KEYWORDS: &[&str] = &[
    "expansion",
    "hiring",
    "plans to",
    "will launch",
    "upcoming",
    "announced",
];

const CLIENT_PATTERNS: &[&str] = &[
    r"(?im)(?:major\s+)?(?:clients?|customers?|partners?)\s+(?:include|are|such as|like)[\s:]*([A-Z][a-zA-Z\s&.,-]+?)(?:\s*[,;.]|$)",
    r"(?im)(?:works?\s+with|serves?|partnered?\s+with)\s+([A-Z][a-zA-Z\s&.,-]+?)(?:\s*[,;.]|$)",
    r"(?im)(?:case\s+studies?|success\s+stories?)\s+.*?([A-Z][a-zA-Z\s&.,-]{3,30})(?:\s*[,;.]|$)",
    r"(?im)([A-Z][a-zA-Z\s&.,-]{3,30})\s+(?:uses?|chose|selected|implemented|deployed)",
    r"(?im)(?:partnership|collaboration|alliance)\s+with\s+([A-Z][a-zA-Z\s&.,-]+?)(?:\s*[,;.]|$)",
];

/// Customer-segment name plus the keywords that evidence it.
pub const SEGMENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("Enterprise", &["enterprise", "large enterprise", "fortune 500", "big business"]),
    ("SMB", &["small business", "smb", "small to medium", "mid-market", "middle market"]),
    ("Startups", &["startup", "start-up", "emerging companies", "early stage"]),
    ("Government", &["government", "public sector", "federal", "municipal"]),
    ("Healthcare", &["healthcare", "hospitals", "medical", "pharma"]),
    ("Financial Services", &["banks", "financial", "fintech", "insurance"]),
    ("Technology", &["tech companies", "software", "saas", "it services"]),
    ("Manufacturing", &["manufacturing", "industrial", "factory"]),
    ("Retail", &["retail", "e-commerce", "merchants", "stores"]),
    ("Education", &["education", "schools", "universities", "academic"]),
];

const RATING_PATTERNS: &[&str] = &[
    r"(?i)(\d\.\d)\s*out of\s*5",
    r"(?i)(\d\.\d)\s*/\s*5",
    r"(?i)rated\s*(\d\.\d)",
    r"(?i)(\d\.\d)\s*stars?",
    r"(?i)rating[:\s]+(\d\.\d)",
];

static FOUNDED: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(FOUNDED_PATTERNS));
static FOUNDERS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(FOUNDER_PATTERNS));
static HEADQUARTERS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(HEADQUARTERS_PATTERNS));
static SUBSIDIARY: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(SUBSIDIARY_PATTERNS));
static CLIENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(CLIENT_PATTERNS));
static RATING: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(RATING_PATTERNS));
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern"));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("extraction pattern compiles"))
        .collect()
}

/// Returns the first capture of the first matching pattern in the ladder.
fn first_capture(ladder: &[Regex], text: &str) -> Option<String> {
    ladder.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Removes parenthetical asides before matching downstream.
pub fn strip_parentheticals(text: &str) -> String {
    PARENTHETICAL.replace_all(text, "").into_owned()
}

/// Extracts a four-digit founding year.
pub fn founding_year(text: &str) -> Option<String> {
    first_capture(&FOUNDED, text)
}

/// Extracts founder names, split on commas, ampersands and "and".
pub fn founders(text: &str) -> Option<Vec<String>> {
    let raw = first_capture(&FOUNDERS, text)?;
    let cleaned = strip_parentheticals(&raw);
    let names: Vec<String> = cleaned
        .split(&[',', '&'])
        .flat_map(|part| part.split(" and "))
        .map(|name| name.trim().trim_matches(&['.', ';', ':'][..]).to_string())
        .filter(|name| name.len() >= MIN_NAME_LEN)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Extracts the headquarters location.
pub fn headquarters(text: &str) -> Option<String> {
    let raw = first_capture(&HEADQUARTERS, text)?;
    let location = strip_parentheticals(&raw);
    let normalized = location.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.len() >= MIN_NAME_LEN {
        Some(normalized)
    } else {
        None
    }
}

/// Classifies ownership structure. Subsidiary mentions take precedence over
/// public markers, which take precedence over private markers.
pub fn ownership(text: &str) -> Option<String> {
    if let Some(parent) = first_capture(&SUBSIDIARY, text) {
        let parent = strip_parentheticals(&parent);
        let parent = parent.trim();
        if parent.len() >= MIN_NAME_LEN {
            return Some(format!("Subsidiary of {parent}"));
        }
    }
    let lower = text.to_lowercase();
    if PUBLIC_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some("Publicly traded".to_string());
    }
    if PRIVATE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return Some("Private company".to_string());
    }
    None
}

/// Pulls up to three history-flavored sentences longer than 20 characters.
pub fn history(text: &str) -> Option<String> {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|sentence| sentence.len() > 20)
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            HISTORY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .take(3)
        .collect();
    if sentences.is_empty() {
        None
    } else {
        Some(format!("{}.", sentences.join(". ")))
    }
}

/// Deduplicates description lines and keeps the first three substantial ones.
pub fn clean_description(raw: &str) -> Option<String> {
    let mut seen = Vec::new();
    for line in raw.lines() {
        let cleaned = line.trim();
        if cleaned.len() > 10 && !seen.iter().any(|kept: &&str| kept == &cleaned) {
            seen.push(cleaned);
        }
        if seen.len() == 3 {
            break;
        }
    }
    if seen.is_empty() {
        None
    } else {
        Some(seen.join(" "))
    }
}

/// Article polarity derived from keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    /// Matched the positive keyword table.
    Positive,
    /// Matched the negative keyword table.
    Negative,
    /// Matched neither table.
    Neutral,
}

impl Sentiment {
    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Classifies an article by keyword; negative keywords win ties because a
/// downside mention dominates reader perception of the piece.
pub fn classify_sentiment(title: &str, description: &str) -> (Sentiment, Option<&'static str>) {
    let haystack = format!("{} {}", title.to_lowercase(), description.to_lowercase());
    if let Some(keyword) = NEGATIVE_KEYWORDS
        .iter()
        .find(|keyword| haystack.contains(**keyword))
    {
        return (Sentiment::Negative, Some(keyword));
    }
    if let Some(keyword) = POSITIVE_KEYWORDS
        .iter()
        .find(|keyword| haystack.contains(**keyword))
    {
        return (Sentiment::Positive, Some(keyword));
    }
    (Sentiment::Neutral, None)
}

/// Returns the keywords from `table` found in the title or description.
pub fn matched_keywords(
    table: &'static [&'static str],
    title: &str,
    description: &str,
) -> Vec<&'static str> {
    let haystack = format!("{} {}", title.to_lowercase(), description.to_lowercase());
    table
        .iter()
        .filter(|keyword| haystack.contains(**keyword))
        .copied()
        .collect()
}

/// Mines candidate client names out of prose, rejecting the company itself,
/// stop-words and implausibly short or long captures.
pub fn client_mentions(text: &str, company: &str) -> Vec<String> {
    const STOPWORDS: &[&str] = &["the", "and", "with", "our", "all", "more", "other"];
    let mut clients = Vec::new();
    for pattern in CLIENTS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let name = m.as_str().trim_matches(&[' ', '.', ',', ';', ':'][..]);
            if name.len() <= MIN_NAME_LEN || name.len() >= 50 {
                continue;
            }
            if name.eq_ignore_ascii_case(company)
                || STOPWORDS.iter().any(|stop| name.eq_ignore_ascii_case(stop))
            {
                continue;
            }
            if !clients.iter().any(|seen: &String| seen.eq_ignore_ascii_case(name)) {
                clients.push(name.to_string());
            }
        }
    }
    clients
}

/// Returns the customer segments evidenced in the text, each at most once.
pub fn customer_segments(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SEGMENT_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(segment, _)| segment.to_string())
        .collect()
}

/// Extracts an employer-review rating like "4.2 out of 5".
pub fn review_rating(text: &str) -> Option<String> {
    first_capture(&RATING, text).filter(|rating| {
        rating
            .parse::<f64>()
            .map(|value| (0.0..=5.0).contains(&value))
            .unwrap_or(false)
    })
}
