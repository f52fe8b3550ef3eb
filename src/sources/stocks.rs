//! Stock-data lookup: ticker resolution, public fundamentals, and
//! best-effort private-company estimates.

use crate::facet::{SourceRecord, SourceRef};
use crate::fetch::{self, FetchError};
use crate::sources::{reliability, search, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

const ENDPOINT: &str = "https://www.alphavantage.co/query";

/// Ticker shortcuts for companies whose symbols never match a name-derived
/// guess; last-resort fallback when the symbol search yields nothing.
const KNOWN_TICKERS: &[(&str, &str)] = &[
    ("tesla", "TSLA"),
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("amazon", "AMZN"),
    ("facebook", "META"),
    ("meta", "META"),
    ("netflix", "NFLX"),
    ("nvidia", "NVDA"),
    ("walmart", "WMT"),
    ("disney", "DIS"),
    ("boeing", "BA"),
    ("coca cola", "KO"),
    ("mcdonalds", "MCD"),
    ("visa", "V"),
    ("mastercard", "MA"),
    ("paypal", "PYPL"),
    ("uber", "UBER"),
    ("airbnb", "ABNB"),
    ("zoom", "ZM"),
];

/// Revenue-per-employee rough estimates by industry, in dollars.
const REVENUE_PER_EMPLOYEE: &[(&str, f64)] = &[
    ("technology", 200_000.0),
    ("software", 250_000.0),
    ("finance", 300_000.0),
    ("consulting", 150_000.0),
    ("manufacturing", 400_000.0),
    ("retail", 100_000.0),
];
const DEFAULT_REVENUE_PER_EMPLOYEE: f64 = 200_000.0;

static FUNDING_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:raised|funding|valuation of|valued at)[^.]*?\$\s*([\d.]+)\s*(million|billion)")
        .expect("funding pattern")
});
static EMPLOYEE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d,]+)\+?\s*employees").expect("employee pattern"));

#[derive(Debug, Deserialize)]
struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: HashMap<String, String>,
}

/// Adapter over the Alpha Vantage market-data API, with a private-company
/// estimate ladder when no ticker resolves.
pub struct StockDataAdapter {
    client: Client,
    api_key: Option<String>,
}

impl StockDataAdapter {
    /// Builds the adapter; the API key is injected, never embedded.
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    fn query_url(&self, function: &str, extra: &[(&str, &str)]) -> Option<Url> {
        let key = self.api_key.as_deref()?;
        let mut params = vec![("function", function), ("apikey", key)];
        params.extend_from_slice(extra);
        Url::parse_with_params(ENDPOINT, &params).ok()
    }

    async fn symbol_search(&self, company: &str) -> Option<String> {
        let url = self.query_url("SYMBOL_SEARCH", &[("keywords", company)])?;
        let response: SymbolSearchResponse =
            fetch::get_json(&self.client, url.as_str(), &[]).await.ok()?;
        response
            .best_matches
            .first()
            .and_then(|best| best.get("1. symbol").cloned())
            .filter(|symbol| !symbol.is_empty())
    }

    async fn quote_price(&self, ticker: &str) -> Option<f64> {
        let url = self.query_url("GLOBAL_QUOTE", &[("symbol", ticker)])?;
        let response: GlobalQuoteResponse =
            fetch::get_json(&self.client, url.as_str(), &[]).await.ok()?;
        response
            .quote
            .get("05. price")
            .and_then(|price| price.parse::<f64>().ok())
    }

    /// Ticker resolution ladder: symbol search, known-company table, then
    /// name-derived guesses validated against a live quote.
    async fn search_ticker(&self, company: &str) -> Option<String> {
        if let Some(symbol) = self.symbol_search(company).await {
            return Some(symbol);
        }
        if let Some(symbol) = known_ticker(company) {
            return Some(symbol.to_string());
        }
        for candidate in ticker_guesses(company) {
            if self.quote_price(&candidate).await.is_some() {
                return Some(candidate);
            }
        }
        None
    }

    async fn public_financials(&self, ticker: &str) -> Result<SourceRecord, FetchError> {
        let url = self
            .query_url("OVERVIEW", &[("symbol", ticker)])
            .ok_or(FetchError::Status {
                url: ENDPOINT.to_string(),
                status: reqwest::StatusCode::UNAUTHORIZED,
            })?;
        let overview: HashMap<String, String> =
            fetch::get_json(&self.client, url.as_str(), &[]).await?;
        // A throttled or unknown symbol comes back as a note object with no
        // Name key; treat that as unavailable rather than a 0.9 record.
        if clean_field(&overview, "Name").is_none() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NO_CONTENT,
            });
        }
        let price = self.quote_price(ticker).await;

        let origin = SourceRef::new(
            "Stock Data API",
            format!("{ticker} fundamentals"),
            Some(format!("https://www.alphavantage.co/query?function=OVERVIEW&symbol={ticker}")),
        );
        let mut record = SourceRecord::new(origin, reliability::PUBLIC_FINANCIALS);
        record.set("data_type", Some("public_company"));
        record.set("ticker", Some(ticker));
        record.set("company_name", clean_field(&overview, "Name"));
        record.set("exchange", clean_field(&overview, "Exchange"));
        record.set("currency", clean_field(&overview, "Currency"));
        record.set("sector", clean_field(&overview, "Sector"));
        record.set("industry", clean_field(&overview, "Industry"));
        record.set("pe_ratio", clean_field(&overview, "PERatio"));
        record.set("eps", clean_field(&overview, "EPS"));
        record.set("profit_margin", clean_field(&overview, "ProfitMargin"));
        record.set("dividend_yield", clean_field(&overview, "DividendYield"));
        record.set("beta", clean_field(&overview, "Beta"));
        record.set("fifty_two_week_high", clean_field(&overview, "52WeekHigh"));
        record.set("fifty_two_week_low", clean_field(&overview, "52WeekLow"));
        record.set("target_price", clean_field(&overview, "AnalystTargetPrice"));
        record.set(
            "market_cap",
            numeric_field(&overview, "MarketCapitalization").map(format_currency),
        );
        record.set(
            "revenue_ttm",
            numeric_field(&overview, "RevenueTTM").map(format_currency),
        );
        record.set(
            "shares_outstanding",
            numeric_field(&overview, "SharesOutstanding").map(format_currency_bare),
        );
        record.set("current_price", price.map(|p| format!("${p:.2}")));
        record.set(
            "last_updated",
            Some(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        Ok(record)
    }

    /// Best-effort private-company estimates mined from search snippets.
    /// Each evidence tier adds a fixed weight, capped well below what
    /// exchange-reported data earns.
    async fn private_estimates(&self, company: &str) -> SourceRecord {
        let hits = search::duckduckgo(
            &self.client,
            &format!("\"{company}\" funding round raised valuation"),
            5,
        )
        .await;
        let text = hits
            .iter()
            .map(|hit| format!("{} {}", hit.title, hit.snippet))
            .collect::<Vec<_>>()
            .join(" ");

        let origin = SourceRef::new(
            "Industry Analysis",
            "Private company estimates",
            hits.first().map(|hit| hit.url.clone()).filter(|u| !u.is_empty()),
        );
        let mut weight: f64 = 0.0;
        let mut record = SourceRecord::new(origin, 0.0);
        record.set("data_type", Some("private_company_estimates"));
        record.set("company_name", Some(company));

        if let Some(caps) = FUNDING_AMOUNT.captures(&text) {
            let amount = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let unit = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            record.set("funding_info", Some(format!("${amount} {unit} reported")));
            weight += 0.3;
        }

        let lower = text.to_lowercase();
        if let Some((industry, _)) = crate::extract::SEGMENT_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
        {
            record.set("industry", Some(*industry));
            weight += 0.2;
        }

        if let Some(count) = EMPLOYEE_COUNT
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        {
            record.set("employee_count", Some(count.to_string()));
            let per_head = record
                .fields
                .get("industry")
                .and_then(|value| match value {
                    crate::facet::FieldValue::Text(industry) => Some(industry.to_lowercase()),
                    _ => None,
                })
                .and_then(|industry| {
                    REVENUE_PER_EMPLOYEE
                        .iter()
                        .find(|(name, _)| industry.contains(name))
                        .map(|(_, value)| *value)
                })
                .unwrap_or(DEFAULT_REVENUE_PER_EMPLOYEE);
            record.set(
                "estimated_revenue",
                Some(format_currency(count as f64 * per_head)),
            );
            weight += 0.1;
        }

        record.set(
            "last_updated",
            Some(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        record.reliability = weight.min(reliability::PRIVATE_FINANCIALS_CAP);
        record
    }
}

#[async_trait]
impl SourceAdapter for StockDataAdapter {
    fn name(&self) -> &'static str {
        "stock-data"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        if let Some(ticker) = self.search_ticker(company).await {
            match self.public_financials(&ticker).await {
                Ok(record) => return SourceOutcome::Fetched(record),
                Err(err) => {
                    tracing::debug!(%ticker, %err, "public fundamentals unavailable");
                }
            }
        }
        let estimates = self.private_estimates(company).await;
        if estimates.reliability > 0.0 {
            SourceOutcome::Fetched(estimates)
        } else {
            SourceOutcome::missing("stock-data", "no ticker and no estimate evidence")
        }
    }
}

fn known_ticker(company: &str) -> Option<&'static str> {
    let lower = company.to_lowercase();
    KNOWN_TICKERS
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, ticker)| *ticker)
}

fn ticker_guesses(company: &str) -> Vec<String> {
    let cleaned: String = company
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let mut guesses = Vec::new();
    if let Some(first) = cleaned.split_whitespace().next() {
        guesses.push(first.to_uppercase());
    }
    let squashed: String = cleaned.split_whitespace().collect::<String>().to_uppercase();
    if !squashed.is_empty() && !guesses.contains(&squashed) && squashed.len() <= 5 {
        guesses.push(squashed);
    }
    guesses
}

fn clean_field(map: &HashMap<String, String>, key: &str) -> Option<String> {
    map.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != "None" && value != "-")
}

fn numeric_field(map: &HashMap<String, String>, key: &str) -> Option<f64> {
    clean_field(map, key).and_then(|value| value.parse::<f64>().ok())
}

/// Formats dollar amounts with magnitude suffixes.
fn format_currency(amount: f64) -> String {
    format!("${}", format_magnitude(amount))
}

fn format_currency_bare(amount: f64) -> String {
    format_magnitude(amount)
}

fn format_magnitude(amount: f64) -> String {
    if amount >= 1e12 {
        format!("{:.2}T", amount / 1e12)
    } else if amount >= 1e9 {
        format!("{:.2}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("{:.2}M", amount / 1e6)
    } else if amount >= 1e3 {
        format!("{:.2}K", amount / 1e3)
    } else {
        format!("{amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_table_matches_on_substring() {
        assert_eq!(known_ticker("Tesla, Inc."), Some("TSLA"));
        assert_eq!(known_ticker("Meta Platforms"), Some("META"));
        assert_eq!(known_ticker("Unheard Of Ventures"), None);
    }

    #[test]
    fn ticker_guesses_come_from_the_name() {
        // The squashed form is kept only when short enough to be a symbol.
        assert_eq!(ticker_guesses("Acme, Inc."), vec!["ACME".to_string()]);
        assert_eq!(
            ticker_guesses("Big Co"),
            vec!["BIG".to_string(), "BIGCO".to_string()]
        );
    }

    #[test]
    fn currency_formatting_uses_magnitude_suffixes() {
        assert_eq!(format_currency(1_500_000_000_000.0), "$1.50T");
        assert_eq!(format_currency(2_300_000_000.0), "$2.30B");
        assert_eq!(format_currency(45_000_000.0), "$45.00M");
        assert_eq!(format_currency(9_800.0), "$9.80K");
        assert_eq!(format_currency(42.0), "$42.00");
    }

    #[test]
    fn alpha_vantage_none_values_are_dropped() {
        let mut map = HashMap::new();
        map.insert("PERatio".to_string(), "None".to_string());
        map.insert("EPS".to_string(), "4.30".to_string());
        assert_eq!(clean_field(&map, "PERatio"), None);
        assert_eq!(clean_field(&map, "EPS"), Some("4.30".to_string()));
        assert_eq!(numeric_field(&map, "EPS"), Some(4.3));
    }

    #[test]
    fn funding_snippets_yield_an_amount() {
        let caps = FUNDING_AMOUNT
            .captures("The startup raised $120 million in a Series C round")
            .expect("funding match");
        assert_eq!(&caps[1], "120");
        assert_eq!(caps[2].to_lowercase(), "million");
    }
}
