//! Competitor lookup via a traffic-analytics company-details API.

use crate::facet::{SourceRecord, SourceRef};
use crate::fetch;
use crate::sources::{reliability, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

const ENDPOINT: &str = "https://similarweb12.p.rapidapi.com/v2/company-details";
const HOST: &str = "similarweb12.p.rapidapi.com";

#[derive(Debug, Deserialize)]
struct CompanyDetails {
    #[serde(default)]
    competitors: HashMap<String, Vec<Competitor>>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(rename = "employeesMin", default)]
    employees_min: Option<u64>,
    #[serde(rename = "employeesMax", default)]
    employees_max: Option<u64>,
    #[serde(rename = "totalVisits", default)]
    total_visits: Option<f64>,
    #[serde(rename = "headquarterCity", default)]
    hq_city: Option<String>,
    #[serde(rename = "headquarterCountryCode", default)]
    hq_country: Option<String>,
}

impl Competitor {
    fn describe(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        let domain = self.domain.as_deref().unwrap_or("N/A");
        let mut line = format!("{name} ({domain})");
        if let (Some(min), Some(max)) = (self.employees_min, self.employees_max) {
            line.push_str(&format!(", {min}–{max} employees"));
        }
        if let Some(visits) = self.total_visits {
            line.push_str(&format!(", {:.0} monthly visits", visits));
        }
        match (self.hq_city.as_deref(), self.hq_country.as_deref()) {
            (Some(city), Some(country)) => line.push_str(&format!(", HQ {city}, {country}")),
            (Some(city), None) => line.push_str(&format!(", HQ {city}")),
            _ => {}
        }
        Some(line)
    }
}

/// Adapter over the SimilarWeb company-details endpoint, keyed by a domain
/// derived from the company name.
pub struct CompetitorsAdapter {
    client: Client,
    api_key: String,
}

impl CompetitorsAdapter {
    /// Builds the adapter; the API key is injected, never embedded.
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl SourceAdapter for CompetitorsAdapter {
    fn name(&self) -> &'static str {
        "competitors"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let domain = derive_domain(company);
        let Ok(url) = Url::parse_with_params(ENDPOINT, &[("company_domain", domain.as_str())])
        else {
            return SourceOutcome::missing("competitors", "query construction failed");
        };
        let headers = [
            ("x-rapidapi-key", self.api_key.as_str()),
            ("x-rapidapi-host", HOST),
        ];
        let details: CompanyDetails =
            match fetch::get_json(&self.client, url.as_str(), &headers).await {
                Ok(details) => details,
                Err(err) => return SourceOutcome::missing("competitors", err.to_string()),
            };

        let rivals: Vec<String> = details
            .competitors
            .get(&domain)
            .into_iter()
            .flatten()
            .filter_map(Competitor::describe)
            .collect();
        if rivals.is_empty() {
            return SourceOutcome::missing("competitors", format!("no competitors for {domain}"));
        }

        let origin = SourceRef::new(
            "Traffic Analytics",
            format!("Competitors of {domain}"),
            Some(format!("https://www.similarweb.com/website/{domain}/")),
        );
        let mut record = SourceRecord::new(origin, reliability::COMPETITOR_API);
        record.set_items("competitors", rivals);
        SourceOutcome::Fetched(record)
    }
}

/// The same first-token domain guess the website adapter uses; the API keys
/// companies by their primary domain.
fn derive_domain(company: &str) -> String {
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
    format!("{token}.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_derivation_strips_designators() {
        assert_eq!(derive_domain("Tesla, Inc."), "tesla.com");
        assert_eq!(derive_domain("Acme"), "acme.com");
    }

    #[test]
    fn competitor_lines_include_optional_detail() {
        let competitor = Competitor {
            name: Some("Rival Co".to_string()),
            domain: Some("rival.com".to_string()),
            employees_min: Some(100),
            employees_max: Some(500),
            total_visits: Some(1_250_000.0),
            hq_city: Some("Berlin".to_string()),
            hq_country: Some("DE".to_string()),
        };
        assert_eq!(
            competitor.describe().expect("line"),
            "Rival Co (rival.com), 100–500 employees, 1250000 monthly visits, HQ Berlin, DE"
        );
    }

    #[test]
    fn nameless_competitors_are_dropped() {
        let competitor = Competitor {
            name: None,
            domain: Some("rival.com".to_string()),
            employees_min: None,
            employees_max: None,
            total_visits: None,
            hq_city: None,
            hq_country: None,
        };
        assert_eq!(competitor.describe(), None);
    }
}
