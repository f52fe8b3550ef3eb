//! Job-posting adapters: three board scrapes plus one listings API.

use crate::facet::{SourceRecord, SourceRef};
use crate::fetch;
use crate::sources::{reliability, SourceAdapter, SourceOutcome};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

const JSEARCH_ENDPOINT: &str = "https://jsearch.p.rapidapi.com/search";
const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";

fn job_record(kind: &str, url: Option<String>, jobs: Vec<String>) -> Option<SourceRecord> {
    if jobs.is_empty() {
        return None;
    }
    let origin = SourceRef::new(kind, format!("{} job postings", jobs.len()), url);
    let mut record = SourceRecord::new(origin, reliability::JOB_BOARD);
    record.set_items("jobs", jobs);
    Some(record)
}

fn mentions(haystack: &str, company: &str) -> bool {
    haystack.to_lowercase().contains(&company.to_lowercase())
}

/// SimplyHired search-results scrape.
pub struct SimplyHiredAdapter {
    client: Client,
    cards: Selector,
    title: Selector,
    location: Selector,
}

impl SimplyHiredAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cards: Selector::parse("div.card-content").expect("card selector"),
            title: Selector::parse("a").expect("title selector"),
            location: Selector::parse("span.jobposting-location").expect("location selector"),
        }
    }

    fn parse_jobs(&self, html: &str, company: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.cards)
            .filter_map(|card| {
                let title = card
                    .select(&self.title)
                    .next()?
                    .text()
                    .collect::<String>()
                    .trim()
                    .to_string();
                let location = card
                    .select(&self.location)
                    .next()?
                    .text()
                    .collect::<String>()
                    .trim()
                    .to_string();
                mentions(&title, company)
                    .then(|| format!("{title} — {location} (SimplyHired)"))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for SimplyHiredAdapter {
    fn name(&self) -> &'static str {
        "simplyhired"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let url = format!(
            "https://www.simplyhired.com/search?q={}",
            company.replace(' ', "+")
        );
        match fetch::get_text(&self.client, &url).await {
            Ok(html) => match job_record("SimplyHired", Some(url), self.parse_jobs(&html, company))
            {
                Some(record) => SourceOutcome::Fetched(record),
                None => SourceOutcome::missing("simplyhired", "no matching job cards"),
            },
            Err(err) => SourceOutcome::missing("simplyhired", err.to_string()),
        }
    }
}

/// RemoteOK listings-page scrape.
pub struct RemoteOkAdapter {
    client: Client,
    rows: Selector,
    title: Selector,
    company: Selector,
}

impl RemoteOkAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            rows: Selector::parse("tr.job").expect("row selector"),
            title: Selector::parse("h2").expect("title selector"),
            company: Selector::parse("h3").expect("company selector"),
        }
    }

    fn parse_jobs(&self, html: &str, company: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.rows)
            .filter_map(|row| {
                let title = row
                    .select(&self.title)
                    .next()?
                    .text()
                    .collect::<String>()
                    .trim()
                    .to_string();
                let employer = row
                    .select(&self.company)
                    .next()?
                    .text()
                    .collect::<String>()
                    .trim()
                    .to_string();
                (mentions(&employer, company) || mentions(&title, company))
                    .then(|| format!("{title} — Remote (RemoteOK)"))
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    fn name(&self) -> &'static str {
        "remoteok"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let url = "https://remoteok.com/remote-jobs".to_string();
        match fetch::get_text(&self.client, &url).await {
            Ok(html) => match job_record("RemoteOK", Some(url), self.parse_jobs(&html, company)) {
                Some(record) => SourceOutcome::Fetched(record),
                None => SourceOutcome::missing("remoteok", "no matching rows"),
            },
            Err(err) => SourceOutcome::missing("remoteok", err.to_string()),
        }
    }
}

/// WeWorkRemotely listings-page scrape.
pub struct WeWorkRemotelyAdapter {
    client: Client,
    sections: Selector,
    items: Selector,
    company: Selector,
    title: Selector,
}

impl WeWorkRemotelyAdapter {
    /// Builds the adapter around a shared client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            sections: Selector::parse("section.jobs").expect("section selector"),
            items: Selector::parse("li").expect("item selector"),
            company: Selector::parse("span.company").expect("company selector"),
            title: Selector::parse("span.title").expect("title selector"),
        }
    }

    fn parse_jobs(&self, html: &str, company: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut jobs = Vec::new();
        for section in document.select(&self.sections) {
            for item in section.select(&self.items) {
                let Some(employer) = item.select(&self.company).next() else {
                    continue;
                };
                let Some(title) = item.select(&self.title).next() else {
                    continue;
                };
                let employer = employer.text().collect::<String>().trim().to_string();
                let title = title.text().collect::<String>().trim().to_string();
                if mentions(&employer, company) || mentions(&title, company) {
                    jobs.push(format!("{title} — Remote (WeWorkRemotely)"));
                }
            }
        }
        jobs
    }
}

#[async_trait]
impl SourceAdapter for WeWorkRemotelyAdapter {
    fn name(&self) -> &'static str {
        "weworkremotely"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let url = "https://weworkremotely.com/remote-jobs".to_string();
        match fetch::get_text(&self.client, &url).await {
            Ok(html) => {
                match job_record("WeWorkRemotely", Some(url), self.parse_jobs(&html, company)) {
                    Some(record) => SourceOutcome::Fetched(record),
                    None => SourceOutcome::missing("weworkremotely", "no matching listings"),
                }
            }
            Err(err) => SourceOutcome::missing("weworkremotely", err.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JSearchResponse {
    #[serde(default)]
    data: Vec<JSearchJob>,
}

#[derive(Debug, Deserialize)]
struct JSearchJob {
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    job_city: Option<String>,
    #[serde(default)]
    job_country: Option<String>,
    #[serde(default)]
    employer_name: Option<String>,
}

/// JSearch listings API behind a RapidAPI key.
pub struct JSearchAdapter {
    client: Client,
    api_key: String,
}

impl JSearchAdapter {
    /// Builds the adapter; the API key is injected, never embedded.
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl SourceAdapter for JSearchAdapter {
    fn name(&self) -> &'static str {
        "jsearch"
    }

    async fn fetch(&self, company: &str) -> SourceOutcome {
        let Ok(url) = Url::parse_with_params(
            JSEARCH_ENDPOINT,
            &[("query", company), ("page", "1"), ("num_pages", "1")],
        ) else {
            return SourceOutcome::missing("jsearch", "query construction failed");
        };
        let headers = [
            ("X-RapidAPI-Key", self.api_key.as_str()),
            ("X-RapidAPI-Host", JSEARCH_HOST),
        ];
        let response: JSearchResponse =
            match fetch::get_json(&self.client, url.as_str(), &headers).await {
                Ok(response) => response,
                Err(err) => return SourceOutcome::missing("jsearch", err.to_string()),
            };

        let jobs: Vec<String> = response
            .data
            .iter()
            .filter(|job| {
                job.employer_name
                    .as_deref()
                    .map(|employer| mentions(employer, company))
                    .unwrap_or(false)
            })
            .filter_map(|job| {
                let title = job.job_title.as_deref()?;
                let location = job
                    .job_city
                    .as_deref()
                    .or(job.job_country.as_deref())
                    .unwrap_or("N/A");
                Some(format!("{title} — {location} (JSearch)"))
            })
            .collect();

        match job_record("JSearch API", Some(url.to_string()), jobs) {
            Some(record) => SourceOutcome::Fetched(record),
            None => SourceOutcome::missing("jsearch", "no matching listings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::FieldValue;

    #[test]
    fn simplyhired_cards_filter_on_the_company_name() {
        let adapter = SimplyHiredAdapter::new(Client::new());
        let html = r#"<html><body>
            <div class="card-content">
              <a>Acme Senior Engineer</a>
              <span class="jobposting-location">Austin, TX</span>
            </div>
            <div class="card-content">
              <a>Unrelated Role</a>
              <span class="jobposting-location">Remote</span>
            </div>
        </body></html>"#;
        let jobs = adapter.parse_jobs(html, "Acme");
        assert_eq!(jobs, vec!["Acme Senior Engineer — Austin, TX (SimplyHired)"]);
    }

    #[test]
    fn remoteok_matches_on_employer_or_title() {
        let adapter = RemoteOkAdapter::new(Client::new());
        let html = r#"<html><body><table>
            <tr class="job"><td><h2>Backend Engineer</h2><h3>Acme</h3></td></tr>
            <tr class="job"><td><h2>Designer</h2><h3>Other Co</h3></td></tr>
        </table></body></html>"#;
        let jobs = adapter.parse_jobs(html, "acme");
        assert_eq!(jobs, vec!["Backend Engineer — Remote (RemoteOK)"]);
    }

    #[test]
    fn weworkremotely_walks_sections_and_items() {
        let adapter = WeWorkRemotelyAdapter::new(Client::new());
        let html = r#"<html><body>
          <section class="jobs"><ul>
            <li><span class="company">Acme</span><span class="title">Platform Engineer</span></li>
            <li><span class="company">Beta</span><span class="title">Analyst</span></li>
          </ul></section>
        </body></html>"#;
        let jobs = adapter.parse_jobs(html, "Acme");
        assert_eq!(jobs, vec!["Platform Engineer — Remote (WeWorkRemotely)"]);
    }

    #[test]
    fn empty_scrapes_yield_no_record() {
        assert!(job_record("SimplyHired", None, Vec::new()).is_none());
        let record = job_record("SimplyHired", None, vec!["a".to_string()]).expect("record");
        assert_eq!(
            record.fields.get("jobs"),
            Some(&FieldValue::Items(vec!["a".to_string()]))
        );
    }
}
