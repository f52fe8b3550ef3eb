//! Orchestration: sequential facet execution over a current-thread runtime.

use crate::aggregate::{self, FacetSchema};
use crate::config::ResearchConfig;
use crate::facet::{CompanyQuery, Facet, FacetResult};
use crate::fetch::{self, FetchError};
use crate::score::ScoreTunables;
use crate::sources::{
    collect_records,
    competitors::CompetitorsAdapter,
    customers::{SearchClientsAdapter, WebsiteClientsAdapter, WikiClientsAdapter},
    jobs::{JSearchAdapter, RemoteOkAdapter, SimplyHiredAdapter, WeWorkRemotelyAdapter},
    news::NewsAdapter,
    reviews::ReviewSnippetsAdapter,
    social::{SocialAdapter, SocialPlatform},
    stocks::StockDataAdapter,
    website::WebsiteAdapter,
    wikipedia::WikipediaAdapter,
    SourceAdapter,
};
use crate::synthesis::{self, LlmProvider, Synthesis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::runtime::Builder;

type DynError = Box<dyn std::error::Error + Send + Sync>;

const OVERVIEW_FIELDS: &[&str] = &[
    "description",
    "founded",
    "founders",
    "headquarters",
    "ownership",
    "history",
];
const FINANCIAL_FIELDS: &[&str] = &[
    "data_type",
    "company_name",
    "market_cap",
    "revenue_ttm",
    "sector",
];
const NEWS_FIELDS: &[&str] = &[
    "total_articles",
    "positive",
    "negative",
    "neutral",
    "key_articles",
];
const SOCIAL_FIELDS: &[&str] = &[
    "platforms",
    "linkedin_followers",
    "twitter_followers",
    "instagram_followers",
    "youtube_subscribers",
];
const COMPETITOR_FIELDS: &[&str] = &["competitors"];
const CUSTOMER_FIELDS: &[&str] = &["clients", "segments"];
const REVIEW_FIELDS: &[&str] = &["rating", "review_highlights"];
const JOB_FIELDS: &[&str] = &["jobs"];

/// The finished research artifact handed to report rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyReport {
    /// Company name exactly as queried.
    pub company: String,
    /// Pass-through contact email, if provided.
    pub contact_email: Option<String>,
    /// When the research run completed.
    pub generated_at: DateTime<Utc>,
    /// Facet name → aggregated result.
    pub facets: BTreeMap<String, FacetResult>,
    /// Optional LLM-synthesized brief.
    pub synthesis: Option<Synthesis>,
}

struct FacetPlan {
    schema: FacetSchema,
    adapters: Vec<Box<dyn SourceAdapter>>,
}

/// Orchestrator owning the HTTP client, configuration and the optional
/// synthesis collaborator for one or more research runs.
pub struct Researcher {
    client: reqwest::Client,
    config: ResearchConfig,
    provider: Option<Box<dyn LlmProvider>>,
}

impl Researcher {
    /// Builds the orchestrator and its shared HTTP client.
    pub fn new(config: ResearchConfig) -> Result<Self, FetchError> {
        let client = fetch::build_client(config.request_timeout)?;
        Ok(Self {
            client,
            config,
            provider: None,
        })
    }

    /// Attaches a synthesis collaborator.
    pub fn with_provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Researches one company: every enabled facet in order, adapters
    /// invoked sequentially most-authoritative first, best-effort
    /// throughout. Per-source failures never abort the run.
    pub async fn research(&self, query: &CompanyQuery) -> CompanyReport {
        let mut facets = BTreeMap::new();
        for facet in &self.config.facets {
            tracing::info!(facet = %facet, company = %query.name, "researching facet");
            let plan = self.facet_plan(*facet);
            let records =
                collect_records(&plan.adapters, &query.name, self.config.inter_call_delay).await;
            let result = aggregate::merge_records(&plan.schema, &records);
            tracing::info!(facet = %facet, confidence = result.confidence, "facet aggregated");
            facets.insert(facet.as_str().to_string(), result);
        }

        let synthesis = match &self.provider {
            Some(provider) => {
                Some(synthesis::synthesize(provider.as_ref(), &query.name, &facets).await)
            }
            None => None,
        };

        CompanyReport {
            company: query.name.clone(),
            contact_email: query.contact_email.clone(),
            generated_at: Utc::now(),
            facets,
            synthesis,
        }
    }

    /// Adapter registrations per facet, most authoritative first. The
    /// official site outranks the encyclopedia for self-described content,
    /// matching the merge precedence the overview facet wants for
    /// descriptions; structured attributes only the encyclopedia yields are
    /// unaffected by the ordering.
    fn facet_plan(&self, facet: Facet) -> FacetPlan {
        let client = self.client.clone();
        match facet {
            Facet::Overview => FacetPlan {
                schema: FacetSchema::new(facet, OVERVIEW_FIELDS, self.config.overview_tunables),
                adapters: vec![
                    Box::new(WebsiteAdapter::new(client.clone())),
                    Box::new(WikipediaAdapter::new(client)),
                ],
            },
            Facet::Financials => FacetPlan {
                schema: FacetSchema::new(facet, FINANCIAL_FIELDS, ScoreTunables::weight_sum()),
                adapters: vec![Box::new(StockDataAdapter::new(
                    client,
                    self.config.alpha_vantage_key.clone(),
                ))],
            },
            Facet::News => {
                let adapters: Vec<Box<dyn SourceAdapter>> = match &self.config.news_api_key {
                    Some(key) => vec![Box::new(NewsAdapter::new(client, key.clone()))],
                    None => Vec::new(),
                };
                FacetPlan {
                    schema: FacetSchema::new(facet, NEWS_FIELDS, ScoreTunables::weight_sum()),
                    adapters,
                }
            }
            Facet::Social => FacetPlan {
                schema: FacetSchema::new(facet, SOCIAL_FIELDS, ScoreTunables::weight_sum()),
                adapters: vec![
                    Box::new(SocialAdapter::new(SocialPlatform::LinkedIn, client.clone())),
                    Box::new(SocialAdapter::new(SocialPlatform::Twitter, client.clone())),
                    Box::new(SocialAdapter::new(
                        SocialPlatform::Instagram,
                        client.clone(),
                    )),
                    Box::new(SocialAdapter::new(SocialPlatform::YouTube, client)),
                ],
            },
            Facet::Competitors => {
                let adapters: Vec<Box<dyn SourceAdapter>> = match &self.config.rapidapi_key {
                    Some(key) => vec![Box::new(CompetitorsAdapter::new(client, key.clone()))],
                    None => Vec::new(),
                };
                FacetPlan {
                    schema: FacetSchema::new(facet, COMPETITOR_FIELDS, ScoreTunables::weight_sum()),
                    adapters,
                }
            }
            Facet::Customers => FacetPlan {
                schema: FacetSchema::new(facet, CUSTOMER_FIELDS, ScoreTunables::weight_sum()),
                adapters: vec![
                    Box::new(WikiClientsAdapter::new(client.clone())),
                    Box::new(WebsiteClientsAdapter::new(client.clone())),
                    Box::new(SearchClientsAdapter::new(
                        client,
                        self.config.search_query_delay,
                    )),
                ],
            },
            Facet::Reviews => FacetPlan {
                schema: FacetSchema::new(facet, REVIEW_FIELDS, self.config.review_tunables),
                adapters: vec![Box::new(ReviewSnippetsAdapter::new(
                    client,
                    self.config.search_query_delay,
                ))],
            },
            Facet::Jobs => {
                let mut adapters: Vec<Box<dyn SourceAdapter>> = vec![
                    Box::new(SimplyHiredAdapter::new(client.clone())),
                    Box::new(RemoteOkAdapter::new(client.clone())),
                    Box::new(WeWorkRemotelyAdapter::new(client.clone())),
                ];
                if let Some(key) = &self.config.rapidapi_key {
                    adapters.push(Box::new(JSearchAdapter::new(client, key.clone())));
                }
                FacetPlan {
                    schema: FacetSchema::new(facet, JOB_FIELDS, ScoreTunables::weight_sum()),
                    adapters,
                }
            }
        }
    }
}

/// Entry point used by the binary: builds a current-thread runtime and
/// drives one research run to completion on it.
pub fn run(
    config: ResearchConfig,
    query: &CompanyQuery,
    provider: Option<Box<dyn LlmProvider>>,
) -> Result<CompanyReport, DynError> {
    let rt = Builder::new_current_thread().enable_all().build()?;
    let mut researcher = Researcher::new(config)?;
    if let Some(provider) = provider {
        researcher = researcher.with_provider(provider);
    }
    Ok(rt.block_on(researcher.research(query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_facet_has_a_plan() {
        let researcher = Researcher::new(ResearchConfig::default()).expect("researcher");
        for facet in Facet::ALL {
            let plan = researcher.facet_plan(facet);
            assert_eq!(plan.schema.facet, facet);
            assert!(!plan.schema.expected.is_empty());
        }
    }

    #[test]
    fn keyed_facets_register_no_adapters_without_credentials() {
        let researcher = Researcher::new(ResearchConfig::default()).expect("researcher");
        assert!(researcher.facet_plan(Facet::News).adapters.is_empty());
        assert!(researcher
            .facet_plan(Facet::Competitors)
            .adapters
            .is_empty());
        // Job boards scrape without a key; the listings API joins when one
        // is present.
        assert_eq!(researcher.facet_plan(Facet::Jobs).adapters.len(), 3);

        let keyed = Researcher::new(ResearchConfig {
            rapidapi_key: Some("k".to_string()),
            ..ResearchConfig::default()
        })
        .expect("researcher");
        assert_eq!(keyed.facet_plan(Facet::Jobs).adapters.len(), 4);
    }
}
