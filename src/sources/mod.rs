//! Source adapters: one component per external data source.
//!
//! Adapters share a single contract: given a company name, return a
//! [`SourceRecord`] or a missing-source outcome within the client's bounded
//! timeout. They never raise — every network or parsing failure is converted
//! into [`SourceOutcome::Missing`] so the aggregator can inspect outcomes
//! without exception interception.

use crate::facet::SourceRecord;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

pub mod competitors;
pub mod customers;
pub mod jobs;
pub mod news;
pub mod reviews;
pub mod search;
pub mod social;
pub mod stocks;
pub mod website;
pub mod wikipedia;

/// Per-source reliability weights, tuned against observed source quality and
/// kept in one place so facet divisors stay in sync with them.
pub mod reliability {
    /// Encyclopedic summaries are curated but can lag reality.
    pub const WIKIPEDIA: f64 = 0.85;
    /// Self-published about pages are current but promotional.
    pub const WEBSITE: f64 = 0.75;
    /// Exchange-reported fundamentals for public companies.
    pub const PUBLIC_FINANCIALS: f64 = 0.9;
    /// Ceiling for private-company estimate ladders.
    pub const PRIVATE_FINANCIALS_CAP: f64 = 0.6;
    /// Each social platform contributes a quarter of the facet.
    pub const SOCIAL_PLATFORM: f64 = 0.25;
    /// Each job board contributes a quarter of the facet.
    pub const JOB_BOARD: f64 = 0.25;
    /// Traffic-analytics competitor API.
    pub const COMPETITOR_API: f64 = 0.8;
    /// Wikipedia prose mined for client mentions.
    pub const CUSTOMER_WIKIPEDIA: f64 = 0.4;
    /// Company-site prose mined for client mentions.
    pub const CUSTOMER_WEBSITE: f64 = 0.3;
    /// Web-search snippets mined for client mentions.
    pub const CUSTOMER_SEARCH: f64 = 0.3;
    /// Review-site search snippets.
    pub const REVIEW_SNIPPETS: f64 = 0.5;
}

/// Why a source produced no data. Recovered locally, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMiss {
    /// Adapter that missed.
    pub source: &'static str,
    /// Human-readable reason, for logs only.
    pub reason: String,
}

/// Outcome of a single adapter call — the explicit result type the
/// aggregator branches on.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// The source yielded a record (possibly sparse).
    Fetched(SourceRecord),
    /// The source yielded nothing usable.
    Missing(SourceMiss),
}

impl SourceOutcome {
    /// Shorthand for a missing outcome.
    pub fn missing(source: &'static str, reason: impl Into<String>) -> Self {
        SourceOutcome::Missing(SourceMiss {
            source,
            reason: reason.into(),
        })
    }

    /// Unwraps the record, if any.
    pub fn into_record(self) -> Option<SourceRecord> {
        match self {
            SourceOutcome::Fetched(record) => Some(record),
            SourceOutcome::Missing(_) => None,
        }
    }
}

/// A component that queries exactly one external data source for one facet.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetches data for the company, converting every failure into
    /// [`SourceOutcome::Missing`].
    async fn fetch(&self, company: &str) -> SourceOutcome;
}

/// Invokes adapters one after another in registration (authority) order,
/// waiting `delay` between calls to stay under third-party rate limits, and
/// returns the fetched records in that same order. Rank-based merging is
/// preserved by construction: the output order never depends on completion
/// timing.
pub async fn collect_records(
    adapters: &[Box<dyn SourceAdapter>],
    company: &str,
    delay: Duration,
) -> Vec<SourceRecord> {
    let mut records = Vec::new();
    for (index, adapter) in adapters.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            sleep(delay).await;
        }
        match adapter.fetch(company).await {
            SourceOutcome::Fetched(record) => {
                tracing::debug!(source = adapter.name(), fields = record.fields.len(), "source fetched");
                records.push(record);
            }
            SourceOutcome::Missing(miss) => {
                tracing::debug!(source = miss.source, reason = %miss.reason, "source missing");
            }
        }
    }
    records
}
