#![warn(missing_docs)]
//! Confidence-weighted multi-source aggregation of open-source company
//! intelligence.
//!
//! For each research facet — overview, financials, news, social presence,
//! competitors, customers, employer reviews, job postings — several
//! independent, unreliable sources are queried in authority order, their
//! partial results merged, and a `[0, 1]` confidence score derived from
//! source reliability and field completeness. Per-source failures degrade
//! the result; they never abort a run.

pub mod aggregate;
pub mod config;
pub mod extract;
pub mod facet;
pub mod fetch;
pub mod report;
pub mod resolve;
pub mod runtime;
pub mod score;
pub mod sources;
pub mod synthesis;

pub use aggregate::{merge_records, FacetSchema};
pub use config::{Cli, ConfigError, ResearchConfig, SynthesisArg};
pub use facet::{CompanyQuery, Facet, FacetResult, FieldValue, SourceRecord, SourceRef, SENTINEL};
pub use runtime::{run, CompanyReport, Researcher};
pub use score::ScoreTunables;
pub use sources::{SourceAdapter, SourceMiss, SourceOutcome};
pub use synthesis::{LlmProvider, ProviderRequest, Synthesis};
