//! Injected research configuration and the command-line interface that
//! builds it. API keys are never embedded in source; they arrive through
//! flags or environment variables and are handed to each adapter at
//! construction time.

use crate::facet::Facet;
use crate::score::ScoreTunables;
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the orchestrator needs to build its adapters.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// News-search service key; required when the news facet is enabled.
    pub news_api_key: Option<String>,
    /// Stock-data service key; optional — the financial facet degrades to
    /// its known-ticker table and estimate ladder without it.
    pub alpha_vantage_key: Option<String>,
    /// RapidAPI key shared by the competitors endpoint and the JSearch
    /// listings API; required when the competitors facet is enabled.
    pub rapidapi_key: Option<String>,
    /// Per-request timeout applied to every outbound call.
    pub request_timeout: Duration,
    /// Fixed delay between successive adapter calls within a facet.
    pub inter_call_delay: Duration,
    /// Delay between successive web-search queries inside one adapter.
    pub search_query_delay: Duration,
    /// Facets to research, in report order.
    pub facets: Vec<Facet>,
    /// Scoring constants for the overview facet; the carried-over defaults
    /// normalize the wiki+website weight sum by 1.6 and add 0.1 once three
    /// expected fields are filled.
    pub overview_tunables: ScoreTunables,
    /// Scoring constants for the employer-review facet.
    pub review_tunables: ScoreTunables,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            alpha_vantage_key: None,
            rapidapi_key: None,
            request_timeout: Duration::from_secs(15),
            inter_call_delay: Duration::from_secs(2),
            search_query_delay: Duration::from_secs(2),
            facets: Facet::ALL.to_vec(),
            overview_tunables: ScoreTunables {
                weight_divisor: 1.6,
                completeness_bonus: 0.1,
                bonus_threshold: 3,
            },
            review_tunables: ScoreTunables {
                weight_divisor: 1.0,
                completeness_bonus: 0.1,
                bonus_threshold: 2,
            },
        }
    }
}

impl ResearchConfig {
    /// Checks that every enabled facet has the credential it cannot run
    /// without. This is the single fatal startup error; everything after
    /// startup degrades per source instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.facets.contains(&Facet::News) && self.news_api_key.is_none() {
            return Err(ConfigError::MissingCredential {
                facet: Facet::News,
                variable: "NEWS_API_KEY",
            });
        }
        if self.facets.contains(&Facet::Competitors) && self.rapidapi_key.is_none() {
            return Err(ConfigError::MissingCredential {
                facet: Facet::Competitors,
                variable: "RAPIDAPI_KEY",
            });
        }
        Ok(())
    }
}

/// Fatal configuration problems surfaced before any research starts.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An enabled facet is missing its required credential.
    MissingCredential {
        /// The facet that cannot run.
        facet: Facet,
        /// Environment variable (or flag) that would satisfy it.
        variable: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential { facet, variable } => write!(
                f,
                "facet '{facet}' requires {variable}; set it or disable the facet"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Which text-generation collaborator to use for the synthesis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SynthesisArg {
    /// Skip synthesis; the aggregation core runs standalone.
    None,
    /// Anthropic messages API.
    Anthropic,
    /// OpenAI chat-completions API.
    Openai,
}

/// Command-line interface for the research binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "corpscout", about = "Multi-source company intelligence reports")]
pub struct Cli {
    /// Company name to research
    #[arg(long)]
    pub company: String,

    /// Contact email carried into the report as metadata
    #[arg(long)]
    pub email: Option<String>,

    /// Directory for the rendered reports
    #[arg(long, default_value = "reports")]
    pub output_dir: PathBuf,

    /// Comma-separated facet list
    #[arg(
        long,
        default_value = "overview,financials,news,social,competitors,customers,reviews,jobs"
    )]
    pub facets: String,

    /// Milliseconds to wait between adapter calls within a facet
    #[arg(long, env = "CORPSCOUT_DELAY_MS", default_value_t = 2000)]
    pub delay_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "CORPSCOUT_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// News-search service API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Stock-data service API key
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub alpha_vantage_key: Option<String>,

    /// RapidAPI key for the competitors and job-listings endpoints
    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true)]
    pub rapidapi_key: Option<String>,

    /// Text-generation collaborator for the synthesis step
    #[arg(long, value_enum, default_value = "none")]
    pub synthesis: SynthesisArg,

    /// Model override for the chosen synthesis provider
    #[arg(long)]
    pub model: Option<String>,

    /// Anthropic API key (synthesis = anthropic)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key (synthesis = openai)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

impl Cli {
    /// Converts the parsed CLI into a [`ResearchConfig`].
    pub fn build_config(&self) -> ResearchConfig {
        ResearchConfig {
            news_api_key: self.news_api_key.clone(),
            alpha_vantage_key: self.alpha_vantage_key.clone(),
            rapidapi_key: self.rapidapi_key.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            inter_call_delay: Duration::from_millis(self.delay_ms),
            facets: self.facet_list(),
            ..ResearchConfig::default()
        }
    }

    fn facet_list(&self) -> Vec<Facet> {
        let parsed: Vec<Facet> = self
            .facets
            .split(',')
            .filter_map(Facet::parse)
            .collect();
        if parsed.is_empty() {
            Facet::ALL.to_vec()
        } else {
            parsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(facets: Vec<Facet>) -> ResearchConfig {
        ResearchConfig {
            facets,
            ..ResearchConfig::default()
        }
    }

    #[test]
    fn news_facet_requires_a_credential() {
        let config = config_with(vec![Facet::News]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingCredential {
                facet: Facet::News,
                variable: "NEWS_API_KEY",
            })
        );

        let mut keyed = config_with(vec![Facet::News]);
        keyed.news_api_key = Some("k".to_string());
        assert_eq!(keyed.validate(), Ok(()));
    }

    #[test]
    fn credential_free_facets_validate_without_keys() {
        let config = config_with(vec![Facet::Overview, Facet::Social, Facet::Jobs]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn competitors_facet_requires_rapidapi() {
        let config = config_with(vec![Facet::Competitors]);
        assert!(config.validate().is_err());
    }
}
