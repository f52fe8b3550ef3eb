//! Command-line entry point: research one company and write its reports.

use anyhow::{Context, Result};
use clap::Parser;
use corpscout::synthesis::{AnthropicProvider, OpenAiProvider};
use corpscout::{report, Cli, CompanyQuery, LlmProvider, SynthesisArg};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("corpscout=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.build_config();
    // Missing credentials are the one fatal startup error; every failure
    // after this point degrades per source instead.
    config.validate().context("configuration invalid")?;
    let provider = build_provider(&cli)?;

    let mut query = CompanyQuery::new(cli.company.clone());
    if let Some(email) = &cli.email {
        query = query.with_email(email.clone());
    }

    let company_report = corpscout::run(config, &query, provider)
        .map_err(|err| anyhow::anyhow!(err))
        .context("research run failed")?;

    let (json_path, markdown_path) = report::write_reports(&company_report, &cli.output_dir)
        .context("failed to write reports")?;
    println!("wrote {}", json_path.display());
    println!("wrote {}", markdown_path.display());

    for (facet, result) in &company_report.facets {
        println!("{facet}: confidence {:.2}", result.confidence);
    }
    Ok(())
}

fn build_provider(cli: &Cli) -> Result<Option<Box<dyn LlmProvider>>> {
    match cli.synthesis {
        SynthesisArg::None => Ok(None),
        SynthesisArg::Anthropic => {
            let key = cli
                .anthropic_api_key
                .clone()
                .context("synthesis=anthropic requires ANTHROPIC_API_KEY")?;
            Ok(Some(Box::new(AnthropicProvider::new(
                key,
                cli.model.clone(),
            )?)))
        }
        SynthesisArg::Openai => {
            let key = cli
                .openai_api_key
                .clone()
                .context("synthesis=openai requires OPENAI_API_KEY")?;
            Ok(Some(Box::new(OpenAiProvider::new(key, cli.model.clone())?)))
        }
    }
}
