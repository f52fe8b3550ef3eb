//! Report rendering: a human-readable markdown view plus a machine-readable
//! JSON dump, named deterministically from the sanitized company name.

use crate::facet::{Facet, FieldValue};
use crate::runtime::CompanyReport;
use std::io;
use std::path::{Path, PathBuf};

/// Derives a filesystem-safe, deterministic stem from a company name:
/// lowercased, every non-alphanumeric run collapsed to one underscore.
pub fn sanitize_company_name(name: &str) -> String {
    let mut stem = String::new();
    let mut last_was_separator = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c);
            last_was_separator = false;
        } else if !last_was_separator {
            stem.push('_');
            last_was_separator = true;
        }
    }
    let trimmed = stem.trim_end_matches('_');
    if trimmed.is_empty() {
        "company".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Renders the report as markdown.
pub fn render_markdown(report: &CompanyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Company research: {}\n\n", report.company));
    out.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(email) = &report.contact_email {
        out.push_str(&format!("Contact: {email}\n"));
    }
    out.push('\n');

    if let Some(synthesis) = &report.synthesis {
        out.push_str("## Executive summary\n\n");
        out.push_str(&format!("{}\n\n", synthesis.executive_summary));
        out.push_str(&format!("Sentiment: {}\n", synthesis.sentiment));
        if !synthesis.key_themes.is_empty() {
            out.push_str(&format!("Themes: {}\n", synthesis.key_themes.join(", ")));
        }
        if !synthesis.outlook.is_empty() {
            out.push_str(&format!("Outlook: {}\n", synthesis.outlook));
        }
        out.push('\n');
    }

    for facet in Facet::ALL {
        let Some(result) = report.facets.get(facet.as_str()) else {
            continue;
        };
        out.push_str(&format!("## {}\n\n", heading(facet)));
        out.push_str(&format!("Confidence: {:.2}\n\n", result.confidence));

        for (key, value) in &result.data {
            match value {
                FieldValue::Text(text) => out.push_str(&format!("- {key}: {text}\n")),
                FieldValue::Number(number) => {
                    out.push_str(&format!("- {key}: {}\n", format_number(*number)))
                }
                FieldValue::Items(items) => {
                    out.push_str(&format!("- {key}:\n"));
                    for item in items {
                        out.push_str(&format!("  - {item}\n"));
                    }
                }
            }
        }

        if !result.sources.is_empty() {
            out.push_str("\nSources:\n");
            for source in &result.sources {
                match &source.url {
                    Some(url) => {
                        out.push_str(&format!("- {}: {} — {url}\n", source.kind, source.title))
                    }
                    None => out.push_str(&format!("- {}: {}\n", source.kind, source.title)),
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Writes the JSON dump and the markdown report, returning both paths.
pub fn write_reports(report: &CompanyReport, dir: &Path) -> io::Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let stem = sanitize_company_name(&report.company);

    let json_path = dir.join(format!("{stem}_research.json"));
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    std::fs::write(&json_path, json)?;

    let markdown_path = dir.join(format!("{stem}_research.md"));
    std::fs::write(&markdown_path, render_markdown(report))?;

    Ok((json_path, markdown_path))
}

fn heading(facet: Facet) -> &'static str {
    match facet {
        Facet::Overview => "Overview",
        Facet::Financials => "Financial snapshot",
        Facet::News => "News and sentiment",
        Facet::Social => "Social presence",
        Facet::Competitors => "Competitors",
        Facet::Customers => "Customers and segments",
        Facet::Reviews => "Employer reviews",
        Facet::Jobs => "Job postings",
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{FacetResult, SourceRef};
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn sanitized_names_are_deterministic_and_safe() {
        assert_eq!(sanitize_company_name("Tesla, Inc."), "tesla_inc");
        assert_eq!(sanitize_company_name("Ben & Jerry's"), "ben_jerry_s");
        assert_eq!(sanitize_company_name("___"), "company");
        assert_eq!(
            sanitize_company_name("Tesla, Inc."),
            sanitize_company_name("Tesla, Inc.")
        );
    }

    #[test]
    fn markdown_lists_facets_in_report_order() {
        let mut facets = BTreeMap::new();
        let mut overview = FacetResult::empty(&["description"]);
        overview.confidence = 0.53;
        overview.data.insert(
            "description".to_string(),
            FieldValue::Text("Makes rockets.".to_string()),
        );
        overview.sources.push(SourceRef::new(
            "Wikipedia",
            "Acme",
            Some("https://en.wikipedia.org/wiki/Acme".to_string()),
        ));
        facets.insert("overview".to_string(), overview);
        facets.insert("jobs".to_string(), FacetResult::empty(&["jobs"]));

        let report = CompanyReport {
            company: "Acme".to_string(),
            contact_email: Some("analyst@example.com".to_string()),
            generated_at: Utc::now(),
            facets,
            synthesis: None,
        };
        let markdown = render_markdown(&report);
        let overview_at = markdown.find("## Overview").expect("overview section");
        let jobs_at = markdown.find("## Job postings").expect("jobs section");
        assert!(overview_at < jobs_at);
        assert!(markdown.contains("Confidence: 0.53"));
        assert!(markdown.contains("analyst@example.com"));
        assert!(markdown.contains("https://en.wikipedia.org/wiki/Acme"));
    }
}
