//! Core data model shared by source adapters and the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel written into every expected field that no source could fill.
pub const SENTINEL: &str = "Not available";

/// Placeholder strings that sources sometimes return instead of omitting a
/// field. Scoring and merging treat these as absent.
const PLACEHOLDERS: &[&str] = &["n/a", "not available"];

/// The research categories this crate knows how to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    /// Description, founding data, headquarters, ownership.
    Overview,
    /// Ticker lookup plus public fundamentals or private estimates.
    Financials,
    /// Recent articles with keyword sentiment classification.
    News,
    /// Follower and subscriber counts across social platforms.
    Social,
    /// Rival companies keyed off the company domain.
    Competitors,
    /// Named clients and customer segments mined from public text.
    Customers,
    /// Employer-review ratings and highlights.
    Reviews,
    /// Open job postings across job boards.
    Jobs,
}

impl Facet {
    /// Every facet, in report order.
    pub const ALL: [Facet; 8] = [
        Facet::Overview,
        Facet::Financials,
        Facet::News,
        Facet::Social,
        Facet::Competitors,
        Facet::Customers,
        Facet::Reviews,
        Facet::Jobs,
    ];

    /// Stable lowercase identifier used in reports and CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Overview => "overview",
            Facet::Financials => "financials",
            Facet::News => "news",
            Facet::Social => "social",
            Facet::Competitors => "competitors",
            Facet::Customers => "customers",
            Facet::Reviews => "reviews",
            Facet::Jobs => "jobs",
        }
    }

    /// Parses a facet identifier as written on the command line.
    pub fn parse(value: &str) -> Option<Facet> {
        Facet::ALL
            .into_iter()
            .find(|facet| facet.as_str() == value.trim().to_ascii_lowercase())
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field payload held by records and facet results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free-text scalar.
    Text(String),
    /// Numeric scalar.
    Number(f64),
    /// List-valued field merged by additive union.
    Items(Vec<String>),
}

impl FieldValue {
    /// True when the value carries no usable data: an empty or placeholder
    /// string, or an empty list. Placeholder text scores identically to an
    /// absent field.
    pub fn is_placeholder(&self) -> bool {
        match self {
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                trimmed.is_empty()
                    || PLACEHOLDERS
                        .iter()
                        .any(|p| trimmed.eq_ignore_ascii_case(p))
            }
            FieldValue::Number(value) => value.is_nan(),
            FieldValue::Items(items) => items.is_empty(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Items(value)
    }
}

/// Provenance entry naming where a record (or merged field set) came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source family, e.g. `"Wikipedia"` or `"Official Website"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable label for the specific document or endpoint.
    pub title: String,
    /// Resolved URL when one exists.
    pub url: Option<String>,
}

impl SourceRef {
    /// Builds a provenance entry.
    pub fn new(kind: impl Into<String>, title: impl Into<String>, url: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            url,
        }
    }
}

/// Ephemeral output of a single source adapter call, consumed only by the
/// aggregator that requested it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// Extracted fields; placeholder values are tolerated and ignored later.
    pub fields: BTreeMap<String, FieldValue>,
    /// Per-source reliability weight contributed to the facet confidence.
    pub reliability: f64,
    /// Where the data came from.
    pub origin: SourceRef,
}

impl SourceRecord {
    /// Starts an empty record for the given origin and weight.
    pub fn new(origin: SourceRef, reliability: f64) -> Self {
        Self {
            fields: BTreeMap::new(),
            reliability,
            origin,
        }
    }

    /// Inserts a field, dropping `None`.
    pub fn set(&mut self, key: &str, value: Option<impl Into<FieldValue>>) {
        if let Some(value) = value {
            self.fields.insert(key.to_string(), value.into());
        }
    }

    /// Inserts a list field, dropping empty lists.
    pub fn set_items(&mut self, key: &str, items: Vec<String>) {
        if !items.is_empty() {
            self.fields.insert(key.to_string(), FieldValue::Items(items));
        }
    }

    /// True when at least one field holds usable (non-placeholder) data.
    pub fn has_data(&self) -> bool {
        self.fields.values().any(|value| !value.is_placeholder())
    }
}

/// Immutable result of aggregating one facet for one company query.
///
/// Ownership transfers entirely to the caller; callers branch on
/// [`FacetResult::confidence`], never on per-field presence — every expected
/// field is populated, with [`SENTINEL`] standing in for missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetResult {
    /// Completeness/reliability score, always clamped to `[0, 1]`.
    pub confidence: f64,
    /// Merged field map; sentinel-filled, never sparse.
    pub data: BTreeMap<String, FieldValue>,
    /// Provenance of the sources that contributed usable data, in
    /// authority order.
    pub sources: Vec<SourceRef>,
}

impl FacetResult {
    /// A result representing total facet failure: zero confidence and every
    /// expected field holding the sentinel.
    pub fn empty(expected: &[&str]) -> Self {
        let data = expected
            .iter()
            .map(|key| (key.to_string(), FieldValue::Text(SENTINEL.to_string())))
            .collect();
        Self {
            confidence: 0.0,
            data,
            sources: Vec::new(),
        }
    }
}

/// Input key for one research run. The contact email is pass-through
/// metadata only and never participates in lookups. The company name is
/// used as given — differing casings or punctuation may yield different
/// results, which is a documented limitation rather than a bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyQuery {
    /// Free-text company name.
    pub name: String,
    /// Optional contact email carried into the report verbatim.
    pub contact_email: Option<String>,
}

impl CompanyQuery {
    /// Builds a query for the given company name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact_email: None,
        }
    }

    /// Attaches a contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_strings_count_as_absent() {
        assert!(FieldValue::Text("N/A".to_string()).is_placeholder());
        assert!(FieldValue::Text("not available".to_string()).is_placeholder());
        assert!(FieldValue::Text("  ".to_string()).is_placeholder());
        assert!(FieldValue::Items(Vec::new()).is_placeholder());
        assert!(!FieldValue::Text("2003".to_string()).is_placeholder());
        assert!(!FieldValue::Number(0.0).is_placeholder());
    }

    #[test]
    fn empty_result_is_sentinel_filled() {
        let result = FacetResult::empty(&["founded", "founders"]);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.data.get("founded"),
            Some(&FieldValue::Text(SENTINEL.to_string()))
        );
        assert_eq!(
            result.data.get("founders"),
            Some(&FieldValue::Text(SENTINEL.to_string()))
        );
        assert!(result.sources.is_empty());
    }

    #[test]
    fn facet_identifiers_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::parse(facet.as_str()), Some(facet));
        }
        assert_eq!(Facet::parse("nonsense"), None);
    }
}
