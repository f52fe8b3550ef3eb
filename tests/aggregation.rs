//! End-to-end aggregation scenarios driven through canned source adapters.

use async_trait::async_trait;
use corpscout::sources::collect_records;
use corpscout::{
    merge_records, Facet, FacetSchema, FieldValue, ScoreTunables, SourceAdapter, SourceOutcome,
    SourceRecord, SourceRef, SENTINEL,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

const OVERVIEW_FIELDS: &[&str] = &[
    "description",
    "founded",
    "founders",
    "headquarters",
    "ownership",
    "history",
];

const OVERVIEW_TUNABLES: ScoreTunables = ScoreTunables {
    weight_divisor: 1.6,
    completeness_bonus: 0.1,
    bonus_threshold: 3,
};

struct CannedAdapter {
    name: &'static str,
    outcome: SourceOutcome,
}

impl CannedAdapter {
    fn fetched(name: &'static str, record: SourceRecord) -> Box<dyn SourceAdapter> {
        Box::new(Self {
            name,
            outcome: SourceOutcome::Fetched(record),
        })
    }

    fn failing(name: &'static str) -> Box<dyn SourceAdapter> {
        Box::new(Self {
            name,
            outcome: SourceOutcome::missing(name, "canned timeout"),
        })
    }
}

#[async_trait]
impl SourceAdapter for CannedAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _company: &str) -> SourceOutcome {
        self.outcome.clone()
    }
}

fn schema() -> FacetSchema {
    FacetSchema::new(Facet::Overview, OVERVIEW_FIELDS, OVERVIEW_TUNABLES)
}

fn wikipedia_record() -> SourceRecord {
    let origin = SourceRef::new(
        "Wikipedia",
        "Tesla, Inc.",
        Some("https://en.wikipedia.org/wiki/Tesla,_Inc.".to_string()),
    );
    let mut record = SourceRecord::new(origin, 0.85);
    record.set("description", Some("Tesla designs electric vehicles."));
    record.set("founded", Some("2003"));
    record.set("headquarters", Some("Austin, Texas"));
    record.set("ownership", Some("Publicly traded"));
    record
}

#[tokio::test]
async fn canned_research_run_merges_only_contributing_sources() {
    let adapters = vec![
        CannedAdapter::fetched("wikipedia", wikipedia_record()),
        CannedAdapter::failing("website"),
    ];

    let records = collect_records(&adapters, "Tesla, Inc.", Duration::ZERO).await;
    let result = merge_records(&schema(), &records);

    assert_eq!(
        result.data.get("founded"),
        Some(&FieldValue::Text("2003".to_string()))
    );
    assert!(result.confidence > 0.0);
    // Exactly the adapters that returned data appear as sources.
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].kind, "Wikipedia");
}

#[tokio::test]
async fn total_failure_yields_sentinels_not_errors() {
    let adapters = vec![
        CannedAdapter::failing("wikipedia"),
        CannedAdapter::failing("website"),
    ];

    let records = collect_records(&adapters, "Tesla, Inc.", Duration::ZERO).await;
    let result = merge_records(&schema(), &records);

    assert_eq!(result.confidence, 0.0);
    assert!(result.sources.is_empty());
    for key in OVERVIEW_FIELDS {
        assert_eq!(
            result.data.get(*key),
            Some(&FieldValue::Text(SENTINEL.to_string())),
            "field {key} should hold the sentinel"
        );
    }
}

#[test]
fn authoritative_null_defers_to_lower_ranked_value() {
    let mut authoritative = SourceRecord::new(SourceRef::new("A", "A", None), 0.85);
    authoritative.set("description", Some("Primary source prose."));
    let mut secondary = SourceRecord::new(SourceRef::new("B", "B", None), 0.75);
    secondary.set("founded", Some("2010"));

    let result = merge_records(&schema(), &[authoritative, secondary]);
    assert_eq!(
        result.data.get("founded"),
        Some(&FieldValue::Text("2010".to_string()))
    );
}

#[test]
fn authoritative_value_beats_lower_ranked_value() {
    let mut authoritative = SourceRecord::new(SourceRef::new("A", "A", None), 0.85);
    authoritative.set("founded", Some("2005"));
    let mut secondary = SourceRecord::new(SourceRef::new("B", "B", None), 0.75);
    secondary.set("founded", Some("2010"));

    let result = merge_records(&schema(), &[authoritative, secondary]);
    assert_eq!(
        result.data.get("founded"),
        Some(&FieldValue::Text("2005".to_string()))
    );
}

#[test]
fn placeholder_scores_identically_to_absent() {
    let mut with_placeholder = SourceRecord::new(SourceRef::new("A", "A", None), 0.85);
    with_placeholder.set("description", Some("Real prose."));
    with_placeholder.set("founded", Some("N/A"));

    let mut without_field = SourceRecord::new(SourceRef::new("A", "A", None), 0.85);
    without_field.set("description", Some("Real prose."));

    let scored_placeholder = merge_records(&schema(), &[with_placeholder]);
    let scored_absent = merge_records(&schema(), &[without_field]);
    assert_eq!(scored_placeholder.confidence, scored_absent.confidence);
    assert_eq!(
        scored_placeholder.data.get("founded"),
        Some(&FieldValue::Text(SENTINEL.to_string()))
    );
}

#[test]
fn reaggregation_is_idempotent() {
    let records = vec![wikipedia_record()];
    let first = merge_records(&schema(), &records);
    let second = merge_records(&schema(), &records);
    assert_eq!(first, second);
}

#[test]
fn confidence_stays_in_bounds_for_any_source_mix() {
    // Zero, one and many populated sources all stay inside [0, 1].
    for count in 0..6 {
        let records: Vec<SourceRecord> = (0..count)
            .map(|i| {
                let mut record =
                    SourceRecord::new(SourceRef::new("S", format!("s{i}"), None), 0.9);
                record.set("description", Some("text"));
                record.set("founded", Some("1999"));
                record.set("headquarters", Some("Somewhere"));
                record
            })
            .collect();
        let result = merge_records(&schema(), &records);
        assert!(
            (0.0..=1.0).contains(&result.confidence),
            "confidence {} out of bounds for {count} sources",
            result.confidence
        );
    }
}

#[test]
fn merge_order_is_rank_based_not_completion_based() {
    // The same records in a different order change which value wins —
    // proving the merge consumes rank order, so callers must (and do)
    // collect in registration order regardless of completion timing.
    let mut first = SourceRecord::new(SourceRef::new("A", "A", None), 0.85);
    first.set("founded", Some("2005"));
    let mut second = SourceRecord::new(SourceRef::new("B", "B", None), 0.75);
    second.set("founded", Some("2010"));

    let ranked = merge_records(&schema(), &[first.clone(), second.clone()]);
    let reversed = merge_records(&schema(), &[second, first]);
    assert_eq!(
        ranked.data.get("founded"),
        Some(&FieldValue::Text("2005".to_string()))
    );
    assert_eq!(
        reversed.data.get("founded"),
        Some(&FieldValue::Text("2010".to_string()))
    );
}
