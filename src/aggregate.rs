//! Rank-ordered merging of source records into a single facet result.

use crate::facet::{Facet, FacetResult, FieldValue, SourceRecord, SENTINEL};
use crate::score::{self, ScoreTunables};
use std::collections::BTreeMap;

/// Static description of one facet's merge: the fields a complete result is
/// expected to carry, plus its scoring constants.
#[derive(Debug, Clone)]
pub struct FacetSchema {
    /// The facet this schema describes.
    pub facet: Facet,
    /// Fields counted toward completeness and sentinel-backfilled on miss.
    pub expected: &'static [&'static str],
    /// Scoring constants for this facet.
    pub tunables: ScoreTunables,
}

impl FacetSchema {
    /// Builds a schema.
    pub const fn new(
        facet: Facet,
        expected: &'static [&'static str],
        tunables: ScoreTunables,
    ) -> Self {
        Self {
            facet,
            expected,
            tunables,
        }
    }
}

/// Merges adapter records into one [`FacetResult`].
///
/// `records` must be ordered most-authoritative first; the merge is driven by
/// that rank, never by completion order. Scalar fields follow
/// first-non-placeholder-wins, list fields take the additive union with
/// case-insensitive de-duplication in first-seen order. The merge is pure:
/// identical input always yields identical output, and it never partially
/// fails — when no record carries usable data the result has confidence 0.0
/// and every expected field holding the sentinel.
pub fn merge_records(schema: &FacetSchema, records: &[SourceRecord]) -> FacetResult {
    let mut data: BTreeMap<String, FieldValue> = BTreeMap::new();
    let mut sources = Vec::new();
    let mut weights = Vec::new();

    for record in records {
        if !record.has_data() {
            continue;
        }
        for (key, value) in &record.fields {
            if value.is_placeholder() {
                continue;
            }
            match value {
                FieldValue::Items(items) => extend_union(&mut data, key, items),
                scalar => {
                    let occupied = data
                        .get(key)
                        .map(|existing| !existing.is_placeholder())
                        .unwrap_or(false);
                    if !occupied {
                        data.insert(key.clone(), scalar.clone());
                    }
                }
            }
        }
        sources.push(record.origin.clone());
        weights.push(record.reliability);
    }

    let filled = schema
        .expected
        .iter()
        .filter(|key| {
            data.get(**key)
                .map(|value| !value.is_placeholder())
                .unwrap_or(false)
        })
        .count();

    for key in schema.expected {
        let missing = data
            .get(*key)
            .map(FieldValue::is_placeholder)
            .unwrap_or(true);
        if missing {
            data.insert(key.to_string(), FieldValue::Text(SENTINEL.to_string()));
        }
    }

    FacetResult {
        confidence: score::facet_confidence(&weights, filled, &schema.tunables),
        data,
        sources,
    }
}

fn extend_union(data: &mut BTreeMap<String, FieldValue>, key: &str, items: &[String]) {
    let entry = data
        .entry(key.to_string())
        .or_insert_with(|| FieldValue::Items(Vec::new()));
    // A scalar placeholder left by an earlier source gives way to the list.
    if !matches!(entry, FieldValue::Items(_)) {
        *entry = FieldValue::Items(Vec::new());
    }
    if let FieldValue::Items(existing) = entry {
        for item in items {
            let candidate = item.trim();
            if candidate.is_empty() {
                continue;
            }
            let duplicate = existing
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(candidate));
            if !duplicate {
                existing.push(candidate.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::SourceRef;

    fn schema() -> FacetSchema {
        FacetSchema::new(
            Facet::Overview,
            &["founded", "headquarters", "offices"],
            ScoreTunables {
                weight_divisor: 1.6,
                completeness_bonus: 0.1,
                bonus_threshold: 3,
            },
        )
    }

    fn record(kind: &str, reliability: f64) -> SourceRecord {
        SourceRecord::new(SourceRef::new(kind, kind, None), reliability)
    }

    #[test]
    fn earlier_rank_wins_scalar_conflicts() {
        let mut first = record("Wikipedia", 0.85);
        first.set("founded", Some("2005"));
        let mut second = record("Official Website", 0.75);
        second.set("founded", Some("2010"));

        let merged = merge_records(&schema(), &[first, second]);
        assert_eq!(
            merged.data.get("founded"),
            Some(&FieldValue::Text("2005".to_string()))
        );
    }

    #[test]
    fn lower_rank_fills_gaps_left_by_higher_rank() {
        let first = record("Wikipedia", 0.85);
        let mut second = record("Official Website", 0.75);
        second.set("founded", Some("2010"));

        let merged = merge_records(&schema(), &[first, second]);
        assert_eq!(
            merged.data.get("founded"),
            Some(&FieldValue::Text("2010".to_string()))
        );
        // The empty first record contributed nothing and is not a source.
        assert_eq!(merged.sources.len(), 1);
        assert_eq!(merged.sources[0].kind, "Official Website");
    }

    #[test]
    fn list_fields_union_without_case_duplicates() {
        let mut first = record("Wikipedia", 0.85);
        first.set_items(
            "offices",
            vec!["Austin".to_string(), "Berlin".to_string()],
        );
        let mut second = record("Official Website", 0.75);
        second.set_items(
            "offices",
            vec!["austin".to_string(), "Tokyo".to_string()],
        );

        let merged = merge_records(&schema(), &[first, second]);
        assert_eq!(
            merged.data.get("offices"),
            Some(&FieldValue::Items(vec![
                "Austin".to_string(),
                "Berlin".to_string(),
                "Tokyo".to_string(),
            ]))
        );
    }

    #[test]
    fn placeholder_fields_neither_occupy_nor_score() {
        let mut first = record("Wikipedia", 0.85);
        first.set("founded", Some("N/A"));
        first.set("headquarters", Some("Austin, Texas"));
        let mut second = record("Official Website", 0.75);
        second.set("founded", Some("2010"));

        let merged = merge_records(&schema(), &[first.clone(), second]);
        assert_eq!(
            merged.data.get("founded"),
            Some(&FieldValue::Text("2010".to_string()))
        );

        // "N/A" scores the same as the field being absent entirely.
        let mut without = record("Wikipedia", 0.85);
        without.set("headquarters", Some("Austin, Texas"));
        let with_placeholder = merge_records(&schema(), &[first]);
        let with_absent = merge_records(&schema(), &[without]);
        assert_eq!(with_placeholder.confidence, with_absent.confidence);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut first = record("Wikipedia", 0.85);
        first.set("founded", Some("2003"));
        first.set_items("offices", vec!["Palo Alto".to_string()]);
        let mut second = record("Official Website", 0.75);
        second.set("headquarters", Some("Austin, Texas"));
        let records = [first, second];

        let once = merge_records(&schema(), &records);
        let twice = merge_records(&schema(), &records);
        assert_eq!(once, twice);
    }

    #[test]
    fn total_failure_yields_sentinels_and_zero_confidence() {
        let merged = merge_records(&schema(), &[record("Wikipedia", 0.85)]);
        assert_eq!(merged.confidence, 0.0);
        assert!(merged.sources.is_empty());
        for key in ["founded", "headquarters", "offices"] {
            assert_eq!(
                merged.data.get(key),
                Some(&FieldValue::Text(SENTINEL.to_string())),
                "field {key} should hold the sentinel"
            );
        }
    }
}
