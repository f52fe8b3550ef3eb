//! Company-name disambiguation.
//!
//! A literal lookup that yields no structured attributes is retried through
//! an ordered list of name variants, then through fuzzy matching against an
//! encyclopedic search index. Every stage is best-effort: callers receive
//! the result of the last attempted lookup, never an error.

use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a fuzzy candidate to be attempted.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Maximum number of fuzzy candidates tried, best first.
pub const MAX_FUZZY_CANDIDATES: usize = 3;

/// Ordered lookup variants for a raw company name: the literal input,
/// a title-cased form, and the common legal-suffix spellings.
pub fn name_variants(name: &str) -> Vec<String> {
    let trimmed = name.trim();
    let mut variants = vec![trimmed.to_string()];
    let titled = title_case(trimmed);
    for candidate in [
        titled.clone(),
        format!("{titled}, Inc."),
        format!("{titled} Inc."),
    ] {
        if !variants.iter().any(|seen| seen == &candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Ranks `candidates` by similarity to `name`, keeping those at or above
/// [`SIMILARITY_THRESHOLD`] and at most [`MAX_FUZZY_CANDIDATES`] of them.
pub fn fuzzy_candidates(name: &str, candidates: &[String]) -> Vec<String> {
    let needle = name.trim().to_lowercase();
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|candidate| (jaro_winkler(&needle, &candidate.to_lowercase()), candidate))
        .filter(|(score, _)| *score >= SIMILARITY_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(MAX_FUZZY_CANDIDATES)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_start_with_the_literal_name() {
        let variants = name_variants("acme");
        assert_eq!(
            variants,
            vec![
                "acme".to_string(),
                "Acme".to_string(),
                "Acme, Inc.".to_string(),
                "Acme Inc.".to_string(),
            ]
        );
    }

    #[test]
    fn already_titled_names_do_not_duplicate() {
        let variants = name_variants("Acme");
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0], "Acme");
    }

    #[test]
    fn fuzzy_matching_keeps_the_best_three_above_threshold() {
        let candidates = vec![
            "Acme Corporation".to_string(),
            "Acme Brick".to_string(),
            "Acme Markets".to_string(),
            "Acme Packet".to_string(),
            "Zzyzx Industrial".to_string(),
        ];
        let matches = fuzzy_candidates("acme", &candidates);
        assert_eq!(matches.len(), MAX_FUZZY_CANDIDATES);
        assert!(matches.iter().all(|m| m.starts_with("Acme")));
    }

    #[test]
    fn dissimilar_candidates_are_rejected() {
        let candidates = vec!["Completely Unrelated Plumbing Supply".to_string()];
        assert!(fuzzy_candidates("acme", &candidates).is_empty());
    }
}
