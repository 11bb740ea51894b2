//! Sentence-level semantic diff.
//!
//! Compares two texts as multisets of normalized sentences, so reordering a
//! sentence or changing its case does not register as a change. Near-match
//! pairs are reported as one removal plus one addition; the `modified`
//! bucket stays at zero until real fuzzy matching earns its keep.

use rustc_hash::FxHashMap;

use crate::pipeline::types::DiffSummary;
use crate::util::text::{hash_text, normalize_for_match, split_into_sentences};

/// Compares original and rewritten text sentence-by-sentence.
///
/// Counts satisfy `added + unchanged == sentences(rewritten)` and
/// `removed + unchanged == sentences(original)`.
#[must_use]
pub fn semantic_diff(original: &str, rewritten: &str) -> DiffSummary {
    let original_counts = sentence_multiset(original);
    let rewritten_counts = sentence_multiset(rewritten);

    let original_total: usize = original_counts.values().sum();
    let rewritten_total: usize = rewritten_counts.values().sum();

    let unchanged: usize = original_counts
        .iter()
        .map(|(key, count)| {
            rewritten_counts
                .get(key)
                .map_or(0, |other| (*count).min(*other))
        })
        .sum();

    DiffSummary {
        added: rewritten_total - unchanged,
        removed: original_total - unchanged,
        modified: 0,
        unchanged,
    }
}

fn sentence_multiset(text: &str) -> FxHashMap<u64, usize> {
    let mut counts = FxHashMap::default();
    for sentence in split_into_sentences(text) {
        let key = hash_text(&normalize_for_match(&sentence));
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_sentence_counts_as_added() {
        let diff = semantic_diff("First point. Second point.", "First point. Second point. Third point.");
        assert_eq!(diff.added, 1);
        assert_eq!(diff.removed, 0);
        assert_eq!(diff.unchanged, 2);
    }

    #[test]
    fn identical_texts_have_no_changes() {
        let diff = semantic_diff("One. Two!", "One. Two!");
        assert_eq!(diff.added, 0);
        assert_eq!(diff.removed, 0);
        assert_eq!(diff.unchanged, 2);
    }

    #[test]
    fn reordering_is_not_a_change() {
        let diff = semantic_diff("Alpha here. Beta there.", "Beta there. Alpha here.");
        assert_eq!(diff.unchanged, 2);
        assert_eq!(diff.added, 0);
        assert_eq!(diff.removed, 0);
    }

    #[test]
    fn comparison_ignores_case() {
        let diff = semantic_diff("Hello world.", "HELLO WORLD.");
        assert_eq!(diff.unchanged, 1);
        assert_eq!(diff.added, 0);
    }

    #[test]
    fn duplicates_match_up_to_multiplicity() {
        let diff = semantic_diff("Same line. Same line. Extra.", "Same line. Extra.");
        assert_eq!(diff.unchanged, 2);
        assert_eq!(diff.removed, 1);
        assert_eq!(diff.added, 0);
    }

    #[test]
    fn empty_original_makes_everything_added() {
        let diff = semantic_diff("", "New one. New two.");
        assert_eq!(diff.added, 2);
        assert_eq!(diff.removed, 0);
        assert_eq!(diff.unchanged, 0);
    }

    #[test]
    fn both_empty_is_all_zero() {
        assert_eq!(semantic_diff("", ""), DiffSummary::default());
    }

    #[test]
    fn counts_partition_both_sides() {
        let original = "Keep me. Drop me. Keep me too.";
        let rewritten = "Keep me. Keep me too. Brand new. Another new.";
        let diff = semantic_diff(original, rewritten);
        assert_eq!(
            diff.added + diff.unchanged,
            split_into_sentences(rewritten).len()
        );
        assert_eq!(
            diff.removed + diff.unchanged,
            split_into_sentences(original).len()
        );
        assert_eq!(diff.modified, 0);
    }
}
