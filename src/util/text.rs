/// テキスト処理ユーティリティ。
///
/// 文分割、語数カウント、フレーズ照合、ハッシングを提供します。
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;
use xxhash_rust::xxh3::xxh3_64;

/// テキストをXXH3でハッシュする。
#[must_use]
pub(crate) fn hash_text(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

/// Split text into sentences on `.`, `!` and `?` terminators.
///
/// The terminator itself is stripped, each fragment is trimmed, and empty
/// fragments are dropped. A trailing fragment without a terminator still
/// counts as a sentence. `""` yields an empty vector.
#[must_use]
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if matches!(ch, '.' | '!' | '?') {
            let fragment = current.trim();
            if !fragment.is_empty() {
                sentences.push(fragment.to_string());
            }
            current.clear();
        } else {
            current.push(ch);
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Count words as maximal runs of non-whitespace.
///
/// Consecutive whitespace is treated as a single separator; whitespace-only
/// input counts zero words.
#[must_use]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Average character length of the Unicode words in `text`.
///
/// Returns 0.0 when the text contains no words.
#[must_use]
pub fn average_word_length(text: &str) -> f32 {
    let mut chars = 0usize;
    let mut words = 0usize;
    for word in text.unicode_words() {
        chars += word.chars().count();
        words += 1;
    }
    if words == 0 {
        return 0.0;
    }
    chars as f32 / words as f32
}

/// Count non-overlapping, case-insensitive occurrences of `phrase`.
#[must_use]
pub fn count_phrase(haystack: &str, phrase: &str) -> usize {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    haystack.to_lowercase().matches(&needle).count()
}

/// Case-insensitive containment check for a trimmed phrase.
#[must_use]
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    count_phrase(haystack, phrase) > 0
}

/// 比較用の正規化表現を返す。
///
/// NFC正規化、小文字化、空白の圧縮を行います。
#[must_use]
pub fn normalize_for_match(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate at the last word boundary that fits within `max_chars`.
///
/// Trailing separators and dangling punctuation are trimmed from the cut.
#[must_use]
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }

    let prefix: String = trimmed.chars().take(max_chars).collect();
    let cut = match prefix.rfind(char::is_whitespace) {
        Some(pos) => &prefix[..pos],
        None => prefix.as_str(),
    };
    cut.trim_end_matches([',', ';', ':', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn hash_text_is_deterministic() {
        let text = "Hello, world!";
        assert_eq!(hash_text(text), hash_text(text));
        assert_ne!(hash_text(text), hash_text("Goodbye, world!"));
    }

    #[test]
    fn split_strips_terminators() {
        let sentences = split_into_sentences("First. Second! Third?");
        assert_eq!(sentences, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn split_empty_input_yields_empty() {
        assert_eq!(split_into_sentences(""), Vec::<String>::new());
        assert_eq!(split_into_sentences("   "), Vec::<String>::new());
        assert_eq!(split_into_sentences("..!?"), Vec::<String>::new());
    }

    #[test]
    fn split_keeps_unterminated_tail() {
        let sentences = split_into_sentences("One. Two");
        assert_eq!(sentences, vec!["One", "Two"]);
    }

    #[test]
    fn split_drops_blank_fragments() {
        let sentences = split_into_sentences("One. . Two.");
        assert_eq!(sentences, vec!["One", "Two"]);
    }

    #[test]
    fn count_words_collapses_whitespace() {
        assert_eq!(count_words("a  b   c"), 3);
        assert_eq!(count_words("  leading and trailing  "), 3);
    }

    #[test]
    fn count_words_empty_is_zero() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words(" \t\n"), 0);
    }

    #[test]
    fn average_word_length_handles_empty() {
        assert!((average_word_length("") - 0.0).abs() < f32::EPSILON);
        let avg = average_word_length("ab abcd");
        assert!((avg - 3.0).abs() < 0.01);
    }

    #[test]
    fn count_phrase_is_case_insensitive() {
        assert_eq!(count_phrase("Cloud cloud CLOUD", "cloud"), 3);
        assert_eq!(count_phrase("edge computing at the edge", "edge computing"), 1);
        assert_eq!(count_phrase("anything", ""), 0);
    }

    #[test]
    fn contains_phrase_matches_substrings() {
        assert!(contains_phrase("Series C funding round", "series c"));
        assert!(!contains_phrase("Series C funding round", "series d"));
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize_for_match("  Hello   World "), "hello world");
        // e + combining acute composes to a single code point
        assert_eq!(normalize_for_match("cafe\u{301}"), "caf\u{e9}");
    }

    #[test]
    fn truncate_cuts_at_word_boundary() {
        assert_eq!(truncate_at_word("short text", 40), "short text");
        let cut = truncate_at_word("a very long announcement body for testing", 20);
        assert_eq!(cut, "a very long");
    }

    #[rstest]
    #[case("one two three four", 9, "one two")]
    #[case("hyphen-stays whole", 14, "hyphen-stays")]
    #[case("no-spaces-in-range", 7, "no-spac")]
    #[case("ends with, punctuation", 11, "ends with")]
    fn truncate_honors_limits(#[case] text: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(truncate_at_word(text, max), expected);
    }
}
