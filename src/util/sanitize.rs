/// 入稿テキストのクリーニング。
///
/// リッチテキスト由来のHTML断片を除去し、NFC正規化と空白圧縮を行います。
use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Clean a pasted announcement or description for pipeline use.
///
/// Brief fields frequently arrive copied out of rich-text editors. Markup is
/// flattened to plain text, entities are decoded, the result is NFC
/// normalized and whitespace runs are collapsed.
#[must_use]
pub(crate) fn clean_brief(input: &str) -> String {
    let flattened = if looks_like_markup(input) {
        strip_markup(input)
    } else {
        input.to_string()
    };

    let composed: String = flattened.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn looks_like_markup(input: &str) -> bool {
    let open = input.find('<');
    let close = input.rfind('>');
    matches!((open, close), (Some(start), Some(end)) if start < end)
}

fn strip_markup(input: &str) -> String {
    // ブロックタグのみ残し、インライン装飾はテキスト化の前に落とす
    let block_tags: HashSet<&str> = ["p", "br", "ul", "ol", "li", "blockquote"]
        .into_iter()
        .collect();
    let mut builder = ammonia::Builder::default();
    builder.tags(block_tags);
    let sanitized = builder.clean(input).to_string();
    // Flattening failure keeps the sanitized markup rather than panicking
    // on a pasted brief.
    html2text::from_read(sanitized.as_bytes(), 500).unwrap_or(sanitized)
}
