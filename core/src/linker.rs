use crate::splice::wrap_in_link;
use crate::{flat_text, Document, Inline, SharedStr};
use std::sync::Arc;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Wraps every whole-word, case-sensitive occurrence of `keyword` in a link.
/// Text already inside a link is left alone, so running it twice adds
/// nothing. Returns how many links were created.
pub fn link_keyword(
    doc: &mut Document,
    keyword: &str,
    url: &str,
    title: Option<&str>,
    new_tab: bool,
) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    let url: SharedStr = Arc::from(url);
    let title: Option<SharedStr> = title.filter(|t| !t.is_empty()).map(Arc::from);
    let mut created = 0;
    for path in doc.text_blocks() {
        let Some(content) = doc.container_mut(&path) else { continue };
        let hits = find_keyword(content, keyword);
        // right to left keeps earlier offsets valid
        for (start, end) in hits.into_iter().rev() {
            let wrapped = wrap_in_link(content, start, end, |inner| Inline::Link {
                url: url.clone(),
                title: title.clone(),
                new_tab,
                content: inner,
            });
            if wrapped {
                created += 1;
            }
        }
    }
    if created > 0 {
        tracing::debug!(keyword, created, "linked keyword occurrences");
    }
    created
}

/// Offsets of linkable occurrences in a container, left to right and
/// never overlapping.
fn find_keyword(content: &[Inline], keyword: &str) -> Vec<(usize, usize)> {
    let text: Vec<char> = flat_text(content).chars().collect();
    let needle: Vec<char> = keyword.chars().collect();
    let linked = link_spans(content);
    let mut hits = Vec::new();
    let mut i = 0;
    while i + needle.len() <= text.len() {
        let end = i + needle.len();
        let matches = text[i..end] == needle[..]
            && (i == 0 || !is_word_char(text[i - 1]))
            && (end == text.len() || !is_word_char(text[end]))
            && !linked.iter().any(|&(s, e)| i < e && end > s);
        if matches {
            hits.push((i, end));
            i = end;
        } else {
            i += 1;
        }
    }
    hits
}

fn link_spans(content: &[Inline]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0;
    for inline in content {
        let len = inline.len();
        if matches!(inline, Inline::Link { .. }) {
            spans.push((pos, pos + len));
        }
        pos += len;
    }
    spans
}
