use crate::{inline_len, normalize_inlines, Inline, TextRun};

/// Splits inline content at a container offset. Text runs are cut by
/// character; links are cut into two links carrying the same attributes.
pub fn split_inlines(content: Vec<Inline>, at: usize) -> (Vec<Inline>, Vec<Inline>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0usize;
    for inline in content {
        let len = inline.len();
        if pos + len <= at {
            left.push(inline);
        } else if pos >= at {
            right.push(inline);
        } else {
            let cut = at - pos;
            match inline {
                Inline::Text(run) => {
                    let (a, b) = split_text(&run.text, cut);
                    left.push(Inline::Text(run.with_text(a)));
                    right.push(Inline::Text(run.with_text(b)));
                }
                Inline::Link { url, title, new_tab, content } => {
                    let (a, b) = split_inlines(content, cut);
                    if !a.is_empty() {
                        left.push(Inline::Link {
                            url: url.clone(),
                            title: title.clone(),
                            new_tab,
                            content: a,
                        });
                    }
                    if !b.is_empty() {
                        right.push(Inline::Link { url, title, new_tab, content: b });
                    }
                }
                // one wide, never cut
                other => right.push(other),
            }
        }
        pos += len;
    }
    (left, right)
}

fn split_text(text: &str, chars: usize) -> (String, String) {
    let idx = text.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(text.len());
    (text[..idx].to_string(), text[idx..].to_string())
}

/// Removes `[start, end)` from `content` and returns it.
pub fn take_range(content: &mut Vec<Inline>, start: usize, end: usize) -> Vec<Inline> {
    let (before, rest) = split_inlines(std::mem::take(content), start);
    let (mid, after) = split_inlines(rest, end.saturating_sub(start));
    let mut joined = before;
    joined.extend(after);
    normalize_inlines(&mut joined);
    *content = joined;
    mid
}

/// Splices `nodes` in at offset `at`.
pub fn insert_at(content: &mut Vec<Inline>, at: usize, nodes: Vec<Inline>) {
    let (mut before, after) = split_inlines(std::mem::take(content), at);
    before.extend(nodes);
    before.extend(after);
    normalize_inlines(&mut before);
    *content = before;
}

/// Applies `f` to every text run inside `[start, end)`, splitting runs that
/// straddle the boundaries so text outside keeps its formatting.
pub fn map_runs(
    content: &mut Vec<Inline>,
    start: usize,
    end: usize,
    f: &mut dyn FnMut(&mut TextRun),
) {
    if start >= end {
        return;
    }
    let (mut before, rest) = split_inlines(std::mem::take(content), start);
    let (mut mid, after) = split_inlines(rest, end - start);
    for_each_run(&mut mid, f);
    before.append(&mut mid);
    before.extend(after);
    normalize_inlines(&mut before);
    *content = before;
}

fn for_each_run(content: &mut [Inline], f: &mut dyn FnMut(&mut TextRun)) {
    for inline in content {
        match inline {
            Inline::Text(run) => f(run),
            Inline::Link { content, .. } => for_each_run(content, f),
            Inline::Image { .. } | Inline::LineBreak => {}
        }
    }
}

/// Non-empty text runs overlapping `[start, end)`.
pub fn runs_in_range(content: &[Inline], start: usize, end: usize) -> Vec<&TextRun> {
    let mut out = Vec::new();
    collect_runs(content, start, end, 0, &mut out);
    out
}

fn collect_runs<'a>(
    content: &'a [Inline],
    start: usize,
    end: usize,
    mut pos: usize,
    out: &mut Vec<&'a TextRun>,
) {
    for inline in content {
        let len = inline.len();
        if len > 0 && pos < end && pos + len > start {
            match inline {
                Inline::Text(run) => out.push(run),
                Inline::Link { content, .. } => collect_runs(content, start, end, pos, out),
                Inline::Image { .. } | Inline::LineBreak => {}
            }
        }
        pos += len;
    }
}

/// Replaces links by their children, at any depth.
pub fn unwrap_links(content: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(content.len());
    for inline in content {
        match inline {
            Inline::Link { content, .. } => out.extend(unwrap_links(content)),
            other => out.push(other),
        }
    }
    out
}

/// Wraps `[start, end)` in a single link. Links already inside the range are
/// dissolved so links never nest.
pub fn wrap_in_link(
    content: &mut Vec<Inline>,
    start: usize,
    end: usize,
    make_link: impl FnOnce(Vec<Inline>) -> Inline,
) -> bool {
    if start >= end || end > inline_len(content) {
        return false;
    }
    let inner = unwrap_links(take_range(content, start, end));
    insert_at(content, start, vec![make_link(inner)]);
    true
}
