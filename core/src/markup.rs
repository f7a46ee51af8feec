//! Forgiving tokenizer for the HTML-like markup the engine reads and writes.
//!
//! It never fails: unknown closing tags are ignored, unclosed elements are
//! closed at the end of input and nesting past [`MAX_PARSE_DEPTH`] is
//! flattened into the deepest open element.

pub const MAX_PARSE_DEPTH: usize = 256;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn is_void(&self) -> bool {
        is_void(&self.tag)
    }
}

pub fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub fn parse_markup(raw: &str) -> Vec<MarkupNode> {
    let mut stack: Vec<Element> = vec![Element::new("#root")];
    let mut i = 0usize;
    while i < raw.len() {
        let rest = &raw[i..];
        if rest.starts_with("<!--") {
            i += rest[4..].find("-->").map(|end| end + 7).unwrap_or(rest.len());
            continue;
        }
        if let Some(after) = rest.strip_prefix("</") {
            match after.find('>') {
                Some(end) => {
                    let name = tag_name(&after[..end]);
                    close_tag(&mut stack, &name);
                    i += end + 3;
                }
                None => i = raw.len(),
            }
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            i += rest.find('>').map(|end| end + 1).unwrap_or(rest.len());
            continue;
        }
        if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            let Some((element, self_closing, consumed)) = parse_open_tag(rest) else {
                i = raw.len();
                continue;
            };
            i += consumed;
            if RAW_TEXT_TAGS.contains(&element.tag.as_str()) {
                let body = &raw[i..];
                let end = find_ci(body, &format!("</{}", element.tag)).unwrap_or(body.len());
                let mut element = element;
                if end > 0 {
                    element.children.push(MarkupNode::Text(body[..end].to_string()));
                }
                i += end;
                if i < raw.len() {
                    i += raw[i..].find('>').map(|e| e + 1).unwrap_or(raw.len() - i);
                }
                append(&mut stack, MarkupNode::Element(element));
                continue;
            }
            open_tag(&mut stack, element, self_closing);
            continue;
        }
        let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        let len = rest[first..].find('<').map(|p| p + first).unwrap_or(rest.len());
        let text = html_escape::decode_html_entities(&rest[..len]).into_owned();
        append_text(&mut stack, text);
        i += len;
    }
    while stack.len() > 1 {
        pop(&mut stack);
    }
    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn open_tag(stack: &mut Vec<Element>, element: Element, self_closing: bool) {
    implicit_close(stack, &element.tag);
    let leaf = self_closing || element.is_void();
    if leaf {
        append(stack, MarkupNode::Element(element));
    } else if stack.len() <= MAX_PARSE_DEPTH {
        stack.push(element);
    }
    // past the depth bound the wrapper is lost and its content flows into
    // the deepest open element
}

/// Elements that end an open sibling of the same kind, as browsers do.
fn implicit_close(stack: &mut Vec<Element>, tag: &str) {
    let closes: &[&str] = match tag {
        "p" => &["p"],
        "li" => &["li", "p"],
        "td" | "th" => &["td", "th", "p"],
        "tr" => &["tr", "td", "th", "p"],
        "thead" | "tbody" | "tfoot" => &["thead", "tbody", "tfoot", "tr", "td", "th", "p"],
        "ul" | "ol" | "table" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => &["p"],
        _ => &[],
    };
    while stack.len() > 1 {
        let top = stack.last().map(|e| e.tag.as_str()).unwrap_or("");
        if closes.contains(&top) {
            pop(stack);
        } else {
            break;
        }
    }
}

fn close_tag(stack: &mut Vec<Element>, name: &str) {
    let Some(idx) = stack.iter().rposition(|e| e.tag == name) else {
        return;
    };
    if idx == 0 {
        return;
    }
    while stack.len() > idx {
        pop(stack);
    }
}

fn pop(stack: &mut Vec<Element>) {
    if let Some(element) = stack.pop() {
        append(stack, MarkupNode::Element(element));
    }
}

fn append(stack: &mut [Element], node: MarkupNode) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn append_text(stack: &mut [Element], text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(top) = stack.last_mut() {
        if let Some(MarkupNode::Text(prev)) = top.children.last_mut() {
            prev.push_str(&text);
            return;
        }
        top.children.push(MarkupNode::Text(text));
    }
}

fn tag_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Parses `<tag attrs...>` at the start of `raw`; returns the element,
/// whether it was written self-closing and the bytes consumed.
fn parse_open_tag(raw: &str) -> Option<(Element, bool, usize)> {
    let mut chars = raw.char_indices().skip(1).peekable();
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == ':' {
            name.push(c.to_ascii_lowercase());
            chars.next();
        } else {
            break;
        }
    }
    let mut element = Element::new(&name);
    let mut self_closing = false;
    loop {
        while chars.peek().map_or(false, |&(_, c)| c.is_whitespace()) {
            chars.next();
        }
        let (idx, c) = chars.next()?;
        match c {
            '>' => return Some((element, self_closing, idx + 1)),
            '/' => self_closing = true,
            _ => {
                self_closing = false;
                let mut key = String::from(c.to_ascii_lowercase());
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
                        break;
                    }
                    key.push(c.to_ascii_lowercase());
                    chars.next();
                }
                while chars.peek().map_or(false, |&(_, c)| c.is_whitespace()) {
                    chars.next();
                }
                let mut value = String::new();
                if chars.peek().map(|&(_, c)| c) == Some('=') {
                    chars.next();
                    while chars.peek().map_or(false, |&(_, c)| c.is_whitespace()) {
                        chars.next();
                    }
                    match chars.peek().map(|&(_, c)| c) {
                        Some(q @ ('"' | '\'')) => {
                            chars.next();
                            for (_, c) in chars.by_ref() {
                                if c == q {
                                    break;
                                }
                                value.push(c);
                            }
                        }
                        _ => {
                            while let Some(&(_, c)) = chars.peek() {
                                if c.is_whitespace() || c == '>' {
                                    break;
                                }
                                value.push(c);
                                chars.next();
                            }
                        }
                    }
                }
                let value = html_escape::decode_html_entities(&value).into_owned();
                if !element.attrs.iter().any(|(k, _)| *k == key) {
                    element.attrs.push((key, value));
                }
            }
        }
    }
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    lower.find(&needle.to_ascii_lowercase())
}

/// Writes nodes back out as markup, escaping text and attribute values.
pub fn write_markup(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        MarkupNode::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (key, value) in &element.attrs {
                push_attr(out, key, value);
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

pub(crate) fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}

/// `prop: value` pairs of a `style` attribute, property names lowercased.
pub fn parse_style(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            Some((prop, value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &MarkupNode) -> &Element {
        match node {
            MarkupNode::Element(e) => e,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn nests_and_decodes() {
        let nodes = parse_markup("<p class=x>a &amp; <b>b</b></p>");
        assert_eq!(nodes.len(), 1);
        let p = element(&nodes[0]);
        assert_eq!(p.tag, "p");
        assert_eq!(p.attr("class"), Some("x"));
        assert_eq!(p.children[0], MarkupNode::Text("a & ".to_string()));
        assert_eq!(element(&p.children[1]).tag, "b");
    }

    #[test]
    fn script_body_is_raw_text() {
        let nodes = parse_markup("<script>if (a<b) { x(); }</script><p>ok</p>");
        let script = element(&nodes[0]);
        assert_eq!(script.children, vec![MarkupNode::Text("if (a<b) { x(); }".to_string())]);
        assert_eq!(element(&nodes[1]).tag, "p");
    }

    #[test]
    fn stray_close_and_unclosed_tags() {
        let nodes = parse_markup("</div><ul><li>one<li>two</ul><p>tail");
        let list = element(&nodes[0]);
        assert_eq!(list.children.len(), 2);
        let p = element(&nodes[1]);
        assert_eq!(p.children, vec![MarkupNode::Text("tail".to_string())]);
    }

    #[test]
    fn deep_nesting_terminates() {
        let raw = "<span>".repeat(10_000) + "x";
        let nodes = parse_markup(&raw);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let nodes = parse_markup("<!DOCTYPE html><!-- note --><br/>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(element(&nodes[0]).tag, "br");
    }

    #[test]
    fn writer_escapes() {
        let mut img = Element::new("img");
        img.attrs.push(("alt".into(), "\"q\" & <x>".into()));
        let out = write_markup(&[MarkupNode::Element(img), MarkupNode::Text("<b>".into())]);
        assert_eq!(out, "<img alt=\"&quot;q&quot; &amp; &lt;x&gt;\">&lt;b&gt;");
    }
}
