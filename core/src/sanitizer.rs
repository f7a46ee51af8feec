use crate::markup::{parse_markup, parse_style, write_markup, Element, MarkupNode};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Elements dropped together with everything inside them.
const DENIED_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "link", "meta",
    "base", "noscript", "template", "svg", "math", "form", "input", "button", "textarea", "select",
    "option",
];

const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "thead", "tbody", "tfoot",
    "tr", "th", "td", "a", "img", "br", "strong", "b", "em", "i", "u", "ins", "span", "font", "div",
    "center",
];

const STYLE_PROPERTIES: &[&str] = &[
    "text-align",
    "color",
    "background-color",
    "font-family",
    "font-size",
    "list-style-type",
    "font-weight",
    "font-style",
    "text-decoration",
];

fn allowed_attrs(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "title", "target", "rel"],
        "img" => &["src", "alt", "width", "height"],
        "ul" | "ol" => &["style", "align", "data-list-style"],
        "font" => &["color", "face", "size"],
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "span" | "div" | "center" | "th"
        | "td" => &["style", "align"],
        _ => &[],
    }
}

/// Filters untrusted markup down to what the document model can hold.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_depth: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn sanitize(&self, raw: &str) -> String {
        write_markup(&self.filter_nodes(parse_markup(raw)))
    }

    pub fn filter_nodes(&self, nodes: Vec<MarkupNode>) -> Vec<MarkupNode> {
        let mut out = Vec::with_capacity(nodes.len());
        self.filter_into(nodes, 0, &mut out);
        out
    }

    fn filter_into(&self, nodes: Vec<MarkupNode>, depth: usize, out: &mut Vec<MarkupNode>) {
        for node in nodes {
            let element = match node {
                MarkupNode::Text(text) => {
                    out.push(MarkupNode::Text(text));
                    continue;
                }
                MarkupNode::Element(element) => element,
            };
            if depth >= self.max_depth {
                tracing::debug!(
                    tag = %element.tag,
                    depth,
                    "sanitizer depth bound reached, dropping content"
                );
                continue;
            }
            if DENIED_TAGS.contains(&element.tag.as_str()) {
                tracing::debug!(tag = %element.tag, "dropping denied element");
                continue;
            }
            if element.attrs.iter().any(|(k, _)| k.starts_with("on")) {
                tracing::debug!(tag = %element.tag, "dropping element with event handler");
                continue;
            }
            if ALLOWED_TAGS.contains(&element.tag.as_str()) {
                let Element { tag, attrs, children } = element;
                let attrs = filter_attrs(&tag, attrs);
                if tag == "a" && !attrs.iter().any(|(k, _)| k == "href") {
                    // a link without a usable target is just its text
                    self.filter_into(children, depth + 1, out);
                    continue;
                }
                let mut kept = Vec::with_capacity(children.len());
                self.filter_into(children, depth + 1, &mut kept);
                out.push(MarkupNode::Element(Element { tag, attrs, children: kept }));
            } else {
                self.filter_into(element.children, depth + 1, out);
            }
        }
    }
}

/// Sanitizes with the default depth bound.
pub fn sanitize(raw: &str) -> String {
    Sanitizer::default().sanitize(raw)
}

fn filter_attrs(tag: &str, attrs: Vec<(String, String)>) -> Vec<(String, String)> {
    let allowed = allowed_attrs(tag);
    attrs
        .into_iter()
        .filter(|(k, _)| allowed.contains(&k.as_str()))
        .filter_map(|(k, v)| {
            let v = match k.as_str() {
                "href" => safe_url(&v, false).filter(|url| !url.is_empty())?,
                "src" => safe_url(&v, true)?,
                "style" => safe_style(&v)?,
                "target" => match v.trim().to_ascii_lowercase().as_str() {
                    t @ ("_blank" | "_self" | "_parent" | "_top") => t.to_string(),
                    _ => return None,
                },
                "color" | "face" => {
                    if !is_safe_css_value(&v) {
                        return None;
                    }
                    v.trim().to_string()
                }
                "size" => match v.trim() {
                    s @ ("1" | "2" | "3" | "4" | "5" | "6" | "7") => s.to_string(),
                    _ => return None,
                },
                "width" | "height" => {
                    let trimmed = v.trim();
                    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
                        return None;
                    }
                    trimmed.to_string()
                }
                "data-list-style" => crate::ListStyle::parse(&v)?.as_str().to_string(),
                "align" => crate::Align::parse(&v)?.as_str().to_string(),
                _ => v,
            };
            Some((k, v))
        })
        .collect()
}

/// Scheme of a URL as a browser would read it: control characters and
/// whitespace are ignored and case does not matter.
pub(crate) fn url_scheme(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let colon = compact.find(':')?;
    let scheme = &compact[..colon];
    let scheme_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.');
    if scheme.is_empty() || !scheme.chars().all(scheme_char) {
        return None;
    }
    Some(scheme.to_string())
}

pub(crate) fn safe_url(raw: &str, image: bool) -> Option<String> {
    let trimmed = raw.trim();
    match url_scheme(trimmed).as_deref() {
        Some("javascript") | Some("vbscript") => None,
        Some("data") => {
            let lower = trimmed.to_ascii_lowercase();
            (image && lower.starts_with("data:image/")).then(|| trimmed.to_string())
        }
        _ => Some(trimmed.to_string()),
    }
}

pub(crate) fn is_safe_css_value(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    !value.trim().is_empty()
        && !lower.contains("url(")
        && !lower.contains("expression(")
        && !lower.contains("javascript:")
        && value
            .chars()
            .all(|c| {
                c.is_alphanumeric()
                    || matches!(c, ' ' | '#' | '%' | '.' | ',' | '-' | '(' | ')' | '\'' | '"')
            })
}

fn safe_style(raw: &str) -> Option<String> {
    let kept: Vec<String> = parse_style(raw)
        .into_iter()
        .filter(|(prop, value)| {
            STYLE_PROPERTIES.contains(&prop.as_str()) && is_safe_css_value(value)
        })
        .map(|(prop, value)| format!("{}: {}", prop, value))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_keeps_known_properties() {
        assert_eq!(
            safe_style("color: #fff; position: fixed; background: url(x)").as_deref(),
            Some("color: #fff")
        );
        assert_eq!(safe_style("width: 100%"), None);
    }

    #[test]
    fn schemes_are_read_like_browsers() {
        assert_eq!(url_scheme(" Java\tScript:alert(1)").as_deref(), Some("javascript"));
        assert_eq!(url_scheme("/relative/path"), None);
        assert!(safe_url("data:image/png;base64,AAAA", true).is_some());
        assert!(safe_url("data:text/html,<b>", true).is_none());
        assert!(safe_url("data:image/png;base64,AAAA", false).is_none());
    }
}
