use crate::markup::{parse_markup, parse_style, push_attr, Element, MarkupNode};
use crate::{
    normalize_inlines, Align, Block, Document, Inline, ListItem, ListStyle, StringInterner,
    TableCell, TableRow, TextRun,
};
use std::sync::Arc;

const FONT_SIZES: [&str; 7] = [
    "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
];

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "head", "title", "template", "noscript", "iframe", "object",
];

const BLOCK_CONTAINERS: &[&str] = &[
    "div", "section", "article", "blockquote", "header", "footer", "main", "aside", "nav", "body",
    "html", "center", "figure", "figcaption", "pre", "address", "details", "summary", "dl", "dt",
    "dd",
];

pub fn font_size_name(level: u8) -> Option<&'static str> {
    FONT_SIZES.get(usize::from(level).checked_sub(1)?).copied()
}

fn font_size_level(raw: &str) -> Option<u8> {
    let raw = raw.trim().to_ascii_lowercase();
    if let Some(idx) = FONT_SIZES.iter().position(|s| *s == raw) {
        return Some(idx as u8 + 1);
    }
    match raw.parse::<u8>() {
        Ok(level @ 1..=7) => Some(level),
        _ => None,
    }
}

/// Canonical markup for a document.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        write_block(block, &mut out);
    }
    out
}

/// Best-effort read of markup; anything unusable degrades to a single
/// empty paragraph.
pub fn deserialize(markup: &str) -> Document {
    let nodes = parse_markup(markup);
    let mut builder = Builder::default();
    builder.blocks(&nodes, None);
    builder.flush(None);
    let mut doc = Document::from_blocks(builder.out);
    doc.normalize();
    doc
}

fn write_block(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph { align, content } => {
            open_with_align(out, "p", *align);
            write_inlines(content, out);
            out.push_str("</p>");
        }
        Block::Heading { level, align, content } => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            open_with_align(out, &tag, *align);
            write_inlines(content, out);
            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
        Block::List { ordered, style, align, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push('<');
            out.push_str(tag);
            if *style != ListStyle::Default {
                push_attr(out, "data-list-style", style.as_str());
            }
            if let Some(align) = align {
                push_attr(out, "style", &format!("text-align: {}", align.as_str()));
            }
            out.push('>');
            for item in items {
                out.push_str("<li>");
                write_inlines(&item.content, out);
                for sub in &item.sublists {
                    write_block(sub, out);
                }
                out.push_str("</li>");
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        Block::Table { has_header_row, rows } => {
            out.push_str("<table>");
            let body = if *has_header_row && !rows.is_empty() {
                out.push_str("<thead>");
                write_row(&rows[0], out);
                out.push_str("</thead>");
                &rows[1..]
            } else {
                &rows[..]
            };
            out.push_str("<tbody>");
            for row in body {
                write_row(row, out);
            }
            out.push_str("</tbody></table>");
        }
    }
}

fn open_with_align(out: &mut String, tag: &str, align: Option<Align>) {
    out.push('<');
    out.push_str(tag);
    if let Some(align) = align {
        push_attr(out, "style", &format!("text-align: {}", align.as_str()));
    }
    out.push('>');
}

fn write_row(row: &TableRow, out: &mut String) {
    out.push_str("<tr>");
    for cell in &row.cells {
        let tag = if cell.is_header { "th" } else { "td" };
        out.push('<');
        out.push_str(tag);
        out.push('>');
        write_inlines(&cell.content, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out.push_str("</tr>");
}

fn write_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(run) => write_run(run, out),
            Inline::Link { url, title, new_tab, content } => {
                out.push_str("<a");
                push_attr(out, "href", url);
                if let Some(title) = title {
                    push_attr(out, "title", title);
                }
                if *new_tab {
                    push_attr(out, "target", "_blank");
                    push_attr(out, "rel", "noopener noreferrer");
                }
                out.push('>');
                write_inlines(content, out);
                out.push_str("</a>");
            }
            Inline::Image { src, alt, width, height } => {
                out.push_str("<img");
                push_attr(out, "src", src);
                push_attr(out, "alt", alt);
                if let Some(w) = width {
                    push_attr(out, "width", &w.to_string());
                }
                if let Some(h) = height {
                    push_attr(out, "height", &h.to_string());
                }
                out.push('>');
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

fn write_run(run: &TextRun, out: &mut String) {
    let mut decls = Vec::new();
    if let Some(family) = &run.font_family {
        decls.push(format!("font-family: {}", family));
    }
    if let Some(size) = run.font_size.and_then(font_size_name) {
        decls.push(format!("font-size: {}", size));
    }
    if let Some(color) = &run.fore_color {
        decls.push(format!("color: {}", color));
    }
    if let Some(color) = &run.highlight_color {
        decls.push(format!("background-color: {}", color));
    }
    if !decls.is_empty() {
        out.push_str("<span");
        push_attr(out, "style", &decls.join("; "));
        out.push('>');
    }
    let marks = [
        (run.marks.bold, "strong"),
        (run.marks.italic, "em"),
        (run.marks.underline, "u"),
    ];
    for (on, tag) in marks {
        if on {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
    }
    out.push_str(&html_escape::encode_text(&run.text));
    for (on, tag) in marks.iter().rev() {
        if *on {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
    if !decls.is_empty() {
        out.push_str("</span>");
    }
}

fn element_align(e: &Element) -> Option<Align> {
    let from_style = e
        .attr("style")
        .map(parse_style)
        .and_then(|decls| decls.into_iter().find(|(p, _)| p == "text-align"))
        .and_then(|(_, v)| Align::parse(&v));
    from_style
        .or_else(|| e.attr("align").and_then(Align::parse))
        .or_else(|| (e.tag == "center").then_some(Align::Center))
}

fn is_list_node(node: Option<&MarkupNode>) -> bool {
    matches!(node, Some(MarkupNode::Element(e)) if e.tag == "ul" || e.tag == "ol")
}

fn is_indentation(text: &str) -> bool {
    text.trim().is_empty() && text.contains(['\n', '\r', '\t'])
}

/// Collapses indentation whitespace that markup authors put around tags.
/// Text without line breaks or tabs is kept verbatim.
fn clean_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if !raw.contains(['\n', '\r', '\t']) {
        return Some(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && c != '\u{a0}' {
            let mut run = String::from(c);
            while let Some(&n) = chars.peek() {
                if n.is_whitespace() && n != '\u{a0}' {
                    run.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            if run.contains(['\n', '\r', '\t']) {
                out.push(' ');
            } else {
                out.push_str(&run);
            }
        } else {
            out.push(c);
        }
    }
    if out.trim().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

#[derive(Default)]
struct Builder {
    out: Vec<Block>,
    pending: Vec<Inline>,
    soft_break: bool,
    interner: StringInterner,
}

impl Builder {
    fn blocks(&mut self, nodes: &[MarkupNode], align: Option<Align>) {
        for node in nodes {
            let element = match node {
                MarkupNode::Text(_) => {
                    self.push_pending(node);
                    continue;
                }
                MarkupNode::Element(e) => e,
            };
            let tag = element.tag.as_str();
            if SKIPPED_TAGS.contains(&tag) {
                continue;
            }
            if tag == "p" {
                self.flush(align);
                let content = self.inlines(&element.children, &TextRun::plain(""), false);
                self.out.push(Block::Paragraph {
                    align: element_align(element).or(align),
                    content,
                });
            } else if let Some(level) = heading_level(tag) {
                self.flush(align);
                let content = self.inlines(&element.children, &TextRun::plain(""), false);
                self.out.push(Block::Heading {
                    level,
                    align: element_align(element).or(align),
                    content,
                });
            } else if tag == "ul" || tag == "ol" {
                self.flush(align);
                let list = self.list(element, align);
                self.out.push(list);
            } else if tag == "table" {
                self.flush(align);
                if let Some(table) = self.table(element) {
                    self.out.push(table);
                }
            } else if tag == "li" {
                // stray item outside a list
                self.flush(align);
                let wrapper = Element {
                    tag: "ul".into(),
                    attrs: Vec::new(),
                    children: vec![node.clone()],
                };
                let list = self.list(&wrapper, align);
                self.out.push(list);
            } else if BLOCK_CONTAINERS.contains(&tag) || tag == "hr" {
                self.flush(align);
                self.blocks(&element.children, element_align(element).or(align));
                self.flush(element_align(element).or(align));
            } else {
                self.push_pending(node);
            }
        }
    }

    /// Inline content found at block level joins the pending paragraph.
    fn push_pending(&mut self, node: &MarkupNode) {
        let mut pending = std::mem::take(&mut self.pending);
        self.collect(node, &TextRun::plain(""), false, &mut pending);
        self.pending = pending;
    }

    fn flush(&mut self, align: Option<Align>) {
        if self.pending.is_empty() {
            return;
        }
        self.soft_break = false;
        let mut content = std::mem::take(&mut self.pending);
        normalize_inlines(&mut content);
        let blank = content
            .iter()
            .all(|i| matches!(i, Inline::Text(run) if run.text.trim().is_empty()));
        if !blank {
            self.out.push(Block::Paragraph { align, content });
        }
    }

    fn inlines(&mut self, nodes: &[MarkupNode], fmt: &TextRun, in_link: bool) -> Vec<Inline> {
        self.soft_break = false;
        let mut out = Vec::new();
        for node in nodes {
            self.collect(node, fmt, in_link, &mut out);
        }
        self.soft_break = false;
        out
    }

    /// Pushes an inline, first closing a block that was flattened into
    /// this container with a line break.
    fn emit(&mut self, out: &mut Vec<Inline>, inline: Inline) {
        let broken = matches!(out.last(), None | Some(Inline::LineBreak));
        if std::mem::take(&mut self.soft_break) && !broken {
            out.push(Inline::LineBreak);
        }
        out.push(inline);
    }

    fn collect(&mut self, node: &MarkupNode, fmt: &TextRun, in_link: bool, out: &mut Vec<Inline>) {
        let e = match node {
            MarkupNode::Text(text) => {
                if let Some(text) = clean_text(text) {
                    self.emit(out, Inline::Text(fmt.with_text(text)));
                }
                return;
            }
            MarkupNode::Element(e) => e,
        };
        let tag = e.tag.as_str();
        if SKIPPED_TAGS.contains(&tag) {
            return;
        }
        let mut next = fmt.clone();
        match tag {
            "strong" | "b" => next.marks.bold = true,
            "em" | "i" => next.marks.italic = true,
            "u" | "ins" => next.marks.underline = true,
            "span" | "font" => self.apply_run_style(e, &mut next),
            "a" if !in_link && e.attr("href").map_or(false, |h| !h.trim().is_empty()) => {
                let mut content = Vec::new();
                for child in &e.children {
                    self.collect(child, &next, true, &mut content);
                }
                let title = e
                    .attr("title")
                    .filter(|t| !t.is_empty())
                    .map(|t| self.interner.intern(t));
                let link = Inline::Link {
                    url: self.interner.intern(e.attr("href").unwrap_or("").trim()),
                    title,
                    new_tab: e.attr("target").map_or(false, |t| t.eq_ignore_ascii_case("_blank")),
                    content,
                };
                self.emit(out, link);
                return;
            }
            "img" => {
                let image = Inline::Image {
                    src: self.interner.intern(e.attr("src").unwrap_or("").trim()),
                    alt: Arc::from(e.attr("alt").unwrap_or("")),
                    width: e.attr("width").and_then(|w| w.trim().parse().ok()),
                    height: e.attr("height").and_then(|h| h.trim().parse().ok()),
                };
                self.emit(out, image);
                return;
            }
            "br" => {
                self.soft_break = false;
                out.push(Inline::LineBreak);
                return;
            }
            _ if is_block_tag(tag) => {
                self.soft_break = true;
                for child in &e.children {
                    self.collect(child, &next, in_link, out);
                }
                self.soft_break = true;
                return;
            }
            _ => {}
        }
        for child in &e.children {
            self.collect(child, &next, in_link, out);
        }
    }

    fn apply_run_style(&mut self, e: &Element, run: &mut TextRun) {
        if let Some(style) = e.attr("style") {
            for (prop, value) in parse_style(style) {
                match prop.as_str() {
                    "color" => run.fore_color = Some(self.interner.intern_css(&value)),
                    "background-color" | "background" => {
                        run.highlight_color = Some(self.interner.intern_css(&value))
                    }
                    "font-family" => run.font_family = Some(self.interner.intern_css(&value)),
                    "font-size" => {
                        if let Some(level) = font_size_level(&value) {
                            run.font_size = Some(level);
                        }
                    }
                    "font-weight" if value == "bold" || value == "700" => run.marks.bold = true,
                    "font-style" if value == "italic" => run.marks.italic = true,
                    "text-decoration" | "text-decoration-line" if value.contains("underline") => {
                        run.marks.underline = true
                    }
                    _ => {}
                }
            }
        }
        if e.tag == "font" {
            if let Some(color) = e.attr("color") {
                run.fore_color = Some(self.interner.intern_css(color));
            }
            if let Some(face) = e.attr("face") {
                run.font_family = Some(self.interner.intern_css(face));
            }
            if let Some(level) = e.attr("size").and_then(font_size_level) {
                run.font_size = Some(level);
            }
        }
    }

    fn list(&mut self, e: &Element, align: Option<Align>) -> Block {
        let ordered = e.tag == "ol";
        let style = e
            .attr("data-list-style")
            .and_then(ListStyle::parse)
            .or_else(|| {
                let decls = e.attr("style").map(parse_style).unwrap_or_default();
                decls
                    .into_iter()
                    .find(|(p, _)| p == "list-style-type" || p == "list-style")
                    .and_then(|(_, v)| v.split_whitespace().find_map(ListStyle::parse))
            })
            .unwrap_or_default();
        let mut items: Vec<ListItem> = Vec::new();
        for child in &e.children {
            match child {
                MarkupNode::Element(li) if li.tag == "li" => items.push(self.list_item(li)),
                MarkupNode::Element(sub) if sub.tag == "ul" || sub.tag == "ol" => {
                    let nested = self.list(sub, None);
                    match items.last_mut() {
                        Some(item) => item.sublists.push(nested),
                        None => {
                            let mut item = ListItem::new(Vec::new());
                            item.sublists.push(nested);
                            items.push(item);
                        }
                    }
                }
                MarkupNode::Text(text) if text.trim().is_empty() => {}
                other => {
                    let plain = TextRun::plain("");
                    let mut content = self.inlines(std::slice::from_ref(other), &plain, false);
                    normalize_inlines(&mut content);
                    if !content.is_empty() {
                        items.push(ListItem::new(content));
                    }
                }
            }
        }
        if items.is_empty() {
            items.push(ListItem::new(Vec::new()));
        }
        Block::List {
            ordered,
            style,
            align: element_align(e).or(align),
            items,
        }
    }

    fn list_item(&mut self, li: &Element) -> ListItem {
        let mut content = Vec::new();
        let mut sublists = Vec::new();
        self.soft_break = false;
        let children = &li.children;
        for (i, child) in children.iter().enumerate() {
            match child {
                MarkupNode::Element(sub) if is_list_node(Some(child)) => {
                    sublists.push(self.list(sub, None))
                }
                // source indentation at the item edges or around nested lists
                MarkupNode::Text(text)
                    if is_indentation(text)
                        && (i == 0
                            || i + 1 == children.len()
                            || is_list_node(children.get(i + 1))
                            || is_list_node(children.get(i - 1))) => {}
                other => self.collect(other, &TextRun::plain(""), false, &mut content),
            }
        }
        self.soft_break = false;
        ListItem { content, sublists }
    }

    fn table(&mut self, e: &Element) -> Option<Block> {
        let mut rows: Vec<TableRow> = Vec::new();
        let mut saw_head = false;
        let mut saw_section = false;
        self.table_rows(&e.children, false, &mut rows, &mut saw_head, &mut saw_section);
        rows.retain(|r| !r.cells.is_empty());
        let width = rows.iter().map(|r| r.cells.len()).max()?;
        for row in &mut rows {
            let header = row.is_header_row();
            while row.cells.len() < width {
                row.cells.push(TableCell::empty(header));
            }
        }
        let has_header_row = if saw_section {
            saw_head
        } else {
            rows.first().map_or(false, TableRow::is_header_row)
        };
        Some(Block::Table { has_header_row, rows })
    }

    fn table_rows(
        &mut self,
        nodes: &[MarkupNode],
        in_head: bool,
        rows: &mut Vec<TableRow>,
        saw_head: &mut bool,
        saw_section: &mut bool,
    ) {
        for node in nodes {
            let MarkupNode::Element(e) = node else { continue };
            match e.tag.as_str() {
                "thead" => {
                    *saw_section = true;
                    *saw_head = *saw_head || rows.is_empty();
                    self.table_rows(&e.children, true, rows, saw_head, saw_section);
                }
                "tbody" | "tfoot" => {
                    *saw_section = true;
                    self.table_rows(&e.children, false, rows, saw_head, saw_section);
                }
                "tr" => {
                    let mut cells = Vec::new();
                    for cell in &e.children {
                        let MarkupNode::Element(c) = cell else { continue };
                        if c.tag != "td" && c.tag != "th" {
                            continue;
                        }
                        let mut content = self.inlines(&c.children, &TextRun::plain(""), false);
                        normalize_inlines(&mut content);
                        cells.push(TableCell {
                            is_header: c.tag == "th" || in_head,
                            content,
                        });
                    }
                    rows.push(TableRow { cells });
                }
                _ => {}
            }
        }
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "ul" | "ol" | "li" | "table" | "tr" | "td" | "th" | "thead" | "tbody" | "tfoot"
    )
        || heading_level(tag).is_some()
        || BLOCK_CONTAINERS.contains(&tag)
}
