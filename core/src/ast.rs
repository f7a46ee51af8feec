use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub type SharedStr = Arc<str>;

/// Stand-in character for an image in a container's flattened text.
pub const OBJECT_CHAR: char = '\u{FFFC}';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub version: u64,
    pub blocks: Vec<Block>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub title: SharedStr,
    pub author: SharedStr,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: Arc::from(""),
            author: Arc::from(""),
            created_at: 0,
            updated_at: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Align::Left),
            "center" | "middle" => Some(Align::Center),
            "right" | "end" => Some(Align::Right),
            "justify" => Some(Align::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyle {
    #[default]
    Default,
    Disc,
    Circle,
    Square,
    Arrow,
    Check,
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl ListStyle {
    pub const ALL: [ListStyle; 11] = [
        ListStyle::Default,
        ListStyle::Disc,
        ListStyle::Circle,
        ListStyle::Square,
        ListStyle::Arrow,
        ListStyle::Check,
        ListStyle::Decimal,
        ListStyle::LowerAlpha,
        ListStyle::UpperAlpha,
        ListStyle::LowerRoman,
        ListStyle::UpperRoman,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ListStyle::Default => "default",
            ListStyle::Disc => "disc",
            ListStyle::Circle => "circle",
            ListStyle::Square => "square",
            ListStyle::Arrow => "arrow",
            ListStyle::Check => "check",
            ListStyle::Decimal => "decimal",
            ListStyle::LowerAlpha => "lower-alpha",
            ListStyle::UpperAlpha => "upper-alpha",
            ListStyle::LowerRoman => "lower-roman",
            ListStyle::UpperRoman => "upper-roman",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        match raw.as_str() {
            "" | "none" => Some(ListStyle::Default),
            "lower-latin" => Some(ListStyle::LowerAlpha),
            "upper-latin" => Some(ListStyle::UpperAlpha),
            _ => Self::ALL.into_iter().find(|s| s.as_str() == raw),
        }
    }

    /// `Some(true)` for numbering styles, `Some(false)` for bullet styles.
    pub fn ordering(self) -> Option<bool> {
        match self {
            ListStyle::Default => None,
            ListStyle::Disc
            | ListStyle::Circle
            | ListStyle::Square
            | ListStyle::Arrow
            | ListStyle::Check => Some(false),
            ListStyle::Decimal
            | ListStyle::LowerAlpha
            | ListStyle::UpperAlpha
            | ListStyle::LowerRoman
            | ListStyle::UpperRoman => Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        align: Option<Align>,
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        align: Option<Align>,
        content: Vec<Inline>,
    },
    List {
        ordered: bool,
        style: ListStyle,
        align: Option<Align>,
        items: Vec<ListItem>,
    },
    Table {
        has_header_row: bool,
        rows: Vec<TableRow>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
    /// Nested lists; only `Block::List` values live here.
    #[serde(default)]
    pub sublists: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub is_header: bool,
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text(TextRun),
    Link {
        url: SharedStr,
        title: Option<SharedStr>,
        new_tab: bool,
        content: Vec<Inline>,
    },
    Image {
        src: SharedStr,
        alt: SharedStr,
        width: Option<u32>,
        height: Option<u32>,
    },
    LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: SharedStr,
    #[serde(default)]
    pub marks: Marks,
    pub fore_color: Option<SharedStr>,
    pub highlight_color: Option<SharedStr>,
    pub font_family: Option<SharedStr>,
    /// Legacy font size level, 1..=7.
    pub font_size: Option<u8>,
}

impl TextRun {
    pub fn plain(text: impl Into<SharedStr>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
            fore_color: None,
            highlight_color: None,
            font_family: None,
            font_size: None,
        }
    }

    /// Same formatting, different text.
    pub fn with_text(&self, text: impl Into<SharedStr>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn same_format(&self, other: &TextRun) -> bool {
        self.marks == other.marks
            && self.fore_color == other.fore_color
            && self.highlight_color == other.highlight_color
            && self.font_family == other.font_family
            && self.font_size == other.font_size
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl Inline {
    pub fn text(value: &str) -> Self {
        Inline::Text(TextRun::plain(value))
    }

    /// Width of this node in container offsets.
    pub fn len(&self) -> usize {
        match self {
            Inline::Text(run) => run.char_len(),
            Inline::Link { content, .. } => inline_len(content),
            Inline::Image { .. } | Inline::LineBreak => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn inline_len(inlines: &[Inline]) -> usize {
    inlines.iter().map(Inline::len).sum()
}

/// Text as offsets see it: one char per text char, `\n` per line break and
/// [`OBJECT_CHAR`] per image.
pub fn flat_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_flat_text(inlines, &mut out);
    out
}

fn push_flat_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::Link { content, .. } => push_flat_text(content, out),
            Inline::Image { .. } => out.push(OBJECT_CHAR),
            Inline::LineBreak => out.push('\n'),
        }
    }
}

/// Drops empty runs and links, merges neighbouring runs that share formatting.
pub fn normalize_inlines(content: &mut Vec<Inline>) {
    let mut out: Vec<Inline> = Vec::with_capacity(content.len());
    for inline in std::mem::take(content) {
        match inline {
            Inline::Text(run) => {
                if run.text.is_empty() {
                    continue;
                }
                if let Some(Inline::Text(prev)) = out.last_mut() {
                    if prev.same_format(&run) {
                        let mut merged = String::with_capacity(prev.text.len() + run.text.len());
                        merged.push_str(&prev.text);
                        merged.push_str(&run.text);
                        prev.text = Arc::from(merged);
                        continue;
                    }
                }
                out.push(Inline::Text(run));
            }
            Inline::Link { url, title, new_tab, mut content } => {
                normalize_inlines(&mut content);
                if content.is_empty() {
                    continue;
                }
                out.push(Inline::Link { url, title, new_tab, content });
            }
            other => out.push(other),
        }
    }
    *content = out;
}

impl Document {
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let now = chrono::Utc::now().timestamp();
        let mut doc = Self {
            id: Uuid::new_v4(),
            version: 1,
            blocks,
            metadata: Metadata {
                created_at: now,
                updated_at: now,
                ..Metadata::default()
            },
        };
        doc.ensure_not_empty();
        doc
    }

    pub fn touch(&mut self) {
        self.version = self.version.saturating_add(1);
        self.metadata.updated_at = chrono::Utc::now().timestamp();
    }

    pub fn ensure_not_empty(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty_paragraph());
        }
    }

    /// Structural equality, ignoring identity and metadata.
    pub fn same_content(&self, other: &Document) -> bool {
        self.blocks == other.blocks
    }

    pub fn is_empty(&self) -> bool {
        match self.blocks.as_slice() {
            [Block::Paragraph { content, .. }] => content.is_empty(),
            _ => false,
        }
    }

    pub fn normalize(&mut self) {
        for block in &mut self.blocks {
            block.normalize();
        }
        self.ensure_not_empty();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Block {
    pub fn empty_paragraph() -> Self {
        Block::Paragraph { align: None, content: Vec::new() }
    }

    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph { align: None, content }
    }

    /// Inline content of a paragraph or heading.
    pub fn text_content(&self) -> Option<&Vec<Inline>> {
        match self {
            Block::Paragraph { content, .. } | Block::Heading { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn normalize(&mut self) {
        match self {
            Block::Paragraph { content, .. } | Block::Heading { content, .. } => {
                normalize_inlines(content)
            }
            Block::List { items, .. } => {
                for item in items {
                    normalize_inlines(&mut item.content);
                    for sub in &mut item.sublists {
                        sub.normalize();
                    }
                }
            }
            Block::Table { rows, .. } => {
                for row in rows {
                    for cell in &mut row.cells {
                        normalize_inlines(&mut cell.content);
                    }
                }
            }
        }
    }
}

impl ListItem {
    pub fn new(content: Vec<Inline>) -> Self {
        Self { content, sublists: Vec::new() }
    }
}

impl TableRow {
    pub fn is_header_row(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|c| c.is_header)
    }
}

impl TableCell {
    pub fn empty(is_header: bool) -> Self {
        Self { is_header, content: Vec::new() }
    }

    pub fn with_text(is_header: bool, text: &str) -> Self {
        Self { is_header, content: vec![Inline::text(text)] }
    }
}
