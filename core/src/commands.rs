use crate::sanitizer::{is_safe_css_value, safe_url, url_scheme};
use crate::{Align, EditorError, ListStyle, Mark, Result};
use serde::{Deserialize, Serialize};

/// Scalar parameter that travels with a command name. Composite
/// parameters are JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandValue {
    Number(i64),
    Text(String),
}

impl CommandValue {
    pub fn as_text(&self) -> String {
        match self {
            CommandValue::Number(n) => n.to_string(),
            CommandValue::Text(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            CommandValue::Number(n) => Some(*n),
            CommandValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for CommandValue {
    fn from(value: &str) -> Self {
        CommandValue::Text(value.to_string())
    }
}

impl From<String> for CommandValue {
    fn from(value: String) -> Self {
        CommandValue::Text(value)
    }
}

impl From<i64> for CommandValue {
    fn from(value: i64) -> Self {
        CommandValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attr", content = "value", rename_all = "snake_case")]
pub enum InlineAttr {
    FontFamily(String),
    FontSize(u8),
    ForeColor(String),
    HighlightColor(String),
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub open_in_new_tab: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub rows: i64,
    pub cols: i64,
    #[serde(default = "default_true")]
    pub has_header_row: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSpec {
    /// Falls back to the selected text.
    #[serde(default)]
    pub keyword: Option<String>,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_true")]
    pub open_in_new_tab: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EditorCommand {
    ToggleMark(Mark),
    SetInlineAttr(InlineAttr),
    /// 0 is a paragraph, 1..=6 a heading level.
    SetBlockType(u8),
    SetAlignment(Align),
    ApplyList { ordered: bool, style: ListStyle },
    CreateLink(LinkSpec),
    InsertImage(ImageSpec),
    InsertTable(TableSpec),
    TableInsertRow,
    TableInsertColumn,
    TableDeleteRow,
    TableDeleteColumn,
    InsertFragment(String),
    LinkKeyword(KeywordSpec),
    Undo,
    Redo,
}

impl EditorCommand {
    /// Resolves a command name and its optional value.
    pub fn parse(name: &str, value: Option<CommandValue>) -> Result<Self> {
        let need = |value: Option<CommandValue>| {
            value.ok_or_else(|| EditorError::MissingValue(name.to_string()))
        };
        let cmd = match name {
            "bold" => EditorCommand::ToggleMark(Mark::Bold),
            "italic" => EditorCommand::ToggleMark(Mark::Italic),
            "underline" => EditorCommand::ToggleMark(Mark::Underline),
            "fontFamily" => inline_attr(name, need(value)?, InlineAttr::FontFamily)?,
            "foreColor" => inline_attr(name, need(value)?, InlineAttr::ForeColor)?,
            "highlightColor" => inline_attr(name, need(value)?, InlineAttr::HighlightColor)?,
            "fontSizeLevel" => {
                let level = need(value)?
                    .as_number()
                    .filter(|n| (1..=7).contains(n))
                    .ok_or_else(|| {
                        EditorError::invalid_value(name, "font size level must be 1..=7")
                    })?;
                EditorCommand::SetInlineAttr(InlineAttr::FontSize(level as u8))
            }
            "heading" => {
                EditorCommand::SetBlockType(heading_level(name, &need(value)?.as_text())?)
            }
            "link:create" => {
                EditorCommand::CreateLink(LinkSpec::from_value(name, need(value)?)?)
            }
            "image:insert" => {
                EditorCommand::InsertImage(ImageSpec::from_value(name, need(value)?)?)
            }
            "table:insert" => {
                EditorCommand::InsertTable(TableSpec::from_value(name, need(value)?)?)
            }
            "table:insertRow" => EditorCommand::TableInsertRow,
            "table:insertColumn" => EditorCommand::TableInsertColumn,
            "table:deleteRow" => EditorCommand::TableDeleteRow,
            "table:deleteColumn" => EditorCommand::TableDeleteColumn,
            "fragment:insert" => EditorCommand::InsertFragment(need(value)?.as_text()),
            "linkKeyword" => {
                EditorCommand::LinkKeyword(KeywordSpec::from_value(name, need(value)?)?)
            }
            "undo" => EditorCommand::Undo,
            "redo" => EditorCommand::Redo,
            _ => return Self::parse_parameterized(name),
        };
        Ok(cmd)
    }

    fn parse_parameterized(name: &str) -> Result<Self> {
        if let Some(level) = name.strip_prefix("heading:") {
            return Ok(EditorCommand::SetBlockType(heading_level(name, level)?));
        }
        if let Some(align) = name.strip_prefix("alignment:") {
            let align = Align::parse(align)
                .ok_or_else(|| EditorError::invalid_value(name, "unknown alignment"))?;
            return Ok(EditorCommand::SetAlignment(align));
        }
        if let Some(rest) = name.strip_prefix("list:") {
            let (kind, style) = rest.split_once(':').unwrap_or((rest, ""));
            let ordered = match kind {
                "ordered" => true,
                "unordered" => false,
                _ => return Err(EditorError::invalid_value(name, "expected ordered or unordered")),
            };
            let style = ListStyle::parse(style)
                .ok_or_else(|| EditorError::invalid_value(name, "unknown list style"))?;
            if style.ordering().map_or(false, |o| o != ordered) {
                return Err(EditorError::invalid_value(name, "style does not fit the list kind"));
            }
            return Ok(EditorCommand::ApplyList { ordered, style });
        }
        Err(EditorError::UnknownCommand(name.to_string()))
    }

    /// Command name as the vocabulary spells it.
    pub fn name(&self) -> String {
        match self {
            EditorCommand::ToggleMark(Mark::Bold) => "bold".into(),
            EditorCommand::ToggleMark(Mark::Italic) => "italic".into(),
            EditorCommand::ToggleMark(Mark::Underline) => "underline".into(),
            EditorCommand::SetInlineAttr(InlineAttr::FontFamily(_)) => "fontFamily".into(),
            EditorCommand::SetInlineAttr(InlineAttr::FontSize(_)) => "fontSizeLevel".into(),
            EditorCommand::SetInlineAttr(InlineAttr::ForeColor(_)) => "foreColor".into(),
            EditorCommand::SetInlineAttr(InlineAttr::HighlightColor(_)) => "highlightColor".into(),
            EditorCommand::SetBlockType(level) => format!("heading:{}", level),
            EditorCommand::SetAlignment(align) => format!("alignment:{}", align.as_str()),
            EditorCommand::ApplyList { ordered, style } => format!(
                "list:{}:{}",
                if *ordered { "ordered" } else { "unordered" },
                style.as_str()
            ),
            EditorCommand::CreateLink(_) => "link:create".into(),
            EditorCommand::InsertImage(_) => "image:insert".into(),
            EditorCommand::InsertTable(_) => "table:insert".into(),
            EditorCommand::TableInsertRow => "table:insertRow".into(),
            EditorCommand::TableInsertColumn => "table:insertColumn".into(),
            EditorCommand::TableDeleteRow => "table:deleteRow".into(),
            EditorCommand::TableDeleteColumn => "table:deleteColumn".into(),
            EditorCommand::InsertFragment(_) => "fragment:insert".into(),
            EditorCommand::LinkKeyword(_) => "linkKeyword".into(),
            EditorCommand::Undo => "undo".into(),
            EditorCommand::Redo => "redo".into(),
        }
    }
}

fn heading_level(name: &str, raw: &str) -> Result<u8> {
    match raw.trim().parse::<u8>() {
        Ok(level @ 0..=6) => Ok(level),
        _ => Err(EditorError::invalid_value(name, "heading level must be 0..=6")),
    }
}

fn inline_attr(
    name: &str,
    value: CommandValue,
    make: fn(String) -> InlineAttr,
) -> Result<EditorCommand> {
    Ok(EditorCommand::SetInlineAttr(make(css_value(name, &value)?)))
}

fn css_value(name: &str, value: &CommandValue) -> Result<String> {
    let text = value.as_text();
    let folded = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !is_safe_css_value(&folded) {
        return Err(EditorError::invalid_value(name, format!("unsafe value `{}`", text)));
    }
    Ok(folded)
}

fn from_json<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| EditorError::invalid_value(name, e.to_string()))
}

fn is_json_object(raw: &str) -> bool {
    raw.trim_start().starts_with('{')
}

impl LinkSpec {
    /// JSON object, or a bare URL.
    pub fn from_value(name: &str, value: CommandValue) -> Result<Self> {
        let raw = value.as_text();
        if is_json_object(&raw) {
            return from_json(name, &raw);
        }
        Ok(Self {
            url: raw,
            title: None,
            open_in_new_tab: true,
        })
    }
}

impl ImageSpec {
    /// JSON object, or a bare source.
    pub fn from_value(name: &str, value: CommandValue) -> Result<Self> {
        let raw = value.as_text();
        if is_json_object(&raw) {
            return from_json(name, &raw);
        }
        Ok(Self {
            src: raw,
            alt: String::new(),
            width: None,
            height: None,
        })
    }
}

impl TableSpec {
    /// JSON object or `RxC`. Sizes below one are rejected.
    pub fn from_value(name: &str, value: CommandValue) -> Result<Self> {
        let raw = value.as_text();
        let spec = if is_json_object(&raw) {
            from_json(name, &raw)?
        } else {
            let (rows, cols) = raw
                .to_ascii_lowercase()
                .split_once('x')
                .and_then(|(r, c)| Some((r.trim().parse().ok()?, c.trim().parse().ok()?)))
                .ok_or_else(|| EditorError::invalid_value(name, "expected {rows, cols} or RxC"))?;
            TableSpec { rows, cols, has_header_row: true }
        };
        if spec.rows < 1 || spec.cols < 1 {
            return Err(EditorError::InvalidTableSize {
                rows: spec.rows,
                cols: spec.cols,
            });
        }
        Ok(spec)
    }
}

impl KeywordSpec {
    /// JSON object, or a bare URL for the selected text.
    pub fn from_value(name: &str, value: CommandValue) -> Result<Self> {
        let raw = value.as_text();
        if is_json_object(&raw) {
            return from_json(name, &raw);
        }
        Ok(Self {
            keyword: None,
            url: raw,
            title: None,
            open_in_new_tab: true,
        })
    }
}

const REJECTED_LINK_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

/// Trims a link target and gives it `default_scheme` when it has none.
/// Script and data URLs are refused.
pub fn normalize_link_url(raw: &str, default_scheme: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() || url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(EditorError::InvalidUrl(raw.to_string()));
    }
    match explicit_scheme(url) {
        Some(scheme) if REJECTED_LINK_SCHEMES.contains(&scheme.as_str()) => {
            Err(EditorError::InvalidUrl(raw.to_string()))
        }
        Some(_) => Ok(url.to_string()),
        None if url.starts_with(['/', '#', '?']) => Ok(url.to_string()),
        None => Ok(format!("{}{}", default_scheme, url)),
    }
}

/// Trims an image source; `data:image/...` is accepted, script URLs are not.
pub fn normalize_image_src(raw: &str) -> Result<String> {
    let src = raw.trim();
    if src.is_empty() {
        return Err(EditorError::InvalidUrl(raw.to_string()));
    }
    safe_url(src, true).ok_or_else(|| EditorError::InvalidUrl(raw.to_string()))
}

/// `host:port` and `example.com:8080/x` carry no scheme.
fn explicit_scheme(url: &str) -> Option<String> {
    let scheme = url_scheme(url)?;
    let rest = &url[url.find(':')? + 1..];
    if scheme.contains('.') || rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(scheme)
}
