use serde::{Deserialize, Serialize};

use crate::{inline_len, Document, EditorError, Result, OBJECT_CHAR};

/// A point inside an inline container.
///
/// `path` walks from the root: `[block]` for a paragraph or heading,
/// `[block, item, (sublist, item)*]` for a list item and
/// `[block, row, col]` for a table cell. `offset` counts characters of the
/// container's flattened text, with images and line breaks one wide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Position {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    pub fn start() -> Self {
        Self { path: vec![0], offset: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn collapsed(pos: Position) -> Self {
        Self { anchor: pos.clone(), focus: pos }
    }

    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Range inside one container.
    pub fn within(path: Vec<usize>, start: usize, end: usize) -> Self {
        Self {
            anchor: Position::new(path.clone(), start),
            focus: Position::new(path, end),
        }
    }

    pub fn caret(path: Vec<usize>, offset: usize) -> Self {
        Self::collapsed(Position::new(path, offset))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Concatenated text of the range; containers are joined with `\n`.
    pub fn to_text(&self, doc: &Document) -> Result<String> {
        let range = doc.range(self)?;
        if range.is_collapsed() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(range.segments.len());
        for seg in &range.segments {
            let content = doc
                .container(&seg.path)
                .ok_or_else(|| EditorError::InvalidSelection(format!("{:?}", seg.path)))?;
            let text: String = crate::flat_text(content)
                .chars()
                .skip(seg.start)
                .take(seg.end - seg.start)
                .filter(|c| *c != OBJECT_CHAR)
                .collect();
            parts.push(text);
        }
        Ok(parts.join("\n"))
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::collapsed(Position::start())
    }
}

/// The part of one container covered by a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub path: Vec<usize>,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A selection resolved against the current tree, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
    pub segments: Vec<Segment>,
}

impl TextRange {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Top-level block indices touched, ascending and without repeats.
    pub fn top_blocks(&self) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for seg in &self.segments {
            if let Some(&b) = seg.path.first() {
                if out.last() != Some(&b) {
                    out.push(b);
                }
            }
        }
        out
    }
}

impl Document {
    /// Resolves `selection` freshly against the tree. Offsets past the end
    /// of a container clamp to its length.
    pub fn range(&self, selection: &Selection) -> Result<TextRange> {
        let paths = self.text_blocks();
        let locate = |pos: &Position| -> Result<(usize, Position)> {
            let idx = paths
                .iter()
                .position(|p| *p == pos.path)
                .ok_or_else(|| EditorError::InvalidSelection(format!("{:?}", pos.path)))?;
            let len = self.container(&pos.path).map(|c| inline_len(c)).unwrap_or(0);
            Ok((idx, Position::new(pos.path.clone(), pos.offset.min(len))))
        };
        let (a_idx, anchor) = locate(&selection.anchor)?;
        let (f_idx, focus) = locate(&selection.focus)?;
        let forward = (a_idx, anchor.offset) <= (f_idx, focus.offset);
        let ((start_idx, start), (end_idx, end)) = if forward {
            ((a_idx, anchor), (f_idx, focus))
        } else {
            ((f_idx, focus), (a_idx, anchor))
        };

        let mut segments = Vec::with_capacity(end_idx - start_idx + 1);
        for (idx, path) in paths.iter().enumerate().take(end_idx + 1).skip(start_idx) {
            let len = self.container(path).map(|c| inline_len(c)).unwrap_or(0);
            let seg_start = if idx == start_idx { start.offset } else { 0 };
            let seg_end = if idx == end_idx { end.offset } else { len };
            segments.push(Segment {
                path: path.clone(),
                start: seg_start,
                end: seg_end,
            });
        }
        Ok(TextRange { start, end, segments })
    }
}
