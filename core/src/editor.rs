use crate::commands::{normalize_image_src, normalize_link_url};
use crate::splice::{map_runs, runs_in_range, wrap_in_link};
use crate::{
    deserialize, link_keyword, serialize, Align, Block, CellRef, CommandHistory, CommandValue,
    Document, EditorCommand, EditorConfig, ImageSpec, Inline, InlineAttr, KeywordSpec, LinkSpec,
    ListItem, ListStyle, Mark, Position, Result, Sanitizer, Selection, Snapshot, TableEditor,
    TableSpec, TextRange, TextRun,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    CollapsedSelection,
    NotInTable,
    NotApplicable,
    TableAtMinimum,
    NothingToUndo,
    NothingToRedo,
    Unchanged,
    EmptyKeyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CommandStatus {
    Applied,
    NoOp(NoOpReason),
}

impl CommandStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandStatus::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyOutcome {
    pub status: CommandStatus,
    pub selection: Selection,
    pub markup: String,
}

use CommandStatus::{Applied, NoOp};

pub struct Editor {
    doc: Document,
    selection: Selection,
    history: CommandHistory,
    sanitizer: Sanitizer,
    config: EditorConfig,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self::build(doc, EditorConfig::default())
    }

    /// Starts from `config.initial_markup`, or an empty document.
    pub fn with_config(config: EditorConfig) -> Self {
        let sanitizer = Sanitizer::with_max_depth(config.max_sanitize_depth);
        let doc = match &config.initial_markup {
            Some(markup) => deserialize(&sanitizer.sanitize(markup)),
            None => Document::new(),
        };
        Self::build(doc, config)
    }

    /// Editor over sanitized `markup` with the default configuration.
    pub fn from_markup(markup: &str) -> Self {
        let mut editor = Self::new(Document::new());
        editor.reset_markup(markup);
        editor
    }

    fn build(mut doc: Document, config: EditorConfig) -> Self {
        doc.normalize();
        let selection = Selection::default();
        let history = CommandHistory::new(
            Snapshot {
                doc: doc.clone(),
                selection: selection.clone(),
            },
            config.history_limit,
        );
        let mut editor = Self {
            doc,
            selection,
            history,
            sanitizer: Sanitizer::with_max_depth(config.max_sanitize_depth),
            config,
        };
        editor.repair_selection();
        editor.history.update_selection(editor.selection.clone());
        editor
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.doc.range(&selection)?;
        self.selection = selection;
        Ok(())
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn markup(&self) -> String {
        serialize(&self.doc)
    }

    pub fn sanitize(&self, raw: &str) -> String {
        self.sanitizer.sanitize(raw)
    }

    pub fn selected_text(&self) -> Result<String> {
        self.selection.to_text(&self.doc)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Forgets undo and redo steps but keeps the content as it is.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history.update_selection(self.selection.clone());
    }

    /// Applies a command given by name, as a toolbar would send it.
    pub fn apply(
        &mut self,
        name: &str,
        selection: Selection,
        value: Option<CommandValue>,
    ) -> Result<ApplyOutcome> {
        let cmd = EditorCommand::parse(name, value).map_err(|err| {
            tracing::debug!(command = name, error = %err, "command rejected");
            err
        })?;
        self.execute(cmd, selection)
    }

    pub fn execute(&mut self, cmd: EditorCommand, selection: Selection) -> Result<ApplyOutcome> {
        let name = cmd.name();
        let status = match cmd {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            other => match self.run_mutation(other, selection) {
                Ok(status) => status,
                Err(err) => {
                    tracing::debug!(command = %name, error = %err, "command rejected");
                    return Err(err);
                }
            },
        };
        tracing::debug!(
            command = %name,
            status = ?status,
            version = self.doc.version,
            "command executed"
        );
        Ok(self.outcome(status))
    }

    /// Replaces the content with sanitized `markup` as one undoable step.
    pub fn load_markup(&mut self, markup: &str) -> ApplyOutcome {
        let doc = deserialize(&self.sanitizer.sanitize(markup));
        self.doc.blocks = doc.blocks;
        self.selection = Selection::default();
        self.repair_selection();
        let status = self.commit(Applied);
        self.outcome(status)
    }

    /// Replaces the content with sanitized `markup` and forgets history.
    pub fn reset_markup(&mut self, markup: &str) {
        let doc = deserialize(&self.sanitizer.sanitize(markup));
        self.doc.blocks = doc.blocks;
        self.doc.touch();
        self.selection = Selection::default();
        self.repair_selection();
        self.history.reset(self.snapshot());
    }

    fn outcome(&self, status: CommandStatus) -> ApplyOutcome {
        ApplyOutcome {
            status,
            selection: self.selection.clone(),
            markup: self.markup(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc: self.doc.clone(),
            selection: self.selection.clone(),
        }
    }

    fn run_mutation(&mut self, cmd: EditorCommand, selection: Selection) -> Result<CommandStatus> {
        self.doc.range(&selection)?;
        self.selection = selection;
        match self.mutate(cmd) {
            Ok(status) => Ok(self.commit(status)),
            Err(err) => {
                self.restore_current();
                Err(err)
            }
        }
    }

    /// Records the tree if it changed; anything else leaves the tree as the
    /// current snapshot has it.
    fn commit(&mut self, status: CommandStatus) -> CommandStatus {
        self.doc.normalize();
        let changed = !self.doc.same_content(&self.history.current().doc);
        match (status, changed) {
            (Applied, true) => {
                self.repair_selection();
                self.doc.touch();
                self.history.record(self.snapshot());
                Applied
            }
            (Applied, false) => NoOp(NoOpReason::Unchanged),
            (noop, changed) => {
                if changed {
                    self.restore_current();
                }
                noop
            }
        }
    }

    fn restore_current(&mut self) {
        self.doc = self.history.current().doc.clone();
        if self.doc.range(&self.selection).is_err() {
            self.repair_selection();
        }
    }

    /// Moves a selection that no longer resolves to the nearest container.
    fn repair_selection(&mut self) {
        if self.doc.range(&self.selection).is_ok() {
            return;
        }
        let top = self
            .selection
            .focus
            .path
            .first()
            .copied()
            .unwrap_or(0)
            .min(self.doc.blocks.len().saturating_sub(1));
        let pos = self
            .doc
            .start_of_block(top)
            .or_else(|| self.doc.text_blocks().into_iter().next().map(|p| Position::new(p, 0)))
            .unwrap_or_else(Position::start);
        self.selection = Selection::collapsed(pos);
    }

    fn undo(&mut self) -> CommandStatus {
        match self.history.undo() {
            Some(snapshot) => {
                self.doc = snapshot.doc.clone();
                self.selection = snapshot.selection.clone();
                Applied
            }
            None => NoOp(NoOpReason::NothingToUndo),
        }
    }

    fn redo(&mut self) -> CommandStatus {
        match self.history.redo() {
            Some(snapshot) => {
                self.doc = snapshot.doc.clone();
                self.selection = snapshot.selection.clone();
                Applied
            }
            None => NoOp(NoOpReason::NothingToRedo),
        }
    }

    fn mutate(&mut self, cmd: EditorCommand) -> Result<CommandStatus> {
        match cmd {
            EditorCommand::ToggleMark(mark) => self.toggle_mark(mark),
            EditorCommand::SetInlineAttr(attr) => self.set_inline_attr(attr),
            EditorCommand::SetBlockType(level) => self.set_block_type(level),
            EditorCommand::SetAlignment(align) => self.set_alignment(align),
            EditorCommand::ApplyList { ordered, style } => self.apply_list(ordered, style),
            EditorCommand::CreateLink(spec) => self.create_link(spec),
            EditorCommand::InsertImage(spec) => self.insert_image(spec),
            EditorCommand::InsertTable(spec) => self.insert_table(spec),
            EditorCommand::TableInsertRow => {
                self.table_op(TableEditor::insert_row, NoOpReason::NotApplicable, |at| {
                    CellRef::new(at.row + 1, at.col)
                })
            }
            EditorCommand::TableInsertColumn => {
                self.table_op(TableEditor::insert_column, NoOpReason::NotApplicable, |at| at)
            }
            EditorCommand::TableDeleteRow => {
                self.table_op(TableEditor::delete_row, NoOpReason::TableAtMinimum, |at| at)
            }
            EditorCommand::TableDeleteColumn => {
                self.table_op(TableEditor::delete_column, NoOpReason::TableAtMinimum, |at| at)
            }
            EditorCommand::InsertFragment(raw) => self.insert_fragment(&raw),
            EditorCommand::LinkKeyword(spec) => self.link_keyword(spec),
            EditorCommand::Undo | EditorCommand::Redo => Ok(NoOp(NoOpReason::NotApplicable)),
        }
    }

    fn touched_runs(&self, range: &TextRange) -> Vec<TextRun> {
        let mut out = Vec::new();
        for seg in range.segments.iter().filter(|s| !s.is_empty()) {
            if let Some(content) = self.doc.container(&seg.path) {
                out.extend(runs_in_range(content, seg.start, seg.end).into_iter().cloned());
            }
        }
        out
    }

    fn update_runs(&mut self, range: &TextRange, f: &mut dyn FnMut(&mut TextRun)) {
        for seg in range.segments.iter().filter(|s| !s.is_empty()) {
            if let Some(content) = self.doc.container_mut(&seg.path) {
                map_runs(content, seg.start, seg.end, f);
            }
        }
    }

    fn toggle_mark(&mut self, mark: Mark) -> Result<CommandStatus> {
        let range = self.doc.range(&self.selection)?;
        if range.is_collapsed() {
            return Ok(NoOp(NoOpReason::CollapsedSelection));
        }
        let runs = self.touched_runs(&range);
        if runs.is_empty() {
            return Ok(NoOp(NoOpReason::NotApplicable));
        }
        // mixed state turns the mark on everywhere
        let on = !runs.iter().all(|run| run.marks.has(mark));
        self.update_runs(&range, &mut |run| run.marks.set(mark, on));
        Ok(Applied)
    }

    fn set_inline_attr(&mut self, attr: InlineAttr) -> Result<CommandStatus> {
        let range = self.doc.range(&self.selection)?;
        if range.is_collapsed() {
            return Ok(NoOp(NoOpReason::CollapsedSelection));
        }
        if self.touched_runs(&range).is_empty() {
            return Ok(NoOp(NoOpReason::NotApplicable));
        }
        match attr {
            InlineAttr::FontFamily(value) => {
                let value: Arc<str> = Arc::from(value);
                self.update_runs(&range, &mut |run| run.font_family = Some(value.clone()));
            }
            InlineAttr::FontSize(level) => {
                self.update_runs(&range, &mut |run| run.font_size = Some(level))
            }
            InlineAttr::ForeColor(value) => {
                let value: Arc<str> = Arc::from(value);
                self.update_runs(&range, &mut |run| run.fore_color = Some(value.clone()));
            }
            InlineAttr::HighlightColor(value) => {
                let value: Arc<str> = Arc::from(value);
                self.update_runs(&range, &mut |run| run.highlight_color = Some(value.clone()));
            }
        }
        Ok(Applied)
    }

    /// Top-level blocks a block command works on. A caret targets the
    /// block that encloses it.
    fn target_blocks(&self, range: &TextRange) -> Vec<usize> {
        if range.is_collapsed() {
            return self.doc.find_enclosing_block(&self.selection).into_iter().collect();
        }
        range.top_blocks()
    }

    fn set_block_type(&mut self, level: u8) -> Result<CommandStatus> {
        let range = self.doc.range(&self.selection)?;
        let mut touched = false;
        for top in self.target_blocks(&range) {
            let Some(block) = self.doc.blocks.get_mut(top) else { continue };
            let (align, content) = match block {
                Block::Paragraph { align, content } | Block::Heading { align, content, .. } => {
                    (*align, std::mem::take(content))
                }
                _ => continue,
            };
            *block = if level == 0 {
                Block::Paragraph { align, content }
            } else {
                Block::Heading { level, align, content }
            };
            touched = true;
        }
        Ok(if touched { Applied } else { NoOp(NoOpReason::NotApplicable) })
    }

    fn set_alignment(&mut self, value: Align) -> Result<CommandStatus> {
        let range = self.doc.range(&self.selection)?;
        let mut touched = false;
        for top in self.target_blocks(&range) {
            match self.doc.blocks.get_mut(top) {
                Some(Block::Paragraph { align, .. })
                | Some(Block::Heading { align, .. })
                | Some(Block::List { align, .. }) => {
                    *align = Some(value);
                    touched = true;
                }
                _ => {}
            }
        }
        Ok(if touched { Applied } else { NoOp(NoOpReason::NotApplicable) })
    }

    fn apply_list(&mut self, ordered: bool, style: ListStyle) -> Result<CommandStatus> {
        let range = self.doc.range(&self.selection)?;
        if let Some(path) = self.nested_list_path(&range) {
            if let Some(Block::List { ordered: o, style: s, .. }) = self.doc.list_mut(&path) {
                *o = ordered;
                *s = style;
                return Ok(Applied);
            }
        }
        let tops = self.target_blocks(&range);
        let (Some(&first), Some(&last)) = (tops.first(), tops.last()) else {
            return Ok(NoOp(NoOpReason::NotApplicable));
        };
        let touched = &self.doc.blocks[first..=last];
        let all_lists = touched.iter().all(|b| matches!(b, Block::List { .. }));
        let all_tables = touched.iter().all(|b| matches!(b, Block::Table { .. }));
        if all_lists {
            for block in &mut self.doc.blocks[first..=last] {
                if let Block::List { ordered: o, style: s, .. } = block {
                    *o = ordered;
                    *s = style;
                }
            }
            return Ok(Applied);
        }
        if all_tables {
            return Ok(NoOp(NoOpReason::NotApplicable));
        }

        let old: Vec<Block> = self.doc.blocks.drain(first..=last).collect();
        let removed = old.len();
        let mut out: Vec<Block> = Vec::new();
        let mut items: Vec<ListItem> = Vec::new();
        let mut align = None;
        let mut moves = Vec::with_capacity(removed);
        for block in old {
            match block {
                Block::Paragraph { align: a, content }
                | Block::Heading { align: a, content, .. } => {
                    if items.is_empty() {
                        align = a;
                    }
                    moves.push(Move::IntoItem { list: out.len(), item: items.len() });
                    items.push(ListItem::new(content));
                }
                Block::List { align: a, items: existing, .. } => {
                    if items.is_empty() {
                        align = a;
                    }
                    moves.push(Move::ShiftItems { list: out.len(), base: items.len() });
                    items.extend(existing);
                }
                table => {
                    flush_list(&mut out, &mut items, ordered, style, align);
                    moves.push(Move::Block(out.len()));
                    out.push(table);
                }
            }
        }
        flush_list(&mut out, &mut items, ordered, style, align);
        let inserted = out.len();
        self.doc.blocks.splice(first..first, out);

        let remap = |pos: &Position| -> Position {
            let mut path = pos.path.clone();
            let top = path[0];
            if top > last {
                path[0] = top - removed + inserted;
            } else if top >= first {
                match moves[top - first] {
                    Move::IntoItem { list, item } => path = vec![first + list, item],
                    Move::ShiftItems { list, base } => {
                        path[0] = first + list;
                        path[1] += base;
                    }
                    Move::Block(idx) => path[0] = first + idx,
                }
            }
            Position::new(path, pos.offset)
        };
        let (anchor, focus) = (remap(&self.selection.anchor), remap(&self.selection.focus));
        self.selection = Selection::new(anchor, focus);
        Ok(Applied)
    }

    /// Path of the innermost sublist holding both ends of the range, when
    /// that list is nested inside another one.
    fn nested_list_path(&self, range: &TextRange) -> Option<Vec<usize>> {
        let (start, end) = (&range.start.path, &range.end.path);
        let in_list = matches!(self.doc.blocks.get(start[0]), Some(Block::List { .. }));
        if start[0] != end[0] || !in_list {
            return None;
        }
        let deepest = start.len().min(end.len()) - 1;
        (3..deepest + 1)
            .step_by(2)
            .rev()
            .find(|&len| start[..len] == end[..len])
            .map(|len| start[..len].to_vec())
    }

    fn create_link(&mut self, spec: LinkSpec) -> Result<CommandStatus> {
        let range = self.doc.range(&self.selection)?;
        if range.is_collapsed() {
            return Ok(NoOp(NoOpReason::CollapsedSelection));
        }
        let url = normalize_link_url(&spec.url, &self.config.default_link_scheme)?;
        let url: Arc<str> = Arc::from(url);
        let title: Option<Arc<str>> = spec
            .title
            .filter(|t| !t.trim().is_empty())
            .map(|t| Arc::from(t.trim()));
        let mut wrapped = false;
        for seg in range.segments.iter().filter(|s| !s.is_empty()) {
            let Some(content) = self.doc.container_mut(&seg.path) else { continue };
            wrapped |= wrap_in_link(content, seg.start, seg.end, |inner| Inline::Link {
                url: url.clone(),
                title: title.clone(),
                new_tab: spec.open_in_new_tab,
                content: inner,
            });
        }
        Ok(if wrapped { Applied } else { NoOp(NoOpReason::NotApplicable) })
    }

    fn insert_image(&mut self, spec: ImageSpec) -> Result<CommandStatus> {
        let src = normalize_image_src(&spec.src)?;
        let (width, height) = match (spec.width, spec.height, self.config.default_image_size) {
            (None, None, Some(size)) => (Some(size.width), Some(size.height)),
            (w, h, _) => (w, h),
        };
        let image = Inline::Image {
            src: Arc::from(src),
            alt: Arc::from(spec.alt.trim()),
            width,
            height,
        };
        let cursor = self.doc.replace_range(&self.selection, vec![Block::paragraph(vec![image])])?;
        self.selection = Selection::collapsed(cursor);
        Ok(Applied)
    }

    fn insert_table(&mut self, spec: TableSpec) -> Result<CommandStatus> {
        let max = self.config.max_table_size as i64;
        if spec.rows < 1 || spec.cols < 1 || spec.rows > max || spec.cols > max {
            return Err(crate::EditorError::InvalidTableSize {
                rows: spec.rows,
                cols: spec.cols,
            });
        }
        let table = TableEditor::build(spec.rows as usize, spec.cols as usize, spec.has_header_row);
        let cursor = self.doc.replace_range(&self.selection, Vec::new())?;
        let (first, _, _) = self.doc.insert_blocks(&cursor, vec![table, Block::empty_paragraph()]);
        let landing = self
            .doc
            .start_of_block(first + 1)
            .unwrap_or_else(|| Position::new(vec![first + 1], 0));
        self.selection = Selection::collapsed(landing);
        Ok(Applied)
    }

    /// Focus cell of the selection when it sits in a table.
    fn focus_cell(&self) -> Option<(usize, CellRef)> {
        match self.selection.focus.path.as_slice() {
            [b, r, c] if matches!(self.doc.blocks.get(*b), Some(Block::Table { .. })) => {
                Some((*b, CellRef::new(*r, *c)))
            }
            _ => None,
        }
    }

    fn table_op(
        &mut self,
        op: fn(&mut Block, CellRef) -> bool,
        refused: NoOpReason,
        caret: impl FnOnce(CellRef) -> CellRef,
    ) -> Result<CommandStatus> {
        let Some((b, at)) = self.focus_cell() else {
            return Ok(NoOp(NoOpReason::NotInTable));
        };
        let block = &mut self.doc.blocks[b];
        if !op(block, at) {
            return Ok(NoOp(refused));
        }
        let cell = TableEditor::clamp(block, caret(at)).unwrap_or(at);
        self.selection = Selection::caret(vec![b, cell.row, cell.col], 0);
        Ok(Applied)
    }

    fn insert_fragment(&mut self, raw: &str) -> Result<CommandStatus> {
        let clean = self.sanitizer.sanitize(raw);
        let fragment = deserialize(&clean);
        let blocks = if fragment.is_empty() { Vec::new() } else { fragment.blocks };
        let cursor = self.doc.replace_range(&self.selection, blocks)?;
        self.selection = Selection::collapsed(cursor);
        Ok(Applied)
    }

    fn link_keyword(&mut self, spec: KeywordSpec) -> Result<CommandStatus> {
        let keyword = match spec.keyword {
            Some(keyword) => keyword,
            None if self.selection.is_collapsed() => {
                return Ok(NoOp(NoOpReason::CollapsedSelection));
            }
            None => self.selection.to_text(&self.doc)?,
        };
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(NoOp(NoOpReason::EmptyKeyword));
        }
        let url = normalize_link_url(&spec.url, &self.config.default_link_scheme)?;
        let title = spec.title.as_deref();
        let created = link_keyword(&mut self.doc, keyword, &url, title, spec.open_in_new_tab);
        Ok(if created > 0 { Applied } else { NoOp(NoOpReason::Unchanged) })
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

/// Where an old top-level block went when list:apply rebuilt a run of
/// blocks; indices are relative to the first rebuilt block.
#[derive(Debug, Clone, Copy)]
enum Move {
    IntoItem { list: usize, item: usize },
    ShiftItems { list: usize, base: usize },
    Block(usize),
}

fn flush_list(
    out: &mut Vec<Block>,
    items: &mut Vec<ListItem>,
    ordered: bool,
    style: ListStyle,
    align: Option<Align>,
) {
    if items.is_empty() {
        return;
    }
    out.push(Block::List {
        ordered,
        style,
        align,
        items: std::mem::take(items),
    });
}
