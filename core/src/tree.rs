use crate::splice::{insert_at, take_range};
use crate::{inline_len, Block, Document, Inline, ListItem, Position, Result, Selection};

impl Document {
    /// Paths of every inline container, in document order.
    pub fn text_blocks(&self) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        collect_paths(&self.blocks, &mut Vec::new(), &mut out);
        out
    }

    pub fn container(&self, path: &[usize]) -> Option<&Vec<Inline>> {
        resolve(&self.blocks, path)
    }

    pub fn container_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Inline>> {
        resolve_mut(&mut self.blocks, path)
    }

    /// Index of the top-level block holding the focus.
    pub fn find_enclosing_block(&self, selection: &Selection) -> Option<usize> {
        let path = &selection.focus.path;
        self.container(path)?;
        path.first().copied()
    }

    /// The list at `path`: a top-level index, or an item path followed by
    /// a sublist index.
    pub(crate) fn list_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        let (top, rest) = path.split_first()?;
        let block = self.blocks.get_mut(*top)?;
        let Some((sub, item_path)) = rest.split_last() else {
            return Some(block);
        };
        match block {
            Block::List { items, .. } => item_mut(items, item_path)?.sublists.get_mut(*sub),
            _ => None,
        }
    }

    /// Deletes everything inside `selection`, splices `fragment` in its place
    /// and returns the caret right after the inserted content.
    pub fn replace_range(
        &mut self,
        selection: &Selection,
        fragment: Vec<Block>,
    ) -> Result<Position> {
        let cursor = self.delete_range(selection)?;
        let cursor = self.insert_fragment(cursor, fragment);
        self.ensure_not_empty();
        Ok(cursor)
    }

    fn delete_range(&mut self, selection: &Selection) -> Result<Position> {
        let range = self.range(selection)?;
        let cursor = range.start.clone();
        if range.is_collapsed() {
            return Ok(cursor);
        }
        if let [only] = range.segments.as_slice() {
            if let Some(content) = self.container_mut(&only.path) {
                take_range(content, only.start, only.end);
            }
            return Ok(cursor);
        }

        let start = range.start.path.clone();
        let start_top = start[0];
        let end_top = range.end.path[0];
        let last = range.segments.len() - 1;
        for (idx, seg) in range.segments.iter().enumerate() {
            let top = seg.path[0];
            if top > start_top && top < end_top {
                continue;
            }
            if let Some(content) = self.container_mut(&seg.path) {
                if idx == 0 || idx == last {
                    take_range(content, seg.start, seg.end);
                } else {
                    content.clear();
                }
            }
        }

        let mut end = range.end.path.clone();
        let tops = if start_top == end_top { vec![start_top] } else { vec![start_top, end_top] };
        for top in tops {
            if let Some(Block::List { items, .. }) = self.blocks.get_mut(top) {
                prune_items(items, &mut vec![top], &start, &range.end.path, &mut end);
            }
        }
        if end_top > start_top + 1 {
            self.blocks.drain(start_top + 1..end_top);
            end[0] = start_top + 1;
        }
        self.join_containers(&start, &end);
        Ok(cursor)
    }

    /// Moves what is left of the `end` container onto the `start` one and
    /// removes the emptied block or list item. Table cells never join.
    fn join_containers(&mut self, start: &[usize], end: &[usize]) {
        let in_table =
            |path: &[usize]| matches!(self.blocks.get(path[0]), Some(Block::Table { .. }));
        if start == end || in_table(start) || in_table(end) {
            return;
        }
        let (tail, sublists) = if end.len() == 1 {
            let tail = match self.blocks.get_mut(end[0]) {
                Some(Block::Paragraph { content, .. }) | Some(Block::Heading { content, .. }) => {
                    std::mem::take(content)
                }
                _ => return,
            };
            self.blocks.remove(end[0]);
            (tail, Vec::new())
        } else {
            let nested = self.list_item_mut(end).map_or(true, |item| !item.sublists.is_empty());
            if start.len() == 1 && nested {
                return;
            }
            match self.take_item(end) {
                Some(item) => (item.content, item.sublists),
                None => return,
            }
        };
        if let Some(content) = self.container_mut(start) {
            let at = inline_len(content);
            insert_at(content, at, tail);
        }
        if !sublists.is_empty() {
            if let Some(item) = self.list_item_mut(start) {
                if end.starts_with(start) {
                    item.sublists.splice(0..0, sublists);
                } else {
                    item.sublists.extend(sublists);
                }
            }
        }
        // ancestors of the joined item that were emptied by the deletion
        for len in (2..end.len().saturating_sub(1)).step_by(2).rev() {
            let ancestor = &end[..len];
            let empty = ancestor > start
                && self
                    .list_item_mut(ancestor)
                    .map_or(false, |item| item.content.is_empty() && item.sublists.is_empty());
            if !empty {
                break;
            }
            self.take_item(ancestor);
        }
    }

    fn list_item_mut(&mut self, path: &[usize]) -> Option<&mut ListItem> {
        let (top, rest) = path.split_first()?;
        match self.blocks.get_mut(*top)? {
            Block::List { items, .. } => item_mut(items, rest),
            _ => None,
        }
    }

    /// Removes the list item at `path`, dropping lists it leaves empty.
    fn take_item(&mut self, path: &[usize]) -> Option<ListItem> {
        let (top, rest) = path.split_first()?;
        let Block::List { items, .. } = self.blocks.get_mut(*top)? else {
            return None;
        };
        let item = take_nested_item(items, rest)?;
        if items.is_empty() {
            self.blocks.remove(*top);
        }
        Some(item)
    }

    fn insert_fragment(&mut self, cursor: Position, mut fragment: Vec<Block>) -> Position {
        for block in &mut fragment {
            block.normalize();
        }
        let inline_only = match fragment.as_slice() {
            [] => return cursor,
            [Block::Paragraph { content, .. }] => Some(content.clone()),
            _ if cursor.path.len() > 1 => Some(flatten_blocks(&fragment)),
            _ => None,
        };
        if let Some(nodes) = inline_only {
            let width = inline_len(&nodes);
            if let Some(content) = self.container_mut(&cursor.path) {
                insert_at(content, cursor.offset, nodes);
            }
            return Position::new(cursor.path, cursor.offset + width);
        }

        let (first, count, has_tail) = self.insert_blocks(&cursor, fragment);
        if has_tail {
            if let Some(pos) = self.start_of_block(first + count) {
                return pos;
            }
        }
        self.end_of_block(first + count - 1)
            .unwrap_or_else(|| Position::new(vec![first + count - 1], 0))
    }

    /// Inserts top-level blocks at `at`. A paragraph or heading is split
    /// around the offset and empty halves are dropped; inside a list or
    /// table the blocks land after it. Returns the index of the first
    /// inserted block, how many were inserted and whether a trailing half
    /// follows them.
    pub fn insert_blocks(&mut self, at: &Position, blocks: Vec<Block>) -> (usize, usize, bool) {
        let count = blocks.len();
        let top = at.path.first().copied().unwrap_or(0).min(self.blocks.len().saturating_sub(1));
        if at.path.len() > 1 || self.blocks.get(top).and_then(Block::text_content).is_none() {
            let idx = (top + 1).min(self.blocks.len());
            self.blocks.splice(idx..idx, blocks);
            return (idx, count, idx + count < self.blocks.len());
        }

        let original = self.blocks.remove(top);
        let (head, tail) = split_text_block(original, at.offset);
        let mut seq = Vec::with_capacity(count + 2);
        let keep_head = head.text_content().map_or(false, |c| !c.is_empty());
        let keep_tail = tail.text_content().map_or(false, |c| !c.is_empty());
        if keep_head {
            seq.push(head);
        }
        seq.extend(blocks);
        if keep_tail {
            seq.push(tail);
        }
        let first = if keep_head { top + 1 } else { top };
        self.blocks.splice(top..top, seq);
        (first, count, keep_tail)
    }

    pub fn start_of_block(&self, idx: usize) -> Option<Position> {
        let path = self.text_blocks().into_iter().find(|p| p[0] == idx)?;
        Some(Position::new(path, 0))
    }

    /// Caret at the end of the last container of a top-level block.
    pub fn end_of_block(&self, idx: usize) -> Option<Position> {
        let path = self.text_blocks().into_iter().rev().find(|p| p[0] == idx)?;
        let len = self.container(&path).map(|c| inline_len(c)).unwrap_or(0);
        Some(Position::new(path, len))
    }
}

fn split_text_block(block: Block, offset: usize) -> (Block, Block) {
    match block {
        Block::Paragraph { align, content } => {
            let (a, b) = crate::splice::split_inlines(content, offset);
            (Block::Paragraph { align, content: a }, Block::Paragraph { align, content: b })
        }
        Block::Heading { level, align, content } => {
            let (a, b) = crate::splice::split_inlines(content, offset);
            (
                Block::Heading { level, align, content: a },
                Block::Heading { level, align, content: b },
            )
        }
        other => (other, Block::empty_paragraph()),
    }
}

/// Inline rendition of blocks for containers that cannot hold blocks.
pub fn flatten_blocks(blocks: &[Block]) -> Vec<Inline> {
    let mut out = Vec::new();
    for block in blocks {
        flatten_block(block, &mut out);
    }
    if matches!(out.last(), Some(Inline::LineBreak)) {
        out.pop();
    }
    out
}

fn flatten_block(block: &Block, out: &mut Vec<Inline>) {
    match block {
        Block::Paragraph { content, .. } | Block::Heading { content, .. } => {
            out.extend(content.iter().cloned());
            out.push(Inline::LineBreak);
        }
        Block::List { items, .. } => {
            for item in items {
                out.extend(item.content.iter().cloned());
                out.push(Inline::LineBreak);
                for sub in &item.sublists {
                    flatten_block(sub, out);
                }
            }
        }
        Block::Table { rows, .. } => {
            for row in rows {
                for cell in &row.cells {
                    out.extend(cell.content.iter().cloned());
                    out.push(Inline::LineBreak);
                }
            }
        }
    }
}

/// Drops list items whose whole subtree lies strictly between `start` and
/// `end`, decrementing `shifted_end` for every sibling removed ahead of it.
fn prune_items(
    items: &mut Vec<ListItem>,
    path: &mut Vec<usize>,
    start: &[usize],
    end: &[usize],
    shifted_end: &mut [usize],
) {
    let depth = path.len();
    let on_end_path = end.len() > depth && end[..depth] == path[..];
    let mut i = 0;
    let mut original = 0;
    while i < items.len() {
        path.push(original);
        let covered = path.as_slice() > start && path.as_slice() < end && !end.starts_with(path);
        if covered {
            items.remove(i);
            if on_end_path && end[depth] > original {
                shifted_end[depth] -= 1;
            }
        } else {
            prune_sublists(&mut items[i], path, start, end, shifted_end);
            i += 1;
        }
        path.pop();
        original += 1;
    }
}

fn prune_sublists(
    item: &mut ListItem,
    path: &mut Vec<usize>,
    start: &[usize],
    end: &[usize],
    shifted_end: &mut [usize],
) {
    let depth = path.len();
    let on_end_path = end.len() > depth && end[..depth] == path[..];
    let mut s = 0;
    let mut original = 0;
    while s < item.sublists.len() {
        path.push(original);
        let emptied = match &mut item.sublists[s] {
            Block::List { items, .. } => {
                prune_items(items, path, start, end, shifted_end);
                items.is_empty()
            }
            _ => false,
        };
        if emptied {
            item.sublists.remove(s);
            if on_end_path && end[depth] > original {
                shifted_end[depth] -= 1;
            }
        } else {
            s += 1;
        }
        path.pop();
        original += 1;
    }
}

fn item_mut<'a>(items: &'a mut [ListItem], rest: &[usize]) -> Option<&'a mut ListItem> {
    match rest {
        [i] => items.get_mut(*i),
        [i, s, tail @ ..] => match items.get_mut(*i)?.sublists.get_mut(*s)? {
            Block::List { items, .. } => item_mut(items, tail),
            _ => None,
        },
        _ => None,
    }
}

fn take_nested_item(items: &mut Vec<ListItem>, rest: &[usize]) -> Option<ListItem> {
    match rest {
        [i] => (*i < items.len()).then(|| items.remove(*i)),
        [i, s, tail @ ..] => {
            let item = items.get_mut(*i)?;
            let Some(Block::List { items: sub, .. }) = item.sublists.get_mut(*s) else {
                return None;
            };
            let taken = take_nested_item(sub, tail)?;
            if sub.is_empty() {
                item.sublists.remove(*s);
            }
            Some(taken)
        }
        _ => None,
    }
}

fn collect_paths(blocks: &[Block], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (b, block) in blocks.iter().enumerate() {
        prefix.push(b);
        match block {
            Block::Paragraph { .. } | Block::Heading { .. } => out.push(prefix.clone()),
            Block::List { items, .. } => collect_item_paths(items, prefix, out),
            Block::Table { rows, .. } => {
                for (r, row) in rows.iter().enumerate() {
                    for c in 0..row.cells.len() {
                        let mut path = prefix.clone();
                        path.push(r);
                        path.push(c);
                        out.push(path);
                    }
                }
            }
        }
        prefix.pop();
    }
}

fn collect_item_paths(items: &[ListItem], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (i, item) in items.iter().enumerate() {
        prefix.push(i);
        out.push(prefix.clone());
        collect_paths(&item.sublists, prefix, out);
        prefix.pop();
    }
}

fn resolve<'a>(blocks: &'a [Block], path: &[usize]) -> Option<&'a Vec<Inline>> {
    let (first, rest) = path.split_first()?;
    match blocks.get(*first)? {
        Block::Paragraph { content, .. } | Block::Heading { content, .. } if rest.is_empty() => {
            Some(content)
        }
        Block::List { items, .. } => {
            let (i, rest) = rest.split_first()?;
            let item = items.get(*i)?;
            if rest.is_empty() {
                Some(&item.content)
            } else {
                resolve(&item.sublists, rest)
            }
        }
        Block::Table { rows, .. } => match rest {
            [r, c] => rows.get(*r)?.cells.get(*c).map(|cell| &cell.content),
            _ => None,
        },
        _ => None,
    }
}

fn resolve_mut<'a>(blocks: &'a mut [Block], path: &[usize]) -> Option<&'a mut Vec<Inline>> {
    let (first, rest) = path.split_first()?;
    match blocks.get_mut(*first)? {
        Block::Paragraph { content, .. } | Block::Heading { content, .. } if rest.is_empty() => {
            Some(content)
        }
        Block::List { items, .. } => {
            let (i, rest) = rest.split_first()?;
            let item = items.get_mut(*i)?;
            if rest.is_empty() {
                Some(&mut item.content)
            } else {
                resolve_mut(&mut item.sublists, rest)
            }
        }
        Block::Table { rows, .. } => match rest {
            [r, c] => rows.get_mut(*r)?.cells.get_mut(*c).map(|cell| &mut cell.content),
            _ => None,
        },
        _ => None,
    }
}
