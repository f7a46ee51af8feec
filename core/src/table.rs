use crate::{Block, Inline, TableCell, TableRow};
use serde::{Deserialize, Serialize};

/// A cell inside one table block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Default)]
pub struct TableEditor;

impl TableEditor {
    /// A fresh `rows` x `cols` table. The header row is labelled
    /// `Header <n>`, body cells `Cell <row>-<col>`, both 1-based with rows
    /// counted over the whole table.
    pub fn build(rows: usize, cols: usize, has_header_row: bool) -> Block {
        let rows = (0..rows)
            .map(|r| {
                let header = has_header_row && r == 0;
                let cells = (0..cols)
                    .map(|c| {
                        if header {
                            TableCell::with_text(true, &format!("Header {}", c + 1))
                        } else {
                            TableCell::with_text(false, &format!("Cell {}-{}", r + 1, c + 1))
                        }
                    })
                    .collect();
                TableRow { cells }
            })
            .collect();
        Block::Table { has_header_row, rows }
    }

    /// Inserts an empty copy of the reference row right after it. A copy of
    /// the header row becomes a body row.
    pub fn insert_row(block: &mut Block, at: CellRef) -> bool {
        if let Block::Table { has_header_row, rows } = block {
            let Some(reference) = rows.get(at.row) else {
                return false;
            };
            let header_source = *has_header_row && at.row == 0;
            let cells = reference
                .cells
                .iter()
                .map(|cell| TableCell::empty(cell.is_header && !header_source))
                .collect();
            rows.insert(at.row + 1, TableRow { cells });
            return true;
        }
        false
    }

    /// Inserts an empty cell at the reference column in every row.
    pub fn insert_column(block: &mut Block, at: CellRef) -> bool {
        if let Block::Table { rows, .. } = block {
            let width = rows.first().map(|r| r.cells.len()).unwrap_or(0);
            if at.col >= width || at.row >= rows.len() {
                return false;
            }
            for row in rows.iter_mut() {
                let header = row.is_header_row();
                row.cells.insert(at.col, TableCell::empty(header));
            }
            return true;
        }
        false
    }

    /// Removes the reference row unless it is the last one.
    pub fn delete_row(block: &mut Block, at: CellRef) -> bool {
        if let Block::Table { has_header_row, rows } = block {
            if rows.len() <= 1 || at.row >= rows.len() {
                return false;
            }
            rows.remove(at.row);
            if at.row == 0 {
                *has_header_row = rows.first().map_or(false, TableRow::is_header_row);
            }
            return true;
        }
        false
    }

    /// Removes the reference column unless it is the last one.
    pub fn delete_column(block: &mut Block, at: CellRef) -> bool {
        if let Block::Table { rows, .. } = block {
            let width = rows.first().map(|r| r.cells.len()).unwrap_or(0);
            if width <= 1 || at.col >= width {
                return false;
            }
            for row in rows.iter_mut() {
                if at.col < row.cells.len() {
                    row.cells.remove(at.col);
                }
            }
            return true;
        }
        false
    }

    pub fn set_cell_text(block: &mut Block, at: CellRef, text: &str) -> bool {
        if let Block::Table { rows, .. } = block {
            if let Some(cell) = rows.get_mut(at.row).and_then(|r| r.cells.get_mut(at.col)) {
                cell.content = if text.is_empty() { Vec::new() } else { vec![Inline::text(text)] };
                return true;
            }
        }
        false
    }

    /// Nearest existing cell to `at`.
    pub fn clamp(block: &Block, at: CellRef) -> Option<CellRef> {
        match block {
            Block::Table { rows, .. } => {
                let row = at.row.min(rows.len().checked_sub(1)?);
                let col = at.col.min(rows[row].cells.len().checked_sub(1)?);
                Some(CellRef { row, col })
            }
            _ => None,
        }
    }

    pub fn dimensions(block: &Block) -> Option<(usize, usize)> {
        match block {
            Block::Table { rows, .. } => {
                let width = rows.first().map(|r| r.cells.len()).unwrap_or(0);
                Some((rows.len(), width))
            }
            _ => None,
        }
    }
}
