//! Table types.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Grid coordinate of a cell, ordered row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular span of grid cells that is visually one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    /// Row of the canonical (top-left) cell
    pub row: usize,
    /// Column of the canonical (top-left) cell
    pub col: usize,
    /// Number of columns spanned (>= 1)
    pub width: usize,
    /// Number of rows spanned (>= 1)
    pub height: usize,
}

impl Merge {
    pub fn new(row: usize, col: usize, width: usize, height: usize) -> Self {
        Self {
            row,
            col,
            width,
            height,
        }
    }

    /// The canonical cell.
    pub fn origin(&self) -> CellPos {
        CellPos::new(self.row, self.col)
    }

    /// The bottom-right cell covered by this merge.
    pub fn last_cell(&self) -> CellPos {
        CellPos::new(self.row + self.height - 1, self.col + self.width - 1)
    }

    /// Whether `pos` lies inside the span.
    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row >= self.row
            && pos.row < self.row + self.height
            && pos.col >= self.col
            && pos.col < self.col + self.width
    }

    /// Every covered cell, row-major, canonical cell first.
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (self.row..self.row + self.height)
            .flat_map(move |r| (self.col..self.col + self.width).map(move |c| CellPos::new(r, c)))
    }

    /// Covered cells other than the canonical one.
    pub fn absorbed_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        let origin = self.origin();
        self.cells().filter(move |p| *p != origin)
    }
}

/// Content of one grid cell.
///
/// Serializes as a JSON string, or `null` for cells swallowed by a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Accumulated text (empty when no fragment landed here)
    Text(String),
    /// Non-canonical member of a merged cell
    Absorbed,
}

impl Cell {
    /// Text content, `None` for absorbed cells.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            Cell::Absorbed => None,
        }
    }

    pub fn is_absorbed(&self) -> bool {
        matches!(self, Cell::Absorbed)
    }

    /// True for absorbed cells and text cells holding only whitespace.
    pub fn is_empty(&self) -> bool {
        self.text().map_or(true, |s| s.trim().is_empty())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Text(String::new())
    }
}

/// A table reconstructed from one ruled region of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Cells indexed `[row][col]`, row 0 at the top
    pub cells: Vec<Vec<Cell>>,

    /// Merged cell spans
    pub merges: Vec<Merge>,

    /// Number of columns
    pub width: usize,

    /// Number of rows
    pub height: usize,

    /// Page-space bounds of the ruled region
    pub bbox: BBox,
}

impl Table {
    /// Create a table of `height` rows by `width` columns of empty cells.
    pub fn new(width: usize, height: usize, bbox: BBox) -> Self {
        Self {
            cells: vec![vec![Cell::default(); width]; height],
            merges: Vec::new(),
            width,
            height,
            bbox,
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.height
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.width
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Text at `(row, col)`; `None` when absorbed or out of range.
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).and_then(Cell::text)
    }

    /// The merge whose span contains `(row, col)`.
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&Merge> {
        let pos = CellPos::new(row, col);
        self.merges.iter().find(|m| m.contains(pos))
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        !self.merges.is_empty()
    }

    /// Rows as plain strings, absorbed cells rendered empty.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.text().unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows()
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tables found on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTables {
    /// 1-indexed page number
    pub page_number: u32,
    /// Tables in region order
    pub tables: Vec<Table>,
}

impl PageTables {
    pub fn new(page_number: u32, tables: Vec<Table>) -> Self {
        Self {
            page_number,
            tables,
        }
    }
}
