//! Table assembly: placing text fragments into grid cells.

use std::collections::HashMap;

use crate::model::{Cell, CellPos, Merge, Table, TextFragment};

use super::grid::Grid;
use super::regions::Region;

/// Builds a [`Table`] from one region's grid, merges and the page text.
#[derive(Debug, Clone, Default)]
pub struct TableAssembler;

impl TableAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the table for `region`, or `None` when its grid has no
    /// rows or no columns.
    ///
    /// Each fragment is placed by the translation of its transform. Text
    /// landing inside a merged cell goes to the merge's canonical cell;
    /// fragments outside every band are dropped. Text in one cell is
    /// concatenated in encounter order with no separator.
    pub fn assemble(
        &self,
        region: &Region,
        grid: &Grid,
        merges: Vec<Merge>,
        fragments: &[TextFragment],
    ) -> Option<Table> {
        let (width, height) = (grid.width(), grid.height());
        if width == 0 || height == 0 {
            log::trace!("TableAssembler: skipping {}x{} region", width, height);
            return None;
        }

        let mut aliases: HashMap<CellPos, CellPos> = HashMap::new();
        for merge in &merges {
            let origin = merge.origin();
            for cell in merge.absorbed_cells() {
                aliases.insert(cell, origin);
            }
        }

        let mut table = Table::new(width, height, region.bbox);

        let mut placed = 0usize;
        for fragment in fragments {
            let (x, y) = fragment.origin();
            let (Some(col), Some(row)) = (grid.column_at(x), grid.row_at(y)) else {
                log::trace!("TableAssembler: dropping {:?} at ({}, {})", fragment.text, x, y);
                continue;
            };

            let pos = CellPos::new(row, col);
            let target = aliases.get(&pos).copied().unwrap_or(pos);
            if let Cell::Text(text) = &mut table.cells[target.row][target.col] {
                text.push_str(&fragment.text);
                placed += 1;
            }
        }

        for cell in aliases.keys() {
            table.cells[cell.row][cell.col] = Cell::Absorbed;
        }
        table.merges = merges;

        log::debug!(
            "TableAssembler: {}x{} table, {} fragments placed",
            width,
            height,
            placed
        );

        Some(table)
    }
}
