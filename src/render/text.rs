//! Plain text rendering for extracted tables.

use crate::error::Result;
use crate::model::PageTables;

/// Tab-separated rows, one blank line between tables.
pub fn to_text(pages: &[PageTables]) -> Result<String> {
    let output = pages
        .iter()
        .flat_map(|page| page.tables.iter())
        .map(|table| table.plain_text())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(output.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Cell, Table};

    #[test]
    fn test_to_text() {
        let mut first = Table::new(2, 1, BBox::new(0.0, 0.0, 1.0, 1.0));
        first.cells[0][0] = Cell::Text("a".to_string());
        first.cells[0][1] = Cell::Text("b".to_string());
        let mut second = Table::new(1, 2, BBox::new(0.0, 0.0, 1.0, 1.0));
        second.cells[0][0] = Cell::Text("c".to_string());
        second.cells[1][0] = Cell::Absorbed;

        let pages = vec![
            PageTables::new(1, vec![first]),
            PageTables::new(2, vec![]),
            PageTables::new(3, vec![second]),
        ];
        assert_eq!(to_text(&pages).unwrap(), "a\tb\n\nc");
    }
}
