//! Cell grid derived from a region's rulers.

use super::options::YAxis;
use super::regions::Region;

/// Ruler coordinates of one region, indexed the way table cells are.
///
/// `columns` holds vertical ruler x coordinates left to right. `rows` holds
/// horizontal ruler y coordinates in visual order, top boundary first, so
/// band `r` lies between `rows[r]` and `rows[r + 1]` whichever way the page
/// y axis points.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub columns: Vec<f32>,
    pub rows: Vec<f32>,
}

impl Grid {
    pub fn from_region(region: &Region, y_axis: YAxis) -> Self {
        let mut columns: Vec<f32> = region.vertical.iter().map(|r| r.position).collect();
        columns.sort_by(f32::total_cmp);

        let mut rows: Vec<f32> = region.horizontal.iter().map(|r| r.position).collect();
        match y_axis {
            YAxis::Up => rows.sort_by(|a, b| b.total_cmp(a)),
            YAxis::Down => rows.sort_by(f32::total_cmp),
        }

        Self { columns, rows }
    }

    /// Number of cell columns.
    pub fn width(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// Number of cell rows.
    pub fn height(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// `(lo, hi)` x range of column `col`.
    pub fn column_band(&self, col: usize) -> (f32, f32) {
        band(&self.columns, col)
    }

    /// `(lo, hi)` y range of row `row`, in page coordinates.
    pub fn row_band(&self, row: usize) -> (f32, f32) {
        band(&self.rows, row)
    }

    /// Column whose band contains `x`, lower bound inclusive.
    pub fn column_at(&self, x: f32) -> Option<usize> {
        locate(&self.columns, x)
    }

    /// Row whose band contains `y`, lower bound inclusive.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        locate(&self.rows, y)
    }
}

fn band(bounds: &[f32], i: usize) -> (f32, f32) {
    let (a, b) = (bounds[i], bounds[i + 1]);
    (a.min(b), a.max(b))
}

fn locate(bounds: &[f32], p: f32) -> Option<usize> {
    (0..bounds.len().saturating_sub(1)).find(|&i| {
        let (lo, hi) = band(bounds, i);
        lo <= p && p < hi
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Interval, Ruler};

    fn region(xs: &[f32], ys: &[f32]) -> Region {
        Region {
            bbox: BBox::new(0.0, 0.0, 0.0, 0.0),
            vertical: xs
                .iter()
                .map(|&x| Ruler::new(x, vec![Interval::new(0.0, 1.0)]))
                .collect(),
            horizontal: ys
                .iter()
                .map(|&y| Ruler::new(y, vec![Interval::new(0.0, 1.0)]))
                .collect(),
        }
    }

    #[test]
    fn test_rows_follow_y_axis() {
        let r = region(&[0.0, 10.0, 20.0], &[0.0, 10.0, 30.0]);

        let up = Grid::from_region(&r, YAxis::Up);
        assert_eq!(up.rows, vec![30.0, 10.0, 0.0]);
        assert_eq!(up.row_at(25.0), Some(0));
        assert_eq!(up.row_at(5.0), Some(1));

        let down = Grid::from_region(&r, YAxis::Down);
        assert_eq!(down.rows, vec![0.0, 10.0, 30.0]);
        assert_eq!(down.row_at(25.0), Some(1));
        assert_eq!(down.row_at(5.0), Some(0));
    }

    #[test]
    fn test_lookup_bounds() {
        let grid = Grid::from_region(&region(&[0.0, 10.0, 20.0], &[0.0, 20.0]), YAxis::Up);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.column_at(0.0), Some(0));
        assert_eq!(grid.column_at(10.0), Some(1));
        assert_eq!(grid.column_at(20.0), None);
        assert_eq!(grid.column_at(-1.0), None);
        assert_eq!(grid.row_at(20.0), None);
        assert_eq!(grid.row_at(0.0), Some(0));
    }

    #[test]
    fn test_degenerate_grid() {
        let grid = Grid::from_region(&region(&[5.0], &[]), YAxis::Up);
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.height(), 0);
        assert_eq!(grid.column_at(5.0), None);
    }
}
