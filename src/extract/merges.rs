//! Merged cell detection.
//!
//! A ruler that is drawn across one cell band but not another leaves a hole
//! in the grid; the two cells on either side of the hole are one cell. Holes
//! in interior horizontal rulers give row spans, holes in interior vertical
//! rulers give column spans. Chains of two-cell spans are coalesced and the
//! two directions combined into rectangular merges.

use std::collections::{BTreeMap, HashSet};

use crate::model::{CellPos, Interval, Merge, Ruler};

use super::grid::Grid;
use super::regions::Region;

type MergeMap = BTreeMap<CellPos, Merge>;

/// Direction a span map grows in while coalescing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanAxis {
    Rows,
    Columns,
}

/// Infers merged cells from gaps in a region's rulers.
#[derive(Debug, Clone)]
pub struct MergeDetector {
    snap_tolerance: f32,
}

impl MergeDetector {
    /// `snap_tolerance` is how far an interval end may fall short of a
    /// ruler coordinate and still count as reaching it.
    pub fn new(snap_tolerance: f32) -> Self {
        Self { snap_tolerance }
    }

    /// Merges for `region`, sorted by canonical cell and pairwise disjoint.
    pub fn detect(&self, region: &Region, grid: &Grid) -> Vec<Merge> {
        if grid.width() == 0 || grid.height() == 0 {
            return Vec::new();
        }

        let mut row_spans = self.row_spans(region, grid);
        coalesce(&mut row_spans, SpanAxis::Rows);

        let mut column_spans = self.column_spans(region, grid);
        coalesce(&mut column_spans, SpanAxis::Columns);

        let mut merges = combine(row_spans, column_spans);
        normalize(&mut merges);

        let merges = resolve_overlaps(merges, grid);
        log::debug!("MergeDetector: {} merged cells", merges.len());
        merges
    }

    /// Height-2 spans where an interior horizontal ruler is missing over a
    /// column band.
    fn row_spans(&self, region: &Region, grid: &Grid) -> MergeMap {
        let mut spans = MergeMap::new();

        for boundary in 1..grid.height() {
            let intervals = intervals_at(&region.horizontal, grid.rows[boundary]);
            for col in 0..grid.width() {
                let (lo, hi) = grid.column_band(col);
                if !intervals
                    .iter()
                    .any(|iv| iv.covers(lo, hi, self.snap_tolerance))
                {
                    let row = boundary - 1;
                    spans.insert(CellPos::new(row, col), Merge::new(row, col, 1, 2));
                }
            }
        }

        spans
    }

    /// Width-2 spans where an interior vertical ruler is missing over a
    /// row band.
    fn column_spans(&self, region: &Region, grid: &Grid) -> MergeMap {
        let mut spans = MergeMap::new();

        for boundary in 1..grid.width() {
            let intervals = intervals_at(&region.vertical, grid.columns[boundary]);
            for row in 0..grid.height() {
                let (lo, hi) = grid.row_band(row);
                if !intervals
                    .iter()
                    .any(|iv| iv.covers(lo, hi, self.snap_tolerance))
                {
                    let col = boundary - 1;
                    spans.insert(CellPos::new(row, col), Merge::new(row, col, 2, 1));
                }
            }
        }

        spans
    }
}

fn intervals_at(rulers: &[Ruler], position: f32) -> &[Interval] {
    rulers
        .iter()
        .find(|r| r.position.total_cmp(&position).is_eq())
        .map(|r| r.intervals.as_slice())
        .unwrap_or_default()
}

/// Fold chained spans into one: a span whose last cell is the canonical
/// cell of another absorbs it. Repeats until no pair is left.
fn coalesce(spans: &mut MergeMap, axis: SpanAxis) {
    loop {
        let chained = spans.iter().find_map(|(&pos, merge)| {
            let next = merge.last_cell();
            (next != pos && spans.contains_key(&next)).then_some((pos, next))
        });

        let Some((pos, next)) = chained else {
            return;
        };

        let Some(absorbed) = spans.remove(&next) else {
            return;
        };
        if let Some(merge) = spans.get_mut(&pos) {
            match axis {
                SpanAxis::Rows => merge.height += absorbed.height - 1,
                SpanAxis::Columns => merge.width += absorbed.width - 1,
            }
        }
    }
}

/// Overlay column spans onto row spans. A cell present in both takes its
/// height from the row span and its width from the column span.
fn combine(mut row_spans: MergeMap, column_spans: MergeMap) -> MergeMap {
    for (pos, span) in column_spans {
        row_spans
            .entry(pos)
            .and_modify(|m| m.width = span.width)
            .or_insert(span);
    }
    row_spans
}

/// Drop every record whose canonical cell lies inside another merge.
fn normalize(merges: &mut MergeMap) {
    let keys: Vec<CellPos> = merges.keys().copied().collect();
    for pos in keys {
        let Some(merge) = merges.get(&pos).copied() else {
            continue;
        };
        for cell in merge.absorbed_cells() {
            merges.remove(&cell);
        }
    }
}

/// Clamp merges to the grid and make them pairwise disjoint. Earlier merges
/// win; a later one overlapping them loses rows, then columns, and is
/// dropped once it shrinks to a single cell.
fn resolve_overlaps(merges: MergeMap, grid: &Grid) -> Vec<Merge> {
    let mut occupied: HashSet<CellPos> = HashSet::new();
    let mut out = Vec::with_capacity(merges.len());

    for (_, mut merge) in merges {
        merge.height = merge.height.min(grid.height() - merge.row);
        merge.width = merge.width.min(grid.width() - merge.col);

        while merge.height > 1 && merge.cells().any(|c| occupied.contains(&c)) {
            merge.height -= 1;
        }
        while merge.width > 1 && merge.cells().any(|c| occupied.contains(&c)) {
            merge.width -= 1;
        }

        if merge.width * merge.height <= 1 || merge.cells().any(|c| occupied.contains(&c)) {
            log::trace!("MergeDetector: dropping overlapping merge at {:?}", merge.origin());
            continue;
        }

        occupied.extend(merge.cells());
        out.push(merge);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::options::YAxis;
    use crate::model::BBox;

    fn ruler(position: f32, intervals: &[(f32, f32)]) -> Ruler {
        Ruler::new(
            position,
            intervals.iter().map(|&(s, e)| Interval::new(s, e)).collect(),
        )
    }

    fn detect(vertical: Vec<Ruler>, horizontal: Vec<Ruler>) -> Vec<Merge> {
        let region = Region {
            bbox: BBox::new(0.0, 0.0, 0.0, 0.0),
            vertical,
            horizontal,
        };
        let grid = Grid::from_region(&region, YAxis::Up);
        MergeDetector::new(5.0).detect(&region, &grid)
    }

    #[test]
    fn test_full_grid_has_no_merges() {
        let v = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(0.0, 20.0)]),
            ruler(20.0, &[(0.0, 20.0)]),
        ];
        let h = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(0.0, 20.0)]),
            ruler(20.0, &[(0.0, 20.0)]),
        ];
        assert!(detect(v, h).is_empty());
    }

    #[test]
    fn test_missing_horizontal_segment() {
        let v = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(0.0, 20.0)]),
            ruler(20.0, &[(0.0, 20.0)]),
        ];
        let h = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(10.0, 20.0)]),
            ruler(20.0, &[(0.0, 20.0)]),
        ];
        assert_eq!(detect(v, h), vec![Merge::new(0, 0, 1, 2)]);
    }

    #[test]
    fn test_row_chain_coalesces() {
        // four rows, first column spans all of them
        let v = vec![
            ruler(0.0, &[(0.0, 40.0)]),
            ruler(10.0, &[(0.0, 40.0)]),
            ruler(20.0, &[(0.0, 40.0)]),
        ];
        let h = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(10.0, 20.0)]),
            ruler(20.0, &[(10.0, 20.0)]),
            ruler(30.0, &[(10.0, 20.0)]),
            ruler(40.0, &[(0.0, 20.0)]),
        ];
        assert_eq!(detect(v, h), vec![Merge::new(0, 0, 1, 4)]);
    }

    #[test]
    fn test_column_chain_coalesces() {
        // header row spanning three columns
        let v = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(0.0, 10.0)]),
            ruler(20.0, &[(0.0, 10.0)]),
            ruler(30.0, &[(0.0, 20.0)]),
        ];
        let h = vec![
            ruler(0.0, &[(0.0, 30.0)]),
            ruler(10.0, &[(0.0, 30.0)]),
            ruler(20.0, &[(0.0, 30.0)]),
        ];
        assert_eq!(detect(v, h), vec![Merge::new(0, 0, 3, 1)]);
    }

    #[test]
    fn test_rectangular_merge() {
        // 3x3 grid whose top-left 2x2 block is one cell
        let v = vec![
            ruler(0.0, &[(0.0, 30.0)]),
            ruler(10.0, &[(0.0, 10.0)]),
            ruler(20.0, &[(0.0, 30.0)]),
            ruler(30.0, &[(0.0, 30.0)]),
        ];
        let h = vec![
            ruler(0.0, &[(0.0, 30.0)]),
            ruler(10.0, &[(0.0, 30.0)]),
            ruler(20.0, &[(20.0, 30.0)]),
            ruler(30.0, &[(0.0, 30.0)]),
        ];
        assert_eq!(detect(v, h), vec![Merge::new(0, 0, 2, 2)]);
    }

    #[test]
    fn test_snap_tolerance_absorbs_rounding() {
        let v = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(0.3, 19.6)]),
            ruler(20.0, &[(0.0, 20.0)]),
        ];
        let h = vec![
            ruler(0.0, &[(0.0, 20.0)]),
            ruler(10.0, &[(0.2, 19.8)]),
            ruler(20.0, &[(0.0, 20.0)]),
        ];
        assert!(detect(v, h).is_empty());
    }

    #[test]
    fn test_coalesce_terminates_without_overlap() {
        let mut map = MergeMap::new();
        for row in 0..5 {
            map.insert(CellPos::new(row, 0), Merge::new(row, 0, 1, 2));
        }
        coalesce(&mut map, SpanAxis::Rows);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&CellPos::new(0, 0)], Merge::new(0, 0, 1, 6));
    }

    #[test]
    fn test_resolve_overlaps_shrinks_later_merge() {
        let v = vec![ruler(0.0, &[]), ruler(10.0, &[]), ruler(20.0, &[])];
        let h = vec![ruler(0.0, &[]), ruler(10.0, &[]), ruler(20.0, &[])];
        let region = Region {
            bbox: BBox::new(0.0, 0.0, 20.0, 20.0),
            vertical: v,
            horizontal: h,
        };
        let grid = Grid::from_region(&region, YAxis::Up);

        let mut map = MergeMap::new();
        map.insert(CellPos::new(0, 1), Merge::new(0, 1, 1, 2));
        map.insert(CellPos::new(1, 0), Merge::new(1, 0, 2, 1));

        let merges = resolve_overlaps(map, &grid);
        assert_eq!(merges, vec![Merge::new(0, 1, 1, 2)]);
        for (i, a) in merges.iter().enumerate() {
            for b in &merges[i + 1..] {
                assert!(!a.cells().any(|c| b.contains(c)));
            }
        }
    }
}
