//! Region detection: grouping rulers into independently ruled tables.
//!
//! Connectivity is judged by bounding-box overlap. A vertical segment joins
//! the first region whose box it touches, and every horizontal segment
//! touching the grown box is pulled in. Unrelated rulings whose boxes
//! overlap end up in one region.

use crate::model::{BBox, Ruler};

use super::options::YAxis;
use super::rulers::RulerSet;

/// One connected group of rulers, later assembled into one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Page-space bounds of every segment in the region
    pub bbox: BBox,
    /// Vertical rulers inside the region, sorted by x
    pub vertical: Vec<Ruler>,
    /// Horizontal rulers inside the region, sorted by y
    pub horizontal: Vec<Ruler>,
}

impl Region {
    /// Number of grid columns.
    pub fn column_count(&self) -> usize {
        self.vertical.len().saturating_sub(1)
    }

    /// Number of grid rows.
    pub fn row_count(&self) -> usize {
        self.horizontal.len().saturating_sub(1)
    }
}

/// Finds connected ruler regions.
#[derive(Debug, Clone)]
pub struct RegionDetector {
    thickness: f32,
    y_axis: YAxis,
}

impl RegionDetector {
    /// `thickness` is the extent given to a segment across its own axis
    /// when testing for overlap.
    pub fn new(thickness: f32, y_axis: YAxis) -> Self {
        Self { thickness, y_axis }
    }

    /// Group `rulers` into regions ordered top-to-bottom, then left-to-right.
    pub fn detect(&self, rulers: &RulerSet) -> Vec<Region> {
        let boxes = self.find_boxes(rulers);

        let regions: Vec<Region> = boxes
            .into_iter()
            .filter_map(|bbox| self.clip(bbox, rulers))
            .collect();

        log::debug!("RegionDetector: {} regions", regions.len());
        regions
    }

    /// Bounding boxes of the connected components, in output order.
    ///
    /// Every segment is given `thickness` across its own axis, and the
    /// boxes cover those thickened segments.
    pub fn find_boxes(&self, rulers: &RulerSet) -> Vec<BBox> {
        let mut boxes: Vec<BBox> = Vec::new();

        for ruler in &rulers.vertical {
            for iv in &ruler.intervals {
                let segment = BBox::new(
                    ruler.position,
                    iv.start,
                    ruler.position + self.thickness,
                    iv.end,
                );

                let idx = match boxes.iter().position(|b| b.intersects(&segment)) {
                    Some(i) => {
                        boxes[i].expand(&segment);
                        i
                    }
                    None => {
                        boxes.push(segment);
                        boxes.len() - 1
                    }
                };

                self.absorb_horizontal(&mut boxes[idx], &rulers.horizontal);
            }
        }

        let mut boxes = self.coalesce(boxes, &rulers.horizontal);
        match self.y_axis {
            YAxis::Up => boxes.sort_by(|a, b| {
                b.y_max
                    .total_cmp(&a.y_max)
                    .then(a.x_min.total_cmp(&b.x_min))
            }),
            YAxis::Down => boxes.sort_by(|a, b| {
                a.y_min
                    .total_cmp(&b.y_min)
                    .then(a.x_min.total_cmp(&b.x_min))
            }),
        }
        boxes
    }

    /// Grow `region` by every horizontal segment touching it, until no
    /// segment enlarges it further.
    fn absorb_horizontal(&self, region: &mut BBox, horizontal: &[Ruler]) {
        let mut changed = true;
        while changed {
            changed = false;
            for ruler in horizontal {
                for iv in &ruler.intervals {
                    let segment = BBox::new(
                        iv.start,
                        ruler.position,
                        iv.end,
                        ruler.position + self.thickness,
                    );
                    if !region.intersects(&segment) {
                        continue;
                    }
                    let mut grown = *region;
                    grown.expand(&segment);
                    // NaN compares false, so a non-finite box never counts as grown
                    if grown.x_min < region.x_min
                        || grown.y_min < region.y_min
                        || grown.x_max > region.x_max
                        || grown.y_max > region.y_max
                    {
                        *region = grown;
                        changed = true;
                    }
                }
            }
        }
    }

    /// Merge touching boxes. A vertical segment may bridge two boxes but
    /// only joins the first it meets; this pass restores the transitive
    /// closure.
    fn coalesce(&self, mut boxes: Vec<BBox>, horizontal: &[Ruler]) -> Vec<BBox> {
        loop {
            let mut merged = false;
            'outer: for i in 0..boxes.len() {
                for j in (i + 1)..boxes.len() {
                    if boxes[i].intersects(&boxes[j]) {
                        let other = boxes.remove(j);
                        boxes[i].expand(&other);
                        self.absorb_horizontal(&mut boxes[i], horizontal);
                        merged = true;
                        break 'outer;
                    }
                }
            }
            if !merged {
                return boxes;
            }
        }
    }

    /// Rulers falling inside `bbox`, keeping only the intervals that reach
    /// into it. Regions left without a vertical or horizontal ruler are
    /// dropped.
    fn clip(&self, bbox: BBox, rulers: &RulerSet) -> Option<Region> {
        let t = self.thickness;

        let vertical = clip_rulers(
            &rulers.vertical,
            (bbox.x_min - t, bbox.x_max + t),
            (bbox.y_min - t, bbox.y_max + t),
        );
        let horizontal = clip_rulers(
            &rulers.horizontal,
            (bbox.y_min - t, bbox.y_max + t),
            (bbox.x_min - t, bbox.x_max + t),
        );

        if vertical.is_empty() || horizontal.is_empty() {
            log::trace!("RegionDetector: dropping region {:?} without a full ruling", bbox);
            return None;
        }

        Some(Region {
            bbox,
            vertical,
            horizontal,
        })
    }
}

fn clip_rulers(rulers: &[Ruler], fixed: (f32, f32), along: (f32, f32)) -> Vec<Ruler> {
    rulers
        .iter()
        .filter(|r| r.position >= fixed.0 && r.position <= fixed.1)
        .filter_map(|r| {
            let intervals: Vec<_> = r
                .intervals
                .iter()
                .filter(|iv| iv.overlaps(along.0, along.1))
                .copied()
                .collect();
            if intervals.is_empty() {
                None
            } else {
                Some(Ruler::new(r.position, intervals))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Interval;

    fn ruler(position: f32, intervals: &[(f32, f32)]) -> Ruler {
        Ruler::new(
            position,
            intervals.iter().map(|&(s, e)| Interval::new(s, e)).collect(),
        )
    }

    /// A fully ruled grid with lines at `xs` × `ys`.
    fn grid(xs: &[f32], ys: &[f32]) -> RulerSet {
        let (x0, x1) = (xs[0], xs[xs.len() - 1]);
        let (y0, y1) = (ys[0], ys[ys.len() - 1]);
        RulerSet {
            vertical: xs.iter().map(|&x| ruler(x, &[(y0, y1)])).collect(),
            horizontal: ys.iter().map(|&y| ruler(y, &[(x0, x1)])).collect(),
        }
    }

    fn detector() -> RegionDetector {
        RegionDetector::new(1.0, YAxis::Up)
    }

    #[test]
    fn test_single_grid() {
        let rulers = grid(&[0.0, 10.0, 20.0], &[0.0, 10.0, 20.0]);
        let regions = detector().detect(&rulers);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bbox, BBox::new(0.0, 0.0, 21.0, 21.0));
        assert_eq!(regions[0].column_count(), 2);
        assert_eq!(regions[0].row_count(), 2);
    }

    #[test]
    fn test_two_separate_tables_top_first() {
        let mut rulers = grid(&[0.0, 50.0], &[0.0, 20.0]);
        let upper = grid(&[0.0, 30.0, 50.0], &[100.0, 120.0, 140.0]);
        rulers.vertical.extend(upper.vertical);
        rulers.horizontal.extend(upper.horizontal);
        rulers.vertical.sort_by(|a, b| a.position.total_cmp(&b.position));
        rulers.horizontal.sort_by(|a, b| a.position.total_cmp(&b.position));

        let regions = detector().detect(&rulers);
        assert_eq!(regions.len(), 2);

        assert_eq!(regions[0].bbox, BBox::new(0.0, 100.0, 51.0, 141.0));
        assert_eq!(regions[0].column_count(), 2);
        assert_eq!(regions[0].row_count(), 2);

        assert_eq!(regions[1].bbox, BBox::new(0.0, 0.0, 51.0, 21.0));
        assert_eq!(regions[1].column_count(), 1);
        assert_eq!(regions[1].row_count(), 1);
    }

    #[test]
    fn test_clip_keeps_only_intervals_in_region() {
        // one long vertical ruler shared by two stacked tables
        let rulers = RulerSet {
            vertical: vec![
                ruler(0.0, &[(0.0, 20.0), (100.0, 120.0)]),
                ruler(40.0, &[(0.0, 20.0), (100.0, 120.0)]),
            ],
            horizontal: vec![
                ruler(0.0, &[(0.0, 40.0)]),
                ruler(20.0, &[(0.0, 40.0)]),
                ruler(100.0, &[(0.0, 40.0)]),
                ruler(120.0, &[(0.0, 40.0)]),
            ],
        };

        let regions = detector().detect(&rulers);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].vertical[0].intervals, vec![Interval::new(0.0, 20.0)]);
        assert_eq!(regions[1].horizontal.len(), 2);
    }

    #[test]
    fn test_order_independent() {
        let mut rulers = grid(&[0.0, 10.0, 20.0], &[0.0, 10.0, 20.0]);
        let other = grid(&[50.0, 70.0], &[0.0, 30.0]);
        rulers.vertical.extend(other.vertical);
        rulers.horizontal.extend(other.horizontal);

        let forward = detector().find_boxes(&rulers);

        let mut permuted = rulers.clone();
        permuted.vertical.reverse();
        permuted.horizontal.reverse();
        permuted.vertical.swap(0, 2);
        let backward = detector().find_boxes(&permuted);

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn test_bridging_segment_joins_regions() {
        // two pairs of verticals joined by one long horizontal ruler
        let rulers = RulerSet {
            vertical: vec![
                ruler(0.0, &[(0.0, 10.0)]),
                ruler(10.0, &[(0.0, 10.0)]),
                ruler(30.0, &[(0.0, 10.0)]),
                ruler(40.0, &[(0.0, 10.0)]),
            ],
            horizontal: vec![ruler(0.0, &[(0.0, 40.0)]), ruler(10.0, &[(0.0, 10.0)])],
        };

        let boxes = detector().find_boxes(&rulers);
        assert_eq!(boxes, vec![BBox::new(0.0, 0.0, 41.0, 11.0)]);
    }

    #[test]
    fn test_late_bridge_merges_earlier_boxes() {
        // the x=8 segment touches both boxes but joins only the upper one
        let rulers = RulerSet {
            vertical: vec![
                ruler(0.0, &[(100.0, 110.0)]),
                ruler(5.0, &[(0.0, 10.0)]),
                ruler(8.0, &[(5.0, 105.0)]),
            ],
            horizontal: vec![ruler(0.0, &[(0.0, 10.0)]), ruler(100.0, &[(0.0, 10.0)])],
        };

        let boxes = detector().find_boxes(&rulers);
        assert_eq!(boxes, vec![BBox::new(0.0, 0.0, 10.0, 110.0)]);
    }

    #[test]
    fn test_non_finite_ruler_terminates() {
        let rulers = RulerSet {
            vertical: vec![ruler(f32::NAN, &[(0.0, 10.0)])],
            horizontal: vec![ruler(0.0, &[(0.0, 10.0)]), ruler(f32::NAN, &[(0.0, 10.0)])],
        };
        let boxes = detector().find_boxes(&rulers);
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn test_horizontal_only_yields_nothing() {
        let rulers = RulerSet {
            vertical: vec![],
            horizontal: vec![ruler(0.0, &[(0.0, 40.0)])],
        };
        assert!(detector().detect(&rulers).is_empty());
    }
}
