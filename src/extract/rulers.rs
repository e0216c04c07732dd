//! Ruler building: clustering edges into logical grid lines.

use crate::model::{Edge, Interval, Orientation, Ruler};

/// Vertical and horizontal rulers found on a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulerSet {
    /// Sorted by x
    pub vertical: Vec<Ruler>,
    /// Sorted by y
    pub horizontal: Vec<Ruler>,
}

impl RulerSet {
    /// True when either family is empty; no table can be formed.
    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() || self.horizontal.is_empty()
    }
}

/// Clusters edges sharing a coordinate into rulers.
#[derive(Debug, Clone)]
pub struct RulerBuilder {
    line_max_width: f32,
    gap_tolerance: f32,
}

impl RulerBuilder {
    pub fn new(line_max_width: f32, gap_tolerance: f32) -> Self {
        Self {
            line_max_width,
            gap_tolerance,
        }
    }

    /// Partition `edges` by orientation and build both ruler families.
    pub fn build(&self, edges: &[Edge]) -> RulerSet {
        let mut vertical = Vec::new();
        let mut horizontal = Vec::new();
        for edge in edges {
            match edge.orientation(self.line_max_width) {
                Some(Orientation::Vertical) => vertical.push(*edge),
                Some(Orientation::Horizontal) => horizontal.push(*edge),
                None => {}
            }
        }

        let set = RulerSet {
            vertical: self.build_oriented(vertical, Orientation::Vertical),
            horizontal: self.build_oriented(horizontal, Orientation::Horizontal),
        };

        log::debug!(
            "RulerBuilder: {} vertical, {} horizontal rulers",
            set.vertical.len(),
            set.horizontal.len()
        );

        set
    }

    /// Build rulers from edges that all share `orientation`.
    ///
    /// A ruler is anchored at the smallest fixed coordinate of its cluster;
    /// edges within `line_max_width` of the anchor join it. Non-finite edges
    /// are ignored. Within a
    /// cluster edges are scanned by start coordinate, so the resulting
    /// intervals do not depend on input order.
    pub fn build_oriented(&self, mut edges: Vec<Edge>, orientation: Orientation) -> Vec<Ruler> {
        edges.retain(Edge::is_finite);
        edges.sort_by(|a, b| {
            a.fixed(orientation)
                .total_cmp(&b.fixed(orientation))
                .then(a.start(orientation).total_cmp(&b.start(orientation)))
        });

        let mut rulers = Vec::new();
        let mut cluster_start = 0;
        while cluster_start < edges.len() {
            let anchor = edges[cluster_start].fixed(orientation);
            let cluster_len = edges[cluster_start..]
                .iter()
                .take_while(|e| e.fixed(orientation) - anchor <= self.line_max_width)
                .count();
            let cluster = &mut edges[cluster_start..cluster_start + cluster_len];
            cluster.sort_by(|a, b| a.start(orientation).total_cmp(&b.start(orientation)));

            rulers.extend(self.build_ruler(anchor, cluster, orientation));
            cluster_start += cluster_len;
        }

        rulers
    }

    fn build_ruler(&self, position: f32, cluster: &[Edge], orientation: Orientation) -> Option<Ruler> {
        let mut acc: Option<RulerAccumulator> = None;

        for edge in cluster {
            let start = edge.start(orientation);
            let end = start + edge.length(orientation);

            match acc.as_mut() {
                Some(ruler) if start < ruler.open.end + self.gap_tolerance => {
                    ruler.open.end = ruler.open.end.max(end);
                }
                Some(ruler) => {
                    ruler.flush(self.line_max_width);
                    ruler.open = Interval::new(start, end);
                }
                None => acc = Some(RulerAccumulator::new(position, Interval::new(start, end))),
            }
        }

        acc.and_then(|acc| acc.finish(self.line_max_width))
    }
}

/// Ruler under construction: anchored coordinate, closed intervals and the
/// interval still being extended.
struct RulerAccumulator {
    position: f32,
    intervals: Vec<Interval>,
    open: Interval,
}

impl RulerAccumulator {
    fn new(position: f32, open: Interval) -> Self {
        Self {
            position,
            intervals: Vec::new(),
            open,
        }
    }

    /// Close the open interval, dropping it when too short to be a line.
    fn flush(&mut self, min_len: f32) {
        if self.open.len() <= min_len {
            return;
        }
        match self.intervals.last_mut() {
            Some(last) if self.open.start <= last.end => last.end = last.end.max(self.open.end),
            _ => self.intervals.push(self.open),
        }
    }

    fn finish(mut self, min_len: f32) -> Option<Ruler> {
        self.flush(min_len);
        if self.intervals.is_empty() {
            None
        } else {
            Some(Ruler::new(self.position, self.intervals))
        }
    }
}
