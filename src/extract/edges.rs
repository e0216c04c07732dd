//! Edge extraction from the drawing operation stream.
//!
//! Walks the operator list with a transform stack and collects thin
//! rectangles and orthogonal strokes as page-space [`Edge`]s.

use crate::model::{Edge, Matrix, Operation, PathOp};

/// An edge in local coordinates together with the transform in effect
/// when it was drawn.
#[derive(Debug, Clone, Copy)]
struct PendingEdge {
    edge: Edge,
    transform: Matrix,
}

/// Converts an operation stream into page-space edges.
#[derive(Debug, Clone)]
pub struct EdgeExtractor {
    line_max_width: f32,
}

impl EdgeExtractor {
    /// Create an extractor keeping rectangles thinner than `line_max_width`.
    pub fn new(line_max_width: f32) -> Self {
        Self { line_max_width }
    }

    /// Extract edges from `ops`.
    ///
    /// The result is unordered. Unknown operators are skipped; the stream is
    /// only read.
    pub fn extract(&self, ops: &[Operation]) -> Vec<Edge> {
        let mut pending: Vec<PendingEdge> = Vec::new();
        let mut transform = Matrix::IDENTITY;
        let mut stack: Vec<Matrix> = Vec::new();
        let mut line_width: Option<f32> = None;
        let mut cursor: Option<(f32, f32)> = None;

        for op in ops {
            match op {
                Operation::ConstructPath(subops) => {
                    for subop in subops {
                        match *subop {
                            PathOp::Rectangle {
                                x,
                                y,
                                width,
                                height,
                            } => {
                                if width.abs().min(height.abs()) < self.line_max_width {
                                    pending.push(PendingEdge {
                                        edge: Edge::new(x, y, width, height),
                                        transform,
                                    });
                                }
                            }
                            PathOp::MoveTo { x, y } => {
                                cursor = Some((x, y));
                            }
                            PathOp::LineTo { x, y } => {
                                if let Some(from) = cursor {
                                    if let Some(edge) = stroke_edge(from, (x, y), line_width) {
                                        pending.push(PendingEdge { edge, transform });
                                    }
                                }
                                cursor = Some((x, y));
                            }
                            PathOp::Unsupported => {}
                        }
                    }
                }
                Operation::Save => stack.push(transform),
                Operation::Restore => match stack.pop() {
                    Some(saved) => transform = saved,
                    None => log::trace!("EdgeExtractor: restore without matching save"),
                },
                Operation::Transform(m) => transform = transform.multiply(m),
                Operation::SetLineWidth(w) => line_width = Some(*w),
                Operation::Unsupported(name) => {
                    log::trace!("EdgeExtractor: skipping operator {}", name);
                }
            }
        }

        log::debug!("EdgeExtractor: {} candidate edges", pending.len());

        pending
            .into_iter()
            .map(|p| p.edge.transformed(&p.transform))
            .filter(|edge| {
                let finite = edge.is_finite();
                if !finite {
                    log::trace!("EdgeExtractor: dropping non-finite edge {:?}", edge);
                }
                finite
            })
            .collect()
    }
}

/// Edge for a straight stroke from `from` to `to`, if it is axis-aligned.
///
/// With a known line width the edge is that wide and centered on the
/// stroke; without one it has zero breadth.
fn stroke_edge(from: (f32, f32), to: (f32, f32), line_width: Option<f32>) -> Option<Edge> {
    let (x0, y0) = from;
    let (x, y) = to;
    let breadth = line_width.unwrap_or(0.0);
    let half = breadth / 2.0;

    if x0 == x {
        Some(Edge::new(x - half, y.min(y0), breadth, (y - y0).abs()))
    } else if y0 == y {
        Some(Edge::new(x.min(x0), y - half, (x - x0).abs(), breadth))
    } else {
        None
    }
}
