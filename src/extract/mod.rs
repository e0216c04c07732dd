//! The per-page table reconstruction pipeline.
//!
//! ```text
//! operations ──► EdgeExtractor ──► RulerBuilder ──► RegionDetector
//!                                                        │
//! text fragments ───────────► TableAssembler ◄── MergeDetector
//! ```
//!
//! Every stage is a small value built from [`ExtractOptions`] and run over
//! read-only input. Nothing is shared between pages, so pages can be
//! processed on separate threads.

mod assembler;
mod edges;
mod grid;
mod merges;
mod options;
mod regions;
mod rulers;

pub use assembler::TableAssembler;
pub use edges::EdgeExtractor;
pub use grid::Grid;
pub use merges::MergeDetector;
pub use options::{ErrorMode, ExtractOptions, PageSelection, YAxis};
pub use regions::{Region, RegionDetector};
pub use rulers::{RulerBuilder, RulerSet};

use crate::model::{Edge, Operation, Table, TextFragment};

/// Intermediate results of one pipeline run, for inspection and debugging.
#[derive(Debug, Clone, Default)]
pub struct PageAnalysis {
    /// Page-space edges found in the drawing operations
    pub edges: Vec<Edge>,
    /// Rulers built from those edges
    pub rulers: RulerSet,
    /// Connected ruler regions, top to bottom
    pub regions: Vec<Region>,
    /// One table per region that produced a non-empty grid
    pub tables: Vec<Table>,
}

/// Reconstructs tables from one page's drawing operations and text.
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    options: ExtractOptions,
}

impl TableExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Tables on the page, in region order.
    ///
    /// Never fails: a page without usable rulings gives an empty list.
    pub fn extract(&self, ops: &[Operation], fragments: &[TextFragment]) -> Vec<Table> {
        self.analyze(ops, fragments).tables
    }

    /// Run the pipeline and keep every intermediate stage.
    pub fn analyze(&self, ops: &[Operation], fragments: &[TextFragment]) -> PageAnalysis {
        let opts = &self.options;

        let edges = EdgeExtractor::new(opts.line_max_width).extract(ops);
        let rulers = RulerBuilder::new(opts.line_max_width, opts.gap_tolerance).build(&edges);

        if rulers.is_empty() {
            log::debug!("TableExtractor: no rulings on page");
            return PageAnalysis {
                edges,
                rulers,
                ..Default::default()
            };
        }

        let regions = RegionDetector::new(opts.segment_thickness, opts.y_axis).detect(&rulers);

        let merge_detector = MergeDetector::new(opts.snap_tolerance);
        let assembler = TableAssembler::new();
        let tables: Vec<Table> = regions
            .iter()
            .filter_map(|region| {
                let grid = Grid::from_region(region, opts.y_axis);
                let merges = merge_detector.detect(region, &grid);
                assembler.assemble(region, &grid, merges, fragments)
            })
            .collect();

        log::debug!(
            "TableExtractor: {} edges, {} regions, {} tables",
            edges.len(),
            regions.len(),
            tables.len()
        );

        PageAnalysis {
            edges,
            rulers,
            regions,
            tables,
        }
    }
}
