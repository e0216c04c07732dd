//! # pdfgrid
//!
//! Ruled table reconstruction from PDF page graphics.
//!
//! Tables are inferred purely from ruling lines and text placement: thin
//! rectangles and orthogonal strokes become grid lines, connected grid
//! lines become table regions, gaps in the lines become merged cells, and
//! text fragments are dropped into the cells they land in.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfgrid::{extract_tables_from_file, render, ExtractOptions};
//!
//! fn main() -> pdfgrid::Result<()> {
//!     let pages = extract_tables_from_file("invoice.pdf", &ExtractOptions::default())?;
//!
//!     let markdown = render::to_markdown(&pages, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! The geometric pipeline also works without a PDF, on operation streams
//! from any document engine:
//!
//! ```
//! use pdfgrid::{extract_tables, Operation, PathOp, TextFragment};
//!
//! let rect = |x, y, width, height| PathOp::Rectangle { x, y, width, height };
//! let ops = vec![Operation::ConstructPath(vec![
//!     rect(0.0, 0.0, 1.0, 20.0),
//!     rect(20.0, 0.0, 1.0, 20.0),
//!     rect(0.0, 0.0, 20.0, 1.0),
//!     rect(0.0, 20.0, 20.0, 1.0),
//! ])];
//!
//! let tables = extract_tables(&ops, &[TextFragment::at(5.0, 5.0, "42")]);
//! assert_eq!(tables[0].text(0, 0), Some("42"));
//! ```
//!
//! ## Features
//!
//! - **Merged cells**: row and column spans, including rectangular spans
//! - **Multiple tables per page**: independently ruled regions
//! - **Parallel processing**: Uses Rayon for multi-page documents
//! - **Output formats**: JSON, Markdown (with HTML fallback), plain text

pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

pub use detect::{is_pdf, is_pdf_bytes, PdfHeader};
pub use error::{Error, Result};
pub use extract::{
    ErrorMode, ExtractOptions, PageAnalysis, PageSelection, TableExtractor, YAxis,
};
pub use model::{
    BBox, Cell, CellPos, Edge, Interval, Matrix, Merge, Operation, PageTables, PathOp, Ruler,
    Table, TextFragment,
};
pub use parser::{LopdfSource, PageContent, PageSource};
pub use render::{JsonFormat, RenderOptions, TableFallback};

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

/// Reconstruct the tables of one page with default options.
///
/// # Example
///
/// ```
/// use pdfgrid::extract_tables;
///
/// assert!(extract_tables(&[], &[]).is_empty());
/// ```
pub fn extract_tables(ops: &[Operation], fragments: &[TextFragment]) -> Vec<Table> {
    TableExtractor::default().extract(ops, fragments)
}

/// Reconstruct the tables of one page with custom options.
pub fn extract_tables_with_options(
    ops: &[Operation],
    fragments: &[TextFragment],
    options: &ExtractOptions,
) -> Vec<Table> {
    TableExtractor::new(options.clone()).extract(ops, fragments)
}

/// Extract tables from every selected page of `source`.
///
/// Both input streams of every page are fetched first, in page order. In
/// [`ErrorMode::Strict`] the first failed fetch is returned; in
/// [`ErrorMode::Lenient`] the page is logged and skipped. The geometric
/// work then runs per page, in parallel unless disabled.
pub fn extract_tables_from_source<S: PageSource + ?Sized>(
    source: &S,
    options: &ExtractOptions,
) -> Result<Vec<PageTables>> {
    let mut pages = Vec::new();
    for page in source.page_numbers() {
        if !options.pages.includes(page) {
            continue;
        }
        match source.page_content(page) {
            Ok(content) => pages.push((page, content)),
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::warn!("Skipping page {}: {}", page, e);
            }
            Err(e) => return Err(e),
        }
    }

    let extractor = TableExtractor::new(options.clone());
    let run = |(page, content): &(u32, PageContent)| {
        PageTables::new(
            *page,
            extractor.extract(&content.operations, &content.fragments),
        )
    };

    let results: Vec<PageTables> = if options.parallel {
        pages.par_iter().map(run).collect()
    } else {
        pages.iter().map(run).collect()
    };

    log::info!(
        "Extracted {} tables from {} pages",
        results.iter().map(|p| p.tables.len()).sum::<usize>(),
        results.len()
    );

    Ok(results)
}

/// Extract tables from a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfgrid::{extract_tables_from_file, ExtractOptions, PageSelection};
///
/// let options = ExtractOptions::new()
///     .lenient()
///     .with_pages(PageSelection::Range(1..=3));
/// let pages = extract_tables_from_file("report.pdf", &options).unwrap();
/// for page in &pages {
///     println!("page {}: {} tables", page.page_number, page.tables.len());
/// }
/// ```
pub fn extract_tables_from_file<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Vec<PageTables>> {
    let source = LopdfSource::load_file(path)?;
    extract_tables_from_source(&source, options)
}

/// Extract tables from PDF bytes.
pub fn extract_tables_from_bytes(data: &[u8], options: &ExtractOptions) -> Result<Vec<PageTables>> {
    let source = LopdfSource::load_bytes(data)?;
    extract_tables_from_source(&source, options)
}

/// Extract tables from a reader.
pub fn extract_tables_from_reader<R: Read>(
    reader: R,
    options: &ExtractOptions,
) -> Result<Vec<PageTables>> {
    let source = LopdfSource::load_reader(reader)?;
    extract_tables_from_source(&source, options)
}

/// Extract tables from a PDF file without blocking the async runtime.
///
/// The file is read with tokio and the extraction runs on the blocking
/// thread pool.
#[cfg(feature = "async")]
pub async fn extract_tables_from_file_async<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Vec<PageTables>> {
    let data = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || extract_tables_from_bytes(&data, &options))
        .await
        .map_err(|e| Error::Other(format!("Extraction task failed: {}", e)))?
}

/// Builder for the common extract-then-render flow.
///
/// # Example
///
/// ```no_run
/// use pdfgrid::{PdfGrid, TableFallback};
///
/// let markdown = PdfGrid::new()
///     .lenient()
///     .with_table_fallback(TableFallback::Html)
///     .extract("statement.pdf")?
///     .to_markdown()?;
/// # Ok::<(), pdfgrid::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfGrid {
    extract_options: ExtractOptions,
    render_options: RenderOptions,
}

impl PdfGrid {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip pages whose content cannot be read.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.extract_options = self.extract_options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.extract_options = self.extract_options.with_pages(pages);
        self
    }

    /// Replace the extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Set table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.render_options = self.render_options.with_table_fallback(fallback);
        self
    }

    /// Extract tables from a PDF file.
    pub fn extract<P: AsRef<Path>>(self, path: P) -> Result<Extraction> {
        let pages = extract_tables_from_file(path, &self.extract_options)?;
        Ok(Extraction {
            pages,
            render_options: self.render_options,
        })
    }

    /// Extract tables from PDF bytes.
    pub fn extract_bytes(self, data: &[u8]) -> Result<Extraction> {
        let pages = extract_tables_from_bytes(data, &self.extract_options)?;
        Ok(Extraction {
            pages,
            render_options: self.render_options,
        })
    }
}

/// Tables extracted by [`PdfGrid`], ready to render.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Tables per processed page
    pub pages: Vec<PageTables>,
    render_options: RenderOptions,
}

impl Extraction {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.pages, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.pages)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.pages, format)
    }

    /// Every table, in page order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.pages.iter().flat_map(|p| p.tables.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// In-memory source; pages listed in `failing` cannot be read.
    struct MemorySource {
        pages: BTreeMap<u32, PageContent>,
        failing: Vec<u32>,
    }

    impl PageSource for MemorySource {
        fn page_numbers(&self) -> Vec<u32> {
            let mut numbers: Vec<u32> = self.pages.keys().copied().collect();
            numbers.extend(&self.failing);
            numbers.sort();
            numbers
        }

        fn operations(&self, page: u32) -> Result<Vec<Operation>> {
            if self.failing.contains(&page) {
                return Err(Error::PdfParse(format!("page {} is corrupt", page)));
            }
            Ok(self.pages[&page].operations.clone())
        }

        fn text_fragments(&self, page: u32) -> Result<Vec<TextFragment>> {
            Ok(self.pages[&page].fragments.clone())
        }
    }

    fn boxed_cell(text: &str) -> PageContent {
        let rect = |x, y, width, height| PathOp::Rectangle {
            x,
            y,
            width,
            height,
        };
        PageContent {
            operations: vec![Operation::ConstructPath(vec![
                rect(0.0, 0.0, 1.0, 20.0),
                rect(40.0, 0.0, 1.0, 20.0),
                rect(0.0, 0.0, 40.0, 1.0),
                rect(0.0, 20.0, 40.0, 1.0),
            ])],
            fragments: vec![TextFragment::at(5.0, 5.0, text)],
        }
    }

    fn source() -> MemorySource {
        MemorySource {
            pages: BTreeMap::from([
                (1, boxed_cell("one")),
                (2, PageContent::default()),
                (4, boxed_cell("four")),
            ]),
            failing: vec![3],
        }
    }

    #[test]
    fn test_strict_mode_propagates() {
        let result = extract_tables_from_source(&source(), &ExtractOptions::default());
        assert!(matches!(result, Err(Error::PdfParse(_))));
    }

    #[test]
    fn test_lenient_mode_skips_page() {
        let pages = extract_tables_from_source(&source(), &ExtractOptions::new().lenient()).unwrap();
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 4]);
        assert!(pages[1].tables.is_empty());
        assert_eq!(pages[2].tables[0].text(0, 0), Some("four"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let options = ExtractOptions::new().lenient();
        let parallel = extract_tables_from_source(&source(), &options).unwrap();
        let sequential = extract_tables_from_source(&source(), &options.sequential()).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_page_selection() {
        let options = ExtractOptions::new().with_pages(PageSelection::Pages(vec![1, 4]));
        let pages = extract_tables_from_source(&source(), &options).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].tables[0].text(0, 0), Some("one"));
    }

    #[test]
    fn test_extract_bytes_rejects_non_pdf() {
        let result = extract_tables_from_bytes(b"hello", &ExtractOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_builder_options() {
        let grid = PdfGrid::new()
            .lenient()
            .sequential()
            .with_table_fallback(TableFallback::Html);
        assert_eq!(grid.extract_options.error_mode, ErrorMode::Lenient);
        assert!(!grid.extract_options.parallel);
        assert_eq!(grid.render_options.table_fallback, TableFallback::Html);
    }
}
