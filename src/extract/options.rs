//! Extraction options and configuration.

use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Error;

/// Options for table extraction.
///
/// The tolerances are in page units (points for PDF). The defaults suit
/// ordinary 72-dpi page coordinates; scale them together for coordinate
/// systems with a different unit size.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Edges thinner than this in one dimension are ruling lines; rulers
    /// closer than this are one ruler
    pub line_max_width: f32,

    /// Maximum gap between consecutive edges that still extends an interval
    pub gap_tolerance: f32,

    /// Proximity used when matching interval ends to ruler coordinates
    pub snap_tolerance: f32,

    /// Thickness given to a ruler segment when testing region overlap
    pub segment_thickness: f32,

    /// Direction in which page y coordinates grow
    pub y_axis: YAxis,

    /// Error handling mode for document-level extraction
    pub error_mode: ErrorMode,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Page selection (which pages to process)
    pub pages: PageSelection,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ruling line thickness threshold.
    pub fn with_line_max_width(mut self, width: f32) -> Self {
        self.line_max_width = width;
        self
    }

    /// Set the interval extension tolerance.
    pub fn with_gap_tolerance(mut self, tolerance: f32) -> Self {
        self.gap_tolerance = tolerance;
        self
    }

    /// Set the ruler coordinate matching tolerance.
    pub fn with_snap_tolerance(mut self, tolerance: f32) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    /// Set the segment thickness used in region detection.
    pub fn with_segment_thickness(mut self, thickness: f32) -> Self {
        self.segment_thickness = thickness;
        self
    }

    /// Set the y axis convention.
    pub fn with_y_axis(mut self, y_axis: YAxis) -> Self {
        self.y_axis = y_axis;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages whose streams cannot be read).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            line_max_width: 2.0,
            gap_tolerance: 5.0,
            snap_tolerance: 5.0,
            segment_thickness: 1.0,
            y_axis: YAxis::Up,
            error_mode: ErrorMode::Strict,
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Direction of increasing y in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YAxis {
    /// Origin at the bottom-left, y grows upward (PDF user space)
    #[default]
    Up,
    /// Origin at the top-left, y grows downward
    Down,
}

/// Error handling mode for document-level extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first page whose streams cannot be read
    #[default]
    Strict,
    /// Log and skip such pages
    Lenient,
}

/// Page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                if start > end {
                    return Err(format!("Range start {} exceeds end {}", start, end));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                for p in start..=end {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p: u32 = part.parse().map_err(|_| "Invalid page number")?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort();
        Ok(PageSelection::Pages(pages))
    }
}

impl FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(Error::InvalidPageRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .lenient()
            .with_line_max_width(3.0)
            .with_gap_tolerance(8.0)
            .with_y_axis(YAxis::Down)
            .sequential();

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.line_max_width, 3.0);
        assert_eq!(options.gap_tolerance, 8.0);
        assert_eq!(options.snap_tolerance, 5.0);
        assert_eq!(options.y_axis, YAxis::Down);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.line_max_width, 2.0);
        assert_eq!(options.gap_tolerance, 5.0);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.y_axis, YAxis::Up);
        assert!(options.parallel);
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("1,3,5-7,10").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7, 10])
        );
        assert!(PageSelection::parse("5-2").is_err());
        assert!(PageSelection::parse("one").is_err());
    }

    #[test]
    fn test_page_selection_from_str() {
        let pages: PageSelection = "2, 4".parse().unwrap();
        assert_eq!(pages, PageSelection::Pages(vec![2, 4]));
        assert!(matches!(
            "9-1".parse::<PageSelection>(),
            Err(Error::InvalidPageRange(_))
        ));
    }
}
