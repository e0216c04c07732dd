//! Rendering options.

/// Options for Markdown and text rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How to render tables containing merged cells
    pub table_fallback: TableFallback,

    /// Emit a `## Page N` heading before each page's tables
    pub page_headings: bool,

    /// Treat the first row of every table as a header row
    pub header_row: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table_fallback: TableFallback::Markdown,
            page_headings: true,
            header_row: true,
        }
    }
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.table_fallback = fallback;
        self
    }

    /// Enable or disable page headings.
    pub fn with_page_headings(mut self, include: bool) -> Self {
        self.page_headings = include;
        self
    }

    /// Enable or disable the header row.
    pub fn with_header_row(mut self, header: bool) -> Self {
        self.header_row = header;
        self
    }
}

/// How to render tables that can't be expressed in simple Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFallback {
    /// Pipe table; merged cells are left blank outside their canonical cell
    #[default]
    Markdown,
    /// HTML table with `rowspan`/`colspan` for tables with merged cells
    Html,
}

impl std::str::FromStr for TableFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(TableFallback::Markdown),
            "html" => Ok(TableFallback::Html),
            other => Err(format!("Unknown table fallback: {}", other)),
        }
    }
}
