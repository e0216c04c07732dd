//! Markdown rendering for extracted tables.

use crate::error::Result;
use crate::model::{Cell, PageTables, Table};

use super::{RenderOptions, TableFallback};

/// Render every page's tables as Markdown.
pub fn to_markdown(pages: &[PageTables], options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    Ok(renderer.render(pages))
}

/// Markdown renderer for tables.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, pages: &[PageTables]) -> String {
        let mut output = String::new();

        for page in pages {
            if page.tables.is_empty() {
                continue;
            }
            if self.options.page_headings {
                output.push_str(&format!("## Page {}\n\n", page.page_number));
            }
            for table in &page.tables {
                self.render_table(&mut output, table);
            }
        }

        output.trim_end().to_string()
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        if table.is_empty() {
            return;
        }

        if table.has_merged_cells() && self.options.table_fallback == TableFallback::Html {
            self.render_table_html(output, table);
        } else {
            self.render_table_markdown(output, table);
        }
    }

    fn render_table_markdown(&self, output: &mut String, table: &Table) {
        let separator = format!("|{}\n", " --- |".repeat(table.column_count()));

        if !self.options.header_row {
            output.push('|');
            output.push_str(&"   |".repeat(table.column_count()));
            output.push('\n');
            output.push_str(&separator);
        }

        for (i, row) in table.cells.iter().enumerate() {
            output.push('|');
            for cell in row {
                let content = escape_markdown(cell.text().unwrap_or_default());
                output.push_str(&format!(" {} |", content.trim()));
            }
            output.push('\n');

            if i == 0 && self.options.header_row {
                output.push_str(&separator);
            }
        }

        output.push('\n');
    }

    fn render_table_html(&self, output: &mut String, table: &Table) {
        output.push_str("<table>\n");

        for (r, row) in table.cells.iter().enumerate() {
            let tag = if r == 0 && self.options.header_row {
                "th"
            } else {
                "td"
            };
            output.push_str("<tr>");

            for (c, cell) in row.iter().enumerate() {
                let Cell::Text(text) = cell else {
                    continue;
                };

                let mut attrs = String::new();
                if let Some(merge) = table.merge_at(r, c) {
                    if merge.height > 1 {
                        attrs.push_str(&format!(" rowspan=\"{}\"", merge.height));
                    }
                    if merge.width > 1 {
                        attrs.push_str(&format!(" colspan=\"{}\"", merge.width));
                    }
                }

                output.push_str(&format!("<{}{}>", tag, attrs));
                output.push_str(&escape_html(text.trim()));
                output.push_str(&format!("</{}>", tag));
            }

            output.push_str("</tr>\n");
        }

        output.push_str("</table>\n\n");
    }
}

/// Escape characters that would break a pipe table cell.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            '\n' | '\r' => result.push(' '),
            _ => result.push(c),
        }
    }
    result
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
