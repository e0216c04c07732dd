//! Rendering extracted tables to JSON, Markdown and plain text.

mod json;
mod markdown;
mod options;
mod text;

pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::{RenderOptions, TableFallback};
pub use text::to_text;
