//! PDF input: obtaining drawing operations and text fragments per page.

mod backend;
mod content;

pub use backend::{LopdfSource, PageSource};
pub use content::{decode_text_simple, interpret, ContentOp, PageContent, PdfValue};
