//! Decoded page input: drawing operations and positioned text fragments.
//!
//! These are the two streams a document engine hands to the pipeline.
//! Anything the pipeline does not understand is carried as
//! [`Operation::Unsupported`] / [`PathOp::Unsupported`] and skipped.

use serde::{Deserialize, Serialize};

use super::Matrix;

/// A single drawing operation from a page's operator list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// A complete path built from sub-operations.
    ConstructPath(Vec<PathOp>),
    /// Push the current transform.
    Save,
    /// Pop the most recently saved transform.
    Restore,
    /// Concatenate a matrix onto the current transform.
    Transform(Matrix),
    /// Set the stroke width for subsequent paths.
    SetLineWidth(f32),
    /// Any other operator (named for logging only).
    Unsupported(String),
}

/// A path construction sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    /// Curves, close-path and the like.
    Unsupported,
}

/// A run of text placed on the page by its transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Text-space to page-space transform.
    pub transform: Matrix,
    /// Literal text content.
    pub text: String,
}

impl TextFragment {
    pub fn new(transform: Matrix, text: impl Into<String>) -> Self {
        Self {
            transform,
            text: text.into(),
        }
    }

    /// Fragment with an unscaled transform placed at `(x, y)`.
    pub fn at(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self::new(Matrix::translate(x, y), text)
    }

    /// Placement point in page coordinates.
    pub fn origin(&self) -> (f32, f32) {
        self.transform.translation()
    }
}
