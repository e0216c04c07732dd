//! Data model for table reconstruction.
//!
//! Input streams (operations, text fragments), intermediate geometry
//! (edges, rulers, boxes) and output tables. Everything is plain owned
//! data created per page and serializable with serde.

mod geometry;
mod operation;
mod table;

pub use geometry::{BBox, Edge, Interval, Matrix, Orientation, Ruler};
pub use operation::{Operation, PathOp, TextFragment};
pub use table::{Cell, CellPos, Merge, PageTables, Table};
