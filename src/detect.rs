//! PDF header sniffing.
//!
//! Rejects non-PDF input before it reaches the document parser, so callers
//! get [`Error::UnknownFormat`] instead of an opaque parse failure.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept a header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Parsed `%PDF-x.y` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Version string, e.g. "1.7"
    pub version: String,
    /// Byte offset of the `%PDF-` marker
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

impl PdfHeader {
    /// Locate and validate the header in the leading bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let window = &data[..data.len().min(HEADER_WINDOW)];
        let offset = window
            .windows(PDF_MAGIC.len())
            .position(|w| w == PDF_MAGIC)
            .ok_or(Error::UnknownFormat)?;

        let rest = &window[offset + PDF_MAGIC.len()..];
        let version: String = rest
            .iter()
            .take_while(|b| b.is_ascii_digit() || **b == b'.')
            .map(|&b| b as char)
            .collect();

        match version.split_once('.') {
            Some(("1", minor)) | Some(("2", minor))
                if minor.len() == 1 && minor.bytes().all(|b| b.is_ascii_digit()) =>
            {
                Ok(Self { version, offset })
            }
            _ if version.is_empty() => Err(Error::UnknownFormat),
            _ => Err(Error::UnsupportedVersion(version)),
        }
    }

    /// Read the header of the file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut buf = Vec::with_capacity(HEADER_WINDOW);
        File::open(path)?
            .take(HEADER_WINDOW as u64)
            .read_to_end(&mut buf)?;
        Self::parse(&buf)
    }
}

/// Whether `path` looks like a PDF file.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    PdfHeader::from_path(path).is_ok()
}

/// Whether `data` starts like a PDF file.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    PdfHeader::parse(data).is_ok()
}
