//! Document engine abstraction.
//!
//! The table pipeline only needs, per page, a drawing operation stream and
//! a list of positioned text fragments. [`PageSource`] is that boundary;
//! [`LopdfSource`] implements it over `lopdf`, keeping every concrete PDF
//! library type out of the pipeline.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::PdfHeader;
use crate::error::{Error, Result};
use crate::model::{Operation, TextFragment};

use super::content::{decode_text_simple, interpret, ContentOp, PageContent, PdfValue};

/// Supplier of per-page input streams.
///
/// Pages are 1-indexed. Implementations report failures to obtain a stream
/// as errors; the pipeline itself never fails.
pub trait PageSource {
    /// Page numbers available, ascending.
    fn page_numbers(&self) -> Vec<u32>;

    /// Drawing operations of `page`.
    fn operations(&self, page: u32) -> Result<Vec<Operation>>;

    /// Positioned text fragments of `page`.
    fn text_fragments(&self, page: u32) -> Result<Vec<TextFragment>>;

    /// Both streams of `page`. Sources that produce them together should
    /// override this to avoid doing the work twice.
    fn page_content(&self, page: u32) -> Result<PageContent> {
        Ok(PageContent {
            operations: self.operations(page)?,
            fragments: self.text_fragments(page)?,
        })
    }

    fn page_count(&self) -> u32 {
        self.page_numbers().len() as u32
    }
}

/// [`PageSource`] backed by `lopdf::Document`.
///
/// Only page content streams are read; form XObjects invoked with `Do` are
/// not expanded.
pub struct LopdfSource {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        PdfHeader::from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        PdfHeader::parse(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        log::debug!("LopdfSource: {} pages", pages.len());
        Self { doc, pages }
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Decompressed content stream bytes of a page, concatenating arrays of
    /// streams.
    fn raw_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            // a page without content draws nothing
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => self.stream_bytes(*r),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        content.extend_from_slice(&self.stream_bytes(*r)?);
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn stream_bytes(&self, id: ObjectId) -> Result<Vec<u8>> {
        match self.doc.get_object(id)? {
            Object::Stream(s) => s
                .decompressed_content()
                .or_else(|_| Ok(s.content.clone())),
            _ => Err(Error::PdfParse(format!(
                "Contents {} {} R is not a stream",
                id.0, id.1
            ))),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }
}

impl PageSource for LopdfSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn operations(&self, page: u32) -> Result<Vec<Operation>> {
        Ok(self.page_content(page)?.operations)
    }

    fn text_fragments(&self, page: u32) -> Result<Vec<TextFragment>> {
        Ok(self.page_content(page)?.fragments)
    }

    fn page_content(&self, page: u32) -> Result<PageContent> {
        let page_id = self.page_id(page)?;
        let ops = self.decode_content(&self.raw_content(page_id)?)?;

        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let decode = |font: &[u8], bytes: &[u8]| {
            fonts
                .get(font)
                .and_then(|dict| dict.get_font_encoding(&self.doc).ok())
                .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
                .unwrap_or_else(|| decode_text_simple(bytes))
        };

        let content = interpret(&ops, decode);
        log::debug!(
            "LopdfSource: page {}: {} operations, {} text fragments",
            page,
            content.operations.len(),
            content.fragments.len()
        );
        Ok(content)
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation as LopdfOp};
    use lopdf::{dictionary, Stream};

    /// One-page document whose content is `ops`.
    fn document(ops: Vec<LopdfOp>) -> LopdfDocument {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_page_content_from_document() {
        let source = LopdfSource::from_document(document(vec![
            LopdfOp::new("re", vec![10.into(), 10.into(), 1.into(), 50.into()]),
            LopdfOp::new("f", vec![]),
            LopdfOp::new("BT", vec![]),
            LopdfOp::new("Tf", vec!["F1".into(), 12.into()]),
            LopdfOp::new("Td", vec![20.into(), 30.into()]),
            LopdfOp::new("Tj", vec![Object::string_literal("Total")]),
            LopdfOp::new("ET", vec![]),
        ]));

        assert_eq!(source.page_numbers(), vec![1]);
        assert_eq!(source.page_count(), 1);

        let content = source.page_content(1).unwrap();
        assert_eq!(content.operations.len(), 1);
        assert_eq!(content.fragments.len(), 1);
        assert_eq!(content.fragments[0].text, "Total");
        assert_eq!(content.fragments[0].origin(), (20.0, 30.0));
    }

    #[test]
    fn test_page_out_of_range() {
        let source = LopdfSource::from_document(document(vec![]));
        assert!(matches!(
            source.operations(3),
            Err(Error::PageOutOfRange(3, 1))
        ));
    }

    #[test]
    fn test_load_bytes_rejects_non_pdf() {
        assert!(matches!(
            LopdfSource::load_bytes(b"plain text"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut doc = document(vec![LopdfOp::new(
            "re",
            vec![0.into(), 0.into(), 100.into(), 1.into()],
        )]);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let source = LopdfSource::load_bytes(&bytes).unwrap();
        assert_eq!(source.version(), "1.5");
        assert_eq!(source.operations(1).unwrap().len(), 1);
    }
}
