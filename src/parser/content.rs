//! Content stream interpretation.
//!
//! Turns decoded content stream operators into the two inputs the table
//! pipeline consumes: drawing [`Operation`]s and positioned
//! [`TextFragment`]s. Only the operators that matter for ruling lines and
//! text placement are understood; everything else passes through as
//! [`Operation::Unsupported`] or is dropped.

use crate::model::{Matrix, Operation, PathOp, TextFragment};

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    fn number(&self, i: usize) -> Option<f32> {
        self.operands.get(i).and_then(PdfValue::as_number)
    }

    fn numbers<const N: usize>(&self) -> Option<[f32; N]> {
        if self.operands.len() < N {
            return None;
        }
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.number(i)?;
        }
        Some(out)
    }
}

/// Both input streams of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub operations: Vec<Operation>,
    pub fragments: Vec<TextFragment>,
}

/// TJ adjustments beyond this (thousandths of an em) read as a word gap.
const WORD_GAP: f32 = 200.0;

/// Interpret `ops`, decoding shown strings with `decode(font, bytes)`.
pub fn interpret<F>(ops: &[ContentOp], decode: F) -> PageContent
where
    F: Fn(&[u8], &[u8]) -> String,
{
    let mut state = Interpreter::new(decode);
    for op in ops {
        state.step(op);
    }
    state.flush_path();
    state.out
}

struct Interpreter<F> {
    decode: F,
    out: PageContent,
    path: Vec<PathOp>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text: TextState,
}

/// Text object state: matrices, font and leading.
#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            in_text: false,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.multiply(&Matrix::translate(tx, ty));
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }
}

impl<F> Interpreter<F>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    fn new(decode: F) -> Self {
        Self {
            decode,
            out: PageContent::default(),
            path: Vec::new(),
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text: TextState::default(),
        }
    }

    fn emit(&mut self, op: Operation) {
        self.flush_path();
        self.out.operations.push(op);
    }

    fn flush_path(&mut self) {
        if !self.path.is_empty() {
            let path = std::mem::take(&mut self.path);
            self.out.operations.push(Operation::ConstructPath(path));
        }
    }

    fn step(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            // graphics state
            "q" => {
                self.ctm_stack.push(self.ctm);
                self.emit(Operation::Save);
            }
            "Q" => {
                if let Some(m) = self.ctm_stack.pop() {
                    self.ctm = m;
                }
                self.emit(Operation::Restore);
            }
            "cm" => {
                if let Some(m) = op.numbers::<6>() {
                    let m = Matrix::from(m);
                    self.ctm = self.ctm.multiply(&m);
                    self.emit(Operation::Transform(m));
                }
            }
            "w" => {
                if let Some(w) = op.number(0) {
                    self.emit(Operation::SetLineWidth(w));
                }
            }

            // path construction
            "m" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    self.path.push(PathOp::MoveTo { x, y });
                }
            }
            "l" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    self.path.push(PathOp::LineTo { x, y });
                }
            }
            "re" => {
                if let Some([x, y, width, height]) = op.numbers::<4>() {
                    self.path.push(PathOp::Rectangle {
                        x,
                        y,
                        width,
                        height,
                    });
                }
            }
            "c" | "v" | "y" | "h" => self.path.push(PathOp::Unsupported),

            // painting and clipping end the path
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n" | "W" | "W*" => {
                self.flush_path();
            }

            // text objects
            "BT" => {
                self.text.in_text = true;
                self.text.matrix = Matrix::IDENTITY;
                self.text.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.text.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.text.font = name.clone();
                }
                if let Some(size) = op.number(1) {
                    self.text.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    self.text.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.text.leading = -ty;
                    self.text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.text.line_matrix = Matrix::from(m);
                    self.text.matrix = self.text.line_matrix;
                }
            }
            "T*" => self.text.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = (self.decode)(&self.text.font, bytes);
                    self.show(text);
                }
            }
            "'" => {
                self.text.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = (self.decode)(&self.text.font, bytes);
                    self.show(text);
                }
            }
            "\"" => {
                self.text.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    let text = (self.decode)(&self.text.font, bytes);
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let text = self.decode_array(items);
                    self.show(text);
                }
            }

            other => {
                if !self.text.in_text {
                    self.emit(Operation::Unsupported(other.to_string()));
                }
            }
        }
    }

    fn decode_array(&self, items: &[PdfValue]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&(self.decode)(&self.text.font, bytes)),
                other => {
                    let gap = other.as_number().map_or(0.0, |n| -n);
                    if gap > WORD_GAP && !combined.is_empty() && !combined.ends_with(' ') {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn show(&mut self, text: String) {
        if !self.text.in_text || text.is_empty() {
            return;
        }
        let size = self.text.font_size;
        let transform = self
            .ctm
            .multiply(&self.text.matrix.multiply(&Matrix::scale(size, size)));
        self.out.fragments.push(TextFragment::new(transform, text));
    }
}

/// Fallback string decoding when no font encoding is available: UTF-16BE
/// with BOM, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: &[f32]) -> ContentOp {
        ContentOp::new(operator, operands.iter().map(|&n| PdfValue::Real(n)).collect())
    }

    fn text_op(operator: &str, s: &str) -> ContentOp {
        ContentOp::new(operator, vec![PdfValue::Str(s.as_bytes().to_vec())])
    }

    fn run(ops: &[ContentOp]) -> PageContent {
        interpret(ops, |_, bytes| decode_text_simple(bytes))
    }

    #[test]
    fn test_path_flushed_on_paint() {
        let content = run(&[
            op("w", &[0.5]),
            op("re", &[0.0, 0.0, 1.0, 20.0]),
            op("m", &[0.0, 0.0]),
            op("l", &[20.0, 0.0]),
            op("S", &[]),
        ]);

        assert_eq!(
            content.operations,
            vec![
                Operation::SetLineWidth(0.5),
                Operation::ConstructPath(vec![
                    PathOp::Rectangle {
                        x: 0.0,
                        y: 0.0,
                        width: 1.0,
                        height: 20.0
                    },
                    PathOp::MoveTo { x: 0.0, y: 0.0 },
                    PathOp::LineTo { x: 20.0, y: 0.0 },
                ]),
            ]
        );
    }

    #[test]
    fn test_graphics_state_ops() {
        let content = run(&[
            op("q", &[]),
            op("cm", &[1.0, 0.0, 0.0, 1.0, 5.0, 5.0]),
            op("c", &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]),
            op("f", &[]),
            op("Q", &[]),
            ContentOp::new("Do", vec![PdfValue::Name(b"Im0".to_vec())]),
        ]);

        assert_eq!(
            content.operations,
            vec![
                Operation::Save,
                Operation::Transform(Matrix::translate(5.0, 5.0)),
                Operation::ConstructPath(vec![PathOp::Unsupported]),
                Operation::Restore,
                Operation::Unsupported("Do".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_positioning() {
        let content = run(&[
            op("cm", &[1.0, 0.0, 0.0, 1.0, 0.0, 100.0]),
            op("BT", &[]),
            ContentOp::new("Tf", vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(10)]),
            op("Td", &[50.0, 20.0]),
            text_op("Tj", "first"),
            op("TL", &[12.0]),
            text_op("'", "second"),
            op("Tm", &[1.0, 0.0, 0.0, 1.0, 300.0, 400.0]),
            text_op("Tj", "third"),
            op("ET", &[]),
        ]);

        let placed: Vec<_> = content
            .fragments
            .iter()
            .map(|f| (f.text.as_str(), f.origin()))
            .collect();
        assert_eq!(
            placed,
            vec![
                ("first", (50.0, 120.0)),
                ("second", (50.0, 108.0)),
                ("third", (300.0, 500.0)),
            ]
        );
        assert_eq!(content.fragments[0].transform.a, 10.0);
    }

    #[test]
    fn test_tj_array_word_gaps() {
        let content = run(&[
            op("BT", &[]),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"Un".to_vec()),
                    PdfValue::Integer(-20),
                    PdfValue::Str(b"it".to_vec()),
                    PdfValue::Integer(-250),
                    PdfValue::Str(b"price".to_vec()),
                ])],
            ),
            op("ET", &[]),
        ]);

        assert_eq!(content.fragments[0].text, "Unit price");
    }

    #[test]
    fn test_text_outside_bt_ignored() {
        let content = run(&[text_op("Tj", "stray"), op("BT", &[]), text_op("Tj", ""), op("ET", &[])]);
        assert!(content.fragments.is_empty());
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
