//! Positioned text extraction for report pages.
//!
//! Content streams are walked operator by operator to recover text spans
//! with their baseline position and font size. Spans are then grouped into
//! baseline lines, and each line is cut into segments wherever a wide
//! horizontal gap separates two spans. Instrument reports lay out their
//! tables as widely spaced cells, so one cell ends up on one text line.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Rect, Word};

/// Average glyph advance as a fraction of the font size, for fonts
/// without a `/Widths` array.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Glyph advances of a simple font, from `/FirstChar` and `/Widths`.
#[derive(Debug, Clone)]
struct FontWidths {
    first_char: u32,
    /// Advances in thousandths of the font size
    widths: Vec<f32>,
    /// Advance for codes outside the array
    missing: f32,
}

impl FontWidths {
    fn from_font(doc: &LopdfDocument, font: &Dictionary) -> Option<Self> {
        let first_char = resolve(doc, font.get(b"FirstChar").ok()?).and_then(get_number)?;
        let widths: Vec<f32> = resolve(doc, font.get(b"Widths").ok()?)?
            .as_array()
            .ok()?
            .iter()
            .map(|o| resolve(doc, o).and_then(get_number).unwrap_or(0.0))
            .collect();
        if widths.is_empty() {
            return None;
        }
        let missing = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|d| resolve(doc, d))
            .and_then(|d| d.as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(|w| resolve(doc, w))
            .and_then(get_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(AVG_CHAR_WIDTH * 1000.0);

        Some(Self {
            first_char: first_char.max(0.0) as u32,
            widths,
            missing,
        })
    }

    /// Advance of one character code, as a fraction of the font size.
    fn advance(&self, code: u8) -> f32 {
        let width = (code as u32)
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.missing);
        width / 1000.0
    }
}

/// Per-character advances of decoded text, as fractions of the font size.
///
/// Widths are looked up by byte code when every byte decoded to one
/// character. Otherwise the byte advances are spread evenly.
fn glyph_ems(text: &str, bytes: &[u8], widths: Option<&FontWidths>) -> Vec<f32> {
    let count = text.chars().count();
    match widths {
        Some(w) if bytes.len() == count => bytes.iter().map(|b| w.advance(*b)).collect(),
        Some(w) if count > 0 => {
            let total: f32 = bytes.iter().map(|b| w.advance(*b)).sum();
            vec![total / count as f32; count]
        }
        _ => vec![AVG_CHAR_WIDTH; count],
    }
}

/// A text span with position information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, PDF user space)
    pub y: f32,
    /// Width of the text, from glyph widths or an estimate
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Per-character advances in points, when the font has glyph widths
    pub advances: Option<Vec<f32>>,
}

impl TextSpan {
    /// Create a new text span. The width is estimated from the font size.
    pub fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        let width = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            advances: None,
        }
    }

    /// Create a text span from per-character advances in points.
    ///
    /// Falls back to the estimate of [`TextSpan::new`] when the advances do
    /// not match the characters one to one.
    pub fn with_advances(text: String, x: f32, y: f32, font_size: f32, advances: Vec<f32>) -> Self {
        if advances.len() != text.chars().count() {
            return Self::new(text, x, y, font_size);
        }
        Self {
            text,
            x,
            y,
            width: advances.iter().sum(),
            font_size,
            advances: Some(advances),
        }
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    /// Split the span into whitespace-free words with top-left-origin boxes.
    ///
    /// Word edges follow the glyph advances when the span has them, and
    /// an even split of the span width otherwise.
    pub fn words(&self, page_height: f32) -> Vec<Word> {
        let char_count = self.text.chars().count();
        if char_count == 0 {
            return Vec::new();
        }
        let edges = self.char_edges(char_count);

        let mut words = Vec::new();
        let mut start: Option<(usize, String)> = None;
        for (i, c) in self.text.chars().enumerate() {
            if c.is_whitespace() {
                if let Some((begin, text)) = start.take() {
                    words.push(self.word_at(begin, i, text, &edges, page_height));
                }
            } else {
                match start.as_mut() {
                    Some((_, text)) => text.push(c),
                    None => start = Some((i, c.to_string())),
                }
            }
        }
        if let Some((begin, text)) = start {
            words.push(self.word_at(begin, char_count, text, &edges, page_height));
        }
        words
    }

    /// Offsets of the character boundaries from the span start.
    fn char_edges(&self, char_count: usize) -> Vec<f32> {
        match &self.advances {
            Some(advances) if advances.len() == char_count => std::iter::once(0.0)
                .chain(advances.iter().scan(0.0, |pen, a| {
                    *pen += a;
                    Some(*pen)
                }))
                .collect(),
            _ => {
                let char_width = self.width / char_count as f32;
                (0..=char_count).map(|i| i as f32 * char_width).collect()
            }
        }
    }

    fn word_at(
        &self,
        begin: usize,
        end: usize,
        text: String,
        edges: &[f32],
        page_height: f32,
    ) -> Word {
        let x0 = self.x + edges[begin];
        let x1 = self.x + edges[end];
        let rect = Rect::new(x0, self.bottom(), x1, self.top()).flip_vertical(page_height);
        Word::new(rect, text)
    }
}

/// A text line composed of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text of all spans with gap-based spacing.
    pub fn text(&self) -> String {
        join_spans(&self.spans)
    }

    /// Split the line at horizontal gaps wider than `gap_factor` times the
    /// line's font size and return the text of each segment.
    pub fn segments(&self, gap_factor: f32) -> Vec<String> {
        let threshold = self.font_size * gap_factor;
        let mut segments = Vec::new();
        let mut start = 0;
        for i in 1..self.spans.len() {
            let gap = self.spans[i].x - self.spans[i - 1].right();
            if gap > threshold {
                segments.push(join_spans(&self.spans[start..i]));
                start = i;
            }
        }
        if start < self.spans.len() {
            segments.push(join_spans(&self.spans[start..]));
        }
        segments
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Join adjacent spans, inserting a space where a visible gap separates them.
fn join_spans(spans: &[TextSpan]) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i == 0 {
            result.push_str(&span.text);
            continue;
        }

        let prev_span = &spans[i - 1];
        let gap = span.x - prev_span.right();

        let char_count = span.text.chars().count();
        let avg_char_width = if char_count > 0 && span.width > 0.0 {
            span.width / char_count as f32
        } else {
            span.font_size * AVG_CHAR_WIDTH
        };

        // A gap over 20% of a character width reads as a space
        let space_threshold = avg_char_width * 0.2;

        let prev_last_char = prev_span.text.chars().last();
        let curr_first_char = span.text.chars().next();

        let should_insert_space = gap > space_threshold
            && !(prev_last_char.map(is_spaceless_script_char).unwrap_or(false)
                && curr_first_char.map(is_spaceless_script_char).unwrap_or(false));

        let prev_ends_with_space =
            prev_span.text.ends_with(' ') || prev_span.text.ends_with('\u{00A0}');
        let curr_starts_with_space =
            span.text.starts_with(' ') || span.text.starts_with('\u{00A0}');

        if should_insert_space && !prev_ends_with_space && !curr_starts_with_space {
            result.push(' ');
        }

        result.push_str(&span.text);
    }

    result
}

/// Positioned text extractor for the pages of one lopdf document.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
    /// Line split threshold, as a multiple of the font size
    column_gap: f32,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self {
            doc,
            column_gap: 2.0,
        }
    }

    /// Set the column gap factor used to split lines into segments.
    pub fn with_column_gap(mut self, factor: f32) -> Self {
        self.column_gap = factor;
        self
    }

    /// Extract text spans from a page with position and font information.
    /// Uses lopdf's font encoding support for proper text decoding.
    pub fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::TextExtract(e.to_string()))?;

        let content = self.get_page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let widths: BTreeMap<Vec<u8>, FontWidths> = lopdf_fonts
            .iter()
            .filter_map(|(name, font)| {
                FontWidths::from_font(self.doc, font).map(|w| (name.clone(), w))
            })
            .collect();
        self.parse_content_stream(&content, &lopdf_fonts, &widths)
    }

    /// Build the line-oriented page text from spans.
    pub fn page_text(&self, spans: &[TextSpan]) -> String {
        let lines = group_spans_into_lines(spans.to_vec());
        log::debug!("Grouped {} spans into {} lines", spans.len(), lines.len());
        lines
            .iter()
            .flat_map(|line| line.segments(self.column_gap))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get page content stream.
    fn get_page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content streams is blank
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return Ok(stream_data(s));
                }
                Err(Error::TextExtract("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            content.extend_from_slice(&stream_data(s));
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::TextExtract("Invalid content stream".to_string())),
        }
    }

    /// Walk the content stream and collect text spans.
    fn parse_content_stream(
        &self,
        content: &[u8],
        lopdf_fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        widths: &BTreeMap<Vec<u8>, FontWidths>,
    ) -> Result<Vec<TextSpan>> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::TextExtract(e.to_string()))?;

        let mut spans = Vec::new();
        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix.reset();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        text_matrix.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text_matrix.leading = -ty;
                        }
                        text_matrix.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => {
                    text_matrix.next_line();
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        text_matrix.next_line();
                    }
                    if !in_text_block {
                        continue;
                    }

                    let encoding = lopdf_fonts
                        .get(&current_font_name)
                        .and_then(|f| f.get_font_encoding(self.doc).ok());
                    let decode = |bytes: &[u8]| match &encoding {
                        Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
                        None => decode_text_simple(bytes),
                    };

                    let font_widths = widths.get(&current_font_name);
                    let show = |bytes: &[u8]| {
                        let text = decode(bytes);
                        let ems = glyph_ems(&text, bytes, font_widths);
                        (text, ems)
                    };

                    let (text, ems) = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(arr)) => decode_tj_array(arr, &show),
                            _ => (String::new(), Vec::new()),
                        },
                        "\"" => match op.operands.get(2) {
                            Some(Object::String(bytes, _)) => show(bytes),
                            _ => (String::new(), Vec::new()),
                        },
                        _ => match op.operands.first() {
                            Some(Object::String(bytes, _)) => show(bytes),
                            _ => (String::new(), Vec::new()),
                        },
                    };

                    if text.is_empty() {
                        continue;
                    }
                    let advance = ems.iter().sum::<f32>() * current_font_size;
                    if !text.trim().is_empty() {
                        let (x, y) = text_matrix.get_position();
                        let effective_size = current_font_size * text_matrix.get_scale();
                        let advances = ems.iter().map(|em| em * effective_size).collect();
                        spans.push(TextSpan::with_advances(text, x, y, effective_size, advances));
                    }
                    text_matrix.advance(advance);
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

/// Stream bytes, decoded when the stream carries a filter.
fn stream_data(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Decode a `TJ` array into text and per-character advances in ems.
///
/// Large negative adjustments read as word spaces and become the advance of
/// the inserted space. Smaller ones widen the preceding character.
fn decode_tj_array(
    arr: &[Object],
    show: impl Fn(&[u8]) -> (String, Vec<f32>),
) -> (String, Vec<f32>) {
    // 200 thousandths of the font size is a typical inter-word advance
    let space_threshold = 200.0;
    let mut combined = String::new();
    let mut ems: Vec<f32> = Vec::new();

    for item in arr {
        let adjustment = match item {
            Object::String(bytes, _) => {
                let (text, advances) = show(bytes);
                combined.push_str(&text);
                ems.extend(advances);
                continue;
            }
            Object::Integer(n) => -(*n as f32),
            Object::Real(n) => -n,
            _ => continue,
        };
        let shift = adjustment / 1000.0;
        let breaks_word = adjustment > space_threshold
            && !combined.ends_with(' ')
            && !combined.ends_with('\u{00A0}')
            && combined
                .chars()
                .last()
                .is_some_and(|c| !is_spaceless_script_char(c));
        if breaks_word {
            combined.push(' ');
            ems.push(shift);
        } else if let Some(last) = ems.last_mut() {
            *last += shift;
        }
    }
    (combined, ems)
}

/// Y-based line grouping, top of the page first.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // PDF Y grows upward, so sort by Y descending then X
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current_line_spans.push(span),
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.y);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    /// Start of the current line (Tlm), as (e, f)
    line_start: (f32, f32),
    /// Text leading (TL)
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_start: (0.0, 0.0),
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    /// Reset the matrices at `BT`. Leading persists across text objects.
    fn reset(&mut self) {
        *self = Self {
            leading: self.leading,
            ..Self::default()
        };
    }

    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_start = (e, f);
    }

    /// Move to the start of the next line, offset from the current line start.
    fn move_line(&mut self, tx: f32, ty: f32) {
        let (e, f) = self.line_start;
        self.e = e + tx * self.a + ty * self.c;
        self.f = f + tx * self.b + ty * self.d;
        self.line_start = (self.e, self.f);
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Advance along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn get_position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn get_scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Follow one level of indirection.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Helper to extract number from PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 10.0)
    }

    #[test]
    fn test_span_width_estimate() {
        let s = span("abcd", 0.0, 0.0);
        assert_eq!(s.width, 20.0);
        assert_eq!(s.right(), 20.0);
    }

    #[test]
    fn test_group_spans_into_lines_top_first() {
        let lines = group_spans_into_lines(vec![
            span("second", 72.0, 680.0),
            span("first", 72.0, 700.0),
            span("tail", 150.0, 701.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "first tail");
        assert_eq!(lines[1].text(), "second");
    }

    #[test]
    fn test_segments_split_wide_gaps() {
        let line = TextLine::from_spans(vec![
            span("0.0512", 72.0, 500.0),
            span("120.31", 200.0, 500.0),
            span("0.4562", 320.0, 500.0),
        ]);
        assert_eq!(line.segments(2.0), vec!["0.0512", "120.31", "0.4562"]);
    }

    #[test]
    fn test_segments_keep_close_spans_together() {
        // "Operator:" ends at 72 + 9 * 5 = 117
        let line = TextLine::from_spans(vec![
            span("Operator:", 72.0, 500.0),
            span("Jane Doe", 121.0, 500.0),
        ]);
        assert_eq!(line.segments(2.0), vec!["Operator: Jane Doe"]);
    }

    #[test]
    fn test_span_words_positions() {
        let s = span("Slope = 2.5", 100.0, 700.0);
        let words = s.words(792.0);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Slope", "=", "2.5"]);

        // Top-left origin: baseline 700 with 8pt ascent puts the top at 84
        assert!((words[0].rect.y0 - 84.0).abs() < 1e-3);
        assert!((words[0].rect.x0 - 100.0).abs() < 1e-3);
        assert!((words[0].rect.x1 - 125.0).abs() < 1e-3);
        assert!((words[1].rect.x0 - 130.0).abs() < 1e-3);
    }

    #[test]
    fn test_text_matrix_lines() {
        let mut tm = TextMatrix::default();
        tm.move_line(72.0, 700.0);
        tm.advance(30.0);
        assert_eq!(tm.get_position(), (102.0, 700.0));
        tm.leading = 14.0;
        tm.next_line();
        assert_eq!(tm.get_position(), (72.0, 686.0));
    }

    #[test]
    fn test_decode_tj_array_spacing() {
        let arr = vec![
            Object::string_literal("Surface"),
            Object::Integer(-250),
            Object::string_literal("Area"),
            Object::Integer(-20),
            Object::string_literal("="),
        ];
        let show = |bytes: &[u8]| {
            let text = decode_text_simple(bytes);
            let ems = glyph_ems(&text, bytes, None);
            (text, ems)
        };
        let (text, ems) = decode_tj_array(&arr, show);
        assert_eq!(text, "Surface Area=");
        assert_eq!(ems.len(), text.chars().count());
        // The inserted space carries the adjustment, a small kern widens "a"
        assert!((ems[7] - 0.25).abs() < 1e-6);
        assert!((ems[11] - 0.52).abs() < 1e-6);
    }

    fn widths_font() -> Dictionary {
        let mut widths = vec![Object::Integer(500); 96];
        widths[0] = Object::Integer(250);
        widths[(b'W' - 32) as usize] = Object::Integer(1000);
        widths[(b'i' - 32) as usize] = Object::Integer(250);
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FirstChar" => 32,
            "Widths" => widths,
        }
    }

    #[test]
    fn test_font_widths_lookup() {
        let doc = LopdfDocument::with_version("1.5");
        let metrics = FontWidths::from_font(&doc, &widths_font()).unwrap();
        assert_eq!(metrics.advance(b'W'), 1.0);
        assert_eq!(metrics.advance(b'i'), 0.25);
        // Outside the array
        assert_eq!(metrics.advance(200), 0.5);
        assert_eq!(metrics.advance(10), 0.5);

        let ems = glyph_ems("WW ii", b"WW ii", Some(&metrics));
        assert_eq!(ems, vec![1.0, 1.0, 0.25, 0.25, 0.25]);
        assert!(FontWidths::from_font(&doc, &dictionary! { "Subtype" => "Type1" }).is_none());
    }

    #[test]
    fn test_span_words_follow_glyph_widths() {
        let advances = vec![10.0, 10.0, 2.5, 2.5, 2.5];
        let s = TextSpan::with_advances("WW ii".to_string(), 100.0, 700.0, 10.0, advances);
        assert!((s.width - 27.5).abs() < 1e-3);

        let words = s.words(792.0);
        assert_eq!(words.len(), 2);
        assert!((words[0].rect.x1 - 120.0).abs() < 1e-3);
        assert!((words[1].rect.x0 - 122.5).abs() < 1e-3);
        assert!((words[1].rect.x1 - 127.5).abs() < 1e-3);
    }

    #[test]
    fn test_mismatched_advances_fall_back_to_estimate() {
        let s = TextSpan::with_advances("abcd".to_string(), 0.0, 0.0, 10.0, vec![1.0]);
        assert!(s.advances.is_none());
        assert_eq!(s.width, 20.0);
    }

    #[test]
    fn test_page_spans_use_font_widths() {
        let mut doc = LopdfDocument::with_version("1.5");
        let font_id = doc.add_object(widths_font());
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("WW ii")]),
                Operation::new("Tj", vec![Object::string_literal("W")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let spans = LayoutAnalyzer::new(&doc).extract_page_spans(page_id).unwrap();
        assert_eq!(spans.len(), 2);
        assert!((spans[0].width - 27.5).abs() < 1e-3);
        // The second show starts where the glyph widths of the first end
        assert!((spans[1].x - 127.5).abs() < 1e-3);
        assert!((spans[1].width - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Operator"), "Operator");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0xB2]), "\u{b2}");
    }
}
