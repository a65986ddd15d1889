//! Text labels for plots.
//!
//! Labels are shaped with rustybuzz against the first sans-serif system
//! font fontdb finds, and the glyph outlines are filled as tiny-skia paths.
//! Without a usable font, each character is drawn as a block glyph.

use once_cell::sync::Lazy;
use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::{Face, UnicodeBuffer};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Transform};

/// Em size of block glyphs, in text units.
const BLOCK_EM: f32 = 1000.0;
const BLOCK_ADVANCE: f32 = 600.0;
/// Baseline offset that centers a line of text on its anchor, in ems.
const CENTER_DROP: f32 = 0.35;

struct SystemFont {
    data: Vec<u8>,
    index: u32,
}

static SANS_SERIF: Lazy<Option<SystemFont>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..fontdb::Query::default()
    };
    let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
    let font = db.with_face_data(id, |data, index| SystemFont {
        data: data.to_vec(),
        index,
    });
    match &font {
        Some(_) => log::debug!("Plot labels use system font {:?}", id),
        None => log::debug!("No system font for plot labels, using block glyphs"),
    }
    font
});

/// Text direction on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Orientation {
    Horizontal,
    /// Rotated a quarter turn, reading bottom to top.
    Vertical,
}

/// Glyph outlines in text units: x along the baseline, y up.
struct TextRun {
    path: Option<Path>,
    advance: f32,
    units_per_em: f32,
}

/// Draw `text` centered on `center`, with an em size of `size` pixels.
pub(super) fn draw_label(
    pixmap: &mut Pixmap,
    text: &str,
    size: f32,
    center: (f32, f32),
    orientation: Orientation,
    paint: &Paint,
) {
    let text = text.trim();
    if text.is_empty() || size <= 0.0 {
        return;
    }
    let run = match SANS_SERIF.as_ref() {
        Some(font) => shape(font, text).unwrap_or_else(|| block_glyphs(text)),
        None => block_glyphs(text),
    };
    let Some(path) = &run.path else {
        return;
    };

    let scale = size / run.units_per_em;
    let half = run.advance * scale / 2.0;
    let drop = CENTER_DROP * size;
    let (cx, cy) = center;
    let transform = match orientation {
        Orientation::Horizontal => {
            Transform::from_row(scale, 0.0, 0.0, -scale, cx - half, cy + drop)
        }
        Orientation::Vertical => {
            Transform::from_row(0.0, -scale, -scale, 0.0, cx + drop, cy + half)
        }
    };
    pixmap.fill_path(path, paint, FillRule::Winding, transform, None);
}

fn shape(font: &SystemFont, text: &str) -> Option<TextRun> {
    let face = Face::from_slice(&font.data, font.index)?;
    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    let glyphs = rustybuzz::shape(&face, &[], buffer);

    let mut builder = PathBuilder::new();
    let mut pen = 0.0;
    for (info, pos) in glyphs.glyph_infos().iter().zip(glyphs.glyph_positions()) {
        let mut outline = GlyphOutline {
            builder: &mut builder,
            dx: pen + pos.x_offset as f32,
            dy: pos.y_offset as f32,
        };
        face.outline_glyph(GlyphId(info.glyph_id as u16), &mut outline);
        pen += pos.x_advance as f32;
    }

    Some(TextRun {
        path: builder.finish(),
        advance: pen,
        units_per_em: face.units_per_em() as f32,
    })
}

/// Block glyphs: tall for capitals and digits, short for lower case.
fn block_glyphs(text: &str) -> TextRun {
    let mut builder = PathBuilder::new();
    let mut pen = 0.0;
    for c in text.chars() {
        let height = if c.is_whitespace() {
            None
        } else if c.is_ascii_uppercase() || c.is_ascii_digit() {
            Some(700.0)
        } else if c.is_lowercase() {
            Some(500.0)
        } else {
            Some(600.0)
        };
        if let Some(rect) = height.and_then(|h| Rect::from_xywh(pen + 60.0, 0.0, 480.0, h)) {
            builder.push_rect(rect);
        }
        pen += BLOCK_ADVANCE;
    }
    TextRun {
        path: builder.finish(),
        advance: pen,
        units_per_em: BLOCK_EM,
    }
}

struct GlyphOutline<'a> {
    builder: &'a mut PathBuilder,
    dx: f32,
    dy: f32,
}

impl OutlineBuilder for GlyphOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x + self.dx, y + self.dy);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x + self.dx, y + self.dy);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(x1 + self.dx, y1 + self.dy, x + self.dx, y + self.dy);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 + self.dx,
            y1 + self.dy,
            x2 + self.dx,
            y2 + self.dy,
            x + self.dx,
            y + self.dy,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
