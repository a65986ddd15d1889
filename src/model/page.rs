//! Page-level types.

use super::{Annotation, Rect};
use serde::{Deserialize, Serialize};

/// A single page of a loaded report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Line-oriented plain text of the page
    pub text: String,

    /// Positioned words, used for highlight reconciliation
    #[serde(skip)]
    pub words: Vec<Word>,

    /// Annotations in `/Annots` order
    pub annotations: Vec<Annotation>,
}

impl Page {
    /// Create a new empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            text: String::new(),
            words: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Set the page text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add a positioned word.
    pub fn add_word(&mut self, word: Word) {
        self.words.push(word);
    }

    /// Add an annotation.
    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Highlight annotations on this page, in `/Annots` order.
    pub fn highlights(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(|a| a.is_highlight())
    }

    /// Check if the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Text lines of the page.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter(1)
    }
}

/// A word with its bounding box on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// Bounding box (top-left origin)
    pub rect: Rect,
    /// Literal text, never containing whitespace
    pub text: String,
}

impl Word {
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }

    /// Left edge.
    pub fn x(&self) -> f32 {
        self.rect.x0
    }

    /// Top edge.
    pub fn y(&self) -> f32 {
        self.rect.y0
    }
}
