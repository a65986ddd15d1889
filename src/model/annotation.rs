//! Page annotation types.

use super::Rect;
use serde::{Deserialize, Serialize};

/// Annotation subtype, as named by the `/Subtype` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Highlight,
    Underline,
    StrikeOut,
    Squiggly,
    Text,
    Link,
    /// Any other subtype, kept verbatim
    Other(String),
}

impl AnnotationKind {
    /// Classify a raw `/Subtype` name.
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype {
            "Highlight" => AnnotationKind::Highlight,
            "Underline" => AnnotationKind::Underline,
            "StrikeOut" => AnnotationKind::StrikeOut,
            "Squiggly" => AnnotationKind::Squiggly,
            "Text" => AnnotationKind::Text,
            "Link" => AnnotationKind::Link,
            other => AnnotationKind::Other(other.to_string()),
        }
    }

    /// Text markup annotations are the ones that carry `/QuadPoints`.
    pub fn is_text_markup(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Highlight
                | AnnotationKind::Underline
                | AnnotationKind::StrikeOut
                | AnnotationKind::Squiggly
        )
    }
}

/// An annotation on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation subtype
    pub kind: AnnotationKind,

    /// Bounding rectangle (`/Rect`, top-left origin)
    pub rect: Rect,

    /// One rectangle per quadrilateral of `/QuadPoints` (top-left origin)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quads: Vec<Rect>,

    /// Free text from `/Contents`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl Annotation {
    /// Create an annotation without quad data.
    pub fn new(kind: AnnotationKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            quads: Vec::new(),
            contents: None,
        }
    }

    /// Attach quad rectangles.
    pub fn with_quads(mut self, quads: Vec<Rect>) -> Self {
        self.quads = quads;
        self
    }

    /// Attach `/Contents` text.
    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn is_highlight(&self) -> bool {
        self.kind == AnnotationKind::Highlight
    }

    /// Regions that select words for this annotation.
    ///
    /// Quad rectangles are preferred. When there are none, or all of them
    /// have zero area, the bounding rectangle is used instead.
    pub fn capture_rects(&self) -> Vec<Rect> {
        let quads: Vec<Rect> = self
            .quads
            .iter()
            .copied()
            .filter(|q| !q.is_degenerate())
            .collect();
        if quads.is_empty() {
            vec![self.rect]
        } else {
            quads
        }
    }
}
