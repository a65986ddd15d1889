//! Loading options and configuration.

/// Options for loading report documents.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Error handling mode for page-level failures
    pub error_mode: ErrorMode,

    /// Whether to build positioned words (needed for highlights)
    pub extract_words: bool,

    /// Whether to read page annotations
    pub extract_annotations: bool,

    /// Line split threshold, as a multiple of the font size
    pub column_gap: f32,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first page that cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable word extraction.
    pub fn with_words(mut self, extract: bool) -> Self {
        self.extract_words = extract;
        self
    }

    /// Enable or disable annotation extraction.
    pub fn with_annotations(mut self, extract: bool) -> Self {
        self.extract_annotations = extract;
        self
    }

    /// Text only: no words, no annotations.
    pub fn text_only(self) -> Self {
        self.with_words(false).with_annotations(false)
    }

    /// Set the column gap factor.
    pub fn with_column_gap(mut self, factor: f32) -> Self {
        self.column_gap = factor;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            extract_words: true,
            extract_annotations: true,
            column_gap: 2.0,
        }
    }
}

/// Error handling mode during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    Strict,
    /// Log the failure and keep an empty page
    #[default]
    Lenient,
}
