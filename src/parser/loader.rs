//! Report loader using lopdf.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document as LopdfDocument, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Page};

use super::annots::extract_page_annotations;
use super::layout::{decode_text_simple, get_number, LayoutAnalyzer};
use super::options::{ErrorMode, LoadOptions};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Default page size (US Letter) when no MediaBox is found.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Read the PDF version from the file header.
///
/// Fails with [`Error::UnknownFormat`] when the data does not start with
/// `%PDF-`, and with [`Error::UnsupportedVersion`] when the version is not
/// of the `d.d` form.
pub fn sniff_version(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Loader for one report document.
///
/// The lopdf handle lives only as long as the loader. [`load`](Self::load)
/// consumes it, so the handle is released as soon as the model is built.
pub struct ReportLoader {
    doc: LopdfDocument,
    options: LoadOptions,
}

impl ReportLoader {
    /// Open a report file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, LoadOptions::default())
    }

    /// Open a report file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Open a report from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, LoadOptions::default())
    }

    /// Open a report from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: LoadOptions) -> Result<Self> {
        sniff_version(data)?;

        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        Ok(Self { doc, options })
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Build the document model and release the PDF handle.
    pub fn load(self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.extract_metadata();

        let page_ids = self.doc.get_pages();
        document.metadata.page_count = page_ids.len() as u32;

        let analyzer = LayoutAnalyzer::new(&self.doc).with_column_gap(self.options.column_gap);
        for (&page_num, &page_id) in page_ids.iter() {
            let page = self.load_page(&analyzer, page_num, page_id)?;
            document.add_page(page);
        }

        log::debug!(
            "Loaded {} pages, {} highlights",
            document.page_count(),
            document.highlight_count()
        );
        Ok(document)
    }

    fn load_page(
        &self,
        analyzer: &LayoutAnalyzer<'_>,
        page_num: u32,
        page_id: ObjectId,
    ) -> Result<Page> {
        let (width, height) = self.page_dimensions(page_id);
        let mut page = Page::new(page_num, width, height);

        match analyzer.extract_page_spans(page_id) {
            Ok(spans) => {
                page.text = analyzer.page_text(&spans);
                if self.options.extract_words {
                    page.words = spans.iter().flat_map(|s| s.words(height)).collect();
                }
            }
            Err(e) => {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(e);
                }
                log::warn!("Failed to extract text from page {}: {}", page_num, e);
            }
        }

        if self.options.extract_annotations {
            match extract_page_annotations(&self.doc, page_id, height) {
                Ok(annotations) => page.annotations = annotations,
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to read annotations on page {}: {}", page_num, e);
                }
            }
        }

        Ok(page)
    }

    /// Page size from the MediaBox, following `/Parent` inheritance.
    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        let mut current = self.doc.get_dictionary(page_id).ok();
        while let Some(dict) = current {
            if let Some(size) = media_box_size(dict) {
                return size;
            }
            current = dict
                .get(b"Parent")
                .and_then(|p| p.as_reference())
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }
        DEFAULT_PAGE_SIZE
    }

    /// Extract document metadata.
    fn extract_metadata(&self) -> Metadata {
        let mut metadata = Metadata::with_version(self.doc.version.to_string());

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .and_then(|info| info.as_reference())
            .and_then(|id| self.doc.get_dictionary(id));
        if let Ok(info_dict) = info {
            metadata.title = get_string_from_dict(info_dict, b"Title");
            metadata.author = get_string_from_dict(info_dict, b"Author");
            metadata.creator = get_string_from_dict(info_dict, b"Creator");
            metadata.producer = get_string_from_dict(info_dict, b"Producer");
        }

        metadata.encrypted = self.doc.is_encrypted();
        metadata
    }
}

fn media_box_size(dict: &Dictionary) -> Option<(f32, f32)> {
    let array = dict.get(b"MediaBox").ok()?.as_array().ok()?;
    let values: Vec<f32> = array.iter().filter_map(get_number).collect();
    match values[..] {
        [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
        _ => None,
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        lopdf::Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Where a report comes from: a file path or an in-memory buffer.
#[derive(Debug, Clone, Copy)]
pub enum ReportSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a Path> for ReportSource<'a> {
    fn from(path: &'a Path) -> Self {
        ReportSource::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ReportSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        ReportSource::Path(path.as_path())
    }
}

impl<'a> From<&'a str> for ReportSource<'a> {
    fn from(path: &'a str) -> Self {
        ReportSource::Path(Path::new(path))
    }
}

impl<'a> From<&'a [u8]> for ReportSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        ReportSource::Bytes(data)
    }
}

impl<'a> From<&'a Vec<u8>> for ReportSource<'a> {
    fn from(data: &'a Vec<u8>) -> Self {
        ReportSource::Bytes(data.as_slice())
    }
}

/// Load a report from either kind of source.
pub fn load_source(source: ReportSource<'_>, options: LoadOptions) -> Result<Document> {
    match source {
        ReportSource::Path(path) => load_file_with_options(path, options),
        ReportSource::Bytes(data) => load_bytes_with_options(data, options),
    }
}

/// Load a report file into a [`Document`].
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    ReportLoader::open(path)?.load()
}

/// Load a report file with custom options.
pub fn load_file_with_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Document> {
    ReportLoader::open_with_options(path, options)?.load()
}

/// Load a report from an in-memory buffer.
pub fn load_bytes(data: &[u8]) -> Result<Document> {
    ReportLoader::from_bytes(data)?.load()
}

/// Load a report from an in-memory buffer with custom options.
pub fn load_bytes_with_options(data: &[u8], options: LoadOptions) -> Result<Document> {
    ReportLoader::from_bytes_with_options(data, options)?.load()
}
