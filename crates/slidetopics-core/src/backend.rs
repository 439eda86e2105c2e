use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to open PDF: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extraction(String),
}

/// One visual line of text on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Largest glyph size on the line.
    pub font_size: f32,
    /// Top edge of the line, measured down from the top of the page.
    pub y: f32,
}

impl TextLine {
    pub fn new(text: impl Into<String>, font_size: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            y,
        }
    }
}

/// The text lines of a single page plus the page height they are laid out in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    pub height: f32,
    pub lines: Vec<TextLine>,
}

/// Trait for page text extraction backends.
///
/// Implementors turn raw document bytes into per-page lines with font size
/// and vertical position; everything downstream (heading selection,
/// filtering, clustering) lives in this crate.
pub trait PageTextExtractor: Send + Sync {
    /// Decode `bytes` and return every page in order.
    fn extract_pages(&self, bytes: &[u8], filename: &str) -> Result<Vec<PageText>, ExtractError>;
}
