use mupdf::{Document, TextPageFlags};

use slidetopics_core::{ExtractError, PageText, PageTextExtractor, TextLine};

/// MuPDF-based implementation of [`PageTextExtractor`].
///
/// Kept in its own crate because `mupdf` is AGPL-3.0; `slidetopics-core`
/// only sees the trait.
///
/// Each text line is reported with the largest glyph size on it and its
/// top edge relative to the page's top edge.
#[derive(Debug, Clone, Default)]
pub struct MupdfExtractor {
    /// Stop after this many pages. `None` reads the whole document.
    max_pages: Option<usize>,
}

impl MupdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only read the first `limit` pages of each file. Pass `0` to disable.
    pub fn with_max_pages(mut self, limit: usize) -> Self {
        self.max_pages = if limit > 0 { Some(limit) } else { None };
        self
    }
}

impl PageTextExtractor for MupdfExtractor {
    fn extract_pages(&self, bytes: &[u8], filename: &str) -> Result<Vec<PageText>, ExtractError> {
        let document = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| ExtractError::Open(e.to_string()))?;

        let page_count = document
            .page_count()
            .map_err(|e| ExtractError::Extraction(e.to_string()))?;
        let page_count = usize::try_from(page_count).unwrap_or(0);
        let limit = self.max_pages.unwrap_or(page_count).min(page_count);
        if limit < page_count {
            tracing::warn!(filename, page_count, limit, "page budget reached, ignoring remaining pages");
        }

        let mut pages = Vec::with_capacity(limit);

        for page_result in document
            .pages()
            .map_err(|e| ExtractError::Extraction(e.to_string()))?
            .take(limit)
        {
            let page = page_result.map_err(|e| ExtractError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;

            let page_bounds = page
                .bounds()
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;
            let height = page_bounds.y1 - page_bounds.y0;

            let mut lines = Vec::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let mut text = String::new();
                    let mut font_size = 0.0_f32;
                    for c in line.chars() {
                        text.push(c.char().unwrap_or('\u{FFFD}'));
                        font_size = font_size.max(c.size());
                    }

                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    lines.push(TextLine::new(text, font_size, line.bounds().y0 - page_bounds.y0));
                }
            }
            pages.push(PageText { height, lines });
        }

        Ok(pages)
    }
}
