use async_trait::async_trait;
use std::collections::HashMap;

use super::cache::DocumentId;
use super::error::ExtractionError;

/// Text of one rendered page together with its dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
    pub width: f32,
    pub height: f32,
}

/// Seam for the PDF text-extraction collaborator. Pages are numbered from 1.
#[async_trait]
pub trait PageTextSource: Send + Sync {
    async fn page_count(&self, document: &DocumentId) -> Result<u32, ExtractionError>;

    async fn page_text(
        &self,
        document: &DocumentId,
        page_number: u32,
    ) -> Result<PageText, ExtractionError>;

    /// All pages in order, joined with a space. Pages without text are skipped.
    async fn document_text(&self, document: &DocumentId) -> Result<String, ExtractionError> {
        let page_count = self.page_count(document).await?;
        let mut pages = Vec::new();

        for page_number in 1..=page_count {
            match self.page_text(document, page_number).await {
                Ok(page) => pages.push(page.text),
                Err(ExtractionError::NoText) => {
                    tracing::debug!(page_number, "Skipping page without text");
                }
                Err(e) => return Err(e),
            }
        }

        if pages.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(pages.join(" "))
    }
}

const DEFAULT_PAGE_WIDTH: f32 = 612.0;
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// In-memory page source, useful for documents whose text is already known
#[derive(Debug, Default)]
pub struct StaticPageTextSource {
    documents: HashMap<DocumentId, Vec<String>>,
}

impl StaticPageTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: DocumentId, pages: Vec<String>) -> Self {
        self.documents.insert(document, pages);
        self
    }

    fn pages(&self, document: &DocumentId) -> Result<&Vec<String>, ExtractionError> {
        self.documents
            .get(document)
            .ok_or_else(|| ExtractionError::Source(format!("Unknown document {}", document.as_str())))
    }
}

#[async_trait]
impl PageTextSource for StaticPageTextSource {
    async fn page_count(&self, document: &DocumentId) -> Result<u32, ExtractionError> {
        Ok(self.pages(document)?.len() as u32)
    }

    async fn page_text(
        &self,
        document: &DocumentId,
        page_number: u32,
    ) -> Result<PageText, ExtractionError> {
        let pages = self.pages(document)?;
        let page_count = pages.len() as u32;

        let text = page_number
            .checked_sub(1)
            .and_then(|index| pages.get(index as usize))
            .ok_or(ExtractionError::PageOutOfRange {
                page: page_number,
                page_count,
            })?;

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }

        Ok(PageText {
            page_number,
            text,
            width: DEFAULT_PAGE_WIDTH,
            height: DEFAULT_PAGE_HEIGHT,
        })
    }
}
