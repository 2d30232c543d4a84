use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::CommediaError;
use crate::parser::lines::clean_line;

/// Page separator emitted by both `pdf-extract` and `pdftotext`.
const FORM_FEED: char = '\x0C';

/// One page of extracted text; `number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<String>,
}

/// Load every page of a PDF, or of a form-feed separated text dump.
pub fn load_pages(path: &Path) -> Result<Vec<Page>> {
    let text = if is_pdf(path) {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        pdf_extract::extract_text_from_mem(&bytes)
            .with_context(|| format!("Failed to extract text from {:?}", path))?
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?
    };
    let pages = split_pages(&text);
    info!("Loaded {} pages from {:?}", pages.len(), path);
    Ok(pages)
}

/// Pages `start..=end` (1-based), rejecting ranges outside the document.
pub fn page_range(pages: Vec<Page>, start: usize, end: usize) -> Result<Vec<Page>, CommediaError> {
    if start < 1 || end > pages.len() || start > end {
        return Err(CommediaError::PageRange {
            pages: pages.len(),
            start,
            end,
        });
    }
    Ok(pages
        .into_iter()
        .filter(|p| (start..=end).contains(&p.number))
        .collect())
}

/// Split extracted text into pages of cleaned, non-empty lines.
pub fn split_pages(text: &str) -> Vec<Page> {
    let text = text.replace("\r\n", "\n");
    let mut raw: Vec<&str> = text.split(FORM_FEED).collect();
    // A trailing separator does not start another page.
    if raw.len() > 1 && raw.last().is_some_and(|p| p.trim().is_empty()) {
        raw.pop();
    }
    raw.into_iter()
        .enumerate()
        .map(|(i, page)| Page {
            number: i + 1,
            lines: page
                .lines()
                .map(clean_line)
                .filter(|l| !l.is_empty())
                .collect(),
        })
        .collect()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
