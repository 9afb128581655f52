use crate::error::{Result, SummarizeError};
use crate::models::SubmissionInput;
use lopdf::Document;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>> {
        let document =
            Document::load_mem(bytes).map_err(|error| SummarizeError::UnreadablePdf(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = match document.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(error) => {
                    warn!(page = page_no, %error, "skipping page that failed to decode");
                    continue;
                }
            };

            if !text.trim().is_empty() {
                pages.push(PageText {
                    number: page_no,
                    text,
                });
            }
        }

        if pages.is_empty() {
            return Err(SummarizeError::UnreadablePdf(
                "pdf had no readable page text".to_string(),
            ));
        }

        Ok(pages)
    }
}

/// Turns a submission's raw input into plain text. PDF pages are joined in
/// page order with a blank line between them.
pub fn extract_text<E: PdfExtractor + ?Sized>(
    extractor: &E,
    input: &SubmissionInput,
    max_bytes: usize,
) -> Result<String> {
    match input {
        SubmissionInput::Pdf(bytes) => {
            check_size(bytes.len(), max_bytes)?;
            let pages = extractor.extract_pages(bytes)?;
            debug!(pages = pages.len(), bytes = bytes.len(), "extracted pdf text");
            Ok(pages
                .into_iter()
                .map(|page| page.text)
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
        SubmissionInput::TextFile(bytes) => {
            check_size(bytes.len(), max_bytes)?;
            Ok(String::from_utf8_lossy(bytes).trim().to_string())
        }
        SubmissionInput::Text(text) => {
            check_size(text.len(), max_bytes)?;
            Ok(text.trim().to_string())
        }
    }
}

fn check_size(size: usize, limit: usize) -> Result<()> {
    if size > limit {
        return Err(SummarizeError::InputTooLarge { size, limit });
    }
    Ok(())
}

/// Maps an uploaded file name to the matching input variant.
pub fn input_for_upload(file_name: &str, bytes: Vec<u8>) -> Result<SubmissionInput> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(SubmissionInput::Pdf(bytes)),
        "txt" => Ok(SubmissionInput::TextFile(bytes)),
        _ => Err(SummarizeError::UnsupportedFileType(file_name.to_string())),
    }
}
