pub mod cleaning;
pub mod clients;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod local;
pub mod models;
pub mod orchestrator;
pub mod ranking;
pub mod remote;
pub mod render;
pub mod sentences;
pub mod traits;

pub use cleaning::{normalize_whitespace, ArtifactCleaner};
pub use clients::{OpenAiClient, OpenAiConfig};
pub use error::{RemoteError, RenderError, SummarizeError};
pub use extractor::{extract_text, input_for_upload, LopdfExtractor, PageText, PdfExtractor};
pub use fallback::recover;
pub use local::LocalSummarizer;
pub use models::{
    CleanedText, FallbackNotice, Mode, StudyNotes, Style, Submission, SubmissionInput,
    SummarizerConfig, SummaryBody, SummaryOptions, SummaryResult, DEFAULT_MAX_INPUT_BYTES,
};
pub use orchestrator::SummaryOrchestrator;
pub use ranking::{RankingAlgorithm, SentenceRanker};
pub use remote::RemoteSummarizer;
pub use render::{html::render_html, pdf::render_pdf, render_plain_text};
pub use traits::GenerativeClient;
