use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("input is {size} bytes, larger than the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("unreadable pdf: {0}")]
    UnreadablePdf(String),

    #[error("no readable text found in the provided input")]
    EmptyInput,

    #[error("invalid summary style: {0:?} (expected bullets, abstract or study-notes)")]
    InvalidStyle(String),

    #[error("invalid summarizer mode: {0:?} (expected local or remote)")]
    InvalidMode(String),

    #[error("unsupported file type: {0:?} (only pdf and txt are accepted)")]
    UnsupportedFileType(String),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("summarization worker failed: {0}")]
    Worker(String),
}

impl SummarizeError {
    /// Errors caused by the request itself rather than by the server.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Render(_) | Self::Regex(_) | Self::Worker(_))
    }
}

/// Failure of the remote summarizer. Never shown to the user directly: the
/// fallback step turns it into a local summary with a notice.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote summarizer not configured: {0}")]
    NotConfigured(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote service returned {status}: {details}")]
    Status { status: u16, details: String },

    #[error("remote call timed out after {0} ms")]
    Timeout(u64),

    #[error("input needs {chunks} chunks, more than the {limit} allowed")]
    TooManyChunks { chunks: usize, limit: usize },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("remote service returned an empty summary")]
    EmptyResponse,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SummarizeError> = std::result::Result<T, E>;
