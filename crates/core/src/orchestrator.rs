use crate::cleaning::ArtifactCleaner;
use crate::error::{RemoteError, SummarizeError};
use crate::extractor::{extract_text, LopdfExtractor, PdfExtractor};
use crate::fallback::recover;
use crate::local::LocalSummarizer;
use crate::models::{
    CleanedText, Mode, Style, Submission, SubmissionInput, SummarizerConfig, SummaryResult,
};
use crate::remote::RemoteSummarizer;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs one submission through extraction, cleaning and the selected
/// summarizer.
pub struct SummaryOrchestrator {
    config: SummarizerConfig,
    extractor: Box<dyn PdfExtractor>,
    cleaner: ArtifactCleaner,
    local: Arc<LocalSummarizer>,
    remote: Option<RemoteSummarizer>,
}

impl SummaryOrchestrator {
    pub fn new(
        config: SummarizerConfig,
        remote: Option<RemoteSummarizer>,
    ) -> Result<Self, SummarizeError> {
        let cleaner = ArtifactCleaner::new(config.options.footer_repeat_threshold)?;
        let local = Arc::new(LocalSummarizer::new(
            config.ranking.ranker(),
            config.options.clone(),
        ));
        Ok(Self {
            config,
            extractor: Box::new(LopdfExtractor),
            cleaner,
            local,
            remote,
        })
    }

    pub fn with_extractor(mut self, extractor: impl PdfExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Parses the requested style and mode. A missing or blank mode means
    /// the configured default.
    pub fn resolve(&self, style: &str, mode: Option<&str>) -> Result<(Style, Mode), SummarizeError> {
        let style = style.parse::<Style>()?;
        let mode = match mode.map(str::trim).filter(|mode| !mode.is_empty()) {
            Some(mode) => mode.parse::<Mode>()?,
            None => self.config.mode,
        };
        Ok((style, mode))
    }

    /// Extracts and cleans the input. Blocking: PDF parsing is CPU bound.
    pub fn prepare(&self, input: &SubmissionInput) -> Result<CleanedText, SummarizeError> {
        let raw = extract_text(self.extractor.as_ref(), input, self.config.max_input_bytes)?;
        let cleaned = self.cleaner.clean(&raw);
        if cleaned.is_blank() {
            return Err(SummarizeError::EmptyInput);
        }
        debug!(raw_chars = raw.len(), cleaned_chars = cleaned.char_count(), "prepared input");
        Ok(cleaned)
    }

    /// Summarizes prepared text with the requested summarizer. Local ranking
    /// and the fallback after a failed remote attempt run on the blocking
    /// pool so they never stall the async workers.
    pub async fn select(
        &self,
        mode: Mode,
        style: Style,
        text: CleanedText,
    ) -> Result<SummaryResult, SummarizeError> {
        let local = Arc::clone(&self.local);
        match mode {
            Mode::Local => blocking(move || local.summarize(text.as_str(), style)).await,
            Mode::Remote => {
                let attempt = match &self.remote {
                    Some(remote) => {
                        debug!(backend = remote.client_name(), %style, "calling remote summarizer");
                        remote.summarize(text.as_str(), style).await
                    }
                    None => Err(RemoteError::NotConfigured(
                        "no remote summarizer is configured".to_string(),
                    )),
                };
                blocking(move || recover(attempt, &local, &text, style)).await
            }
        }
    }

    pub async fn process(&self, submission: Submission) -> Result<SummaryResult, SummarizeError> {
        let (style, mode) = self.resolve(&submission.style, submission.mode.as_deref())?;
        let text = self.prepare(&submission.input)?;
        let result = self.select(mode, style, text).await?;
        info!(
            %style,
            requested = %mode,
            used = %result.mode_used,
            fell_back = result.fell_back(),
            words = result.word_count,
            "summary produced"
        );
        Ok(result)
    }
}

async fn blocking<T, F>(task: F) -> Result<T, SummarizeError>
where
    F: FnOnce() -> Result<T, SummarizeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|error| SummarizeError::Worker(error.to_string()))?
}
