use crate::error::SummarizeError;
use crate::ranking::RankingAlgorithm;
use crate::sentences::word_count;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Uploads above this size are rejected before parsing.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Bullets,
    Abstract,
    StudyNotes,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullets => "bullets",
            Self::Abstract => "abstract",
            Self::StudyNotes => "study-notes",
        }
    }
}

impl FromStr for Style {
    type Err = SummarizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bullets" | "bullet" => Ok(Self::Bullets),
            "abstract" => Ok(Self::Abstract),
            "study-notes" | "study_notes" | "study" => Ok(Self::StudyNotes),
            _ => Err(SummarizeError::InvalidStyle(value.to_string())),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Local,
    Remote,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for Mode {
    type Err = SummarizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "offline" => Ok(Self::Local),
            "remote" | "openai" => Ok(Self::Remote),
            _ => Err(SummarizeError::InvalidMode(value.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum SubmissionInput {
    Pdf(Vec<u8>),
    TextFile(Vec<u8>),
    Text(String),
}

/// One summarize request as received from the form. Style and mode stay raw
/// strings until the orchestrator validates them.
#[derive(Debug, Clone)]
pub struct Submission {
    pub input: SubmissionInput,
    pub style: String,
    pub mode: Option<String>,
}

/// Text that went through [`ArtifactCleaner::clean`](crate::cleaning::ArtifactCleaner::clean).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedText(String);

impl CleanedText {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CleanedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyNotes {
    pub overview: Vec<String>,
    pub key_points: Vec<String>,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryBody {
    Bullets { items: Vec<String> },
    Abstract { paragraph: String },
    StudyNotes(StudyNotes),
}

impl SummaryBody {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bullets { items } => items.iter().all(|item| item.trim().is_empty()),
            Self::Abstract { paragraph } => paragraph.trim().is_empty(),
            Self::StudyNotes(notes) => {
                notes.overview.is_empty()
                    && notes.key_points.is_empty()
                    && notes.questions.is_empty()
            }
        }
    }

    /// Every text fragment of the body, in display order.
    pub fn fragments(&self) -> Vec<&str> {
        match self {
            Self::Bullets { items } => items.iter().map(String::as_str).collect(),
            Self::Abstract { paragraph } => vec![paragraph.as_str()],
            Self::StudyNotes(notes) => notes
                .overview
                .iter()
                .chain(notes.key_points.iter())
                .chain(notes.questions.iter())
                .map(String::as_str)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackNotice {
    pub requested: Mode,
    pub reason: String,
}

impl FallbackNotice {
    pub fn message(&self) -> &'static str {
        "The remote summarizer was unavailable, so the offline summarizer was used instead."
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResult {
    pub style: Style,
    pub body: SummaryBody,
    pub mode_used: Mode,
    pub fallback: Option<FallbackNotice>,
    pub word_count: usize,
    pub source_chars: usize,
}

impl SummaryResult {
    pub fn new(style: Style, body: SummaryBody, mode_used: Mode, source_chars: usize) -> Self {
        let word_count = body.fragments().into_iter().map(word_count).sum();
        Self {
            style,
            body,
            mode_used,
            fallback: None,
            word_count,
            source_chars,
        }
    }

    pub fn with_fallback(mut self, notice: FallbackNotice) -> Self {
        self.mode_used = Mode::Local;
        self.fallback = Some(notice);
        self
    }

    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Tuning constants for the summarizers and the cleaner.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub bullet_count: usize,
    pub abstract_sentences: usize,
    pub overview_sentences: usize,
    pub key_point_count: usize,
    pub question_count: usize,
    pub dedup_threshold: f64,
    pub footer_repeat_threshold: usize,
    /// Upper bound on the sentences handed to the ranker. Longer inputs are
    /// pre-filtered by term frequency first.
    pub max_ranked_sentences: usize,
    pub remote_chunk_chars: usize,
    /// Inputs needing more chunks than this are not sent to the remote model.
    pub remote_max_chunks: usize,
    /// Budget for one whole remote summary, all chunk calls included.
    pub remote_deadline: Duration,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            bullet_count: 5,
            abstract_sentences: 4,
            overview_sentences: 2,
            key_point_count: 5,
            question_count: 3,
            dedup_threshold: 0.55,
            footer_repeat_threshold: 3,
            max_ranked_sentences: 1_000,
            remote_chunk_chars: 6_000,
            remote_max_chunks: 16,
            remote_deadline: Duration::from_secs(120),
        }
    }
}

/// Process-wide configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub mode: Mode,
    pub ranking: RankingAlgorithm,
    pub max_input_bytes: usize,
    pub options: SummaryOptions,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Local,
            ranking: RankingAlgorithm::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            options: SummaryOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_accepts_aliases_and_rejects_unknown() {
        assert_eq!("Bullets".parse::<Style>().unwrap(), Style::Bullets);
        assert_eq!(" study ".parse::<Style>().unwrap(), Style::StudyNotes);
        assert_eq!("study_notes".parse::<Style>().unwrap(), Style::StudyNotes);
        assert!(matches!(
            "haiku".parse::<Style>(),
            Err(SummarizeError::InvalidStyle(value)) if value == "haiku"
        ));
    }

    #[test]
    fn mode_parses_openai_as_remote() {
        assert_eq!("OPENAI".parse::<Mode>().unwrap(), Mode::Remote);
        assert!("cloud".parse::<Mode>().is_err());
    }

    #[test]
    fn fallback_forces_local_mode() {
        let result = SummaryResult::new(
            Style::Abstract,
            SummaryBody::Abstract {
                paragraph: "Two words.".to_string(),
            },
            Mode::Remote,
            10,
        )
        .with_fallback(FallbackNotice {
            requested: Mode::Remote,
            reason: "timeout".to_string(),
        });

        assert_eq!(result.mode_used, Mode::Local);
        assert!(result.fell_back());
        assert_eq!(result.word_count, 2);
    }

    #[test]
    fn summary_result_survives_json() {
        let result = SummaryResult::new(
            Style::StudyNotes,
            SummaryBody::StudyNotes(StudyNotes {
                overview: vec!["A.".to_string()],
                key_points: vec!["B.".to_string()],
                questions: vec!["C?".to_string()],
            }),
            Mode::Local,
            3,
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"study-notes\""));
        let back: SummaryResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
