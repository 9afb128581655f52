//! Summaries produced by a remote generative model.
//!
//! Long inputs are split into chunks that are summarized one after another,
//! then the partial summaries are merged with a final call. The whole
//! exchange runs under one deadline, and inputs needing too many chunks are
//! refused before any call is made. The model's
//! free-form reply is parsed back into the same [`SummaryBody`] shapes the
//! local summarizer produces.

use crate::error::RemoteError;
use crate::local::recall_questions;
use crate::models::{Mode, StudyNotes, Style, SummaryBody, SummaryOptions, SummaryResult};
use crate::sentences::split_sentences;
use crate::traits::GenerativeClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a careful summarizer. Write concise, factual summaries \
    that keep the key facts, entities, figures and definitions of the source. \
    Do not add information that is not in the source.";

/// A chunk boundary is only moved back to a sentence end when that end lies
/// in the last 40% of the chunk.
const BOUNDARY_WINDOW: f64 = 0.6;

pub struct RemoteSummarizer {
    client: Arc<dyn GenerativeClient>,
    chunk_chars: usize,
    max_chunks: usize,
    deadline: Duration,
    question_count: usize,
}

impl RemoteSummarizer {
    pub fn new(client: Arc<dyn GenerativeClient>, options: &SummaryOptions) -> Self {
        Self {
            client,
            chunk_chars: options.remote_chunk_chars.max(1),
            max_chunks: options.remote_max_chunks.max(1),
            deadline: options.remote_deadline,
            question_count: options.question_count.max(1),
        }
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    pub async fn summarize(&self, text: &str, style: Style) -> Result<SummaryResult, RemoteError> {
        let source_chars = text.chars().count();
        let chunks = chunk_text(text, self.chunk_chars);
        if chunks.len() > self.max_chunks {
            return Err(RemoteError::TooManyChunks {
                chunks: chunks.len(),
                limit: self.max_chunks,
            });
        }

        let reply = match tokio::time::timeout(self.deadline, self.generate(&chunks, style)).await {
            Ok(reply) => reply?,
            Err(_) => {
                let deadline_ms = self.deadline.as_millis() as u64;
                warn!(deadline_ms, chunks = chunks.len(), "remote summary exceeded its deadline");
                return Err(RemoteError::Timeout(deadline_ms));
            }
        };

        let body = parse_generated(&reply, style, self.question_count);
        if body.is_empty() {
            return Err(RemoteError::EmptyResponse);
        }

        Ok(SummaryResult::new(style, body, Mode::Remote, source_chars))
    }

    async fn generate(&self, chunks: &[String], style: Style) -> Result<String, RemoteError> {
        match chunks {
            [] => Err(RemoteError::EmptyResponse),
            [single] => {
                self.client
                    .complete(SYSTEM_PROMPT, &style_prompt(style, single))
                    .await
            }
            many => {
                info!(
                    chunks = many.len(),
                    backend = self.client.name(),
                    "summarizing long input in chunks"
                );
                let mut partials = Vec::with_capacity(many.len());
                for (position, chunk) in many.iter().enumerate() {
                    debug!(chunk = position + 1, chars = chunk.chars().count(), "summarizing chunk");
                    partials.push(self.client.complete(SYSTEM_PROMPT, &chunk_prompt(chunk)).await?);
                }
                self.client
                    .complete(SYSTEM_PROMPT, &combine_prompt(style, &partials))
                    .await
            }
        }
    }
}

fn style_instruction(style: Style) -> &'static str {
    match style {
        Style::Bullets => {
            "Summarize the text as 5 to 7 concise bullet points. Put each bullet on its own \
             line starting with \"- \"."
        }
        Style::Abstract => {
            "Summarize the text as one cohesive paragraph of 4 to 6 sentences. \
             Do not use bullet points or headings."
        }
        Style::StudyNotes => {
            "Write study notes with exactly three sections, each introduced by its heading on \
             its own line: \"Overview:\" with two or three sentences, \"Key Points:\" with \
             bullets starting with \"- \", and \"Recall Questions:\" with three review \
             questions starting with \"- \"."
        }
    }
}

fn style_prompt(style: Style, text: &str) -> String {
    format!("{}\n\nText:\n{text}", style_instruction(style))
}

fn chunk_prompt(chunk: &str) -> String {
    format!(
        "Summarize this part of a longer document in a few sentences. Keep key facts, \
         entities, figures and definitions.\n\nText:\n{chunk}"
    )
}

fn combine_prompt(style: Style, partials: &[String]) -> String {
    format!(
        "The following are summaries of consecutive parts of one document. Merge them into a \
         single summary and drop repeated points. {}\n\nPartial summaries:\n{}",
        style_instruction(style),
        partials.join("\n\n")
    )
}

/// Splits text into chunks of at most `max_chars` characters, ending a chunk
/// early at a sentence boundary when one is close to the limit.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            let window = &chars[start..end];
            let earliest = (window.len() as f64 * BOUNDARY_WINDOW) as usize;
            let boundary = (earliest..window.len().saturating_sub(1))
                .rev()
                .find(|&i| matches!(window[i], '.' | '!' | '?') && window[i + 1].is_whitespace());
            if let Some(position) = boundary {
                end = start + position + 1;
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = end;
    }

    chunks
}

/// Parses a model reply into a summary body of the requested style.
pub fn parse_generated(reply: &str, style: Style, question_count: usize) -> SummaryBody {
    let reply = reply.replace("**", "").replace("\r\n", "\n");
    match style {
        Style::Bullets => SummaryBody::Bullets {
            items: list_items(&reply),
        },
        Style::Abstract => SummaryBody::Abstract {
            paragraph: reply
                .lines()
                .map(|line| strip_marker(line).1)
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        },
        Style::StudyNotes => SummaryBody::StudyNotes(
            study_sections(&reply).unwrap_or_else(|| structure_locally(&reply, question_count)),
        ),
    }
}

/// Bulleted or numbered lines if there are any, otherwise sentences.
fn list_items(text: &str) -> Vec<String> {
    let marked: Vec<String> = text
        .lines()
        .map(strip_marker)
        .filter(|(marked, content)| *marked && !content.is_empty())
        .map(|(_, content)| content.to_string())
        .collect();
    if !marked.is_empty() {
        return marked;
    }

    split_sentences(text)
        .into_iter()
        .map(|sentence| sentence.text)
        .collect()
}

/// Returns whether the line carried a list marker, and the remaining text.
fn strip_marker(line: &str) -> (bool, &str) {
    let line = line.trim();
    for marker in ["- ", "* ", "\u{2022} ", "\u{2022}"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return (true, rest.trim());
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return (true, rest.trim());
        }
    }

    (false, line)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Overview,
    KeyPoints,
    Questions,
}

/// Recognizes a section heading, returning the section and any text that
/// followed the heading on the same line.
fn heading(line: &str) -> Option<(Section, &str)> {
    let trimmed = line.trim().trim_start_matches('#').trim();
    let (label, rest) = match trimmed.split_once(':') {
        Some((label, rest)) => (label, rest.trim()),
        None => (trimmed, ""),
    };

    let section = match label.trim().to_ascii_lowercase().as_str() {
        "overview" | "summary" => Section::Overview,
        "key points" | "key ideas" | "main points" => Section::KeyPoints,
        "recall questions" | "questions" | "review questions" | "study questions" => {
            Section::Questions
        }
        _ => return None,
    };
    Some((section, rest))
}

fn study_sections(text: &str) -> Option<StudyNotes> {
    let mut overview = Vec::new();
    let mut key_points = Vec::new();
    let mut questions = Vec::new();
    let mut current = None;

    for line in text.lines() {
        let content = match heading(line) {
            Some((section, rest)) => {
                current = Some(section);
                rest
            }
            None => line,
        };
        let content = strip_marker(content).1;
        if content.is_empty() {
            continue;
        }

        match current {
            Some(Section::Overview) => overview.push(content.to_string()),
            Some(Section::KeyPoints) => key_points.push(content.to_string()),
            Some(Section::Questions) => questions.push(content.to_string()),
            None => {}
        }
    }

    if overview.is_empty() || key_points.is_empty() || questions.is_empty() {
        return None;
    }

    let overview = split_sentences(&overview.join(" "))
        .into_iter()
        .map(|sentence| sentence.text)
        .collect();
    Some(StudyNotes {
        overview,
        key_points,
        questions,
    })
}

/// Builds study notes from an unstructured reply: the first sentence becomes
/// the overview and the rest become key points.
fn structure_locally(text: &str, question_count: usize) -> StudyNotes {
    let flattened = text
        .lines()
        .map(|line| heading(line).map_or(line, |(_, rest)| rest))
        .collect::<Vec<_>>()
        .join("\n");
    let mut sentences = list_items(&flattened).into_iter();

    let overview: Vec<String> = sentences.next().into_iter().collect();
    let mut key_points: Vec<String> = sentences.collect();
    if key_points.is_empty() {
        key_points = overview.clone();
    }

    StudyNotes {
        questions: recall_questions(&key_points, question_count),
        overview,
        key_points,
    }
}
