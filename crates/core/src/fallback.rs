use crate::error::{RemoteError, SummarizeError};
use crate::local::LocalSummarizer;
use crate::models::{CleanedText, FallbackNotice, Mode, Style, SummaryResult};
use tracing::warn;

/// Turns a failed remote attempt into a local summary carrying a notice.
/// A successful attempt passes through untouched. Local failures (such as
/// empty input) still surface as errors.
pub fn recover(
    attempt: Result<SummaryResult, RemoteError>,
    local: &LocalSummarizer,
    text: &CleanedText,
    style: Style,
) -> Result<SummaryResult, SummarizeError> {
    match attempt {
        Ok(result) => Ok(result),
        Err(error) => {
            warn!(%error, %style, "remote summarizer failed, using local summarizer");
            let notice = FallbackNotice {
                requested: Mode::Remote,
                reason: error.to_string(),
            };
            Ok(local.summarize(text.as_str(), style)?.with_fallback(notice))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SummaryBody, SummaryOptions};
    use crate::ranking::RankingAlgorithm;

    fn local() -> LocalSummarizer {
        LocalSummarizer::new(RankingAlgorithm::TextRank.ranker(), SummaryOptions::default())
    }

    #[test]
    fn remote_success_is_kept() {
        let remote = SummaryResult::new(
            Style::Abstract,
            SummaryBody::Abstract {
                paragraph: "From the model.".to_string(),
            },
            Mode::Remote,
            10,
        );
        let text = CleanedText::new("Some source text.".to_string());

        let result = recover(Ok(remote.clone()), &local(), &text, Style::Abstract).unwrap();
        assert_eq!(result, remote);
    }

    #[test]
    fn remote_failure_yields_local_summary_with_notice() {
        let text = CleanedText::new("Rust is fast. Rust is safe. Cargo builds projects.".to_string());

        let result = recover(
            Err(RemoteError::Status {
                status: 503,
                details: "overloaded".to_string(),
            }),
            &local(),
            &text,
            Style::Bullets,
        )
        .unwrap();

        assert_eq!(result.mode_used, Mode::Local);
        assert!(!result.body.is_empty());
        let notice = result.fallback.expect("fallback notice");
        assert_eq!(notice.requested, Mode::Remote);
        assert!(notice.reason.contains("503"));
    }

    #[test]
    fn local_errors_still_surface() {
        let text = CleanedText::new(String::new());
        let result = recover(Err(RemoteError::EmptyResponse), &local(), &text, Style::Bullets);
        assert!(matches!(result, Err(SummarizeError::EmptyInput)));
    }
}
