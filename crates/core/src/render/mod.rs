//! Output formats for a finished summary.

pub mod html;
pub mod pdf;

use crate::models::{SummaryBody, SummaryResult};

pub const BULLET: char = '\u{2022}';

/// Plain-text rendering used for copying and as the source of the PDF
/// export. Ends with a word-count line.
pub fn render_plain_text(result: &SummaryResult) -> String {
    let mut out = String::new();
    match &result.body {
        SummaryBody::Bullets { items } => push_list(&mut out, items),
        SummaryBody::Abstract { paragraph } => out.push_str(paragraph),
        SummaryBody::StudyNotes(notes) => {
            out.push_str("Overview\n");
            out.push_str(&notes.overview.join(" "));
            out.push_str("\n\nKey Points\n");
            push_list(&mut out, &notes.key_points);
            out.push_str("\n\nRecall Questions\n");
            push_list(&mut out, &notes.questions);
        }
    }
    out.push_str(&format!("\n\nWord count: {}", result.word_count));
    out
}

fn push_list(out: &mut String, items: &[String]) {
    let lines: Vec<String> = items.iter().map(|item| format!("{BULLET} {item}")).collect();
    out.push_str(&lines.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mode, StudyNotes, Style};

    #[test]
    fn bullets_are_prefixed_and_counted() {
        let result = SummaryResult::new(
            Style::Bullets,
            SummaryBody::Bullets {
                items: vec!["Rust is fast.".to_string(), "Cargo builds crates.".to_string()],
            },
            Mode::Local,
            100,
        );
        assert_eq!(
            render_plain_text(&result),
            "\u{2022} Rust is fast.\n\u{2022} Cargo builds crates.\n\nWord count: 6"
        );
    }

    #[test]
    fn study_notes_have_section_headings() {
        let result = SummaryResult::new(
            Style::StudyNotes,
            SummaryBody::StudyNotes(StudyNotes {
                overview: vec!["Rust is fast.".to_string(), "It is safe.".to_string()],
                key_points: vec!["Ownership".to_string()],
                questions: vec!["What is ownership?".to_string()],
            }),
            Mode::Local,
            100,
        );
        let text = render_plain_text(&result);
        assert!(text.starts_with("Overview\nRust is fast. It is safe.\n\nKey Points\n\u{2022} Ownership"));
        assert!(text.contains("Recall Questions\n\u{2022} What is ownership?"));
        assert!(text.ends_with("Word count: 10"));
    }
}
