use crate::error::SummarizeError;
use crate::models::CleanedText;
use crate::sentences::STOP_WORDS;
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};

/// Lower-case runs longer than this are treated as words whose spaces were
/// lost in extraction.
const GLUED_RUN_CHARS: usize = 18;

/// Strips PDF extraction noise: split words, page numbers, signature and
/// running header/footer lines, glued words and ragged whitespace.
#[derive(Debug, Clone)]
pub struct ArtifactCleaner {
    hyphen_break: Regex,
    page_label: Regex,
    spaced_page: Regex,
    case_change: Regex,
    letter_digit: Regex,
    digit_letter: Regex,
    slash: Regex,
    space_before_punctuation: Regex,
    glued_run: Regex,
    /// Lines seen more often than this are dropped. Zero disables the pass.
    footer_repeat_threshold: usize,
}

impl ArtifactCleaner {
    pub fn new(footer_repeat_threshold: usize) -> Result<Self, SummarizeError> {
        Ok(Self {
            hyphen_break: Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})")?,
            page_label: Regex::new(r"(?i)^page\s*\d+(?:\s*(?:of|/)\s*\d+)?$")?,
            spaced_page: Regex::new(r"(?i)^p\s+a\s+g\s+e\b")?,
            case_change: Regex::new(r"(\p{Ll})(\p{Lu})")?,
            letter_digit: Regex::new(r"(\p{L})(\p{Nd})")?,
            digit_letter: Regex::new(r"(\p{Nd})(\p{L})")?,
            slash: Regex::new(r"/([\p{L}\p{Nd}])")?,
            space_before_punctuation: Regex::new(r"[ \t]+([.,;:!?])")?,
            glued_run: Regex::new(&format!(r"\p{{L}}{{{},}}", GLUED_RUN_CHARS + 1))?,
            footer_repeat_threshold,
        })
    }

    /// Runs the cleaning passes until the text stops changing, so cleaning
    /// the result again returns it unchanged. Passes either remove text or
    /// insert a single space at a boundary that no pass joins back, which
    /// keeps the loop finite.
    pub fn clean(&self, text: &str) -> CleanedText {
        let mut current = text
            .replace("\r\n", "\n")
            .replace(['\r', '\u{000c}'], "\n");

        loop {
            let next = self.clean_once(&current);
            if next == current {
                break;
            }
            current = next;
        }

        CleanedText::new(current)
    }

    fn clean_once(&self, text: &str) -> String {
        let joined = self.rejoin_hyphenated(text);
        let spaced = self.repair_spacing(&joined);
        let without_numbers = self.strip_page_lines(&spaced);
        let without_footers = self.strip_repeated_lines(&without_numbers);
        normalize_whitespace(&without_footers)
    }

    fn rejoin_hyphenated(&self, text: &str) -> String {
        self.hyphen_break.replace_all(text, "$1$2").into_owned()
    }

    /// Puts back spaces that extraction dropped: between a lower-case and an
    /// upper-case letter, between letters and digits, after a slash, and
    /// inside long glued lower-case runs. Spaces before punctuation go.
    fn repair_spacing(&self, text: &str) -> String {
        let text = self.case_change.replace_all(text, "$1 $2");
        let text = self.letter_digit.replace_all(&text, "$1 $2");
        let text = self.digit_letter.replace_all(&text, "$1 $2");
        let text = self.slash.replace_all(&text, "/ $1");
        let text = self.space_before_punctuation.replace_all(&text, "$1");
        self.split_glued_runs(&text)
    }

    fn split_glued_runs(&self, text: &str) -> String {
        if !self.glued_run.is_match(text) {
            return text.to_string();
        }

        let vocabulary = vocabulary(text);
        self.glued_run
            .replace_all(text, |captures: &Captures| {
                let run = &captures[0];
                if !run.chars().all(char::is_lowercase) {
                    return run.to_string();
                }
                segment(run, &vocabulary).unwrap_or_else(|| run.to_string())
            })
            .into_owned()
    }

    /// Drops bare page numbers, page labels (also letter-spaced ones such as
    /// `P a g e 3`) and signature lines.
    fn strip_page_lines(&self, text: &str) -> String {
        text.lines()
            .filter(|line| {
                let trimmed = line.trim();
                let numeric = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit());
                !numeric
                    && !self.page_label.is_match(trimmed)
                    && !self.spaced_page.is_match(trimmed)
                    && !trimmed.starts_with("Signature")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn strip_repeated_lines(&self, text: &str) -> String {
        if self.footer_repeat_threshold == 0 {
            return text.to_string();
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            *counts.entry(line).or_default() += 1;
        }

        text.lines()
            .filter(|line| {
                counts
                    .get(line.trim())
                    .map_or(true, |count| *count <= self.footer_repeat_threshold)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Words the document itself uses, plus stop words, lower-cased. Glued runs
/// are only split into words from this set.
fn vocabulary(text: &str) -> HashSet<String> {
    let mut words: HashSet<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| (2..=GLUED_RUN_CHARS).contains(&word.chars().count()))
        .map(str::to_lowercase)
        .collect();
    words.extend(STOP_WORDS.iter().map(|word| word.to_string()));
    words
}

/// Splits `run` into the fewest vocabulary words that cover it exactly.
/// Ties go to the longer leading word. `None` when no cover exists.
fn segment(run: &str, vocabulary: &HashSet<String>) -> Option<String> {
    let chars: Vec<char> = run.chars().collect();
    let n = chars.len();

    // best[i]: (words needed for chars[i..], end of the first of them)
    let mut best: Vec<Option<(usize, usize)>> = vec![None; n + 1];
    best[n] = Some((0, n));
    for start in (0..n).rev() {
        for end in (start + 1..=(start + GLUED_RUN_CHARS).min(n)).rev() {
            let Some((rest, _)) = best[end] else {
                continue;
            };
            let word: String = chars[start..end].iter().collect();
            let better = best[start].map_or(true, |(count, _)| rest + 1 < count);
            if better && vocabulary.contains(&word) {
                best[start] = Some((rest + 1, end));
            }
        }
    }

    let mut words = Vec::new();
    let mut start = 0;
    while start < n {
        let (_, end) = best[start]?;
        words.push(chars[start..end].iter().collect::<String>());
        start = end;
    }
    Some(words.join(" "))
}

/// Trims and collapses whitespace inside each line, squeezes runs of blank
/// lines down to one and drops blank lines at both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in text.lines() {
        let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(normalized);
            previous_blank = false;
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cleaner() -> ArtifactCleaner {
        ArtifactCleaner::new(3).expect("cleaner regexes compile")
    }

    #[test]
    fn hyphenated_split_word_is_rejoined() {
        let cleaned = cleaner().clean("Access to infor-\nmation matters.");
        assert_eq!(cleaned.as_str(), "Access to information matters.");
    }

    #[test]
    fn hyphen_before_capital_is_kept() {
        let cleaned = cleaner().clean("North-\nSouth trade grew.");
        assert_eq!(cleaned.as_str(), "North-\nSouth trade grew.");
    }

    #[test]
    fn numeric_line_between_paragraphs_is_removed() {
        let cleaned = cleaner().clean("First paragraph ends here.\n\n  12  \n\nSecond paragraph starts.");
        assert_eq!(
            cleaned.as_str(),
            "First paragraph ends here.\n\nSecond paragraph starts."
        );
    }

    #[test]
    fn page_labels_are_removed() {
        let cleaned = cleaner().clean("Page 1\nBody text.\nPage 2 of 9\nMore text.\npage 3/9");
        assert_eq!(cleaned.as_str(), "Body text.\nMore text.");
    }

    #[test]
    fn repeated_footer_lines_are_removed() {
        let footer = "Acme Corp - Confidential";
        let text = format!(
            "Intro.\n{footer}\nAlpha.\n{footer}\nBeta.\n{footer}\nGamma.\n  {footer}\nDelta."
        );
        let cleaned = cleaner().clean(&text);
        assert_eq!(cleaned.as_str(), "Intro.\nAlpha.\nBeta.\nGamma.\nDelta.");
    }

    #[test]
    fn lines_at_threshold_are_kept() {
        let cleaned = cleaner().clean("Note.\nNote.\nNote.\nEnd.");
        assert_eq!(cleaned.as_str(), "Note.\nNote.\nNote.\nEnd.");
    }

    #[test]
    fn blank_runs_collapse_and_lines_are_trimmed() {
        let cleaned = cleaner().clean("\n\n  one  two \r\n\r\n\r\n\tthree\n\n");
        assert_eq!(cleaned.as_str(), "one two\n\nthree");
    }

    #[test]
    fn page_number_hiding_a_hyphen_split_is_still_joined() {
        let cleaned = cleaner().clean("the infor-\n7\nmation age");
        assert_eq!(cleaned.as_str(), "the information age");
    }

    #[test]
    fn pdf_scenario_drops_page_artifacts() {
        let cleaned = cleaner().clean("Page 1\nThe quick fox jumps.\nThe quick fox leaps.\n1\n");
        assert_eq!(
            cleaned.as_str(),
            "The quick fox jumps.\nThe quick fox leaps."
        );
    }

    #[test]
    fn dropped_spaces_are_restored() {
        let cleaned = cleaner().clean("theQuickFox2024report");
        assert_eq!(cleaned.as_str(), "the Quick Fox 2024 report");
    }

    #[test]
    fn slashes_and_punctuation_are_spaced_like_prose() {
        let cleaned = cleaner().clean("Costs rose , then fell .\nSee input/output for details !");
        assert_eq!(
            cleaned.as_str(),
            "Costs rose, then fell.\nSee input/ output for details!"
        );
    }

    #[test]
    fn glued_runs_are_split_into_known_words() {
        let cleaned = cleaner().clean(
            "Results show that growth is strong.\nresultsshowthatgrowthisstrong again.",
        );
        assert_eq!(
            cleaned.as_str(),
            "Results show that growth is strong.\nresults show that growth is strong again."
        );
    }

    #[test]
    fn glued_run_without_a_cover_is_left_alone() {
        let text = "zqxvbnmlkjhgfdsapoiuyt stays.";
        assert_eq!(cleaner().clean(text).as_str(), text);
    }

    #[test]
    fn letter_spaced_page_and_signature_lines_are_removed() {
        let cleaned = cleaner().clean(
            "P a g e 3\nTerms agreed.\n  p a g e 4 of 9\nSignature: __________\nSignatory page follows.",
        );
        assert_eq!(cleaned.as_str(), "Terms agreed.\nSignatory page follows.");
    }

    #[test]
    fn glued_page_label_is_removed_after_spacing() {
        let cleaned = cleaner().clean("Body text.\nPage7\nMore text.");
        assert_eq!(cleaned.as_str(), "Body text.\nMore text.");
    }

    proptest! {
        #[test]
        fn cleaning_is_idempotent(text in any::<String>()) {
            let cleaner = cleaner();
            let once = cleaner.clean(&text);
            let twice = cleaner.clean(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn cleaning_is_idempotent_on_pdf_like_text(
            text in "([a-z]{1,8}(-\n| |\n|\n\n|\t)|[0-9]{1,3}\n|Page [0-9]\n|Footer\n| {1,3}){0,60}"
        ) {
            let cleaner = cleaner();
            let once = cleaner.clean(&text);
            let twice = cleaner.clean(once.as_str());
            prop_assert_eq!(once, twice);
        }
    }
}
