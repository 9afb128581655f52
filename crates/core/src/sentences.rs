//! Sentence splitting and the small lexical helpers shared by the rankers,
//! the deduplication step and the renderers.

use std::collections::HashSet;

const ABBREVIATIONS: [&str; 16] = [
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig", "approx",
    "inc", "ltd",
];

pub const STOP_WORDS: [&str; 95] = [
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
    "it", "its", "this", "that", "these", "those", "i", "you", "he", "she", "we", "they", "what",
    "which", "who", "when", "where", "why", "how", "all", "each", "every", "both", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "just", "also", "now", "here", "there", "then", "once", "if", "while",
    "because", "until", "about", "into", "through", "during", "before", "after", "between",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Position of the sentence in the source, starting at zero.
    pub index: usize,
    pub text: String,
}

/// Splits text into sentences. Blank lines are hard boundaries; single line
/// breaks inside a paragraph are treated as spaces.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();

    for paragraph in text.split("\n\n") {
        let joined = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
        if joined.is_empty() {
            continue;
        }

        let chars: Vec<char> = joined.chars().collect();
        let mut current = String::new();
        let mut position = 0;

        while position < chars.len() {
            let ch = chars[position];
            current.push(ch);

            if matches!(ch, '.' | '!' | '?') {
                // swallow closing quotes/brackets and repeated terminators
                while position + 1 < chars.len()
                    && matches!(chars[position + 1], '"' | '\'' | ')' | ']' | '.' | '!' | '?' | '\u{201d}')
                {
                    position += 1;
                    current.push(chars[position]);
                }

                let at_end = position + 1 >= chars.len();
                let next_starts_sentence = chars.get(position + 2).is_some_and(|next| {
                    next.is_uppercase() || next.is_ascii_digit() || matches!(next, '"' | '(' | '\u{201c}')
                });
                let followed_by_space = chars.get(position + 1).is_some_and(|c| *c == ' ');

                if at_end
                    || (followed_by_space && next_starts_sentence && !ends_with_abbreviation(&current))
                {
                    push_sentence(&mut sentences, &current);
                    current.clear();
                }
            }

            position += 1;
        }

        push_sentence(&mut sentences, &current);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<Sentence>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_alphanumeric) {
        sentences.push(Sentence {
            index: sentences.len(),
            text: trimmed.to_string(),
        });
    }
}

fn ends_with_abbreviation(current: &str) -> bool {
    let last_word = current
        .trim_end_matches(['.', '!', '?', '"', '\'', ')', ']'])
        .rsplit(' ')
        .next()
        .unwrap_or_default()
        .trim_start_matches(['(', '"', '\''])
        .to_lowercase();

    // single-letter initials such as "J. Smith"
    if last_word.chars().count() == 1 && last_word.chars().all(char::is_alphabetic) {
        return true;
    }

    ABBREVIATIONS.contains(&last_word.as_str())
}

/// Lower-cased word tokens.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|token| token.trim_matches('\'').to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Tokens with stop words and one-character tokens removed.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokens(text)
        .into_iter()
        .filter(|token| token.chars().count() > 1 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

pub fn token_set(text: &str) -> HashSet<String> {
    tokens(text).into_iter().collect()
}

/// Jaccard similarity of the lower-cased token sets of two strings.
pub fn jaccard(left: &str, right: &str) -> f64 {
    let left = token_set(left);
    let right = token_set(right);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        split_sentences(text).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn splits_on_terminal_punctuation_across_line_breaks() {
        assert_eq!(
            texts("The quick fox jumps.\nThe quick fox leaps."),
            vec!["The quick fox jumps.", "The quick fox leaps."]
        );
    }

    #[test]
    fn keeps_abbreviations_and_initials_inside_sentences() {
        assert_eq!(
            texts("Dr. Smith met J. Doe at noon. They talked."),
            vec!["Dr. Smith met J. Doe at noon.", "They talked."]
        );
    }

    #[test]
    fn blank_lines_end_a_sentence_without_punctuation() {
        assert_eq!(
            texts("Introduction\n\nThe method works well."),
            vec!["Introduction", "The method works well."]
        );
    }

    #[test]
    fn indices_follow_source_order() {
        let sentences = split_sentences("One is here. Two is there. Three is everywhere.");
        let indices: Vec<usize> = sentences.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn jaccard_of_one_word_change() {
        let score = jaccard("The quick fox jumps.", "The quick fox leaps.");
        assert!((score - 0.6).abs() < 1e-9);
        assert_eq!(jaccard("", "anything"), 0.0);
    }

    #[test]
    fn content_tokens_drop_stop_words() {
        assert_eq!(
            content_tokens("The pump and the valve are OK"),
            vec!["pump", "valve", "ok"]
        );
    }
}
