use crate::error::SummarizeError;
use crate::models::{Mode, StudyNotes, Style, SummaryBody, SummaryOptions, SummaryResult};
use crate::ranking::{FrequencyRanker, SentenceRanker};
use crate::sentences::{jaccard, split_sentences, Sentence};
use tracing::debug;

const QUESTION_TEMPLATES: [&str; 7] = [
    "Why is {} important?",
    "What problem does {} address?",
    "How does {} work in this context?",
    "What are the key assumptions behind {}?",
    "What are the potential risks or limitations of {}?",
    "Where is {} applied effectively?",
    "How could {} be improved?",
];

const QUESTION_TOPIC_CHARS: usize = 90;

/// Offline extractive summarizer. Never touches the network.
pub struct LocalSummarizer {
    ranker: Box<dyn SentenceRanker>,
    options: SummaryOptions,
}

impl LocalSummarizer {
    pub fn new(ranker: Box<dyn SentenceRanker>, options: SummaryOptions) -> Self {
        Self { ranker, options }
    }

    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }

    pub fn summarize(&self, text: &str, style: Style) -> Result<SummaryResult, SummarizeError> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        let order = self.rank(&sentences);
        debug!(sentences = sentences.len(), ranked = order.len(), %style, "ranked sentences");

        let body = match style {
            Style::Bullets => {
                let chosen = self.select(&sentences, &order, self.options.bullet_count.max(1), &[]);
                SummaryBody::Bullets {
                    items: texts(&sentences, &chosen),
                }
            }
            Style::Abstract => {
                let count = self.options.abstract_sentences.max(1);
                let chosen = self.select(&sentences, &order, count, &[]);
                SummaryBody::Abstract {
                    paragraph: texts(&sentences, &chosen).join(" "),
                }
            }
            Style::StudyNotes => SummaryBody::StudyNotes(self.study_notes(&sentences, &order)),
        };

        Ok(SummaryResult::new(style, body, Mode::Local, text.chars().count()))
    }

    /// Ranks the sentences with the configured ranker. Inputs longer than
    /// `max_ranked_sentences` are first narrowed to that many candidates by
    /// term frequency, which is linear in the input; the returned indices
    /// still point into `sentences`.
    fn rank(&self, sentences: &[Sentence]) -> Vec<usize> {
        let limit = self.options.max_ranked_sentences.max(1);
        if sentences.len() <= limit {
            return self.ranker.rank(sentences);
        }

        let mut candidates = FrequencyRanker.rank(sentences);
        candidates.truncate(limit);
        candidates.sort_unstable();
        debug!(sentences = sentences.len(), candidates = limit, "narrowed long input before ranking");

        let subset: Vec<Sentence> = candidates.iter().map(|&index| sentences[index].clone()).collect();
        self.ranker
            .rank(&subset)
            .into_iter()
            .map(|position| candidates[position])
            .collect()
    }

    fn study_notes(&self, sentences: &[Sentence], order: &[usize]) -> StudyNotes {
        let overview = self.select(sentences, order, self.options.overview_sentences.max(1), &[]);
        let mut key_points = self.select(sentences, order, self.options.key_point_count, &overview);
        if key_points.is_empty() {
            key_points = overview.clone();
        }

        let key_point_texts = texts(sentences, &key_points);
        StudyNotes {
            overview: texts(sentences, &overview),
            questions: recall_questions(&key_point_texts, self.options.question_count.max(1)),
            key_points: key_point_texts,
        }
    }

    /// Walks the ranking and keeps up to `count` sentences, skipping anything
    /// too similar to a sentence already kept or listed in `exclude`. The
    /// result is in source order.
    fn select(
        &self,
        sentences: &[Sentence],
        order: &[usize],
        count: usize,
        exclude: &[usize],
    ) -> Vec<usize> {
        let mut chosen: Vec<usize> = Vec::with_capacity(count);

        for &candidate in order {
            if chosen.len() >= count {
                break;
            }
            if exclude.contains(&candidate) {
                continue;
            }

            let text = &sentences[candidate].text;
            let redundant = chosen
                .iter()
                .chain(exclude.iter())
                .any(|&kept| jaccard(text, &sentences[kept].text) >= self.options.dedup_threshold);
            if !redundant {
                chosen.push(candidate);
            }
        }

        chosen.sort_unstable_by_key(|&index| sentences[index].index);
        chosen
    }
}

fn texts(sentences: &[Sentence], indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .map(|&index| sentences[index].text.clone())
        .collect()
}

/// Builds review questions from key sentences with a rotating template set.
pub fn recall_questions(key_points: &[String], count: usize) -> Vec<String> {
    key_points
        .iter()
        .take(count)
        .enumerate()
        .map(|(position, sentence)| {
            let template = QUESTION_TEMPLATES[position % QUESTION_TEMPLATES.len()];
            template.replace("{}", &question_topic(sentence))
        })
        .collect()
}

fn question_topic(sentence: &str) -> String {
    let flattened = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut topic: String = flattened.chars().take(QUESTION_TOPIC_CHARS).collect();
    if flattened.chars().count() > QUESTION_TOPIC_CHARS {
        if let Some((head, _)) = topic.rsplit_once(' ') {
            topic = head.to_string();
        }
    }

    let topic = topic.trim_end_matches([' ', '.', ',', ':', ';', '!', '?']);

    // "The method ..." reads better mid-question as "the method ...", but
    // acronyms and names keep their case
    let mut chars = topic.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_lowercase() => {
            first.to_lowercase().chain(topic.chars().skip(1)).collect()
        }
        _ => topic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::RankingAlgorithm;
    use std::time::{Duration, Instant};

    const ARTICLE: &str = "Photosynthesis lets plants turn light into chemical energy. \
        Chlorophyll in the leaves absorbs most of that light. \
        The absorbed energy splits water and releases oxygen. \
        Plants store the captured energy as glucose. \
        Glucose later fuels growth and repair in the plant. \
        Farmers plan crop spacing so every plant gets enough light. \
        Greenhouses extend the growing season in cold regions. \
        Researchers study photosynthesis to design better solar cells. \
        Some bacteria also perform a simpler form of photosynthesis. \
        Without photosynthesis most life on Earth would disappear.";

    fn summarizer(algorithm: RankingAlgorithm) -> LocalSummarizer {
        LocalSummarizer::new(algorithm.ranker(), SummaryOptions::default())
    }

    #[test]
    fn empty_or_blank_input_is_rejected() {
        let local = summarizer(RankingAlgorithm::TextRank);
        for text in ["", "   \n\t  ", "...  !!"] {
            assert!(matches!(
                local.summarize(text, Style::Bullets),
                Err(SummarizeError::EmptyInput)
            ));
        }
    }

    #[test]
    fn every_style_and_ranker_produces_content() {
        let algorithms = [
            RankingAlgorithm::TextRank,
            RankingAlgorithm::Frequency,
            RankingAlgorithm::Lsa,
        ];
        let inputs = [ARTICLE, "One short line", "Tiny. Text."];
        for algorithm in algorithms {
            let local = summarizer(algorithm);
            for style in [Style::Bullets, Style::Abstract, Style::StudyNotes] {
                for input in inputs {
                    let result = local.summarize(input, style).expect("non-empty input");
                    assert!(!result.body.is_empty(), "{algorithm} {style} {input:?}");
                    assert_eq!(result.mode_used, Mode::Local);
                    assert!(result.fallback.is_none());
                }
            }
        }
    }

    #[test]
    fn near_duplicates_are_not_both_selected() {
        let local = summarizer(RankingAlgorithm::TextRank);
        let result = local
            .summarize("The quick fox jumps.\nThe quick fox leaps.", Style::Bullets)
            .unwrap();
        match result.body {
            SummaryBody::Bullets { items } => assert_eq!(items.len(), 1),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn near_duplicates_in_longer_text_are_collapsed() {
        let text = format!("{ARTICLE} Chlorophyll in the leaves absorbs most of this light.");
        let local = LocalSummarizer::new(
            RankingAlgorithm::Frequency.ranker(),
            SummaryOptions {
                bullet_count: 20,
                ..SummaryOptions::default()
            },
        );
        let result = local.summarize(&text, Style::Bullets).unwrap();
        let SummaryBody::Bullets { items } = result.body else {
            panic!("expected bullets");
        };
        let chlorophyll = items.iter().filter(|item| item.starts_with("Chlorophyll")).count();
        assert_eq!(chlorophyll, 1);
        assert_eq!(items.len(), 10);
    }

    #[test]
    fn bullets_keep_source_order_and_count() {
        let local = summarizer(RankingAlgorithm::TextRank);
        let result = local.summarize(ARTICLE, Style::Bullets).unwrap();
        let SummaryBody::Bullets { items } = result.body else {
            panic!("expected bullets");
        };
        assert_eq!(items.len(), 5);
        let positions: Vec<usize> = items
            .iter()
            .map(|item| ARTICLE.find(item.as_str()).expect("sentence comes from the source"))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn abstract_is_a_single_paragraph() {
        let local = summarizer(RankingAlgorithm::Lsa);
        let result = local.summarize(ARTICLE, Style::Abstract).unwrap();
        let SummaryBody::Abstract { paragraph } = result.body else {
            panic!("expected abstract");
        };
        assert!(!paragraph.contains('\n'));
        assert_eq!(split_sentences(&paragraph).len(), 4);
    }

    #[test]
    fn study_notes_have_three_filled_sections() {
        let local = summarizer(RankingAlgorithm::TextRank);
        let result = local.summarize(ARTICLE, Style::StudyNotes).unwrap();
        let SummaryBody::StudyNotes(notes) = result.body else {
            panic!("expected study notes");
        };
        assert_eq!(notes.overview.len(), 2);
        assert_eq!(notes.key_points.len(), 5);
        assert_eq!(notes.questions.len(), 3);
        assert!(notes.key_points.iter().all(|point| !notes.overview.contains(point)));
        assert!(notes.questions.iter().all(|question| question.ends_with('?')));
    }

    #[test]
    fn short_text_study_notes_reuse_overview_for_key_points() {
        let local = summarizer(RankingAlgorithm::TextRank);
        let result = local.summarize("Ownership prevents data races.", Style::StudyNotes).unwrap();
        let SummaryBody::StudyNotes(notes) = result.body else {
            panic!("expected study notes");
        };
        assert_eq!(notes.overview, notes.key_points);
        assert_eq!(
            notes.questions,
            vec!["Why is ownership prevents data races important?".to_string()]
        );
    }

    #[test]
    fn question_topic_is_trimmed_and_lowercased() {
        let questions = recall_questions(
            &[
                "The borrow checker rejects dangling references.".to_string(),
                "NASA launched the probe in 1977.".to_string(),
            ],
            5,
        );
        assert_eq!(
            questions,
            vec![
                "Why is the borrow checker rejects dangling references important?".to_string(),
                "What problem does NASA launched the probe in 1977 address?".to_string(),
            ]
        );
    }

    /// Sentences over a few hundred made-up terms, so that pairs overlap
    /// sparsely the way real prose does.
    fn long_document(sentences: usize) -> String {
        (0..sentences)
            .map(|i| {
                let words: Vec<String> = (0..6).map(|k| format!("w{}", (i * 7 + k * 131) % 401)).collect();
                format!("Report {i} notes {}. ", words.join(" "))
            })
            .collect()
    }

    #[test]
    fn long_inputs_are_narrowed_before_ranking() {
        let text = long_document(40);
        let sentences = split_sentences(&text);
        assert_eq!(sentences.len(), 40);

        let local = LocalSummarizer::new(
            RankingAlgorithm::TextRank.ranker(),
            SummaryOptions {
                max_ranked_sentences: 8,
                ..SummaryOptions::default()
            },
        );
        let order = local.rank(&sentences);
        assert_eq!(order.len(), 8);

        let mut candidates = FrequencyRanker.rank(&sentences);
        candidates.truncate(8);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        candidates.sort_unstable();
        assert_eq!(sorted, candidates);
    }

    #[test]
    fn very_long_input_is_summarized_in_bounded_time() {
        let text = long_document(20_000);
        for algorithm in [
            RankingAlgorithm::TextRank,
            RankingAlgorithm::Frequency,
            RankingAlgorithm::Lsa,
        ] {
            let started = Instant::now();
            let result = summarizer(algorithm).summarize(&text, Style::Bullets).unwrap();
            let elapsed = started.elapsed();

            let SummaryBody::Bullets { items } = result.body else {
                panic!("expected bullets");
            };
            assert_eq!(items.len(), 5, "{algorithm}");
            assert!(elapsed < Duration::from_secs(30), "{algorithm} took {elapsed:?}");
        }
    }
}
