//! Extractive sentence rankers. Each one scores sentences and returns their
//! indices from most to least representative.

use crate::sentences::{content_tokens, tokens, Sentence};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub trait SentenceRanker: Send + Sync {
    /// Indices into `sentences`, best first. Always a permutation of
    /// `0..sentences.len()`.
    fn rank(&self, sentences: &[Sentence]) -> Vec<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingAlgorithm {
    #[default]
    TextRank,
    Frequency,
    Lsa,
}

impl RankingAlgorithm {
    pub fn ranker(&self) -> Box<dyn SentenceRanker> {
        match self {
            Self::TextRank => Box::new(TextRankRanker::default()),
            Self::Frequency => Box::new(FrequencyRanker),
            Self::Lsa => Box::new(LsaRanker::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextRank => "text-rank",
            Self::Frequency => "frequency",
            Self::Lsa => "lsa",
        }
    }
}

impl FromStr for RankingAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text-rank" | "textrank" | "lexrank" | "lex-rank" => Ok(Self::TextRank),
            "frequency" | "tfidf" | "tf-idf" => Ok(Self::Frequency),
            "lsa" => Ok(Self::Lsa),
            other => Err(format!(
                "unknown ranking algorithm {other:?} (expected text-rank, frequency or lsa)"
            )),
        }
    }
}

impl fmt::Display for RankingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph centrality ranking in the TextRank/LexRank family: sentences are
/// nodes, edges carry the TF-IDF cosine similarity, and scores come from a
/// damped power iteration over the row-normalized graph.
#[derive(Debug, Clone)]
pub struct TextRankRanker {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Similarities at or below this value do not create an edge.
    pub edge_threshold: f64,
}

impl Default for TextRankRanker {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            edge_threshold: 0.05,
        }
    }
}

impl SentenceRanker for TextRankRanker {
    fn rank(&self, sentences: &[Sentence]) -> Vec<usize> {
        let n = sentences.len();
        if n < 2 {
            return (0..n).collect();
        }

        let vectors = tfidf_vectors(&sentence_terms(sentences));
        let edges = similarity_graph(&vectors, self.edge_threshold);

        let out_degree: Vec<f64> = edges
            .iter()
            .map(|row| row.iter().map(|(_, weight)| weight).sum())
            .collect();
        let uniform = 1.0 / n as f64;
        let mut scores = vec![uniform; n];

        for _ in 0..self.max_iterations {
            // mass of sentences without edges is spread evenly
            let dangling: f64 = (0..n)
                .filter(|&j| out_degree[j] == 0.0)
                .map(|j| scores[j])
                .sum::<f64>()
                * uniform;

            // the graph is undirected, so a node's neighbours are its in-edges
            let next: Vec<f64> = edges
                .iter()
                .map(|row| {
                    let incoming: f64 = row
                        .iter()
                        .map(|&(j, weight)| weight / out_degree[j] * scores[j])
                        .sum();
                    (1.0 - self.damping) * uniform + self.damping * (incoming + dangling)
                })
                .collect();

            let delta: f64 = next
                .iter()
                .zip(scores.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            scores = next;
            if delta < self.tolerance {
                break;
            }
        }

        order_by_score(&scores)
    }
}

/// Corpus-statistics ranking: a sentence scores the mean TF-IDF weight of its
/// content words, so sentences dense in the document's recurring vocabulary
/// rise to the top.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyRanker;

impl SentenceRanker for FrequencyRanker {
    fn rank(&self, sentences: &[Sentence]) -> Vec<usize> {
        let terms = sentence_terms(sentences);
        let mut frequency: HashMap<&str, f64> = HashMap::new();
        for term in terms.iter().flatten() {
            *frequency.entry(term.as_str()).or_default() += 1.0;
        }
        let max_frequency = frequency.values().copied().fold(0.0, f64::max);
        let idf = inverse_document_frequency(&terms);

        let scores: Vec<f64> = terms
            .iter()
            .map(|sentence_terms| {
                if sentence_terms.is_empty() || max_frequency == 0.0 {
                    return 0.0;
                }
                let total: f64 = sentence_terms
                    .iter()
                    .map(|term| {
                        let tf = frequency.get(term.as_str()).copied().unwrap_or_default() / max_frequency;
                        tf * idf.get(term.as_str()).copied().unwrap_or(1.0)
                    })
                    .sum();
                total / sentence_terms.len() as f64
            })
            .collect();

        order_by_score(&scores)
    }
}

/// Latent semantic analysis over the term-by-sentence count matrix. The
/// matrix is decomposed with power iteration; the sentence that loads most
/// on each singular direction is taken first (strongest topic first), and
/// the rest follow by the length of their vector in the reduced space,
/// weighted by the singular values.
#[derive(Debug, Clone)]
pub struct LsaRanker {
    pub dimensions: usize,
    pub iterations: usize,
}

impl Default for LsaRanker {
    fn default() -> Self {
        Self {
            dimensions: 3,
            iterations: 100,
        }
    }
}

impl SentenceRanker for LsaRanker {
    fn rank(&self, sentences: &[Sentence]) -> Vec<usize> {
        let n = sentences.len();
        if n < 2 {
            return (0..n).collect();
        }

        let columns = count_vectors(&sentence_terms(sentences));

        // eigenpairs of AᵀA are the squared singular values of A and its
        // right singular vectors; the product is taken through the sparse
        // columns so AᵀA is never materialized
        let mut found: Vec<(f64, Vec<f64>)> = Vec::new();
        let mut leaders: Vec<usize> = Vec::new();
        let mut scores = vec![0.0f64; n];
        for _ in 0..self.dimensions.min(n) {
            let (eigenvalue, vector) = dominant_eigenpair(n, self.iterations, |vector| {
                deflated_gram_product(&columns, &found, vector)
            });
            if eigenvalue <= f64::EPSILON {
                break;
            }

            let leader = (0..n)
                .filter(|index| !leaders.contains(index))
                .max_by(|&left, &right| {
                    vector[left]
                        .abs()
                        .total_cmp(&vector[right].abs())
                        .then_with(|| right.cmp(&left))
                });
            if let Some(leader) = leader {
                leaders.push(leader);
            }

            for (score, component) in scores.iter_mut().zip(vector.iter()) {
                *score += eigenvalue * component * component;
            }
            found.push((eigenvalue, vector));
        }

        let scores: Vec<f64> = scores.into_iter().map(|score| score.max(0.0).sqrt()).collect();
        let mut order = leaders.clone();
        order.extend(
            order_by_score(&scores)
                .into_iter()
                .filter(|index| !leaders.contains(index)),
        );
        order
    }
}

fn dominant_eigenpair(
    n: usize,
    iterations: usize,
    multiply: impl Fn(&[f64]) -> Vec<f64>,
) -> (f64, Vec<f64>) {
    // slightly uneven start so the iteration is not orthogonal to the answer
    let mut vector: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 * 1e-3).collect();
    normalize(&mut vector);

    for _ in 0..iterations {
        let mut next = multiply(&vector);
        if normalize(&mut next) == 0.0 {
            return (0.0, vector);
        }
        let delta: f64 = next.iter().zip(vector.iter()).map(|(a, b)| (a - b).abs()).sum();
        vector = next;
        if delta < 1e-10 {
            break;
        }
    }

    let projected = multiply(&vector);
    (dot_dense(&projected, &vector), vector)
}

/// `(AᵀA - Σ λ v vᵀ) x` for the term-by-sentence matrix `A` given by its
/// sparse columns, with the eigenpairs already found deflated out.
fn deflated_gram_product(
    columns: &[SparseVector],
    found: &[(f64, Vec<f64>)],
    x: &[f64],
) -> Vec<f64> {
    let mut combined: HashMap<&str, f64> = HashMap::new();
    for (column, &weight) in columns.iter().zip(x) {
        if weight == 0.0 {
            continue;
        }
        for (term, count) in column {
            *combined.entry(term.as_str()).or_default() += weight * count;
        }
    }

    let mut product: Vec<f64> = columns
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|(term, count)| count * combined.get(term.as_str()).copied().unwrap_or_default())
                .sum()
        })
        .collect();

    for (eigenvalue, direction) in found {
        let projection = eigenvalue * dot_dense(direction, x);
        for (value, component) in product.iter_mut().zip(direction) {
            *value -= projection * component;
        }
    }
    product
}

fn normalize(vector: &mut [f64]) -> f64 {
    let magnitude = vector.iter().map(|value| value * value).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
    magnitude
}

fn dot_dense(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right.iter()).map(|(a, b)| a * b).sum()
}

/// Content words per sentence, falling back to every token for sentences
/// made only of stop words.
fn sentence_terms(sentences: &[Sentence]) -> Vec<Vec<String>> {
    sentences
        .iter()
        .map(|sentence| {
            let content = content_tokens(&sentence.text);
            if content.is_empty() {
                tokens(&sentence.text)
            } else {
                content
            }
        })
        .collect()
}

fn inverse_document_frequency(terms: &[Vec<String>]) -> HashMap<&str, f64> {
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for sentence_terms in terms {
        let mut seen: Vec<&str> = sentence_terms.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *document_frequency.entry(term).or_default() += 1;
        }
    }

    let total = terms.len() as f64;
    document_frequency
        .into_iter()
        .map(|(term, count)| (term, (1.0 + total / count as f64).ln()))
        .collect()
}

type SparseVector = HashMap<String, f64>;

fn count_vectors(terms: &[Vec<String>]) -> Vec<SparseVector> {
    terms
        .iter()
        .map(|sentence_terms| {
            let mut vector = SparseVector::new();
            for term in sentence_terms {
                *vector.entry(term.clone()).or_default() += 1.0;
            }
            vector
        })
        .collect()
}

fn tfidf_vectors(terms: &[Vec<String>]) -> Vec<SparseVector> {
    let idf = inverse_document_frequency(terms);
    let mut vectors = count_vectors(terms);
    for vector in vectors.iter_mut() {
        for (term, weight) in vector.iter_mut() {
            *weight *= idf.get(term.as_str()).copied().unwrap_or(1.0);
        }
    }
    vectors
}

fn dot(left: &SparseVector, right: &SparseVector) -> f64 {
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum()
}

/// Undirected similarity graph as adjacency lists sorted by neighbour.
/// Only sentence pairs that share a term are compared, through an inverted
/// index from term to the sentences containing it.
fn similarity_graph(vectors: &[SparseVector], threshold: f64) -> Vec<Vec<(usize, f64)>> {
    let mut postings: HashMap<&str, Vec<(usize, f64)>> = HashMap::new();
    for (index, vector) in vectors.iter().enumerate() {
        for (term, weight) in vector {
            postings.entry(term.as_str()).or_default().push((index, *weight));
        }
    }
    let norms: Vec<f64> = vectors.iter().map(|vector| dot(vector, vector).sqrt()).collect();

    let mut edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); vectors.len()];
    for (i, vector) in vectors.iter().enumerate() {
        if norms[i] == 0.0 {
            continue;
        }
        let mut products: HashMap<usize, f64> = HashMap::new();
        for (term, weight) in vector {
            let Some(sharing) = postings.get(term.as_str()) else {
                continue;
            };
            for &(j, other) in sharing.iter().filter(|(j, _)| *j > i) {
                *products.entry(j).or_default() += weight * other;
            }
        }

        for (j, product) in products {
            if norms[j] == 0.0 {
                continue;
            }
            let similarity = product / (norms[i] * norms[j]);
            if similarity > threshold {
                edges[i].push((j, similarity));
                edges[j].push((i, similarity));
            }
        }
    }

    for row in edges.iter_mut() {
        row.sort_unstable_by_key(|&(j, _)| j);
    }
    edges
}

/// Indices sorted by descending score; ties keep source order.
fn order_by_score(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&left, &right| {
        scores[right]
            .total_cmp(&scores[left])
            .then_with(|| left.cmp(&right))
    });
    order
}
