// TF-IDF term matrix construction.
//
// Each record is one document. Terms are unigrams and bigrams over the
// record's tokens with English stop words removed; the vocabulary keeps
// the `max_features` most frequent terms across the whole batch, with
// frequency ties broken lexicographically so vocabulary selection never
// depends on row order. Weights are term frequency times smoothed
// inverse document frequency, and every row is L2-normalized.
//
// The vocabulary is batch-specific: nothing here is persisted or reused
// across batches.

use std::collections::{HashMap, HashSet};

use stop_words::{get, LANGUAGE};
use tracing::debug;

/// Sparse term-weight matrix: one entry list per record, each sorted by
/// column index. Column j corresponds to `vocabulary[j]`.
#[derive(Debug, Clone)]
pub struct TermMatrix {
    /// Per-row (column, weight) pairs, sorted by column
    pub rows: Vec<Vec<(usize, f64)>>,
    /// Column index → term. Lexicographically ordered.
    pub vocabulary: Vec<String>,
}

impl TermMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }
}

/// TF-IDF vectorizer over unigrams and bigrams.
pub struct TfidfVectorizer {
    /// Maximum vocabulary size
    pub max_features: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self { max_features: 2000 }
    }
}

impl TfidfVectorizer {
    /// Build the term matrix for a batch of texts.
    ///
    /// Always returns one row per input text. A batch where no text
    /// yields any token produces a valid zero-column matrix rather than
    /// failing — the reducer and fuser handle that downstream.
    pub fn fit_transform(&self, texts: &[String]) -> TermMatrix {
        let stop_set: HashSet<String> = get(LANGUAGE::English).into_iter().collect();

        // Terms per document (with repeats — these are occurrence lists)
        let doc_terms: Vec<Vec<String>> = texts
            .iter()
            .map(|text| extract_terms(text, &stop_set))
            .collect();

        // Global term frequency across the batch
        let mut corpus_counts: HashMap<&str, u64> = HashMap::new();
        for terms in &doc_terms {
            for term in terms {
                *corpus_counts.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        // Vocabulary: top max_features by frequency, ties lexicographic,
        // columns in lexicographic order
        let mut ranked: Vec<(&str, u64)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(j, t)| (t.as_str(), j))
            .collect();

        // Document frequency per vocabulary term
        let mut df = vec![0u64; vocabulary.len()];
        for terms in &doc_terms {
            let unique: HashSet<usize> = terms
                .iter()
                .filter_map(|t| index.get(t.as_str()).copied())
                .collect();
            for j in unique {
                df[j] += 1;
            }
        }

        // Smoothed IDF: ln((1 + n) / (1 + df)) + 1
        let n_docs = texts.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        // TF-IDF rows, L2-normalized
        let rows: Vec<Vec<(usize, f64)>> = doc_terms
            .iter()
            .map(|terms| {
                let mut tf: HashMap<usize, f64> = HashMap::new();
                for term in terms {
                    if let Some(&j) = index.get(term.as_str()) {
                        *tf.entry(j).or_insert(0.0) += 1.0;
                    }
                }

                let mut entries: Vec<(usize, f64)> =
                    tf.into_iter().map(|(j, count)| (j, count * idf[j])).collect();
                entries.sort_by_key(|&(j, _)| j);

                let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for entry in &mut entries {
                        entry.1 /= norm;
                    }
                }
                entries
            })
            .collect();

        debug!(
            rows = rows.len(),
            terms = vocabulary.len(),
            "Built TF-IDF term matrix"
        );

        TermMatrix { rows, vocabulary }
    }
}

/// Tokenize one text and expand to unigrams + bigrams.
///
/// Tokens are lowercased alphanumeric runs of at least two characters
/// with stop words removed; bigrams join adjacent surviving tokens.
fn extract_terms(text: &str, stop_set: &HashSet<String>) -> Vec<String> {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2 && !stop_set.contains(*t))
        .map(str::to_string)
        .collect();

    let mut terms = tokens.clone();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_row_per_text() {
        let matrix = TfidfVectorizer::default().fit_transform(&texts(&[
            "bullish breakout today",
            "bearish crash fears",
            "",
        ]));
        assert_eq!(matrix.n_rows(), 3);
        assert!(matrix.rows[2].is_empty(), "empty text gets an empty row");
    }

    #[test]
    fn includes_bigrams() {
        let matrix =
            TfidfVectorizer::default().fit_transform(&texts(&["bullish breakout", "bullish run"]));
        assert!(matrix
            .vocabulary
            .iter()
            .any(|t| t == "bullish breakout"));
    }

    #[test]
    fn removes_stop_words() {
        let matrix =
            TfidfVectorizer::default().fit_transform(&texts(&["the market and the index"]));
        assert!(!matrix.vocabulary.iter().any(|t| t == "the"));
        assert!(matrix.vocabulary.iter().any(|t| t == "market"));
    }

    #[test]
    fn max_features_caps_vocabulary() {
        let vectorizer = TfidfVectorizer { max_features: 3 };
        let matrix = vectorizer.fit_transform(&texts(&[
            "alpha beta gamma delta epsilon",
            "alpha beta gamma delta",
            "alpha beta gamma",
        ]));
        assert_eq!(matrix.n_terms(), 3);
    }

    #[test]
    fn frequency_ties_break_lexicographically() {
        // Every term appears exactly once; with max_features = 2 the
        // vocabulary must be the two lexicographically smallest terms.
        let vectorizer = TfidfVectorizer { max_features: 2 };
        let matrix = vectorizer.fit_transform(&texts(&["zebra yak aardvark"]));
        // Unigrams: zebra, yak, aardvark; bigrams: "zebra yak", "yak aardvark"
        assert_eq!(matrix.vocabulary, vec!["aardvark", "yak aardvark"]);
    }

    #[test]
    fn rows_are_l2_normalized() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&texts(&["bullish breakout today", "bearish crash fears"]));
        for row in &matrix.rows {
            let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "row norm was {norm}");
        }
    }

    #[test]
    fn all_empty_texts_yield_zero_column_matrix() {
        let matrix = TfidfVectorizer::default().fit_transform(&texts(&["", "", ""]));
        assert_eq!(matrix.n_rows(), 3);
        assert_eq!(matrix.n_terms(), 0);
    }

    #[test]
    fn deterministic_for_same_input() {
        let input = texts(&[
            "bullish breakout today volume rising",
            "bearish crash fears intraday",
            "market chatter neutral session",
        ]);
        let a = TfidfVectorizer::default().fit_transform(&input);
        let b = TfidfVectorizer::default().fit_transform(&input);
        assert_eq!(a.vocabulary, b.vocabulary);
        for (ra, rb) in a.rows.iter().zip(&b.rows) {
            assert_eq!(ra.len(), rb.len());
            for ((ja, wa), (jb, wb)) in ra.iter().zip(rb) {
                assert_eq!(ja, jb);
                assert_eq!(wa.to_bits(), wb.to_bits(), "weights must be bit-identical");
            }
        }
    }
}
