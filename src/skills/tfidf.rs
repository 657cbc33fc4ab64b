// TF-IDF vectorizer over normalized skill lists.
//
// Each posting is one document and each normalized skill is one term, so
// "machine learning" is a single feature rather than two words. IDF is
// smoothed as if one extra document contained every term:
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// and every vector is L2-normalized, which keeps postings with long skill
// lists comparable to postings with short ones under Euclidean k-means.
//
// The vocabulary is frozen at fit time. transform() never adds terms; a
// token the model has not seen simply contributes nothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillmatchError};

/// Sparse TF-IDF vector: (vocabulary index, weight) pairs sorted by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|&(_, w)| w == 0.0)
    }

    pub fn norm_squared(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum()
    }

    /// Squared Euclidean distance to a dense point.
    pub fn distance_squared(&self, dense: &[f64]) -> f64 {
        let dense_norm: f64 = dense.iter().map(|c| c * c).sum();
        let cross: f64 = self
            .entries
            .iter()
            .map(|&(i, w)| {
                let c = dense.get(i).copied().unwrap_or(0.0);
                w * w - 2.0 * w * c
            })
            .sum();
        (dense_norm + cross).max(0.0)
    }

    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut dense = vec![0.0; dim];
        for &(i, w) in &self.entries {
            if i < dim {
                dense[i] = w;
            }
        }
        dense
    }

    /// Bit-level identity key, used to count distinct points.
    pub fn identity_key(&self) -> Vec<(usize, u64)> {
        self.entries.iter().map(|&(i, w)| (i, w.to_bits())).collect()
    }
}

/// Fitted vectorizer state: the frozen vocabulary and its IDF weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary in lexicographic order; a term's position is its feature index.
    terms: Vec<String>,
    /// Smoothed IDF, parallel to `terms`.
    idf: Vec<f64>,
    /// Number of documents seen at fit time.
    document_count: usize,
}

impl TfIdfVectorizer {
    /// Build the vocabulary and IDF weights from a training corpus and return
    /// the TF-IDF vector of every document, in corpus order.
    pub fn fit(corpus: &[Vec<String>]) -> Result<(Self, Vec<FeatureVector>)> {
        if corpus.is_empty() {
            return Err(SkillmatchError::config(
                "cannot fit vectorizer on an empty corpus",
            ));
        }

        let terms: Vec<String> = corpus
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if terms.is_empty() {
            return Err(SkillmatchError::config(
                "training corpus contains no skill tokens",
            ));
        }

        let mut document_frequency = vec![0usize; terms.len()];
        for doc in corpus {
            let present: BTreeSet<&str> = doc.iter().map(String::as_str).collect();
            for token in present {
                if let Ok(idx) = terms.binary_search_by(|t| t.as_str().cmp(token)) {
                    document_frequency[idx] += 1;
                }
            }
        }

        let n = corpus.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectorizer = Self {
            terms,
            idf,
            document_count: corpus.len(),
        };
        let vectors = corpus.iter().map(|doc| vectorizer.transform(doc)).collect();
        Ok((vectorizer, vectors))
    }

    /// Vectorize one skill list against the frozen vocabulary.
    pub fn transform(&self, skills: &[String]) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in skills {
            if let Some(idx) = self.index_of(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let norm = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }

        FeatureVector { entries }
    }

    /// Check the invariants transform() relies on: one finite IDF weight per
    /// term and a strictly ascending vocabulary for binary search.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.idf.len() != self.terms.len() {
            return Err(format!(
                "{} idf weights for {} terms",
                self.idf.len(),
                self.terms.len()
            ));
        }
        if let Some(pair) = self.terms.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "vocabulary is not strictly sorted at {:?} / {:?}",
                pair[0], pair[1]
            ));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err("idf weights must be finite".to_string());
        }
        Ok(())
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(token)).ok()
    }

    /// Number of features (vocabulary size).
    pub fn dim(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// The `n` highest-weighted terms of a dense vector (e.g. a centroid).
    /// Zero weights are never reported.
    pub fn top_terms(&self, dense: &[f64], n: usize) -> Vec<(String, f64)> {
        let mut weighted: Vec<(usize, f64)> = dense
            .iter()
            .copied()
            .enumerate()
            .filter(|&(i, w)| w > 0.0 && i < self.terms.len())
            .collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        weighted
            .into_iter()
            .take(n)
            .map(|(i, w)| (self.terms[i].clone(), w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_deduplicated() {
        let corpus = vec![doc(&["sql", "python"]), doc(&["java", "python"])];
        let (vectorizer, _) = TfIdfVectorizer::fit(&corpus).unwrap();
        assert_eq!(vectorizer.terms(), &["java", "python", "sql"]);
        assert_eq!(vectorizer.document_count(), 2);
    }

    #[test]
    fn test_smoothed_idf_values() {
        let corpus = vec![doc(&["python"]), doc(&["python", "sql"])];
        let (vectorizer, _) = TfIdfVectorizer::fit(&corpus).unwrap();
        // python appears in both documents: ln(3/3) + 1
        assert!((vectorizer.idf()[0] - 1.0).abs() < 1e-12);
        // sql appears in one: ln(3/2) + 1
        assert!((vectorizer.idf()[1] - ((1.5f64).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let corpus = vec![doc(&["python", "sql", "sql"]), doc(&["java"])];
        let (_, vectors) = TfIdfVectorizer::fit(&corpus).unwrap();
        for v in &vectors {
            assert!((v.norm_squared() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_out_of_vocabulary_is_zero_vector() {
        let corpus = vec![doc(&["python"]), doc(&["java"])];
        let (vectorizer, _) = TfIdfVectorizer::fit(&corpus).unwrap();
        let v = vectorizer.transform(&doc(&["cobol", "fortran"]));
        assert!(v.is_zero());
        assert_eq!(vectorizer.dim(), 2);
    }

    #[test]
    fn test_transform_ignores_unknown_but_keeps_known() {
        let corpus = vec![doc(&["python"]), doc(&["java"])];
        let (vectorizer, _) = TfIdfVectorizer::fit(&corpus).unwrap();
        let v = vectorizer.transform(&doc(&["python", "cobol"]));
        assert_eq!(v.entries().len(), 1);
        assert_eq!(v.entries()[0].0, vectorizer.index_of("python").unwrap());
    }

    #[test]
    fn test_fitted_vectorizer_validates() {
        let corpus = vec![doc(&["sql", "python"]), doc(&["java"])];
        let (vectorizer, _) = TfIdfVectorizer::fit(&corpus).unwrap();
        assert!(vectorizer.validate().is_ok());

        let mut short = vectorizer.clone();
        short.idf.pop();
        assert!(short.validate().is_err());

        let mut unsorted = vectorizer;
        unsorted.terms.swap(0, 2);
        assert!(unsorted.validate().unwrap_err().contains("sorted"));
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        assert!(TfIdfVectorizer::fit(&[]).is_err());
        assert!(TfIdfVectorizer::fit(&[doc(&[])]).is_err());
    }

    #[test]
    fn test_top_terms_orders_by_weight() {
        let corpus = vec![doc(&["a", "b", "c"])];
        let (vectorizer, _) = TfIdfVectorizer::fit(&corpus).unwrap();
        let top = vectorizer.top_terms(&[0.1, 0.0, 0.7], 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "c");
        assert_eq!(top[1].0, "a");
    }

    #[test]
    fn test_distance_matches_dense_computation() {
        let corpus = vec![doc(&["a", "b"]), doc(&["b", "c"])];
        let (_, vectors) = TfIdfVectorizer::fit(&corpus).unwrap();
        let point = [0.3, -0.2, 0.5];
        let dense = vectors[0].to_dense(3);
        let expected: f64 = dense
            .iter()
            .zip(point.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        assert!((vectors[0].distance_squared(&point) - expected).abs() < 1e-12);
    }
}
