//! Similarity: the scoring hooks shared by weights and the boolean engine

use crate::Score;

/// Scoring hooks consulted by term weights and the boolean coordination
/// logic. Implementations must be deterministic: scores and explanations
/// are expected to reproduce bit-identically.
pub trait Similarity: Send + Sync {
    /// Coordination factor rewarding documents that satisfy `overlap` of the
    /// `max_overlap` non-prohibited clauses.
    fn coord(&self, overlap: usize, max_overlap: usize) -> Score;

    /// Query normalization factor derived from the sum of squared clause
    /// weights.
    fn query_norm(&self, sum_of_squared_weights: Score) -> Score;

    /// Term-frequency score component.
    fn tf(&self, freq: u32) -> Score;

    /// Inverse document frequency score component.
    fn idf(&self, doc_freq: u32, num_docs: u32) -> Score;
}

/// Classic TF-IDF similarity.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSimilarity;

impl Similarity for DefaultSimilarity {
    fn coord(&self, overlap: usize, max_overlap: usize) -> Score {
        overlap as Score / max_overlap as Score
    }

    fn query_norm(&self, sum_of_squared_weights: Score) -> Score {
        1.0 / sum_of_squared_weights.sqrt()
    }

    fn tf(&self, freq: u32) -> Score {
        (freq as Score).sqrt()
    }

    fn idf(&self, doc_freq: u32, num_docs: u32) -> Score {
        (num_docs as Score / (doc_freq as Score + 1.0)).ln() + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_is_overlap_fraction() {
        let sim = DefaultSimilarity;
        assert_eq!(sim.coord(1, 2), 0.5);
        assert_eq!(sim.coord(2, 2), 1.0);
        assert_eq!(sim.coord(0, 4), 0.0);
    }

    #[test]
    fn test_query_norm_of_zero_is_infinite() {
        // callers treat a non-finite norm as 1.0
        let sim = DefaultSimilarity;
        assert!(!sim.query_norm(0.0).is_finite());
    }

    #[test]
    fn test_idf_decreases_with_doc_freq() {
        let sim = DefaultSimilarity;
        assert!(sim.idf(1, 100) > sim.idf(50, 100));
    }
}
