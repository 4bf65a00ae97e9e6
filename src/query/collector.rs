//! Search result collection
//!
//! Collectors consume the composite scorer's ascending document stream.
//! The caller pulls synchronously; abandoning a search is just dropping
//! the scorer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::segment::SegmentReader;
use crate::{DocId, Score, TERMINATED};

use super::{DocSet, Weight};

/// A matching document with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub score: Score,
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.doc_id == other.doc_id
    }
}

impl Eq for SearchResult {}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: the heap keeps the lowest-scoring result on top
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Consumes matching documents in ascending doc-id order.
pub trait Collector {
    fn collect(&mut self, doc_id: DocId, score: Score);
}

/// Keeps the k highest-scoring results, doc id as tiebreak.
pub struct TopKCollector {
    heap: BinaryHeap<SearchResult>,
    k: usize,
    total_seen: u32,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k + 1),
            k,
            total_seen: 0,
        }
    }

    /// Total number of documents scored by this collector.
    pub fn total_seen(&self) -> u32 {
        self.total_seen
    }

    pub fn into_sorted_results(self) -> Vec<SearchResult> {
        let mut results: Vec<_> = self.heap.into_vec();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        results
    }
}

impl Collector for TopKCollector {
    fn collect(&mut self, doc_id: DocId, score: Score) {
        self.total_seen += 1;
        if self.heap.len() < self.k {
            self.heap.push(SearchResult { doc_id, score });
        } else if let Some(min) = self.heap.peek() {
            if score > min.score {
                self.heap.pop();
                self.heap.push(SearchResult { doc_id, score });
            }
        }
    }
}

/// Counts all matching documents.
#[derive(Default)]
pub struct CountCollector {
    count: u64,
}

impl CountCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Collector for CountCollector {
    #[inline]
    fn collect(&mut self, _doc_id: DocId, _score: Score) {
        self.count += 1;
    }
}

/// Drive a weight's scorer to exhaustion, feeding every match to the
/// collector. A weight with no scorer yields an empty (non-error) result.
pub fn collect_weight(
    weight: &dyn Weight,
    reader: &SegmentReader,
    collector: &mut impl Collector,
) -> Result<()> {
    let Some(mut scorer) = weight.scorer(reader)? else {
        return Ok(());
    };
    let mut doc = scorer.doc();
    while doc != TERMINATED {
        collector.collect(doc, scorer.score());
        doc = scorer.advance();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_collector() {
        let mut collector = TopKCollector::new(3);
        collector.collect(0, 1.0);
        collector.collect(1, 3.0);
        collector.collect(2, 2.0);
        collector.collect(3, 4.0);
        collector.collect(4, 0.5);

        assert_eq!(collector.total_seen(), 5);
        let results = collector.into_sorted_results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].doc_id, 3); // score 4.0
        assert_eq!(results[1].doc_id, 1); // score 3.0
        assert_eq!(results[2].doc_id, 2); // score 2.0
    }

    #[test]
    fn test_top_k_tiebreak_by_doc_id() {
        let mut collector = TopKCollector::new(2);
        collector.collect(7, 1.0);
        collector.collect(3, 1.0);
        let results = collector.into_sorted_results();
        assert_eq!(results[0].doc_id, 3);
        assert_eq!(results[1].doc_id, 7);
    }

    #[test]
    fn test_count_collector() {
        let mut collector = CountCollector::new();
        collector.collect(0, 1.0);
        collector.collect(1, 2.0);
        assert_eq!(collector.count(), 2);
    }
}
