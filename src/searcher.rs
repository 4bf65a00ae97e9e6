//! Searcher: compiles queries against one segment snapshot and runs them
//!
//! The compile pipeline is rewrite-to-fixpoint, weight creation, then
//! query normalization. Weights and their scorers live for one search
//! call only.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::query::{
    Collector, CountCollector, Explanation, Query, SearchResult, TopKCollector, Weight,
    collect_weight,
};
use crate::segment::SegmentReader;
use crate::similarity::{DefaultSimilarity, Similarity};
use crate::DocId;

pub struct Searcher {
    reader: Arc<SegmentReader>,
    similarity: Arc<dyn Similarity>,
}

impl Searcher {
    pub fn new(reader: Arc<SegmentReader>) -> Self {
        Self::with_similarity(reader, Arc::new(DefaultSimilarity))
    }

    pub fn with_similarity(reader: Arc<SegmentReader>, similarity: Arc<dyn Similarity>) -> Self {
        Self { reader, similarity }
    }

    pub fn reader(&self) -> &SegmentReader {
        &self.reader
    }

    pub fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    /// Rewrite `query` until it reaches fixed point. Queries already in
    /// rewritten form are returned unchanged, identity preserved.
    pub fn rewrite(&self, query: Arc<dyn Query>) -> Result<Arc<dyn Query>> {
        let mut current = query;
        while let Some(next) = current.rewrite(&self.reader)? {
            current = next;
        }
        Ok(current)
    }

    /// Compile `query` into a ready-to-score weight: rewrite, build the
    /// weight tree, then push the query normalization factor through it.
    /// A degenerate (non-finite) norm falls back to 1.0.
    pub fn create_normalized_weight(&self, query: Arc<dyn Query>) -> Result<Box<dyn Weight>> {
        let rewritten = self.rewrite(query)?;
        let mut weight = rewritten.create_weight(self)?;
        let sum = weight.sum_of_squared_weights()?;
        let mut norm = self.similarity.query_norm(sum);
        if !norm.is_finite() {
            norm = 1.0;
        }
        weight.normalize(norm);
        Ok(weight)
    }

    /// Top-`limit` results, ordered by descending score then doc id.
    pub fn search(&self, query: Arc<dyn Query>, limit: usize) -> Result<Vec<SearchResult>> {
        let weight = self.create_normalized_weight(query)?;
        let mut collector = TopKCollector::new(limit);
        collect_weight(weight.as_ref(), &self.reader, &mut collector)?;
        Ok(collector.into_sorted_results())
    }

    /// Number of documents matching `query`.
    pub fn count(&self, query: Arc<dyn Query>) -> Result<u64> {
        let weight = self.create_normalized_weight(query)?;
        let mut collector = CountCollector::new();
        collect_weight(weight.as_ref(), &self.reader, &mut collector)?;
        Ok(collector.count())
    }

    /// Run `collector` over every match of `query`.
    pub fn collect(&self, query: Arc<dyn Query>, collector: &mut impl Collector) -> Result<()> {
        let weight = self.create_normalized_weight(query)?;
        collect_weight(weight.as_ref(), &self.reader, collector)
    }

    /// Explain the score of `doc` for `query`.
    pub fn explain(&self, query: Arc<dyn Query>, doc: DocId) -> Result<Explanation> {
        if doc >= self.reader.max_doc() {
            return Err(Error::DocumentNotFound(doc));
        }
        let weight = self.create_normalized_weight(query)?;
        weight.explain(&self.reader, doc)
    }
}
