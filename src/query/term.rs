//! Term query - matches documents containing a specific term
//!
//! The leaf query of the engine. Its weight carries the classic TF-IDF
//! value chain: `query_weight = idf * boost`, squared into the query
//! normalization sum, then multiplied by the norm, and finally combined
//! with the per-document term frequency at scoring time.

use std::any::Any;
use std::hash::Hasher;
use std::sync::Arc;

use crate::error::Result;
use crate::searcher::Searcher;
use crate::segment::{Field, PostingIterator, SegmentReader};
use crate::similarity::Similarity;
use crate::{DocId, Score};

use super::docset::DocSet;
use super::explanation::Explanation;
use super::{Query, Scorer, Weight};

/// Term query - matches documents containing a specific term.
#[derive(Debug, Clone)]
pub struct TermQuery {
    pub field: Field,
    pub term: Vec<u8>,
    boost: Score,
}

impl TermQuery {
    pub fn new(field: Field, term: impl Into<Vec<u8>>) -> Self {
        Self {
            field,
            term: term.into(),
            boost: 1.0,
        }
    }

    pub fn text(field: Field, text: &str) -> Self {
        Self::new(field, text.to_lowercase().into_bytes())
    }

    pub fn set_boost(&mut self, boost: Score) {
        self.boost = boost;
    }
}

impl Query for TermQuery {
    fn boost(&self) -> Score {
        self.boost
    }

    fn with_boost(&self, boost: Score) -> Arc<dyn Query> {
        let mut clone = self.clone();
        clone.boost = boost;
        Arc::new(clone)
    }

    fn create_weight(&self, searcher: &Searcher) -> Result<Box<dyn Weight>> {
        let reader = searcher.reader();
        let idf = searcher
            .similarity()
            .idf(reader.doc_freq(self.field, &self.term), reader.num_docs());
        Ok(Box::new(TermWeight {
            field: self.field,
            term: self.term.clone(),
            boost: self.boost,
            similarity: Arc::clone(searcher.similarity()),
            idf,
            query_weight: idf * self.boost,
            query_norm: 1.0,
        }))
    }

    fn to_query_string(&self, default_field: Option<Field>) -> String {
        let term = String::from_utf8_lossy(&self.term);
        let mut out = if default_field == Some(self.field) {
            term.into_owned()
        } else {
            format!("{}:{}", self.field.0, term)
        };
        if self.boost != 1.0 {
            out.push_str(&format!("^{}", self.boost));
        }
        out
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Query) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            self.field == other.field
                && self.term == other.term
                && self.boost.to_bits() == other.boost.to_bits()
        })
    }

    fn dyn_hash(&self, state: &mut dyn Hasher) {
        state.write_u32(self.field.0);
        state.write(&self.term);
        state.write_u32(self.boost.to_bits());
    }
}

struct TermWeight {
    field: Field,
    term: Vec<u8>,
    boost: Score,
    similarity: Arc<dyn Similarity>,
    idf: Score,
    query_weight: Score,
    query_norm: Score,
}

impl TermWeight {
    /// Per-match score factor: query weight times idf (idf contributes to
    /// both the query and the field side of the product).
    fn value(&self) -> Score {
        self.query_weight * self.idf
    }

    fn query_string(&self) -> String {
        TermQuery {
            field: self.field,
            term: self.term.clone(),
            boost: self.boost,
        }
        .to_query_string(None)
    }
}

impl Weight for TermWeight {
    fn sum_of_squared_weights(&mut self) -> Result<Score> {
        self.query_weight = self.idf * self.boost;
        Ok(self.query_weight * self.query_weight)
    }

    fn normalize(&mut self, norm: Score) {
        self.query_norm = norm;
        self.query_weight *= norm;
    }

    fn scorer(&self, reader: &SegmentReader) -> Result<Option<Box<dyn Scorer>>> {
        match reader.postings(self.field, &self.term) {
            Some(list) => Ok(Some(Box::new(TermScorer {
                iterator: PostingIterator::new(list),
                weight_value: self.value(),
                similarity: Arc::clone(&self.similarity),
            }))),
            None => Ok(None),
        }
    }

    fn explain(&self, reader: &SegmentReader, doc: DocId) -> Result<Explanation> {
        let Some(list) = reader.postings(self.field, &self.term) else {
            return Ok(Explanation::no_match(format!(
                "no matching term ({})",
                self.query_string()
            )));
        };
        let mut it = PostingIterator::new(list);
        if it.seek(doc) != doc {
            return Ok(Explanation::no_match(format!(
                "no match in doc {} ({})",
                doc,
                self.query_string()
            )));
        }
        let freq = it.term_freq();
        let tf = self.similarity.tf(freq);
        let value = tf * self.value();
        Ok(Explanation::matched(
            value,
            format!("weight({} in {}), product of:", self.query_string(), doc),
        )
        .with_detail(Explanation::matched(tf, format!("tf(freq={})", freq)))
        .with_detail(Explanation::matched(self.idf, format!("idf({})", self.idf)))
        .with_detail(Explanation::matched(
            self.query_weight,
            format!("queryWeight(norm={})", self.query_norm),
        )))
    }
}

struct TermScorer {
    iterator: PostingIterator,
    weight_value: Score,
    similarity: Arc<dyn Similarity>,
}

impl DocSet for TermScorer {
    fn doc(&self) -> DocId {
        self.iterator.doc()
    }

    fn advance(&mut self) -> DocId {
        self.iterator.advance()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        self.iterator.seek(target)
    }

    fn size_hint(&self) -> u32 {
        self.iterator.size_hint()
    }
}

impl Scorer for TermScorer {
    fn score(&self) -> Score {
        self.similarity.tf(self.iterator.term_freq()) * self.weight_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TERMINATED;
    use crate::query::collector::collect_weight;
    use crate::query::{CountCollector, TopKCollector};

    const BODY: Field = Field(0);

    fn searcher() -> Searcher {
        let mut builder = SegmentReader::builder();
        builder.add_document(&[(BODY, "cat dog")]);
        builder.add_document(&[(BODY, "cat cat")]);
        builder.add_document(&[(BODY, "fish")]);
        Searcher::new(Arc::new(builder.build()))
    }

    #[test]
    fn test_term_scorer_iterates_matches() {
        let searcher = searcher();
        let weight = TermQuery::text(BODY, "cat")
            .create_weight(&searcher)
            .unwrap();
        let mut scorer = weight.scorer(searcher.reader()).unwrap().unwrap();
        assert_eq!(scorer.doc(), 0);
        assert_eq!(scorer.advance(), 1);
        assert_eq!(scorer.advance(), TERMINATED);
    }

    #[test]
    fn test_missing_term_has_no_scorer() {
        let searcher = searcher();
        let weight = TermQuery::text(BODY, "missing")
            .create_weight(&searcher)
            .unwrap();
        assert!(weight.scorer(searcher.reader()).unwrap().is_none());
    }

    #[test]
    fn test_higher_freq_scores_higher() {
        let searcher = searcher();
        let weight = TermQuery::text(BODY, "cat")
            .create_weight(&searcher)
            .unwrap();
        let mut scorer = weight.scorer(searcher.reader()).unwrap().unwrap();
        let doc0 = scorer.score();
        scorer.advance();
        let doc1 = scorer.score();
        assert!(doc1 > doc0);
    }

    #[test]
    fn test_explain_matches_score() {
        let searcher = searcher();
        let weight = TermQuery::text(BODY, "cat")
            .create_weight(&searcher)
            .unwrap();
        let scorer = weight.scorer(searcher.reader()).unwrap().unwrap();
        let explanation = weight.explain(searcher.reader(), 0).unwrap();
        assert!(explanation.is_match());
        assert_eq!(explanation.value(), scorer.score());
    }

    #[test]
    fn test_explain_non_match() {
        let searcher = searcher();
        let weight = TermQuery::text(BODY, "cat")
            .create_weight(&searcher)
            .unwrap();
        let explanation = weight.explain(searcher.reader(), 2).unwrap();
        assert!(!explanation.is_match());
        assert_eq!(explanation.value(), 0.0);
    }

    #[test]
    fn test_collectors_over_term_weight() {
        let searcher = searcher();
        let weight = TermQuery::text(BODY, "cat")
            .create_weight(&searcher)
            .unwrap();
        let mut top = TopKCollector::new(10);
        let mut count = CountCollector::new();
        collect_weight(weight.as_ref(), searcher.reader(), &mut top).unwrap();
        collect_weight(weight.as_ref(), searcher.reader(), &mut count).unwrap();
        assert_eq!(count.count(), 2);
        let results = top.into_sorted_results();
        assert_eq!(results.len(), 2);
        // doc 1 has the higher term frequency
        assert_eq!(results[0].doc_id, 1);
    }

    #[test]
    fn test_query_string() {
        let mut query = TermQuery::text(BODY, "Cat");
        assert_eq!(query.to_query_string(Some(BODY)), "cat");
        assert_eq!(query.to_query_string(None), "0:cat");
        query.set_boost(2.0);
        assert_eq!(query.to_query_string(Some(BODY)), "cat^2");
    }
}
