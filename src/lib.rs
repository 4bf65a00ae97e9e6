//! Argus - a boolean query evaluation engine
//!
//! Combines the results of multiple sub-query scorers (ordered, skippable
//! iterators with an associated score) into a single composite result
//! according to boolean clause semantics:
//! - MUST / SHOULD / MUST_NOT occurrence per clause
//! - minimum-should-match threshold over optional clauses
//! - coordination-based score adjustment
//! - structured score explanations mirroring the scoring logic
//!
//! Queries are compiled per search into a `Weight` bound to one index
//! snapshot; the weight produces `Scorer`s that emit matching documents in
//! ascending doc-id order. The crate ships a small in-memory segment so the
//! engine is exercisable end to end, but postings storage is otherwise an
//! external concern.

pub mod config;
pub mod error;
pub mod query;
pub mod searcher;
pub mod segment;
pub mod similarity;

pub use config::{
    SearchConfig, allow_docs_out_of_order, max_clause_count, set_allow_docs_out_of_order,
    set_max_clause_count,
};
pub use error::{Error, Result};
pub use query::{
    BooleanClause, BooleanQuery, BooleanScorer, BooleanWeight, Collector, CountCollector, DocSet,
    EmptyScorer, Explanation, Occur, Query, Scorer, SearchResult, TermQuery, TopKCollector,
    Weight, collect_weight,
};
pub use searcher::Searcher;
pub use segment::{Field, PostingIterator, PostingList, SegmentBuilder, SegmentReader};
pub use similarity::{DefaultSimilarity, Similarity};

pub type DocId = u32;
pub type Score = f32;

/// Sentinel doc id marking an exhausted cursor. Terminal: once returned, a
/// scorer receives no further calls.
pub const TERMINATED: DocId = DocId::MAX;
