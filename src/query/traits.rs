//! Query, Weight, and Scorer traits
//!
//! A `Query` is an immutable description; compiling it against a searcher's
//! index snapshot yields a `Weight`, which produces `Scorer`s over a
//! segment. Weights and scorers live for a single search call and are not
//! shared across threads.

use std::any::Any;
use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use crate::error::Result;
use crate::searcher::Searcher;
use crate::segment::{Field, SegmentReader};
use crate::{DocId, Score, TERMINATED};

use super::docset::DocSet;
use super::explanation::Explanation;

/// A search query. Object-safe so compound queries can hold clauses of any
/// concrete variant behind `Arc<dyn Query>`.
pub trait Query: Send + Sync + fmt::Debug {
    /// Score multiplier for this query.
    fn boost(&self) -> Score {
        1.0
    }

    /// Clone of this query with its boost replaced.
    fn with_boost(&self, boost: Score) -> Arc<dyn Query>;

    /// Compile this query against the searcher's index snapshot.
    fn create_weight(&self, searcher: &Searcher) -> Result<Box<dyn Weight>>;

    /// Optimization pass run once before compilation. `None` means the query
    /// is already in fully rewritten form; preserving identity lets callers
    /// skip recompilation. Must be idempotent: a rewritten query rewrites to
    /// itself (i.e. returns `None`).
    fn rewrite(&self, _reader: &SegmentReader) -> Result<Option<Arc<dyn Query>>> {
        Ok(None)
    }

    /// Human-readable form. Terms in `default_field` omit the field prefix.
    fn to_query_string(&self, default_field: Option<Field>) -> String;

    /// True for compound (boolean) queries. Used for parenthesization in
    /// query strings and for the single-clause rewrite check, instead of
    /// inspecting concrete types.
    fn is_compound(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    /// Structural equality across `dyn Query`.
    fn dyn_eq(&self, other: &dyn Query) -> bool;

    /// Structural hash consistent with [`Query::dyn_eq`].
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl PartialEq for dyn Query {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Eq for dyn Query {}

impl std::hash::Hash for dyn Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

/// A query compiled against one index snapshot. Owns per-clause state for
/// normalization; single-use, single-thread for one search call.
pub trait Weight: Send {
    /// Sum of squared clause weights, feeding query normalization.
    fn sum_of_squared_weights(&mut self) -> Result<Score>;

    /// Push the query normalization factor down into this weight.
    fn normalize(&mut self, norm: Score);

    /// Build a scorer over `reader`. `None` means no document in this
    /// segment can match; that is an ordinary outcome, not an error.
    fn scorer(&self, reader: &SegmentReader) -> Result<Option<Box<dyn Scorer>>>;

    /// Explain the score of `doc`, mirroring the scoring combination logic.
    /// Deterministic and independent of scorer iteration order.
    fn explain(&self, reader: &SegmentReader, doc: DocId) -> Result<Explanation>;
}

/// Scorer: iterates over matching documents and scores the current one.
/// Positioned on its first match at construction.
pub trait Scorer: DocSet {
    /// Score for the current document.
    fn score(&self) -> Score;
}

/// Scorer for queries that match nothing.
pub struct EmptyScorer;

impl DocSet for EmptyScorer {
    fn doc(&self) -> DocId {
        TERMINATED
    }

    fn advance(&mut self) -> DocId {
        TERMINATED
    }

    fn seek(&mut self, _target: DocId) -> DocId {
        TERMINATED
    }

    fn size_hint(&self) -> u32 {
        0
    }
}

impl Scorer for EmptyScorer {
    fn score(&self) -> Score {
        0.0
    }
}
