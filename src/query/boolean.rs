//! Boolean query with MUST, SHOULD, and MUST_NOT clauses
//!
//! `BooleanQuery` is the clause container with the clause-count guard and
//! the single-clause rewrite optimization. `BooleanWeight` is its compiled
//! form: one sub-weight per clause in clause order, query normalization,
//! composite scorer construction, and score explanations.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::searcher::Searcher;
use crate::segment::{Field, SegmentReader};
use crate::similarity::Similarity;
use crate::{DocId, Score};

use super::scorer::BooleanScorer;
use super::{BooleanClause, Explanation, Occur, Query, Scorer, Weight};

/// A query matching documents on a boolean combination of sub-queries.
///
/// Clauses are kept in insertion order; the order is significant for
/// display and explanations. Adding a clause past the configured maximum
/// fails immediately with [`Error::TooManyClauses`].
#[derive(Clone)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    min_should_match: usize,
    disable_coord: bool,
    boost: Score,
    config: SearchConfig,
}

impl BooleanQuery {
    /// Empty query using a snapshot of the process-wide configuration.
    pub fn new() -> Self {
        Self::with_config(SearchConfig::global())
    }

    /// Empty query with an explicit configuration snapshot.
    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            clauses: Vec::new(),
            min_should_match: 0,
            disable_coord: false,
            boost: 1.0,
            config,
        }
    }

    /// Disable the coordination factor for this query, e.g. for
    /// automatically generated expansions where it makes no sense.
    pub fn disable_coord(mut self, disable: bool) -> Self {
        self.disable_coord = disable;
        self
    }

    pub fn is_coord_disabled(&self) -> bool {
        self.disable_coord
    }

    /// Append a clause.
    pub fn add(&mut self, query: Arc<dyn Query>, occur: Occur) -> Result<()> {
        self.add_clause(BooleanClause::new(query, occur))
    }

    /// Append a clause. Fails when the clause count would exceed the
    /// configured maximum.
    pub fn add_clause(&mut self, clause: BooleanClause) -> Result<()> {
        if self.clauses.len() >= self.config.max_clause_count {
            return Err(Error::TooManyClauses(self.config.max_clause_count));
        }
        self.clauses.push(clause);
        Ok(())
    }

    pub fn must(self, query: impl Query + 'static) -> Result<Self> {
        self.with(Arc::new(query), Occur::Must)
    }

    pub fn should(self, query: impl Query + 'static) -> Result<Self> {
        self.with(Arc::new(query), Occur::Should)
    }

    pub fn must_not(self, query: impl Query + 'static) -> Result<Self> {
        self.with(Arc::new(query), Occur::MustNot)
    }

    fn with(mut self, query: Arc<dyn Query>, occur: Occur) -> Result<Self> {
        self.add(query, occur)?;
        Ok(self)
    }

    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Minimum number of SHOULD clauses that must match. Compared only
    /// against the count of matching SHOULD clauses, independent of MUST
    /// and MUST_NOT clauses. Not validated eagerly: a threshold above the
    /// SHOULD clause count simply never matches.
    pub fn set_min_should_match(&mut self, n: usize) {
        self.min_should_match = n;
    }

    pub fn min_should_match(&self) -> usize {
        self.min_should_match
    }

    pub fn with_min_should_match(mut self, n: usize) -> Self {
        self.min_should_match = n;
        self
    }

    pub fn set_boost(&mut self, boost: Score) {
        self.boost = boost;
    }
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanQuery")
            .field("clauses", &self.clauses)
            .field("min_should_match", &self.min_should_match)
            .field("disable_coord", &self.disable_coord)
            .field("boost", &self.boost)
            .finish()
    }
}

impl fmt::Display for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_string(None))
    }
}

impl PartialEq for BooleanQuery {
    fn eq(&self, other: &Self) -> bool {
        self.boost.to_bits() == other.boost.to_bits()
            && self.min_should_match == other.min_should_match
            && self.disable_coord == other.disable_coord
            && self.clauses == other.clauses
    }
}

impl Eq for BooleanQuery {}

impl Hash for BooleanQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.boost.to_bits());
        state.write_usize(self.min_should_match);
        state.write_u8(self.disable_coord as u8);
        // sum of clause hashes, combined order-independently
        let mut clause_sum = 0u64;
        for clause in &self.clauses {
            let mut hasher = FxHasher::default();
            clause.hash(&mut hasher);
            clause_sum = clause_sum.wrapping_add(hasher.finish());
        }
        state.write_u64(clause_sum);
    }
}

impl Query for BooleanQuery {
    fn boost(&self) -> Score {
        self.boost
    }

    fn with_boost(&self, boost: Score) -> Arc<dyn Query> {
        let mut clone = self.clone();
        clone.boost = boost;
        Arc::new(clone)
    }

    fn create_weight(&self, searcher: &Searcher) -> Result<Box<dyn Weight>> {
        Ok(Box::new(BooleanWeight::new(self, searcher)?))
    }

    fn rewrite(&self, reader: &SegmentReader) -> Result<Option<Arc<dyn Query>>> {
        // single non-prohibited clause: the boolean wrapper rewrites away
        if self.min_should_match == 0 && self.clauses.len() == 1 {
            let clause = &self.clauses[0];
            if !clause.is_prohibited() {
                let mut inner: Arc<dyn Query> = match clause.query.rewrite(reader)? {
                    Some(rewritten) => rewritten,
                    None => Arc::clone(&clause.query),
                };
                if self.boost != 1.0 {
                    // the wrapper is gone, so its boost folds into the clause
                    inner = inner.with_boost(self.boost * inner.boost());
                }
                return Ok(Some(inner));
            }
        }

        // clone-on-write: only materialize a new query if a clause changed
        let mut rewritten: Option<Vec<BooleanClause>> = None;
        for (i, clause) in self.clauses.iter().enumerate() {
            if let Some(query) = clause.query.rewrite(reader)? {
                rewritten.get_or_insert_with(|| self.clauses.clone())[i] =
                    BooleanClause::new(query, clause.occur);
            }
        }
        Ok(rewritten.map(|clauses| {
            Arc::new(Self {
                clauses,
                ..self.clone()
            }) as Arc<dyn Query>
        }))
    }

    fn to_query_string(&self, default_field: Option<Field>) -> String {
        let mut buffer = String::new();
        let need_parens = self.boost != 1.0 || self.min_should_match > 0;
        if need_parens {
            buffer.push('(');
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                buffer.push(' ');
            }
            buffer.push_str(&clause.to_query_string(default_field));
        }
        if need_parens {
            buffer.push(')');
        }
        if self.min_should_match > 0 {
            buffer.push('~');
            buffer.push_str(&self.min_should_match.to_string());
        }
        if self.boost != 1.0 {
            buffer.push_str(&format!("^{}", self.boost));
        }
        buffer
    }

    fn is_compound(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Query) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

/// Compiled form of a [`BooleanQuery`]: one sub-weight per clause,
/// preserving clause order. This list is the single source of truth for
/// scoring and explanation.
pub struct BooleanWeight {
    weights: Vec<(BooleanClause, Box<dyn Weight>)>,
    similarity: Arc<dyn Similarity>,
    boost: Score,
    min_should_match: usize,
    disable_coord: bool,
    /// Number of non-prohibited clauses, matching or not.
    max_coord: usize,
    allow_docs_out_of_order: bool,
}

impl BooleanWeight {
    pub(crate) fn new(query: &BooleanQuery, searcher: &Searcher) -> Result<Self> {
        let mut weights = Vec::with_capacity(query.clauses.len());
        let mut max_coord = 0;
        for clause in &query.clauses {
            let weight = clause.query.create_weight(searcher)?;
            if !clause.is_prohibited() {
                max_coord += 1;
            }
            weights.push((clause.clone(), weight));
        }
        Ok(Self {
            weights,
            similarity: Arc::clone(searcher.similarity()),
            boost: query.boost,
            min_should_match: query.min_should_match,
            disable_coord: query.disable_coord,
            max_coord,
            allow_docs_out_of_order: query.config.allow_docs_out_of_order,
        })
    }

    pub fn max_coord(&self) -> usize {
        self.max_coord
    }

    /// Coordination factor. With a single non-prohibited clause the factor
    /// is pinned to 1.0: a boolean query that cannot rewrite itself away
    /// (min_should_match, prohibited clauses) must score like its bare
    /// clause would.
    pub fn coord(&self, overlap: usize, max_overlap: usize) -> Score {
        if max_overlap == 1 {
            1.0
        } else {
            self.similarity.coord(overlap, max_overlap)
        }
    }

    fn coord_factor(&self, overlap: usize) -> Score {
        if self.disable_coord {
            1.0
        } else {
            self.coord(overlap, self.max_coord)
        }
    }

    /// Precomputed `coord(n, max_coord)` for every possible matcher count.
    fn coord_factors(&self) -> Vec<Score> {
        (0..=self.max_coord).map(|n| self.coord_factor(n)).collect()
    }

    /// Whether the legacy out-of-order collection mode applies to this
    /// weight: the process-wide flag is set, no clause is required, and
    /// min_should_match needs at most one optional clause. Emission stays
    /// ascending either way; the flag only relaxes the contract for
    /// callers that opted in.
    pub fn scores_out_of_order(&self) -> bool {
        self.allow_docs_out_of_order
            && self.min_should_match <= 1
            && !self.weights.iter().any(|(clause, _)| clause.is_required())
    }
}

impl Weight for BooleanWeight {
    fn sum_of_squared_weights(&mut self) -> Result<Score> {
        let mut sum = 0.0;
        for (clause, weight) in &mut self.weights {
            // every sub-weight runs for its side effects; prohibited
            // clauses are excluded from the sum only
            let sub = weight.sum_of_squared_weights()?;
            if !clause.is_prohibited() {
                sum += sub;
            }
        }
        Ok(sum * self.boost * self.boost)
    }

    fn normalize(&mut self, norm: Score) {
        let norm = norm * self.boost;
        for (_, weight) in &mut self.weights {
            // prohibited clauses are normalized too, for side-effect parity
            weight.normalize(norm);
        }
    }

    fn scorer(&self, reader: &SegmentReader) -> Result<Option<Box<dyn Scorer>>> {
        let mut scorers: Vec<(Occur, Box<dyn Scorer>)> = Vec::with_capacity(self.weights.len());
        let mut required = 0usize;
        let mut optional = 0usize;
        let mut prohibited = 0usize;
        for (clause, weight) in &self.weights {
            match weight.scorer(reader)? {
                Some(scorer) => {
                    match clause.occur {
                        Occur::Must => required += 1,
                        Occur::Should => optional += 1,
                        Occur::MustNot => prohibited += 1,
                    }
                    scorers.push((clause.occur, scorer));
                }
                None if clause.is_required() => {
                    log::debug!("BooleanWeight: required clause has no scorer, segment cannot match");
                    return Ok(None);
                }
                None => {}
            }
        }

        if required == 0 && optional == 0 {
            // no required and no optional clauses: nothing can ever match
            return Ok(None);
        }
        if optional < self.min_should_match {
            log::debug!(
                "BooleanWeight: {} optional scorers cannot satisfy min_should_match {}",
                optional,
                self.min_should_match
            );
            return Ok(None);
        }

        log::debug!(
            "BooleanWeight: merge over {} required / {} optional / {} prohibited scorers",
            required,
            optional,
            prohibited
        );
        Ok(Some(Box::new(BooleanScorer::new(
            scorers,
            self.min_should_match,
            self.coord_factors(),
        ))))
    }

    fn explain(&self, reader: &SegmentReader, doc: DocId) -> Result<Explanation> {
        let mut details: Vec<Explanation> = Vec::new();
        let mut coord = 0usize;
        let mut sum = 0.0f32;
        let mut fail = false;
        let mut should_match_count = 0usize;

        for (clause, weight) in &self.weights {
            if weight.scorer(reader)?.is_none() {
                if clause.is_required() {
                    fail = true;
                    details.push(Explanation::no_match(format!(
                        "no match on required clause ({})",
                        clause.query.to_query_string(None)
                    )));
                }
                continue;
            }
            let sub = weight.explain(reader, doc)?;
            if sub.is_match() {
                if !clause.is_prohibited() {
                    sum += sub.value();
                    coord += 1;
                    details.push(sub);
                } else {
                    fail = true;
                    details.push(
                        Explanation::no_match(format!(
                            "match on prohibited clause ({})",
                            clause.query.to_query_string(None)
                        ))
                        .with_detail(sub),
                    );
                }
                if clause.occur == Occur::Should {
                    should_match_count += 1;
                }
            } else if clause.is_required() {
                fail = true;
                details.push(
                    Explanation::no_match(format!(
                        "no match on required clause ({})",
                        clause.query.to_query_string(None)
                    ))
                    .with_detail(sub),
                );
            }
        }

        if fail {
            return Ok(Explanation::no_match(
                "Failure to meet condition(s) of required/prohibited clause(s)",
            )
            .with_details(details));
        }
        if should_match_count < self.min_should_match {
            return Ok(Explanation::no_match(format!(
                "Failure to match minimum number of optional clauses: {}",
                self.min_should_match
            ))
            .with_details(details));
        }

        let sum_expl = Explanation::new(coord > 0, sum, "sum of:").with_details(details);
        let coord_factor = self.coord_factor(coord);
        if coord_factor == 1.0 {
            // keep the tree flat in the common case
            return Ok(sum_expl);
        }
        let matched = sum_expl.is_match();
        Ok(Explanation::new(matched, sum * coord_factor, "product of:")
            .with_detail(sum_expl)
            .with_detail(Explanation::matched(
                coord_factor,
                format!("coord({}/{})", coord, self.max_coord),
            )))
    }
}
