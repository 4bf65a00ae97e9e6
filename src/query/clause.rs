//! Boolean clause: a sub-query paired with its occurrence requirement

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::segment::Field;

use super::Query;

/// How a clause participates in the boolean combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occur {
    /// The clause must match (conjunction member).
    Must,
    /// The clause may match; contributes to the score and to the
    /// minimum-should-match count.
    Should,
    /// Documents matching the clause are excluded. Never contributes to
    /// the score.
    MustNot,
}

impl Occur {
    pub fn is_required(self) -> bool {
        matches!(self, Occur::Must)
    }

    pub fn is_prohibited(self) -> bool {
        matches!(self, Occur::MustNot)
    }
}

impl fmt::Display for Occur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occur::Must => write!(f, "+"),
            Occur::Should => Ok(()),
            Occur::MustNot => write!(f, "-"),
        }
    }
}

/// An immutable pairing of a sub-query and an occurrence requirement.
#[derive(Clone)]
pub struct BooleanClause {
    pub query: Arc<dyn Query>,
    pub occur: Occur,
}

impl BooleanClause {
    pub fn new(query: Arc<dyn Query>, occur: Occur) -> Self {
        Self { query, occur }
    }

    pub fn is_required(&self) -> bool {
        self.occur.is_required()
    }

    pub fn is_prohibited(&self) -> bool {
        self.occur.is_prohibited()
    }

    /// Prefixed, parenthesized-if-compound rendering of the clause.
    pub fn to_query_string(&self, default_field: Option<Field>) -> String {
        let sub = if self.query.is_compound() {
            format!("({})", self.query.to_query_string(default_field))
        } else {
            self.query.to_query_string(default_field)
        };
        format!("{}{}", self.occur, sub)
    }
}

impl fmt::Debug for BooleanClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.occur, self.query)
    }
}

impl fmt::Display for BooleanClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_string(None))
    }
}

impl PartialEq for BooleanClause {
    fn eq(&self, other: &Self) -> bool {
        self.occur == other.occur && self.query.dyn_eq(other.query.as_ref())
    }
}

impl Eq for BooleanClause {}

impl Hash for BooleanClause {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.occur.hash(state);
        self.query.dyn_hash(state);
    }
}
