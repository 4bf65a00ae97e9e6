//! Error types for argus

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("too many clauses: max_clause_count is set to {0}")]
    TooManyClauses(usize),

    #[error("max_clause_count must be >= 1, got {0}")]
    InvalidMaxClauseCount(usize),

    #[error("Document not found: {0}")]
    DocumentNotFound(u32),

    #[error("Query error: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, Error>;
