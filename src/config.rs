//! Process-wide search configuration
//!
//! Two knobs are process-wide rather than per-query: the maximum clause
//! count and the legacy out-of-order collection flag. Changing them affects
//! queries built afterwards, never retroactively — each [`BooleanQuery`]
//! snapshots the configuration at construction via [`SearchConfig::global`],
//! so tests can also inject a custom snapshot directly.
//!
//! [`BooleanQuery`]: crate::query::BooleanQuery

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// Default clause limit, matching the classic 1024-clause guard.
pub const DEFAULT_MAX_CLAUSE_COUNT: usize = 1024;

static MAX_CLAUSE_COUNT: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_CLAUSE_COUNT);
static ALLOW_DOCS_OUT_OF_ORDER: AtomicBool = AtomicBool::new(false);

/// Maximum number of clauses permitted in a boolean query.
pub fn max_clause_count() -> usize {
    MAX_CLAUSE_COUNT.load(Ordering::Relaxed)
}

/// Set the process-wide clause limit. Values below 1 are rejected.
pub fn set_max_clause_count(count: usize) -> Result<()> {
    if count < 1 {
        return Err(Error::InvalidMaxClauseCount(count));
    }
    MAX_CLAUSE_COUNT.store(count, Ordering::Relaxed);
    Ok(())
}

/// Whether callers have opted in to out-of-order result collection.
pub fn allow_docs_out_of_order() -> bool {
    ALLOW_DOCS_OUT_OF_ORDER.load(Ordering::Relaxed)
}

/// Opt in to (or out of) the legacy out-of-order collection mode. When
/// enabled, only same-document grouping is guaranteed, not ascending order
/// across documents.
pub fn set_allow_docs_out_of_order(allowed: bool) {
    ALLOW_DOCS_OUT_OF_ORDER.store(allowed, Ordering::Relaxed);
}

/// Immutable snapshot of the process-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub max_clause_count: usize,
    pub allow_docs_out_of_order: bool,
}

impl SearchConfig {
    /// Snapshot the current process-wide values.
    pub fn global() -> Self {
        Self {
            max_clause_count: max_clause_count(),
            allow_docs_out_of_order: allow_docs_out_of_order(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_clause_count: DEFAULT_MAX_CLAUSE_COUNT,
            allow_docs_out_of_order: false,
        }
    }
}
