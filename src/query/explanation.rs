//! Score explanation tree

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Score;

/// Node in a score explanation tree: whether the document matched, the
/// value contributed, a description, and sub-explanations in clause order.
/// Built on demand; mirrors the clause-combination logic used for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    matched: bool,
    value: Score,
    description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    details: Vec<Explanation>,
}

impl Explanation {
    pub fn new(matched: bool, value: Score, description: impl Into<String>) -> Self {
        Self {
            matched,
            value,
            description: description.into(),
            details: Vec::new(),
        }
    }

    /// A matching explanation carrying `value`.
    pub fn matched(value: Score, description: impl Into<String>) -> Self {
        Self::new(true, value, description)
    }

    /// A non-matching explanation. Non-matches always carry value 0.
    pub fn no_match(description: impl Into<String>) -> Self {
        Self::new(false, 0.0, description)
    }

    pub fn add_detail(&mut self, detail: Explanation) {
        self.details.push(detail);
    }

    pub fn with_detail(mut self, detail: Explanation) -> Self {
        self.details.push(detail);
        self
    }

    pub fn with_details(mut self, details: Vec<Explanation>) -> Self {
        self.details = details;
        self
    }

    pub fn is_match(&self) -> bool {
        self.matched
    }

    pub fn value(&self) -> Score {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &[Explanation] {
        &self.details
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            write!(f, "  ")?;
        }
        writeln!(f, "{} = {}", self.value, self.description)?;
        for detail in &self.details {
            detail.render(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}
