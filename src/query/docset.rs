//! DocSet: forward-only cursor over sorted document IDs
//!
//! The base iteration abstraction. Posting cursors and scorers implement
//! this trait; doc ids are strictly increasing across calls and
//! [`TERMINATED`] is terminal.

use crate::{DocId, TERMINATED};

/// Forward-only cursor over sorted document IDs.
pub trait DocSet: Send {
    /// Current document ID, or [`TERMINATED`] if exhausted.
    fn doc(&self) -> DocId;

    /// Advance to the next document. Returns the new doc ID or [`TERMINATED`].
    fn advance(&mut self) -> DocId;

    /// Seek to the first document >= `target`. Returns doc ID or [`TERMINATED`].
    fn seek(&mut self, target: DocId) -> DocId {
        let mut doc = self.doc();
        while doc < target {
            doc = self.advance();
        }
        doc
    }

    /// Estimated number of remaining documents.
    fn size_hint(&self) -> u32;
}

impl DocSet for Box<dyn DocSet + '_> {
    #[inline]
    fn doc(&self) -> DocId {
        (**self).doc()
    }
    #[inline]
    fn advance(&mut self) -> DocId {
        (**self).advance()
    }
    #[inline]
    fn seek(&mut self, target: DocId) -> DocId {
        (**self).seek(target)
    }
    #[inline]
    fn size_hint(&self) -> u32 {
        (**self).size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ascending {
        current: DocId,
        limit: DocId,
    }

    impl DocSet for Ascending {
        fn doc(&self) -> DocId {
            if self.current >= self.limit {
                TERMINATED
            } else {
                self.current
            }
        }
        fn advance(&mut self) -> DocId {
            self.current += 1;
            self.doc()
        }
        fn size_hint(&self) -> u32 {
            self.limit.saturating_sub(self.current)
        }
    }

    #[test]
    fn test_default_seek_advances() {
        let mut set = Ascending {
            current: 0,
            limit: 5,
        };
        assert_eq!(set.seek(3), 3);
        assert_eq!(set.seek(5), TERMINATED);
    }
}
