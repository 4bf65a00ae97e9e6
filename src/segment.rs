//! In-memory segment: the postings snapshot queries compile against
//!
//! This is the smallest realization of the term-to-postings contract the
//! query engine consumes. Posting lists are doc-id sorted with parallel
//! term-frequency arrays; lookup is a hash map keyed by (field, term).
//! On-disk formats, analysis, and durability live outside this crate.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::query::DocSet;
use crate::{DocId, TERMINATED};

/// Field identifier within a schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Field(pub u32);

/// Postings for one term: doc ids (sorted ascending) with term frequencies.
#[derive(Debug, Default, Clone)]
pub struct PostingList {
    docs: Vec<DocId>,
    freqs: Vec<u32>,
}

impl PostingList {
    pub fn doc_count(&self) -> u32 {
        self.docs.len() as u32
    }

    fn push(&mut self, doc: DocId, freq: u32) {
        debug_assert!(self.docs.last().is_none_or(|&last| last < doc));
        self.docs.push(doc);
        self.freqs.push(freq);
    }
}

/// Cursor over a [`PostingList`]. Binary search for seek.
pub struct PostingIterator {
    list: Arc<PostingList>,
    pos: usize,
}

impl PostingIterator {
    pub fn new(list: Arc<PostingList>) -> Self {
        Self { list, pos: 0 }
    }

    /// Term frequency at the current document.
    pub fn term_freq(&self) -> u32 {
        self.list.freqs.get(self.pos).copied().unwrap_or(0)
    }
}

impl DocSet for PostingIterator {
    #[inline]
    fn doc(&self) -> DocId {
        self.list.docs.get(self.pos).copied().unwrap_or(TERMINATED)
    }

    #[inline]
    fn advance(&mut self) -> DocId {
        if self.pos < self.list.docs.len() {
            self.pos += 1;
        }
        self.doc()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.pos >= self.list.docs.len() {
            return TERMINATED;
        }
        let remaining = &self.list.docs[self.pos..];
        match remaining.binary_search(&target) {
            Ok(offset) | Err(offset) => {
                self.pos += offset;
                self.doc()
            }
        }
    }

    fn size_hint(&self) -> u32 {
        self.list.docs.len().saturating_sub(self.pos) as u32
    }
}

/// Read-only snapshot of one segment's postings.
pub struct SegmentReader {
    num_docs: u32,
    postings: FxHashMap<(Field, Vec<u8>), Arc<PostingList>>,
}

impl SegmentReader {
    /// Number of documents in the segment.
    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    /// One past the highest doc id.
    pub fn max_doc(&self) -> u32 {
        self.num_docs
    }

    /// Posting list for `term` in `field`, or `None` if the term is absent.
    pub fn postings(&self, field: Field, term: &[u8]) -> Option<Arc<PostingList>> {
        self.postings.get(&(field, term.to_vec())).cloned()
    }

    /// Number of documents containing `term` in `field`.
    pub fn doc_freq(&self, field: Field, term: &[u8]) -> u32 {
        self.postings
            .get(&(field, term.to_vec()))
            .map_or(0, |list| list.doc_count())
    }

    pub fn builder() -> SegmentBuilder {
        SegmentBuilder::default()
    }
}

/// Accumulates documents into a [`SegmentReader`]. Terms are whitespace
/// tokens, lowercased; doc ids are assigned in insertion order so posting
/// lists stay sorted.
#[derive(Default)]
pub struct SegmentBuilder {
    next_doc: DocId,
    postings: FxHashMap<(Field, Vec<u8>), PostingList>,
}

impl SegmentBuilder {
    /// Add one document and return its doc id.
    pub fn add_document(&mut self, fields: &[(Field, &str)]) -> DocId {
        let doc = self.next_doc;
        self.next_doc += 1;

        let mut freqs: FxHashMap<(Field, Vec<u8>), u32> = FxHashMap::default();
        for (field, text) in fields {
            for token in text.split_whitespace() {
                let term = token.to_lowercase().into_bytes();
                *freqs.entry((*field, term)).or_insert(0) += 1;
            }
        }
        for (key, freq) in freqs {
            self.postings.entry(key).or_default().push(doc, freq);
        }
        doc
    }

    pub fn build(self) -> SegmentReader {
        SegmentReader {
            num_docs: self.next_doc,
            postings: self
                .postings
                .into_iter()
                .map(|(key, list)| (key, Arc::new(list)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Field = Field(0);

    fn segment() -> SegmentReader {
        let mut builder = SegmentReader::builder();
        builder.add_document(&[(BODY, "cat dog")]);
        builder.add_document(&[(BODY, "cat cat cat")]);
        builder.add_document(&[(BODY, "bird")]);
        builder.build()
    }

    #[test]
    fn test_doc_freq() {
        let reader = segment();
        assert_eq!(reader.num_docs(), 3);
        assert_eq!(reader.doc_freq(BODY, b"cat"), 2);
        assert_eq!(reader.doc_freq(BODY, b"dog"), 1);
        assert_eq!(reader.doc_freq(BODY, b"missing"), 0);
    }

    #[test]
    fn test_posting_iterator() {
        let reader = segment();
        let list = reader.postings(BODY, b"cat").unwrap();
        let mut it = PostingIterator::new(list);
        assert_eq!(it.doc(), 0);
        assert_eq!(it.term_freq(), 1);
        assert_eq!(it.advance(), 1);
        assert_eq!(it.term_freq(), 3);
        assert_eq!(it.advance(), TERMINATED);
    }

    #[test]
    fn test_posting_iterator_seek() {
        let reader = segment();
        let list = reader.postings(BODY, b"cat").unwrap();
        let mut it = PostingIterator::new(list);
        assert_eq!(it.seek(1), 1);
        assert_eq!(it.seek(2), TERMINATED);
    }

    #[test]
    fn test_terms_are_lowercased() {
        let mut builder = SegmentReader::builder();
        builder.add_document(&[(BODY, "Cat DOG")]);
        let reader = builder.build();
        assert_eq!(reader.doc_freq(BODY, b"cat"), 1);
        assert_eq!(reader.doc_freq(BODY, b"dog"), 1);
    }
}
