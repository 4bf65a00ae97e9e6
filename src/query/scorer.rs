//! BooleanScorer: k-way merge over clause scorers
//!
//! Combines the surviving clause scorers, tagged with their occurrence,
//! into one document-ordered stream. Per candidate document the merge
//! aligns every required scorer, rejects candidates any prohibited scorer
//! lands on, counts optional matches against the minimum-should-match
//! threshold, and emits the coordination-adjusted sum of the matching
//! non-prohibited contributions. Documents are emitted in strictly
//! ascending order.

use crate::{DocId, Score, TERMINATED};

use super::docset::DocSet;
use super::{Occur, Scorer};

pub struct BooleanScorer {
    /// Surviving clause scorers in clause order. Clause order matters for
    /// score summation so that scores reproduce explanations bit for bit.
    scorers: Vec<(Occur, Box<dyn Scorer>)>,
    min_should_match: usize,
    /// coord(n, max_coord) for n matching non-prohibited clauses.
    coord_factors: Vec<Score>,
    has_required: bool,
    has_optional: bool,
    current_doc: DocId,
}

impl BooleanScorer {
    pub(crate) fn new(
        scorers: Vec<(Occur, Box<dyn Scorer>)>,
        min_should_match: usize,
        coord_factors: Vec<Score>,
    ) -> Self {
        let has_required = scorers.iter().any(|(occur, _)| occur.is_required());
        let has_optional = scorers.iter().any(|(occur, _)| *occur == Occur::Should);
        let mut scorer = Self {
            scorers,
            min_should_match,
            coord_factors,
            has_required,
            has_optional,
            current_doc: TERMINATED,
        };
        scorer.current_doc = scorer.find_next_match();
        scorer
    }

    /// Align all required scorers on a single document. Returns `None` when
    /// any required scorer exhausts, which terminates the whole merge.
    fn align_required(&mut self) -> Option<DocId> {
        let mut target = self
            .scorers
            .iter()
            .filter(|(occur, _)| occur.is_required())
            .map(|(_, scorer)| scorer.doc())
            .max()?;
        if target == TERMINATED {
            return None;
        }
        loop {
            let mut realigned = false;
            for (occur, scorer) in &mut self.scorers {
                if !occur.is_required() {
                    continue;
                }
                let doc = if scorer.doc() < target {
                    scorer.seek(target)
                } else {
                    scorer.doc()
                };
                if doc == TERMINATED {
                    return None;
                }
                if doc > target {
                    target = doc;
                    realigned = true;
                    break;
                }
            }
            if !realigned {
                return Some(target);
            }
        }
    }

    /// Advance whichever scorers sit on a rejected candidate so the next
    /// round of matching starts past it.
    fn advance_past(&mut self, candidate: DocId) {
        let driving = if self.has_required {
            Occur::Must
        } else {
            Occur::Should
        };
        for (occur, scorer) in &mut self.scorers {
            if *occur == driving && scorer.doc() == candidate {
                scorer.advance();
            }
        }
    }

    fn find_next_match(&mut self) -> DocId {
        // a query with no required and no optional scorers never matches
        if !self.has_required && !self.has_optional {
            return TERMINATED;
        }

        loop {
            let candidate = if self.has_required {
                match self.align_required() {
                    Some(doc) => doc,
                    None => return TERMINATED,
                }
            } else {
                let min = self
                    .scorers
                    .iter()
                    .filter(|(occur, _)| *occur == Occur::Should)
                    .map(|(_, scorer)| scorer.doc())
                    .min()
                    .unwrap_or(TERMINATED);
                if min == TERMINATED {
                    return TERMINATED;
                }
                min
            };

            // prohibited scorer landing exactly on the candidate rejects it
            let mut excluded = false;
            for (occur, scorer) in &mut self.scorers {
                if !occur.is_prohibited() {
                    continue;
                }
                if scorer.doc() < candidate {
                    scorer.seek(candidate);
                }
                if scorer.doc() == candidate {
                    excluded = true;
                    break;
                }
            }
            if excluded {
                self.advance_past(candidate);
                continue;
            }

            // count optional scorers landing on the candidate
            let mut should_matches = 0usize;
            for (occur, scorer) in &mut self.scorers {
                if *occur != Occur::Should {
                    continue;
                }
                if scorer.doc() < candidate {
                    scorer.seek(candidate);
                }
                if scorer.doc() == candidate {
                    should_matches += 1;
                }
            }
            if should_matches < self.min_should_match {
                self.advance_past(candidate);
                continue;
            }

            return candidate;
        }
    }
}

impl DocSet for BooleanScorer {
    fn doc(&self) -> DocId {
        self.current_doc
    }

    fn advance(&mut self) -> DocId {
        if self.current_doc == TERMINATED {
            return TERMINATED;
        }
        self.advance_past(self.current_doc);
        self.current_doc = self.find_next_match();
        self.current_doc
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.current_doc >= target {
            return self.current_doc;
        }
        for (occur, scorer) in &mut self.scorers {
            if !occur.is_prohibited() && scorer.doc() < target {
                scorer.seek(target);
            }
        }
        self.current_doc = self.find_next_match();
        self.current_doc
    }

    fn size_hint(&self) -> u32 {
        if self.has_required {
            self.scorers
                .iter()
                .filter(|(occur, _)| occur.is_required())
                .map(|(_, scorer)| scorer.size_hint())
                .min()
                .unwrap_or(0)
        } else {
            self.scorers
                .iter()
                .filter(|(occur, _)| *occur == Occur::Should)
                .map(|(_, scorer)| scorer.size_hint())
                .fold(0u32, u32::saturating_add)
        }
    }
}

impl Scorer for BooleanScorer {
    fn score(&self) -> Score {
        let mut sum = 0.0;
        let mut matchers = 0usize;
        for (occur, scorer) in &self.scorers {
            if occur.is_prohibited() {
                continue;
            }
            if scorer.doc() == self.current_doc {
                sum += scorer.score();
                matchers += 1;
            }
        }
        sum * self.coord_factors[matchers]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Constant-per-doc scorer over a fixed sorted doc list.
    pub(crate) struct VecScorer {
        docs: Vec<DocId>,
        pos: usize,
        score: Score,
    }

    impl VecScorer {
        pub(crate) fn new(docs: Vec<DocId>, score: Score) -> Self {
            Self {
                docs,
                pos: 0,
                score,
            }
        }
    }

    impl DocSet for VecScorer {
        fn doc(&self) -> DocId {
            self.docs.get(self.pos).copied().unwrap_or(TERMINATED)
        }

        fn advance(&mut self) -> DocId {
            if self.pos < self.docs.len() {
                self.pos += 1;
            }
            self.doc()
        }

        fn seek(&mut self, target: DocId) -> DocId {
            while self.doc() < target {
                self.advance();
            }
            self.doc()
        }

        fn size_hint(&self) -> u32 {
            self.docs.len().saturating_sub(self.pos) as u32
        }
    }

    impl Scorer for VecScorer {
        fn score(&self) -> Score {
            self.score
        }
    }

    fn boxed(docs: Vec<DocId>, score: Score) -> Box<dyn Scorer> {
        Box::new(VecScorer::new(docs, score))
    }

    fn drain(mut scorer: BooleanScorer) -> Vec<(DocId, Score)> {
        let mut out = Vec::new();
        let mut doc = scorer.doc();
        while doc != TERMINATED {
            out.push((doc, scorer.score()));
            doc = scorer.advance();
        }
        out
    }

    fn unit_coords(max_coord: usize) -> Vec<Score> {
        vec![1.0; max_coord + 1]
    }

    #[test]
    fn test_conjunction() {
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Must, boxed(vec![1, 3, 5, 7], 1.0)),
                (Occur::Must, boxed(vec![3, 4, 7, 9], 1.0)),
            ],
            0,
            unit_coords(2),
        );
        let docs: Vec<DocId> = drain(scorer).into_iter().map(|(d, _)| d).collect();
        assert_eq!(docs, vec![3, 7]);
    }

    #[test]
    fn test_disjunction() {
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Should, boxed(vec![1, 4], 1.0)),
                (Occur::Should, boxed(vec![2, 4, 8], 1.0)),
            ],
            0,
            unit_coords(2),
        );
        let docs: Vec<DocId> = drain(scorer).into_iter().map(|(d, _)| d).collect();
        assert_eq!(docs, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_prohibited_excludes() {
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Must, boxed(vec![1, 2, 3, 4], 1.0)),
                (Occur::MustNot, boxed(vec![2, 4], 1.0)),
            ],
            0,
            unit_coords(1),
        );
        let docs: Vec<DocId> = drain(scorer).into_iter().map(|(d, _)| d).collect();
        assert_eq!(docs, vec![1, 3]);
    }

    #[test]
    fn test_min_should_match_filters() {
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Should, boxed(vec![1, 3, 5], 1.0)),
                (Occur::Should, boxed(vec![2, 3, 6], 1.0)),
                (Occur::Should, boxed(vec![3, 5, 6], 1.0)),
            ],
            2,
            unit_coords(3),
        );
        let docs: Vec<DocId> = drain(scorer).into_iter().map(|(d, _)| d).collect();
        // doc 3 matches all three, docs 5 and 6 match two
        assert_eq!(docs, vec![3, 5, 6]);
    }

    #[test]
    fn test_must_with_optional_scoring() {
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Must, boxed(vec![1, 2], 1.0)),
                (Occur::Should, boxed(vec![2], 3.0)),
            ],
            0,
            unit_coords(2),
        );
        let results = drain(scorer);
        assert_eq!(results, vec![(1, 1.0), (2, 4.0)]);
    }

    #[test]
    fn test_coord_factor_applied() {
        // coord factors 0/2 -> 0.0, 1/2 -> 0.5, 2/2 -> 1.0
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Must, boxed(vec![1, 2], 1.0)),
                (Occur::Should, boxed(vec![2], 1.0)),
            ],
            0,
            vec![0.0, 0.5, 1.0],
        );
        let results = drain(scorer);
        assert_eq!(results, vec![(1, 0.5), (2, 2.0)]);
    }

    #[test]
    fn test_prohibited_only_is_exhausted() {
        let scorer = BooleanScorer::new(
            vec![(Occur::MustNot, boxed(vec![1, 2], 1.0))],
            0,
            unit_coords(0),
        );
        assert_eq!(scorer.doc(), TERMINATED);
    }

    #[test]
    fn test_empty_is_exhausted() {
        let scorer = BooleanScorer::new(vec![], 0, unit_coords(0));
        assert_eq!(scorer.doc(), TERMINATED);
    }

    #[test]
    fn test_required_exhaustion_terminates() {
        let mut scorer = BooleanScorer::new(
            vec![
                (Occur::Must, boxed(vec![1], 1.0)),
                (Occur::Must, boxed(vec![1, 5, 9], 1.0)),
            ],
            0,
            unit_coords(2),
        );
        assert_eq!(scorer.doc(), 1);
        assert_eq!(scorer.advance(), TERMINATED);
        assert_eq!(scorer.advance(), TERMINATED);
    }

    #[test]
    fn test_seek() {
        let mut scorer = BooleanScorer::new(
            vec![
                (Occur::Should, boxed(vec![1, 4, 7, 10], 1.0)),
                (Occur::Should, boxed(vec![2, 7, 12], 1.0)),
            ],
            0,
            unit_coords(2),
        );
        assert_eq!(scorer.seek(5), 7);
        // seek to an earlier target never retreats
        assert_eq!(scorer.seek(3), 7);
        assert_eq!(scorer.seek(11), 12);
        assert_eq!(scorer.seek(13), TERMINATED);
    }

    #[test]
    fn test_strictly_ascending_emission() {
        let scorer = BooleanScorer::new(
            vec![
                (Occur::Should, boxed(vec![0, 3, 4, 9], 1.0)),
                (Occur::Should, boxed(vec![1, 3, 8, 9, 11], 1.0)),
                (Occur::MustNot, boxed(vec![3, 11], 1.0)),
            ],
            0,
            unit_coords(2),
        );
        let docs: Vec<DocId> = drain(scorer).into_iter().map(|(d, _)| d).collect();
        assert_eq!(docs, vec![0, 1, 4, 8, 9]);
        assert!(docs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pure_disjunction_requires_one_match() {
        // min_should_match 0 still requires at least one SHOULD to land
        let scorer = BooleanScorer::new(
            vec![(Occur::Should, boxed(vec![], 1.0))],
            0,
            unit_coords(1),
        );
        assert_eq!(scorer.doc(), TERMINATED);
    }
}
