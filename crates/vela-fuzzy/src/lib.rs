//! Fuzzy subsequence matching for pickers and search-as-you-type UIs.
//!
//! The matcher answers two questions about a query typed against a candidate
//! string:
//!
//! * how well does it match, as a single comparable number
//!   ([`match_score`], [`rank`]), and
//! * which parts matched, as merged byte spans for emphasis in a UI
//!   ([`highlights`]).
//!
//! Both walk the candidate with the same greedy earliest-occurrence scan, so
//! a positive score and a full highlight set always agree. Scoring favors
//! prefix matches, then fewer gaps, then fewer skipped characters, with the
//! query length added on top so longer matches always win. See
//! [`match_score`] for the exact model.
//!
//! # Design
//!
//! Greedy scanning is deliberately simpler than optimal-alignment matchers:
//! it is linear in the candidate, allocation-free for scoring, and produces
//! stable results that are easy to reason about in ranking code. The cost is
//! that a later occurrence is never considered even when binding to it would
//! reduce gaps. For short interactive queries this trade has not mattered.

#![forbid(unsafe_code)]

mod highlight;
mod scoring;

pub use highlight::highlights;
pub use scoring::{match_score, rank, Score};

/// Returns `true` when `query` is a subsequence of `candidate`.
#[inline]
pub fn is_match(query: &str, candidate: &str) -> bool {
    match_score(query, candidate) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::Span;

    #[test]
    fn score_and_highlights_agree_on_what_matched() {
        let query = "sfs";
        let candidate = "session_file_store";
        assert!(is_match(query, candidate));
        let spans = highlights(query, candidate);
        let covered: String = spans
            .iter()
            .map(|span| &candidate[span.start..span.end])
            .collect();
        assert_eq!(covered, query);
    }

    #[test]
    fn non_match_still_yields_partial_highlights() {
        let query = "sfz";
        let candidate = "session_file_store";
        assert!(!is_match(query, candidate));
        assert_eq!(
            highlights(query, candidate),
            vec![Span::new(0, 1), Span::new(8, 9)]
        );
    }
}
