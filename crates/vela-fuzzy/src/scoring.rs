//! Subsequence scoring.
//!
//! # Scoring model
//!
//! A query matches a candidate when every query character appears in the
//! candidate in order. The scan is greedy: each query character binds to its
//! earliest occurrence at or after the previous binding. Two quantities fall
//! out of the scan:
//!
//! * `gaps` counts the maximal runs of unmatched candidate characters that
//!   sit between matched ones. Unmatched text after the last match is not a
//!   gap, so `"ab"` scores the same against `"ab"` and `"abcdef"`.
//! * `skips` counts the unmatched characters themselves, including the
//!   trailing run.
//!
//! A gapless match is a prefix match and scores `0.5 + query_len`, deliberately
//! above every gapped score of the same query length (those stay below
//! `1.0 + query_len`). Gapped matches score `1.0 / (1.0 + gaps + skips/1000)`
//! plus the query length, so gap count dominates and skipped characters only
//! break ties between equally fragmented matches. Longer queries always beat
//! shorter ones because the additive length term dwarfs the rest.
//!
//! `0.0` is reserved for "no match" and is never produced for a successful
//! scan.

use std::cmp::Ordering;

/// Scores `query` against `candidate`, returning `0.0` when `query` is not a
/// subsequence of `candidate`.
///
/// Matching is case-sensitive and compares Unicode scalar values. `gaps` and
/// `skips` in the scoring model count characters, not bytes.
pub fn match_score(query: &str, candidate: &str) -> f64 {
    let query_len = query.chars().count();
    if query_len > candidate.chars().count() {
        return 0.0;
    }

    let mut gaps = 0usize;
    let mut skips = 0usize;
    let mut candidate_chars = candidate.chars();
    for qc in query.chars() {
        let mut gap_len = 0usize;
        loop {
            match candidate_chars.next() {
                Some(cc) if cc == qc => break,
                Some(_) => gap_len += 1,
                None => return 0.0,
            }
        }
        if gap_len > 0 {
            gaps += 1;
            skips += gap_len;
        }
    }
    // Trailing unmatched text counts as skipped characters only. In the
    // gapless branch skips are ignored entirely, which keeps every prefix
    // match of the same query tied regardless of candidate length.
    skips += candidate_chars.count();

    if gaps == 0 {
        0.5 + query_len as f64
    } else {
        1.0 / (1.0 + gaps as f64 + skips as f64 / 1000.0) + query_len as f64
    }
}

/// A [`match_score`] value usable as a sort or map key.
///
/// Scores are plain `f64`s; this wrapper gives them the total order of
/// [`f64::total_cmp`] so candidate lists can be sorted without a partial-order
/// escape hatch. Ordering is ascending by score, matching the raw floats.
#[derive(Debug, Clone, Copy)]
pub struct Score(pub f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Scores every candidate and returns the matches sorted best-first.
///
/// Non-matches (score `0.0`) are dropped. Ties are broken by comparing the
/// candidate strings so equal-scoring results come back in a stable,
/// predictable order.
pub fn rank<'a, I>(query: &str, candidates: I) -> Vec<(f64, &'a str)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<(f64, &'a str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = match_score(query, candidate);
            (score > 0.0).then_some((score, candidate))
        })
        .collect();
    ranked.sort_by(|a, b| Score(b.0).cmp(&Score(a.0)).then_with(|| a.1.cmp(b.1)));
    ranked
}
