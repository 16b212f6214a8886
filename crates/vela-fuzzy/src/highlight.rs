//! Match highlighting.
//!
//! Recomputes the greedy scan behind [`match_score`](crate::match_score) and
//! records where each query character landed, so UIs can emphasize the
//! matched runs.
//! Spans are byte offsets into the candidate, half-open, and adjacent matches
//! collapse into a single span. The result is always strictly ascending and
//! pairwise disjoint.
//!
//! Unlike [`match_score`](crate::match_score), a failed scan does not erase
//! what was already found: the spans gathered before the first unmatched query
//! character are returned as-is. Callers that only want highlights for real
//! matches should gate on the score first.

use vela_core::Span;

/// Returns the candidate spans covering each matched query character, merged
/// where they touch.
///
/// The scan is the same greedy earliest-occurrence walk used for scoring, so
/// the highlighted runs are exactly the characters the score was derived
/// from. If some query character never matches, the spans collected so far
/// are returned.
pub fn highlights(query: &str, candidate: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut cursor = 0usize;
    for qc in query.chars() {
        let Some(found) = candidate[cursor..].find(qc) else {
            return spans;
        };
        let start = cursor + found;
        let end = start + qc.len_utf8();
        push_match(&mut spans, start, end);
        cursor = end;
    }
    spans
}

fn push_match(spans: &mut Vec<Span>, start: usize, end: usize) {
    match spans.last_mut() {
        Some(last) if last.end == start => last.end = end,
        _ => spans.push(Span::new(start, end)),
    }
}
