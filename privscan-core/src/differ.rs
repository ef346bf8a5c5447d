//! Match-set equivalence, used to skip refresh work when a rescan finds
//! exactly what the previous scan found.

use crate::redaction_match::Match;

fn sorted(matches: &[Match]) -> Vec<&Match> {
    let mut refs: Vec<&Match> = matches.iter().collect();
    refs.sort_by(|a, b| {
        a.index
            .cmp(&b.index)
            .then_with(|| a.rule_name.cmp(&b.rule_name))
            .then_with(|| a.matched_text.cmp(&b.matched_text))
    });
    refs
}

/// True when both sets hold the same `(index, rule name, matched text)`
/// triples, regardless of order. The length of a match is implied by its
/// text.
pub fn matches_equivalent(a: &[Match], b: &[Match]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    sorted(a).iter().zip(sorted(b)).all(|(x, y)| {
        x.index == y.index && x.rule_name == y.rule_name && x.matched_text == y.matched_text
    })
}
