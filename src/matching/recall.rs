use std::collections::BTreeMap;

use crate::core::geometry::Rectangle;

/// Per-reference result of recall matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    pub candidate: Option<usize>,
    /// F1 score of the chosen candidate; zero when unmatched.
    pub score: f64,
}

impl MatchOutcome {
    pub const UNMATCHED: Self = Self {
        candidate: None,
        score: 0.0,
    };
}

/// Picks, for each reference, the candidate with the highest F1 score (first
/// one on ties), then resolves candidates claimed by several references in
/// favour of the first strictly-highest score.
///
/// This is greedy rather than an optimal assignment; the result never maps
/// two references to the same candidate.
pub fn recall_matching(candidates: &[Rectangle], references: &[Rectangle]) -> Vec<MatchOutcome> {
    let mut outcomes: Vec<MatchOutcome> = references
        .iter()
        .map(|reference| best_candidate(candidates, reference))
        .collect();

    let mut claims: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (ref_idx, outcome) in outcomes.iter().enumerate() {
        if let Some(cand_idx) = outcome.candidate {
            claims.entry(cand_idx).or_default().push(ref_idx);
        }
    }

    for claimants in claims.values().filter(|c| c.len() > 1) {
        let mut winner = claimants[0];
        for &ref_idx in &claimants[1..] {
            if outcomes[ref_idx].score > outcomes[winner].score {
                winner = ref_idx;
            }
        }
        for &ref_idx in claimants {
            if ref_idx != winner {
                outcomes[ref_idx] = MatchOutcome::UNMATCHED;
            }
        }
    }

    outcomes
}

fn best_candidate(candidates: &[Rectangle], reference: &Rectangle) -> MatchOutcome {
    let mut best = MatchOutcome::UNMATCHED;
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = candidate.f1_score(reference);
        if score > best.score {
            best = MatchOutcome {
                candidate: Some(idx),
                score,
            };
        }
    }
    best
}
