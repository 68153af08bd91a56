pub mod text;

pub use text::{normalize, text_distance};

use serde::{Deserialize, Serialize};

use crate::core::model::{MatchRecord, PageEvaluation, Region};
use crate::matching::MatchOutcome;

pub const HISTOGRAM_BINS: usize = 10;

/// Aggregate statistics over every evaluated page. Ratios and means are
/// `None` when their divisor is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub pages: usize,
    pub detected_regions: usize,
    pub refined_regions: usize,
    pub reference_regions: usize,
    pub matched_regions: usize,
    /// Matched pairs with text on both sides.
    pub compared_regions: usize,
    pub recall: Option<f64>,
    pub mean_f1: Option<f64>,
    pub mean_text_distance: Option<f64>,
    pub exact_matches: usize,
    pub exact_match_ratio: Option<f64>,
    /// Counts of normalized text distances in equal-width bins over `[0, 1]`.
    pub distance_histogram: Vec<usize>,
}

/// Builds the per-reference records for one page from the matcher output.
pub fn evaluate_page(
    source: &str,
    page_id: i64,
    detected_regions: usize,
    candidates: &[Region],
    references: &[Region],
    outcomes: &[MatchOutcome],
) -> PageEvaluation {
    let matches = references
        .iter()
        .zip(outcomes)
        .enumerate()
        .map(|(reference_index, (reference, outcome))| {
            let candidate = outcome.candidate.map(|idx| &candidates[idx]);
            MatchRecord {
                reference_index,
                candidate_index: outcome.candidate,
                f1_score: outcome.score,
                text_distance: candidate.and_then(|c| compare_text(&c.text, &reference.text)),
                reference_text: reference.text.clone(),
                candidate_text: candidate.map(|c| c.text.clone()),
            }
        })
        .collect();

    PageEvaluation {
        source: source.to_string(),
        page_id,
        detected_regions,
        refined_regions: candidates.len(),
        matches,
    }
}

/// Distance between a candidate and reference text, or `None` when either
/// side has nothing to compare.
fn compare_text(candidate: &str, reference: &str) -> Option<f64> {
    if normalize(candidate).is_empty() || normalize(reference).is_empty() {
        return None;
    }
    Some(text_distance(candidate, reference))
}

pub fn summarize(pages: &[PageEvaluation]) -> Summary {
    let mut summary = Summary {
        pages: pages.len(),
        distance_histogram: vec![0; HISTOGRAM_BINS],
        ..Summary::default()
    };
    let mut f1_total = 0.0;
    let mut distance_total = 0.0;

    for page in pages {
        summary.detected_regions += page.detected_regions;
        summary.refined_regions += page.refined_regions;
        summary.reference_regions += page.matches.len();

        for record in page.matched() {
            summary.matched_regions += 1;
            f1_total += record.f1_score;
            if let Some(distance) = record.text_distance {
                summary.compared_regions += 1;
                distance_total += distance;
                summary.distance_histogram[histogram_bin(distance)] += 1;
                if distance == 0.0 {
                    summary.exact_matches += 1;
                }
            }
        }
    }

    summary.recall = ratio(summary.matched_regions as f64, summary.reference_regions);
    summary.mean_f1 = ratio(f1_total, summary.matched_regions);
    summary.mean_text_distance = ratio(distance_total, summary.compared_regions);
    summary.exact_match_ratio = ratio(summary.exact_matches as f64, summary.compared_regions);
    summary
}

fn ratio(numerator: f64, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator / denominator as f64)
}

fn histogram_bin(distance: f64) -> usize {
    let bin = (distance.clamp(0.0, 1.0) * HISTOGRAM_BINS as f64) as usize;
    bin.min(HISTOGRAM_BINS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Rectangle;
    use pretty_assertions::assert_eq;

    fn region(x: i64, text: &str) -> Region {
        Region::new(Rectangle::new(x, 0, 10, 10), text)
    }

    #[test]
    fn builds_records_per_reference() {
        let candidates = vec![region(0, "abcd")];
        let references = vec![region(0, "abce"), region(50, "zzz")];
        let outcomes = vec![
            MatchOutcome {
                candidate: Some(0),
                score: 1.0,
            },
            MatchOutcome::UNMATCHED,
        ];

        let page = evaluate_page("p", 3, 4, &candidates, &references, &outcomes);

        assert_eq!(page.refined_regions, 1);
        assert_eq!(page.detected_regions, 4);
        assert_eq!(
            page.matches,
            vec![
                MatchRecord {
                    reference_index: 0,
                    candidate_index: Some(0),
                    f1_score: 1.0,
                    text_distance: Some(0.25),
                    reference_text: "abce".to_string(),
                    candidate_text: Some("abcd".to_string()),
                },
                MatchRecord {
                    reference_index: 1,
                    candidate_index: None,
                    f1_score: 0.0,
                    text_distance: None,
                    reference_text: "zzz".to_string(),
                    candidate_text: None,
                },
            ]
        );
    }

    #[test]
    fn aggregates_across_pages() {
        let first = evaluate_page(
            "a",
            0,
            5,
            &[region(0, "same"), region(20, "abcd")],
            &[region(0, "same"), region(20, "abce"), region(90, "lost")],
            &[
                MatchOutcome {
                    candidate: Some(0),
                    score: 1.0,
                },
                MatchOutcome {
                    candidate: Some(1),
                    score: 0.5,
                },
                MatchOutcome::UNMATCHED,
            ],
        );
        let second = evaluate_page("b", 0, 0, &[], &[region(0, "x")], &[MatchOutcome::UNMATCHED]);

        let summary = summarize(&[first, second]);

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.detected_regions, 5);
        assert_eq!(summary.refined_regions, 2);
        assert_eq!(summary.reference_regions, 4);
        assert_eq!(summary.matched_regions, 2);
        assert_eq!(summary.compared_regions, 2);
        assert_eq!(summary.recall, Some(0.5));
        assert_eq!(summary.mean_f1, Some(0.75));
        assert_eq!(summary.mean_text_distance, Some(0.125));
        assert_eq!(summary.exact_matches, 1);
        assert_eq!(summary.exact_match_ratio, Some(0.5));
        assert_eq!(summary.distance_histogram, vec![1, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn untranscribed_pairs_count_for_recall_only() {
        let page = evaluate_page(
            "p",
            0,
            3,
            &[region(0, "abc"), region(20, "\n"), region(40, "same")],
            &[region(0, ""), region(20, "text"), region(40, "same")],
            &[
                MatchOutcome {
                    candidate: Some(0),
                    score: 1.0,
                },
                MatchOutcome {
                    candidate: Some(1),
                    score: 1.0,
                },
                MatchOutcome {
                    candidate: Some(2),
                    score: 1.0,
                },
            ],
        );
        let distances: Vec<Option<f64>> = page.matches.iter().map(|m| m.text_distance).collect();
        assert_eq!(distances, vec![None, None, Some(0.0)]);

        let summary = summarize(&[page]);
        assert_eq!(summary.matched_regions, 3);
        assert_eq!(summary.recall, Some(1.0));
        assert_eq!(summary.mean_f1, Some(1.0));
        assert_eq!(summary.compared_regions, 1);
        assert_eq!(summary.mean_text_distance, Some(0.0));
        assert_eq!(summary.exact_matches, 1);
        assert_eq!(summary.exact_match_ratio, Some(1.0));
        assert_eq!(summary.distance_histogram.iter().sum::<usize>(), 1);
    }

    #[test]
    fn empty_evaluation_has_undefined_means() {
        let summary = summarize(&[]);
        assert_eq!(summary.matched_regions, 0);
        assert_eq!(summary.recall, None);
        assert_eq!(summary.mean_f1, None);
        assert_eq!(summary.mean_text_distance, None);
        assert_eq!(summary.exact_match_ratio, None);
        assert_eq!(summary.distance_histogram.iter().sum::<usize>(), 0);
    }

    #[test]
    fn full_distance_lands_in_last_bin() {
        assert_eq!(histogram_bin(1.0), HISTOGRAM_BINS - 1);
        assert_eq!(histogram_bin(0.0), 0);
        assert_eq!(histogram_bin(0.99), HISTOGRAM_BINS - 1);
    }
}
