pub mod recall;

pub use recall::{recall_matching, MatchOutcome};

use crate::core::model::Region;

/// Assigns candidate regions to reference regions, one entry per reference.
pub trait RegionMatcher {
    fn match_regions(&self, candidates: &[Region], references: &[Region]) -> Vec<MatchOutcome>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RecallMatcher;

impl RecallMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl RegionMatcher for RecallMatcher {
    fn match_regions(&self, candidates: &[Region], references: &[Region]) -> Vec<MatchOutcome> {
        let candidates: Vec<_> = candidates.iter().map(|r| r.rectangle).collect();
        let references: Vec<_> = references.iter().map(|r| r.rectangle).collect();
        recall_matching(&candidates, &references)
    }
}
