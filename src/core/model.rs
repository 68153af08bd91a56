use serde::{Deserialize, Serialize};

use crate::core::geometry::Rectangle;

/// A text bounding box and whatever text was read from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub rectangle: Rectangle,
    #[serde(default)]
    pub text: String,
}

impl Region {
    pub fn new(rectangle: Rectangle, text: impl Into<String>) -> Self {
        Self {
            rectangle,
            text: text.into(),
        }
    }
}

/// Identity of a page across the detected and reference sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageKey {
    pub source: String,
    pub page_id: i64,
}

impl PageKey {
    pub fn new(source: impl Into<String>, page_id: i64) -> Self {
        Self {
            source: source.into(),
            page_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub source: String,
    pub page_id: i64,
    pub regions: Vec<Region>,
}

impl Page {
    pub fn new(source: impl Into<String>, page_id: i64, regions: Vec<Region>) -> Self {
        Self {
            source: source.into(),
            page_id,
            regions,
        }
    }

    pub fn key(&self) -> PageKey {
        PageKey::new(self.source.clone(), self.page_id)
    }
}

pub fn count_regions(pages: &[Page]) -> usize {
    pages.iter().map(|page| page.regions.len()).sum()
}

/// One row of the evaluation output: a reference region and the candidate
/// (if any) it was matched to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub reference_index: usize,
    pub candidate_index: Option<usize>,
    pub f1_score: f64,
    pub text_distance: Option<f64>,
    pub reference_text: String,
    pub candidate_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEvaluation {
    pub source: String,
    pub page_id: i64,
    pub detected_regions: usize,
    pub refined_regions: usize,
    pub matches: Vec<MatchRecord>,
}

impl PageEvaluation {
    pub fn matched(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches
            .iter()
            .filter(|record| record.candidate_index.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub summary: crate::eval::Summary,
    pub pages: Vec<PageEvaluation>,
}
