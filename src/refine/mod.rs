pub mod clean;
pub mod merge;
pub mod noise;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::core::model::Page;

/// Region counts observed after each refinement stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub raw: usize,
    pub after_small: usize,
    pub after_contained: usize,
    pub after_merge: usize,
}

impl std::ops::Add for StageCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            raw: self.raw + other.raw,
            after_small: self.after_small + other.after_small,
            after_contained: self.after_contained + other.after_contained,
            after_merge: self.after_merge + other.after_merge,
        }
    }
}

pub trait PageRefiner {
    fn refine(&self, page: Page) -> (Page, StageCounts);
}

/// Turns raw detected fragments into candidate text blocks: drops tiny and
/// nested boxes, clusters nearby ones, then strips noise characters.
#[derive(Debug, Clone)]
pub struct RegionRefiner {
    config: PipelineConfig,
}

impl RegionRefiner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }
}

impl PageRefiner for RegionRefiner {
    fn refine(&self, page: Page) -> (Page, StageCounts) {
        let Page {
            source,
            page_id,
            regions,
        } = page;
        let mut counts = StageCounts {
            raw: regions.len(),
            ..StageCounts::default()
        };

        let regions = clean::remove_small(regions, self.config.min_w, self.config.min_h);
        counts.after_small = regions.len();
        let regions = clean::remove_contained(regions);
        counts.after_contained = regions.len();
        let regions =
            merge::combine_nearby(regions, self.config.x_expansion, self.config.y_expansion);
        counts.after_merge = regions.len();
        let regions = noise::remove_noise_characters(regions, &self.config.noise_set());

        debug!(
            source = %source,
            page_id,
            raw = counts.raw,
            after_small = counts.after_small,
            after_contained = counts.after_contained,
            after_merge = counts.after_merge,
            "refined page"
        );

        (Page::new(source, page_id, regions), counts)
    }
}
