use std::collections::BTreeSet;

use crate::core::model::Region;

/// Strips every configured character from each region's text.
pub fn remove_noise_characters(regions: Vec<Region>, noise: &BTreeSet<char>) -> Vec<Region> {
    if noise.is_empty() {
        return regions;
    }
    regions
        .into_iter()
        .map(|mut region| {
            region.text.retain(|c| !noise.contains(&c));
            region
        })
        .collect()
}
