use crate::core::geometry::{bounding_box, Rectangle};
use crate::core::graph::OverlapGraph;
use crate::core::model::Region;

/// Collapses regions that touch after growing each one by the given margins.
///
/// Every connected component of the expanded overlap graph becomes a single
/// region whose rectangle bounds the members' original rectangles. Member
/// texts are joined starting with the one farthest from the page origin,
/// which follows the right-to-left, top-to-bottom layout of the target pages.
pub fn combine_nearby(regions: Vec<Region>, x_expansion: i64, y_expansion: i64) -> Vec<Region> {
    let expanded: Vec<Rectangle> = regions
        .iter()
        .map(|region| region.rectangle.expand(x_expansion, y_expansion))
        .collect();
    let groups = OverlapGraph::new(&expanded).divide_groups();

    groups
        .into_iter()
        .filter_map(|group| merge_group(&regions, &group))
        .collect()
}

fn merge_group(regions: &[Region], group: &[usize]) -> Option<Region> {
    let rectangle = bounding_box(group.iter().map(|&idx| &regions[idx].rectangle))?;

    let mut ordered: Vec<&Region> = group.iter().map(|&idx| &regions[idx]).collect();
    ordered.sort_by_key(|region| std::cmp::Reverse(region.rectangle.origin_distance_sq()));
    let text = ordered.iter().map(|region| region.text.as_str()).collect();

    Some(Region { rectangle, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn region(x: i64, y: i64, w: i64, h: i64, text: &str) -> Region {
        Region::new(Rectangle::new(x, y, w, h), text)
    }

    #[test]
    fn keeps_distant_regions_apart() {
        let regions = vec![region(0, 0, 5, 5, "A"), region(20, 0, 5, 5, "B")];
        let merged = combine_nearby(regions.clone(), 3, 0);
        assert_eq!(merged, regions);
    }

    #[test]
    fn merges_regions_within_margin() {
        let regions = vec![region(0, 0, 5, 5, "A"), region(7, 0, 5, 5, "B")];
        let merged = combine_nearby(regions, 3, 0);
        assert_eq!(merged, vec![region(0, 0, 12, 5, "BA")]);
    }

    #[test]
    fn vertical_margin_only_applies_vertically() {
        let regions = vec![region(0, 0, 5, 5, "A"), region(0, 8, 5, 5, "B")];
        assert_eq!(combine_nearby(regions.clone(), 3, 0).len(), 2);
        assert_eq!(
            combine_nearby(regions, 0, 2),
            vec![region(0, 0, 5, 13, "BA")]
        );
    }

    #[test]
    fn joins_text_farthest_from_origin_first() {
        // A right-to-left column layout: the rightmost column reads first.
        let regions = vec![
            region(100, 10, 10, 40, "left"),
            region(112, 10, 10, 40, "middle"),
            region(124, 10, 10, 40, "right"),
        ];
        let merged = combine_nearby(regions, 2, 0);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "rightmiddleleft");
        assert_eq!(merged[0].rectangle, Rectangle::new(100, 10, 34, 40));
    }

    #[test]
    fn merged_rectangle_bounds_original_members() {
        let regions = vec![
            region(10, 10, 5, 5, "a"),
            region(60, 60, 5, 5, "x"),
            region(16, 12, 5, 9, "b"),
            region(22, 4, 3, 3, "c"),
        ];
        let merged = combine_nearby(regions.clone(), 1, 1);
        let groups = OverlapGraph::new(
            &regions
                .iter()
                .map(|r| r.rectangle.expand(1, 1))
                .collect::<Vec<_>>(),
        )
        .divide_groups();
        assert_eq!(merged.len(), groups.len());
        for (merged_region, group) in merged.iter().zip(&groups) {
            let expected = bounding_box(group.iter().map(|&i| &regions[i].rectangle));
            assert_eq!(Some(merged_region.rectangle), expected);
        }
    }

    #[test]
    fn components_follow_lowest_index_order() {
        let regions = vec![
            region(100, 0, 5, 5, "far"),
            region(0, 0, 5, 5, "near"),
            region(104, 0, 5, 5, "far2"),
        ];
        let merged = combine_nearby(regions, 0, 0);
        let texts: Vec<_> = merged.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["far2far", "near"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(combine_nearby(Vec::new(), 3, 3).is_empty());
    }
}
