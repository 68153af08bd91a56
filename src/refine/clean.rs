use crate::core::model::Region;

/// Drops regions narrower than `min_w` or shorter than `min_h`.
pub fn remove_small(regions: Vec<Region>, min_w: i64, min_h: i64) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|region| region.rectangle.width >= min_w && region.rectangle.height >= min_h)
        .collect()
}

/// Drops every region whose rectangle lies entirely inside another one.
///
/// Pairs are scanned as `(i, j)` with `i < j`. When a pair is identical the
/// lower index goes. Survivors keep their relative order.
pub fn remove_contained(regions: Vec<Region>) -> Vec<Region> {
    let n = regions.len();
    let mut removed = vec![false; n];

    for i in 0..n {
        if removed[i] {
            continue;
        }
        let ri = &regions[i].rectangle;
        for j in (i + 1)..n {
            let rj = &regions[j].rectangle;
            if ri.is_inside(rj) {
                removed[i] = true;
                break;
            } else if ri.contains(rj) {
                removed[j] = true;
            }
        }
    }

    regions
        .into_iter()
        .zip(removed)
        .filter_map(|(region, gone)| (!gone).then_some(region))
        .collect()
}
