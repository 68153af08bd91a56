use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::core::model::{EvaluationReport, Page, PageEvaluation, PageKey};
use crate::eval::{evaluate_page, summarize};
use crate::export::{CsvExporter, Exporter, JsonExporter, TextExporter};
use crate::matching::{RecallMatcher, RegionMatcher};
use crate::refine::{PageRefiner, RegionRefiner, StageCounts};

#[derive(Debug, Clone)]
pub struct RefineOutcome {
    pub pages: Vec<Page>,
    pub counts: StageCounts,
}

/// Refines every page independently, in parallel. Output keeps input order.
pub fn refine_pages(pages: Vec<Page>, config: &PipelineConfig) -> RefineOutcome {
    let refiner = RegionRefiner::new(config.clone());
    let refined: Vec<(Page, StageCounts)> = pages
        .into_par_iter()
        .map(|page| refiner.refine(page))
        .collect();

    let mut counts = StageCounts::default();
    let mut pages = Vec::with_capacity(refined.len());
    for (page, page_counts) in refined {
        counts = counts + page_counts;
        pages.push(page);
    }

    info!(count = counts.raw, "count of frames");
    info!(count = counts.after_small, "after removing small frames");
    info!(count = counts.after_contained, "after removing contained frames");
    info!(count = counts.after_merge, "after combining nearby frames");

    RefineOutcome { pages, counts }
}

/// Matches detected pages against reference pages sharing the same
/// `(source, page_id)`.
///
/// Reference pages without a detected counterpart are matched against nothing.
/// Detected pages without a reference are still counted but have no records.
pub fn evaluate_pages(
    detected: Vec<Page>,
    reference: Vec<Page>,
    config: &PipelineConfig,
    refine: bool,
) -> EvaluationReport {
    let mut detected_by_key: HashMap<PageKey, Page> = HashMap::new();
    let mut detected_order = Vec::new();
    for page in detected {
        let key = page.key();
        match detected_by_key.get_mut(&key) {
            Some(existing) => {
                warn!(
                    source = %key.source,
                    page_id = key.page_id,
                    "duplicate detected page, appending regions"
                );
                existing.regions.extend(page.regions);
            }
            None => {
                detected_order.push(key.clone());
                detected_by_key.insert(key, page);
            }
        }
    }

    let mut jobs: Vec<(Page, Page)> = Vec::with_capacity(reference.len());
    for reference_page in reference {
        let detected_page = detected_by_key
            .remove(&reference_page.key())
            .unwrap_or_else(|| {
                Page::new(reference_page.source.clone(), reference_page.page_id, Vec::new())
            });
        jobs.push((detected_page, reference_page));
    }
    for key in detected_order {
        if let Some(page) = detected_by_key.remove(&key) {
            warn!(source = %key.source, page_id = key.page_id, "detected page has no reference");
            let empty = Page::new(key.source, key.page_id, Vec::new());
            jobs.push((page, empty));
        }
    }

    let refiner = RegionRefiner::new(config.clone());
    let matcher = RecallMatcher::new();
    let pages: Vec<PageEvaluation> = jobs
        .into_par_iter()
        .map(|(detected_page, reference_page)| {
            let detected_regions = detected_page.regions.len();
            let candidates = if refine {
                refiner.refine(detected_page).0
            } else {
                detected_page
            };
            let outcomes = matcher.match_regions(&candidates.regions, &reference_page.regions);
            evaluate_page(
                &reference_page.source,
                reference_page.page_id,
                detected_regions,
                &candidates.regions,
                &reference_page.regions,
                &outcomes,
            )
        })
        .collect();

    let summary = summarize(&pages);
    info!(
        pages = summary.pages,
        detected = summary.detected_regions,
        refined = summary.refined_regions,
        reference = summary.reference_regions,
        matched = summary.matched_regions,
        "evaluation finished"
    );
    EvaluationReport { summary, pages }
}

pub fn export_report(report: &EvaluationReport, output: &Path) -> Result<()> {
    let exporters: [Box<dyn Exporter>; 3] = [
        Box::new(JsonExporter::new(output.to_path_buf())),
        Box::new(CsvExporter::new(output.to_path_buf())),
        Box::new(TextExporter::new(output.to_path_buf())),
    ];
    for exporter in &exporters {
        exporter
            .export(report)
            .with_context(|| format!("failed to export report to {}", output.display()))?;
    }
    Ok(())
}
