use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::model::EvaluationReport;
use crate::export::Exporter;

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    source: &'a str,
    page_id: i64,
    reference_index: usize,
    candidate_index: Option<usize>,
    f1_score: f64,
    text_distance: Option<f64>,
    reference_text: &'a str,
    candidate_text: Option<&'a str>,
}

/// Writes `matches.csv`, one row per reference region. Unmatched rows leave
/// the candidate columns empty.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for CsvExporter {
    fn export(&self, report: &EvaluationReport) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("matches.csv");
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        for page in &report.pages {
            for record in &page.matches {
                writer.serialize(MatchRow {
                    source: &page.source,
                    page_id: page.page_id,
                    reference_index: record.reference_index,
                    candidate_index: record.candidate_index,
                    f1_score: record.f1_score,
                    text_distance: record.text_distance,
                    reference_text: &record.reference_text,
                    candidate_text: record.candidate_text.as_deref(),
                })?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
