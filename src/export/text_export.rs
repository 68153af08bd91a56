use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::EvaluationReport;
use crate::eval::Summary;
use crate::export::Exporter;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

fn format_ratio(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Human-readable summary with a bar chart of text distances.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!("pages:              {}\n", summary.pages));
    out.push_str(&format!("detected regions:   {}\n", summary.detected_regions));
    out.push_str(&format!("refined regions:    {}\n", summary.refined_regions));
    out.push_str(&format!("reference regions:  {}\n", summary.reference_regions));
    out.push_str(&format!("matched regions:    {}\n", summary.matched_regions));
    out.push_str(&format!("compared regions:   {}\n", summary.compared_regions));
    out.push_str(&format!("recall:             {}\n", format_ratio(summary.recall)));
    out.push_str(&format!("mean F1:            {}\n", format_ratio(summary.mean_f1)));
    out.push_str(&format!(
        "mean text distance: {}\n",
        format_ratio(summary.mean_text_distance)
    ));
    out.push_str(&format!(
        "exact text matches: {} ({})\n",
        summary.exact_matches,
        format_ratio(summary.exact_match_ratio)
    ));

    let bins = summary.distance_histogram.len();
    if bins == 0 {
        return out;
    }
    let peak = summary.distance_histogram.iter().copied().max().unwrap_or(0);
    out.push_str("\ntext distance histogram:\n");
    for (idx, &count) in summary.distance_histogram.iter().enumerate() {
        let lo = idx as f64 / bins as f64;
        let hi = (idx + 1) as f64 / bins as f64;
        let closing = if idx + 1 == bins { ']' } else { ')' };
        let bar = if peak == 0 { 0 } else { count * BAR_WIDTH / peak };
        out.push_str(&format!(
            "[{lo:.1}, {hi:.1}{closing} {count:>6} {}\n",
            "#".repeat(bar)
        ));
    }
    out
}

impl Exporter for TextExporter {
    fn export(&self, report: &EvaluationReport) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join("summary.txt");
        fs::write(path, render_summary(&report.summary))?;
        Ok(())
    }
}
