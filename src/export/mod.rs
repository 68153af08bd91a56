pub mod csv_export;
pub mod text_export;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::EvaluationReport;

pub use csv_export::CsvExporter;
pub use text_export::TextExporter;

pub trait Exporter {
    fn export(&self, report: &EvaluationReport) -> Result<()>;
}

/// Writes the whole report, summary and per-page records, to `report.json`.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, report: &EvaluationReport) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(
            self.out_dir.join("report.json"),
            serde_json::to_string_pretty(report)?,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::summarize;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn writes_pretty_report() -> Result<()> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let out = std::env::temp_dir().join(format!("regioneval-json-{}-{now}", std::process::id()));
        let report = EvaluationReport {
            summary: summarize(&[]),
            pages: Vec::new(),
        };

        JsonExporter::new(out.clone()).export(&report)?;

        let json = fs::read_to_string(out.join("report.json"))?;
        assert!(json.contains("\"compared_regions\": 0"));
        assert!(json.contains("\"mean_text_distance\": null"));
        let _ = fs::remove_dir_all(&out);
        Ok(())
    }
}
