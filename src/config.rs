use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SourceError};

pub const DEFAULT_NOISE_CHARACTERS: &str = "、。])）」|\\/一";

/// Thresholds and margins for the refinement stages.
///
/// Built once at startup (defaults, then an optional JSON file, then the
/// environment, then CLI flags) and passed by reference into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Regions narrower than this are dropped.
    pub min_w: i64,
    /// Regions shorter than this are dropped.
    pub min_h: i64,
    /// Horizontal margin used when clustering nearby regions.
    pub x_expansion: i64,
    /// Vertical margin used when clustering nearby regions.
    pub y_expansion: i64,
    /// Characters stripped from merged text before matching.
    pub noise_characters: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_w: 15,
            min_h: 15,
            x_expansion: 3,
            y_expansion: 0,
            noise_characters: DEFAULT_NOISE_CHARACTERS.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from `MIN_W`, `MIN_H`, `X_EXPANSION`, `Y_EXPANSION`
    /// and `NOISE_CHARACTERS` when they are set.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let int_var = |name: &str| -> Result<Option<i64>> {
            match lookup(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|e| SourceError::Config(format!("{name}={raw:?}: {e}"))),
                None => Ok(None),
            }
        };

        if let Some(v) = int_var("MIN_W")? {
            self.min_w = v;
        }
        if let Some(v) = int_var("MIN_H")? {
            self.min_h = v;
        }
        if let Some(v) = int_var("X_EXPANSION")? {
            self.x_expansion = v;
        }
        if let Some(v) = int_var("Y_EXPANSION")? {
            self.y_expansion = v;
        }
        if let Some(chars) = lookup("NOISE_CHARACTERS") {
            self.noise_characters = chars;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_w", self.min_w),
            ("min_h", self.min_h),
            ("x_expansion", self.x_expansion),
            ("y_expansion", self.y_expansion),
        ] {
            if value < 0 {
                return Err(SourceError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn noise_set(&self) -> BTreeSet<char> {
        self.noise_characters.chars().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_defaults() -> Result<()> {
        let config = PipelineConfig::default().apply_vars(vars(&[
            ("MIN_W", "20"),
            ("Y_EXPANSION", " 4 "),
            ("NOISE_CHARACTERS", "!?"),
        ]))?;
        assert_eq!(
            config,
            PipelineConfig {
                min_w: 20,
                min_h: 15,
                x_expansion: 3,
                y_expansion: 4,
                noise_characters: "!?".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn rejects_unparsable_env_value() {
        let err = PipelineConfig::default()
            .apply_vars(vars(&[("MIN_H", "tall")]))
            .unwrap_err();
        assert!(err.to_string().contains("MIN_H"));
    }

    #[test]
    fn rejects_negative_margin() {
        let config = PipelineConfig {
            x_expansion: -1,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() -> Result<()> {
        let config: PipelineConfig = serde_json::from_str(r#"{"min_w": 5}"#)?;
        assert_eq!(config.min_w, 5);
        assert_eq!(config.min_h, 15);
        assert_eq!(config.noise_characters, DEFAULT_NOISE_CHARACTERS);
        Ok(())
    }
}
