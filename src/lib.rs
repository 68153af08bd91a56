pub mod config;
pub mod core;
pub mod eval;
pub mod export;
pub mod matching;
pub mod pipeline;
pub mod refine;
pub mod source;

pub use config::PipelineConfig;
pub use crate::core::geometry::Rectangle;
pub use crate::core::model::{EvaluationReport, Page, Region};
